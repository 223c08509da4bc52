//! Domain records exchanged with the REST backend.

pub mod action;
pub mod thing;

pub use action::{Action, ActionId, ActionStatus, NewAction, NewProject, Project, ProjectId};
pub use thing::{NewThing, Thing, ThingId, ThingStatus, ThingValidationError};
