//! In-process `GtdApi` backend.
//!
//! Backs offline CLI sessions and the view/app tests. Failures can be
//! scripted and every call is recorded by operation name.

use super::{
    action_endpoint, thing_endpoint, ApiError, ApiResponse, ApiResult, GtdApi, ACTIONS_ENDPOINT,
    PROJECTS_ENDPOINT, THINGS_ENDPOINT,
};
use crate::model::{
    Action, ActionId, ActionStatus, NewAction, NewProject, NewThing, Project, Thing, ThingId,
    ThingStatus,
};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

type CallHook = Box<dyn Fn(&str)>;

#[derive(Default)]
pub struct InMemoryGtdApi {
    things: RefCell<Vec<Thing>>,
    actions: RefCell<Vec<Action>>,
    projects: RefCell<Vec<Project>>,
    next_id: Cell<i64>,
    failures: RefCell<VecDeque<ApiError>>,
    calls: RefCell<Vec<String>>,
    hook: RefCell<Option<CallHook>>,
}

impl InMemoryGtdApi {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Self::default()
        }
    }

    pub fn with_things(things: Vec<Thing>) -> Self {
        let next = things.iter().map(|thing| thing.id).max().unwrap_or(0) + 1;
        let api = Self::new();
        api.next_id.set(next);
        *api.things.borrow_mut() = things;
        api
    }

    /// Makes the next call fail with `error`. Queued failures apply in order.
    pub fn fail_next(&self, error: ApiError) {
        self.failures.borrow_mut().push_back(error);
    }

    /// Runs `hook` with the operation name at the start of every call.
    pub fn set_call_hook(&self, hook: impl Fn(&str) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn things(&self) -> Vec<Thing> {
        self.things.borrow().clone()
    }

    pub fn thing(&self, id: ThingId) -> Option<Thing> {
        self.things.borrow().iter().find(|thing| thing.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.as_str() == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    fn begin(&self, operation: &str) -> ApiResult<()> {
        self.calls.borrow_mut().push(operation.to_string());
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook(operation);
        }
        match self.failures.borrow_mut().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

fn to_json<T: serde::Serialize>(endpoint: &str, value: &T) -> ApiResult<ApiResponse> {
    serde_json::to_value(value)
        .map(ApiResponse::Json)
        .map_err(|err| ApiError::Decode {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })
}

fn bad_request(endpoint: &str) -> ApiError {
    ApiError::from_status(endpoint, 400, "Bad Request")
}

#[async_trait(?Send)]
impl GtdApi for InMemoryGtdApi {
    async fn list_things(&self) -> ApiResult<Vec<Thing>> {
        self.begin("list_things")?;
        Ok(self.things())
    }

    async fn create_thing(&self, thing: &NewThing) -> ApiResult<ApiResponse> {
        self.begin("create_thing")?;
        if thing.validate().is_err() {
            return Err(bad_request(THINGS_ENDPOINT));
        }
        let created = Thing {
            id: self.allocate_id(),
            title: thing.title.clone(),
            description: thing.description.clone(),
            status: ThingStatus::Pending,
        };
        self.things.borrow_mut().push(created.clone());
        to_json(THINGS_ENDPOINT, &created)
    }

    async fn update_thing_status(
        &self,
        id: ThingId,
        status: ThingStatus,
    ) -> ApiResult<ApiResponse> {
        self.begin("update_thing_status")?;
        let endpoint = thing_endpoint(id);
        let mut things = self.things.borrow_mut();
        let thing = things
            .iter_mut()
            .find(|thing| thing.id == id)
            .ok_or_else(|| ApiError::from_status(&endpoint, 404, "Not Found"))?;
        thing.status = status;
        to_json(&endpoint, thing)
    }

    async fn delete_thing(&self, id: ThingId) -> ApiResult<ApiResponse> {
        self.begin("delete_thing")?;
        let endpoint = thing_endpoint(id);
        let mut things = self.things.borrow_mut();
        let before = things.len();
        things.retain(|thing| thing.id != id);
        if things.len() == before {
            return Err(ApiError::from_status(&endpoint, 404, "Not Found"));
        }
        Ok(ApiResponse::Raw {
            status: 204,
            body: String::new(),
        })
    }

    async fn list_actions(&self) -> ApiResult<Vec<Action>> {
        self.begin("list_actions")?;
        Ok(self.actions.borrow().clone())
    }

    async fn create_action(&self, action: &NewAction) -> ApiResult<ApiResponse> {
        self.begin("create_action")?;
        if action.title.trim().is_empty() {
            return Err(bad_request(ACTIONS_ENDPOINT));
        }
        let created = Action {
            id: self.allocate_id(),
            title: action.title.clone(),
            description: action.description.clone(),
            status: action.status,
            due_date: action.due_date,
            context: action.context.clone(),
        };
        self.actions.borrow_mut().push(created.clone());
        to_json(ACTIONS_ENDPOINT, &created)
    }

    async fn update_action_status(
        &self,
        id: ActionId,
        status: ActionStatus,
    ) -> ApiResult<ApiResponse> {
        self.begin("update_action_status")?;
        let endpoint = action_endpoint(id);
        let mut actions = self.actions.borrow_mut();
        let action = actions
            .iter_mut()
            .find(|action| action.id == id)
            .ok_or_else(|| ApiError::from_status(&endpoint, 404, "Not Found"))?;
        action.status = status;
        to_json(&endpoint, action)
    }

    async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.begin("list_projects")?;
        Ok(self.projects.borrow().clone())
    }

    async fn create_project(&self, project: &NewProject) -> ApiResult<ApiResponse> {
        self.begin("create_project")?;
        if project.title.trim().is_empty() {
            return Err(bad_request(PROJECTS_ENDPOINT));
        }
        let created = Project {
            id: self.allocate_id(),
            title: project.title.clone(),
            description: project.description.clone(),
        };
        self.projects.borrow_mut().push(created.clone());
        to_json(PROJECTS_ENDPOINT, &created)
    }
}
