//! What a DOM handler asks the application to do.
//!
//! Handlers registered on the surface are pure: they inspect the event and
//! return an `Intent`. The app then routes each intent to the router, the
//! navigation component or the visible view.

use crate::model::ThingId;
use crate::ui::surface::KeyPress;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate {
        path: String,
        params: BTreeMap<String, String>,
    },
    DismissToast,
    NavKey(KeyPress),
    SubmitCapture,
    DraftChanged,
    ClarifyThing(ThingId),
    DeleteThing(ThingId),
    Clarify(ClarifyDecision),
    FilterActions(ActionFilter),
    ActionCommand {
        command: ActionCommand,
        id: i64,
    },
}

impl Intent {
    pub fn navigate(path: impl Into<String>) -> Self {
        Self::Navigate {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }
}

/// The five ways a thing can be clarified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClarifyDecision {
    Quick,
    Action,
    Project,
    Someday,
    Delete,
}

impl ClarifyDecision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "quick" => Some(Self::Quick),
            "action" => Some(Self::Action),
            "project" => Some(Self::Project),
            "someday" => Some(Self::Someday),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Action => "action",
            Self::Project => "project",
            Self::Someday => "someday",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionFilter {
    #[default]
    All,
    Todo,
    Doing,
    Done,
}

impl ActionFilter {
    pub const ALL: [ActionFilter; 4] = [Self::All, Self::Todo, Self::Doing, Self::Done];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(Self::All),
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }
}

/// Per-item buttons on the actions screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCommand {
    Start,
    Complete,
    Pause,
    Defer,
    Reopen,
}

impl ActionCommand {
    pub const ALL: [ActionCommand; 5] = [
        Self::Start,
        Self::Complete,
        Self::Pause,
        Self::Defer,
        Self::Reopen,
    ];

    pub fn button_class(self) -> &'static str {
        match self {
            Self::Start => "btn-start",
            Self::Complete => "btn-complete",
            Self::Pause => "btn-pause",
            Self::Defer => "btn-defer",
            Self::Reopen => "btn-reopen",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "시작",
            Self::Complete => "완료",
            Self::Pause => "일시정지",
            Self::Defer => "연기",
            Self::Reopen => "다시 열기",
        }
    }
}
