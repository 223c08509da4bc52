//! Actions screen.
//!
//! There is no action source wired to a screen yet, so completed things are
//! projected as done actions. Filter state survives re-renders but not a
//! hide; the `filter` route parameter selects it on show.

use super::{Services, View, ViewCore, ViewResult};
use crate::clock::{Clock, EpochMillis};
use crate::model::{Thing, ThingStatus};
use crate::router::Route;
use crate::ui::layout::{filter_button_id, ACTIONS_VIEW, ACTION_LIST, FILTER_BAR};
use crate::ui::{relative_time, ActionCommand, ActionFilter, EventKind, Intent, Node};
use async_trait::async_trait;
use log::{debug, info};

const LOADING_ACTIONS: &str = "Action 목록을 불러오는 중...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStage {
    Todo,
    Doing,
    Done,
    Deferred,
    Delegated,
}

impl ActionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Deferred => "deferred",
            Self::Delegated => "delegated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "해야됨",
            Self::Doing => "수행중",
            Self::Done => "완료",
            Self::Deferred => "연기됨",
            Self::Delegated => "위임됨",
        }
    }

    pub fn css_class(self) -> String {
        format!("action-status-{}", self.as_str())
    }

    /// Buttons offered for an action in this stage.
    pub fn commands(self) -> &'static [ActionCommand] {
        match self {
            Self::Todo => &[ActionCommand::Start, ActionCommand::Defer],
            Self::Doing => &[ActionCommand::Complete, ActionCommand::Pause],
            Self::Done => &[ActionCommand::Reopen],
            Self::Deferred | Self::Delegated => &[],
        }
    }

    pub fn matches(self, filter: ActionFilter) -> bool {
        match filter {
            ActionFilter::All => true,
            ActionFilter::Todo => self == Self::Todo,
            ActionFilter::Doing => self == Self::Doing,
            ActionFilter::Done => self == Self::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub stage: ActionStage,
    pub completed_at: Option<EpochMillis>,
}

impl ActionItem {
    /// Projects a done thing; other things have no action counterpart.
    pub fn from_thing(thing: &Thing, loaded_at: EpochMillis) -> Option<Self> {
        (thing.status == ThingStatus::Done).then(|| Self {
            id: thing.id,
            title: thing.title.clone(),
            description: thing.description.clone(),
            stage: ActionStage::Done,
            completed_at: Some(loaded_at),
        })
    }
}

pub struct ActionsView {
    core: ViewCore,
    items: Vec<ActionItem>,
    filter: ActionFilter,
}

impl ActionsView {
    pub fn new(services: Services) -> Self {
        Self {
            core: ViewCore::new("actions", ACTIONS_VIEW, services),
            items: Vec::new(),
            filter: ActionFilter::All,
        }
    }

    pub fn filter(&self) -> ActionFilter {
        self.filter
    }

    pub fn items(&self) -> &[ActionItem] {
        &self.items
    }

    pub fn visible_items(&self) -> Vec<&ActionItem> {
        self.items
            .iter()
            .filter(|item| item.stage.matches(self.filter))
            .collect()
    }

    pub fn count_for(&self, filter: ActionFilter) -> usize {
        self.items.iter().filter(|item| item.stage.matches(filter)).count()
    }

    fn arm_listeners(&mut self) {
        self.core.listen(FILTER_BAR, EventKind::Click, |event| {
            if !event.has_class("filter-btn") {
                return None;
            }
            event
                .data("filter")
                .and_then(ActionFilter::parse)
                .map(Intent::FilterActions)
        });
        self.core
            .listen_keyed("action-list", ACTION_LIST, EventKind::Click, |event| {
                let id = event.data_id("actionId")?;
                ActionCommand::ALL
                    .into_iter()
                    .find(|command| event.has_class(command.button_class()))
                    .map(|command| Intent::ActionCommand { command, id })
            });
    }

    fn set_filter(&mut self, filter: ActionFilter) {
        self.filter = filter;
        let mut surface = self.core.services().surface().borrow_mut();
        for candidate in ActionFilter::ALL {
            let id = filter_button_id(candidate.as_str());
            let selected = candidate == filter;
            if selected {
                surface.add_class(&id, "active");
            } else {
                surface.remove_class(&id, "active");
            }
            surface.set_attr(&id, "aria-pressed", if selected { "true" } else { "false" });
        }
    }

    async fn refresh(&mut self) -> ViewResult {
        let things = self
            .core
            .load_with_state(self.core.services().api().list_things(), LOADING_ACTIONS)
            .await?;
        let now = self.core.services().clock().now_ms();
        self.items = things
            .iter()
            .filter_map(|thing| ActionItem::from_thing(thing, now))
            .collect();
        info!(
            "event=actions_load module=view status=ok count={}",
            self.items.len()
        );
        self.render();
        self.core.record_activity("Actions 새로고침");
        Ok(())
    }

    fn render(&self) {
        {
            let mut surface = self.core.services().surface().borrow_mut();
            for filter in ActionFilter::ALL {
                let count = self.count_for(filter);
                surface.set_content(
                    &filter_button_id(filter.as_str()),
                    vec![Node::el("span")
                        .class("filter-badge")
                        .with_text(count.to_string())],
                );
            }
        }

        let now = self.core.services().clock().now_ms();
        let visible = self.visible_items();
        let nodes = if visible.is_empty() {
            vec![empty_state(self.filter)]
        } else {
            visible.into_iter().map(|item| action_item(item, now)).collect()
        };
        self.core.render(ACTION_LIST, nodes);
    }
}

#[async_trait(?Send)]
impl View for ActionsView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    async fn on_show(&mut self, route: &Route) -> ViewResult {
        let filter = route
            .param("filter")
            .and_then(ActionFilter::parse)
            .unwrap_or_default();
        self.set_filter(filter);
        self.arm_listeners();
        self.refresh().await
    }

    async fn handle(&mut self, intent: Intent) -> ViewResult {
        match intent {
            Intent::FilterActions(filter) => {
                self.set_filter(filter);
                self.render();
                debug!(
                    "event=actions_filter module=view status=ok filter={}",
                    filter.as_str()
                );
            }
            Intent::ActionCommand { command, id } => {
                debug!(
                    "event=action_command module=view status=pending command={} id={id}",
                    command.button_class()
                );
                self.core.services().notifier().info(format!(
                    "Action {} 기능은 곧 구현될 예정입니다.",
                    command.label()
                ));
            }
            other => {
                debug!("event=view_intent module=view status=ignored view=actions intent={other:?}");
            }
        }
        Ok(())
    }
}

fn action_item(item: &ActionItem, now: EpochMillis) -> Node {
    let mut meta = Node::el("div").class("item-meta").child(
        Node::el("span")
            .class("action-status")
            .class(&item.stage.css_class())
            .with_text(item.stage.label()),
    );
    if let Some(completed_at) = item.completed_at {
        meta = meta.child(
            Node::el("span")
                .class("completed-time")
                .with_text(format!("{} 완료", relative_time(completed_at, now))),
        );
    }

    let buttons = item.stage.commands().iter().map(|command| {
        Node::el("button")
            .class("btn btn-small")
            .class(command.button_class())
            .data("action-id", item.id.to_string())
            .with_text(command.label())
    });

    let mut content = Node::el("div")
        .class("item-content")
        .child(Node::el("h3").class("item-title").with_text(item.title.as_str()));
    if !item.description.trim().is_empty() {
        content = content.child(
            Node::el("p")
                .class("item-description")
                .with_text(item.description.as_str()),
        );
    }

    Node::el("div")
        .class("action-item")
        .data("action-id", item.id.to_string())
        .attr("role", "listitem")
        .child(content.child(meta))
        .child(Node::el("div").class("item-actions").children(buttons))
}

fn empty_state(filter: ActionFilter) -> Node {
    let title = match filter {
        ActionFilter::All => "아직 Action이 없습니다",
        ActionFilter::Todo => "해야 할 Action이 없습니다",
        ActionFilter::Doing => "진행 중인 Action이 없습니다",
        ActionFilter::Done => "완료된 Action이 없습니다",
    };
    let hint = if filter == ActionFilter::All {
        "Inbox에서 생각을 명확화하여 Action을 만들어보세요."
    } else {
        "다른 필터를 선택해보세요."
    };
    Node::el("div")
        .class("empty-state")
        .child(Node::el("h3").with_text(title))
        .child(Node::el("p").with_text(hint))
}

#[cfg(test)]
mod tests {
    use super::{action_item, empty_state, ActionItem, ActionStage};
    use crate::model::{Thing, ThingStatus};
    use crate::ui::{ActionCommand, ActionFilter};

    #[test]
    fn only_done_things_become_actions() {
        assert!(ActionItem::from_thing(&Thing::new(1, "a", ThingStatus::Pending), 0).is_none());
        let item = ActionItem::from_thing(&Thing::new(2, "b", ThingStatus::Done), 5).unwrap();
        assert_eq!(item.stage, ActionStage::Done);
        assert_eq!(item.completed_at, Some(5));
    }

    #[test]
    fn stage_commands_follow_the_workflow() {
        assert_eq!(
            ActionStage::Todo.commands(),
            &[ActionCommand::Start, ActionCommand::Defer]
        );
        assert_eq!(ActionStage::Done.commands(), &[ActionCommand::Reopen]);
        assert!(ActionStage::Done.matches(ActionFilter::All));
        assert!(!ActionStage::Done.matches(ActionFilter::Todo));
    }

    #[test]
    fn done_item_renders_reopen_and_completion_time() {
        let item = ActionItem {
            id: 9,
            title: "ship".into(),
            description: String::new(),
            stage: ActionStage::Done,
            completed_at: Some(1_000),
        };
        let html = action_item(&item, 1_000).render();
        assert!(html.as_str().contains("btn-reopen"));
        assert!(html.as_str().contains("방금 전 완료"));
        assert!(html.as_str().contains("action-status-done"));
    }

    #[test]
    fn empty_state_depends_on_filter() {
        assert!(empty_state(ActionFilter::Doing)
            .text_content()
            .contains("진행 중인 Action이 없습니다"));
        assert!(empty_state(ActionFilter::Done)
            .text_content()
            .contains("다른 필터를 선택해보세요."));
    }
}
