//! Inbox screen: capture new things and list what is waiting.
//!
//! # Responsibility
//! - Capture form with validation, Enter-to-submit and a debounced draft.
//! - Newest-first list with clarify and delete controls.
//!
//! # Invariants
//! - Only pending things offer the clarify control; every thing offers delete.
//! - An invalid form never reaches the API.

use super::{Services, View, ViewCore, ViewResult};
use crate::clock::{Clock, EpochMillis};
use crate::model::{NewThing, Thing, ThingId};
use crate::router::Route;
use crate::storage::InboxDraft;
use crate::ui::layout::{CAPTURE_FORM, INBOX_VIEW, THING_DESCRIPTION, THING_LIST, THING_TITLE};
use crate::ui::{Debouncer, EventKind, Intent, Node};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;

const LOADING_LIST: &str = "Thing 목록을 불러오는 중...";
const LOADING_CREATE: &str = "새로운 생각을 추가하는 중...";
const LOADING_DELETE: &str = "삭제하는 중...";

pub struct InboxView {
    core: ViewCore,
    things: Vec<Thing>,
    draft: Debouncer,
}

impl InboxView {
    pub fn new(services: Services) -> Self {
        let delay = Duration::from_millis(services.ui().draft_debounce_ms);
        Self {
            core: ViewCore::new("inbox", INBOX_VIEW, services),
            things: Vec::new(),
            draft: Debouncer::new(delay),
        }
    }

    /// Things from the last successful load, newest first.
    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub fn pending_count(&self) -> usize {
        self.things.iter().filter(|thing| thing.is_pending()).count()
    }

    pub fn has_pending_draft(&self) -> bool {
        self.draft.is_pending()
    }

    fn arm_listeners(&mut self) {
        let core = &mut self.core;
        core.listen(CAPTURE_FORM, EventKind::Submit, |_| Some(Intent::SubmitCapture));
        core.listen(THING_TITLE, EventKind::KeyDown, |event| {
            event
                .key
                .as_ref()
                .filter(|key| key.key == "Enter" && !key.shift)
                .map(|_| Intent::SubmitCapture)
        });
        core.listen(THING_TITLE, EventKind::Input, |_| Some(Intent::DraftChanged));
        core.listen(THING_DESCRIPTION, EventKind::Input, |_| Some(Intent::DraftChanged));
        core.listen_keyed("thing-list", THING_LIST, EventKind::Click, |event| {
            let id = event.data_id("thingId")?;
            if event.has_class("btn-clarify") {
                Some(Intent::ClarifyThing(id))
            } else if event.has_class("btn-delete") {
                Some(Intent::DeleteThing(id))
            } else {
                None
            }
        });
    }

    fn restore_draft(&self) {
        let Some(draft) = self.core.services().cache().inbox_draft() else {
            return;
        };
        if draft.is_empty() {
            return;
        }
        let mut surface = self.core.services().surface().borrow_mut();
        surface.set_value(THING_TITLE, &draft.title);
        surface.set_value(THING_DESCRIPTION, &draft.description);
        debug!("event=draft_restore module=view status=ok view=inbox");
    }

    fn current_draft(&self) -> InboxDraft {
        let surface = self.core.services().surface().borrow();
        InboxDraft {
            title: surface.value(THING_TITLE).unwrap_or_default().to_string(),
            description: surface.value(THING_DESCRIPTION).unwrap_or_default().to_string(),
        }
    }

    fn save_draft(&self) {
        let draft = self.current_draft();
        let cache = self.core.services().cache();
        if draft.is_empty() {
            cache.clear_inbox_draft();
        } else {
            cache.save_inbox_draft(&draft);
        }
    }

    async fn refresh(&mut self) -> ViewResult {
        let mut things = self
            .core
            .load_with_state(self.core.services().api().list_things(), LOADING_LIST)
            .await?;
        things.sort_by(|a, b| b.id.cmp(&a.id));
        info!(
            "event=inbox_load module=view status=ok count={} pending={}",
            things.len(),
            things.iter().filter(|thing| thing.is_pending()).count()
        );
        self.things = things;
        self.render();
        self.core.record_activity("Inbox 새로고침");
        Ok(())
    }

    fn render(&self) {
        let nodes = if self.things.is_empty() {
            vec![empty_state()]
        } else {
            self.things.iter().map(thing_item).collect()
        };
        self.core.render(THING_LIST, nodes);
    }

    async fn submit(&mut self) -> ViewResult {
        let validation = self.core.validate_form(CAPTURE_FORM);
        if !validation.is_valid {
            if let Some(first) = validation.errors.first() {
                self.core.services().notifier().error(first.message.clone());
                self.core.focus(&first.element);
            }
            debug!(
                "event=capture_submit module=view status=invalid errors={}",
                validation.errors.len()
            );
            return Ok(());
        }

        let thing = NewThing::new(
            validation.field("title").trim(),
            validation.field("description").trim(),
        );
        if thing.validate().is_err() {
            return Ok(());
        }

        self.core
            .load_with_state(self.core.services().api().create_thing(&thing), LOADING_CREATE)
            .await?;

        {
            let mut surface = self.core.services().surface().borrow_mut();
            surface.set_value(THING_TITLE, "");
            surface.set_value(THING_DESCRIPTION, "");
        }
        self.draft.cancel();
        self.core.services().cache().clear_inbox_draft();
        self.core.services().notifier().success("새로운 생각이 추가되었습니다.");
        self.core.record_activity(format!("새 생각 추가: {}", thing.title));
        self.core.focus(THING_TITLE);
        self.refresh().await
    }

    fn clarify(&self, id: ThingId) -> ViewResult {
        if let Some(thing) = self.find_thing(id) {
            self.core.record_activity(format!("명확화 시작: {}", thing.title));
        }
        self.core
            .services()
            .router()
            .navigate("clarify", [("thingId", id.to_string())]);
        Ok(())
    }

    async fn delete(&mut self, id: ThingId) -> ViewResult {
        let Some(thing) = self.find_thing(id) else {
            warn!("event=thing_delete module=view status=unknown_id id={id}");
            return Ok(());
        };
        let question = format!("\"{}\"을(를) 정말 삭제하시겠습니까?", thing.title);
        if !self.core.services().prompter().confirm(&question) {
            debug!("event=thing_delete module=view status=cancelled id={id}");
            return Ok(());
        }

        self.core
            .load_with_state(self.core.services().api().delete_thing(id), LOADING_DELETE)
            .await?;
        self.core.services().notifier().success("생각이 삭제되었습니다.");
        self.core.record_activity(format!("생각 삭제: {}", thing.title));
        self.refresh().await
    }

    fn find_thing(&self, id: ThingId) -> Option<Thing> {
        self.things.iter().find(|thing| thing.id == id).cloned()
    }
}

#[async_trait(?Send)]
impl View for InboxView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    async fn on_show(&mut self, route: &Route) -> ViewResult {
        self.arm_listeners();
        self.restore_draft();
        if route.param("focus") == Some("input") {
            self.core.focus(THING_TITLE);
        }
        self.refresh().await
    }

    async fn on_hide(&mut self) -> ViewResult {
        if self.draft.is_pending() {
            self.draft.cancel();
            self.save_draft();
        }
        Ok(())
    }

    async fn handle(&mut self, intent: Intent) -> ViewResult {
        match intent {
            Intent::SubmitCapture => self.submit().await,
            Intent::DraftChanged => {
                let now = self.core.services().clock().now_ms();
                self.draft.trigger(now);
                Ok(())
            }
            Intent::ClarifyThing(id) => self.clarify(id),
            Intent::DeleteThing(id) => self.delete(id).await,
            other => {
                debug!("event=view_intent module=view status=ignored view=inbox intent={other:?}");
                Ok(())
            }
        }
    }

    fn on_tick(&mut self, now: EpochMillis) {
        if self.draft.fire_due(now) {
            self.save_draft();
        }
    }

    fn badge(&self) -> Option<usize> {
        Some(self.pending_count())
    }
}

fn thing_item(thing: &Thing) -> Node {
    let description = if thing.description.trim().is_empty() {
        "설명 없음"
    } else {
        thing.description.as_str()
    };

    let mut actions = Node::el("div").class("item-actions");
    if thing.is_pending() {
        actions = actions.child(
            Node::el("button")
                .class("btn btn-primary btn-clarify")
                .data("thing-id", thing.id.to_string())
                .attr("aria-label", format!("{} 명확화", thing.title))
                .with_text("명확화"),
        );
    }
    actions = actions.child(
        Node::el("button")
            .class("btn btn-secondary btn-delete")
            .data("thing-id", thing.id.to_string())
            .attr("aria-label", format!("{} 제거", thing.title))
            .with_text("제거"),
    );

    Node::el("div")
        .class("thing-item")
        .data("thing-id", thing.id.to_string())
        .attr("role", "listitem")
        .child(
            Node::el("div")
                .class("item-content")
                .child(Node::el("h3").class("item-title").with_text(thing.title.as_str()))
                .child(Node::el("p").class("item-description").with_text(description))
                .child(
                    Node::el("span")
                        .class("item-status")
                        .class(thing.status.css_class())
                        .attr("aria-label", format!("상태: {}", thing.status.label()))
                        .with_text(thing.status.label()),
                ),
        )
        .child(actions)
}

fn empty_state() -> Node {
    Node::el("div")
        .class("empty-state")
        .child(Node::el("h3").with_text("아직 포착된 생각이 없습니다"))
        .child(Node::el("p").with_text("머릿속에 떠오르는 모든 것을 위의 입력란에 적어보세요."))
        .child(Node::el("p").with_text("작은 것이라도 포착하면 마음이 가벼워집니다."))
}

#[cfg(test)]
mod tests {
    use super::{empty_state, thing_item};
    use crate::model::{Thing, ThingStatus};

    #[test]
    fn pending_item_offers_clarify_and_delete() {
        let node = thing_item(&Thing::new(7, "call <mom>", ThingStatus::Pending));
        let html = node.render();

        assert!(html.as_str().contains("call &lt;mom&gt;"));
        assert!(html.as_str().contains("btn-clarify"));
        assert!(html.as_str().contains("btn-delete"));
        assert!(html.as_str().contains("설명 없음"));
        assert_eq!(node.dataset().get("thingId").map(String::as_str), Some("7"));
    }

    #[test]
    fn done_item_has_no_clarify_control() {
        let node = thing_item(&Thing::new(3, "done", ThingStatus::Done).with_description("x"));
        let html = node.render();
        assert!(!html.as_str().contains("btn-clarify"));
        assert!(html.as_str().contains("status-done"));
        assert!(html.as_str().contains("상태: 완료"));
    }

    #[test]
    fn empty_state_mentions_nothing_captured() {
        assert!(empty_state().text_content().contains("아직 포착된 생각이 없습니다"));
    }
}
