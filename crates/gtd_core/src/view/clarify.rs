//! Clarify screen: decide what a captured thing is.
//!
//! # Responsibility
//! - Resolve `thingId` from the route and show the thing with five options.
//! - Apply the chosen decision through the API and leave for the next screen.
//!
//! # Invariants
//! - A missing, malformed or unknown `thingId` shows an error toast and
//!   redirects to the inbox without rendering options.

use super::{Services, View, ViewCore, ViewResult};
use crate::model::{Thing, ThingId, ThingStatus};
use crate::router::{Route, DEFAULT_ROUTE};
use crate::ui::layout::{CLARIFY_BACK, CLARIFY_CONTENT, CLARIFY_VIEW};
use crate::ui::{ClarifyDecision, EventKind, Intent, Node};
use async_trait::async_trait;
use log::{debug, info, warn};

const MISSING_PARAM_MESSAGE: &str = "명확화할 항목을 찾을 수 없습니다.";
const UNKNOWN_THING_MESSAGE: &str = "해당 항목을 찾을 수 없습니다.";
const LOADING_THING: &str = "Thing 정보를 불러오는 중...";

const OPTIONS: [(ClarifyDecision, &str, &str); 5] = [
    (ClarifyDecision::Quick, "2분 안에 끝낼 수 있어요", "지금 바로 처리하고 완료로 표시합니다."),
    (ClarifyDecision::Action, "다음 행동이 필요해요", "실행할 Action으로 만듭니다."),
    (ClarifyDecision::Project, "여러 단계가 필요해요", "Project로 만들어 관리합니다."),
    (ClarifyDecision::Someday, "언젠가 할 수도 있어요", "Someday/Maybe 목록으로 보냅니다."),
    (ClarifyDecision::Delete, "필요 없어요", "이 항목을 삭제합니다."),
];

pub struct ClarifyView {
    core: ViewCore,
    thing: Option<Thing>,
}

impl ClarifyView {
    pub fn new(services: Services) -> Self {
        Self {
            core: ViewCore::new("clarify", CLARIFY_VIEW, services),
            thing: None,
        }
    }

    /// Thing being clarified, once resolved.
    pub fn thing(&self) -> Option<&Thing> {
        self.thing.as_ref()
    }

    fn arm_listeners(&mut self) {
        self.core.listen(CLARIFY_BACK, EventKind::Click, |_| {
            Some(Intent::navigate(DEFAULT_ROUTE))
        });
        self.core
            .listen_keyed("clarify-options", CLARIFY_CONTENT, EventKind::Click, |event| {
                if !event.has_class("option-btn") {
                    return None;
                }
                event
                    .data("action")
                    .and_then(ClarifyDecision::parse)
                    .map(Intent::Clarify)
            });
    }

    fn bail(&self, message: &str) {
        self.core.services().notifier().error(message);
        self.core.navigate(DEFAULT_ROUTE);
    }

    async fn load(&mut self, id: ThingId) -> ViewResult {
        let loaded = self
            .core
            .load_with_state(self.core.services().api().list_things(), LOADING_THING)
            .await;
        let things = match loaded {
            Ok(things) => things,
            Err(err) => {
                self.core.navigate(DEFAULT_ROUTE);
                return Err(err.into());
            }
        };

        let Some(thing) = things.into_iter().find(|thing| thing.id == id) else {
            warn!("event=clarify_load module=view status=unknown_id id={id}");
            self.bail(UNKNOWN_THING_MESSAGE);
            return Ok(());
        };
        info!("event=clarify_load module=view status=ok id={id}");
        self.core.render(CLARIFY_CONTENT, render_thing(&thing));
        self.core.record_activity(format!("명확화 검토: {}", thing.title));
        self.thing = Some(thing);
        Ok(())
    }

    async fn decide(&mut self, decision: ClarifyDecision) -> ViewResult {
        let Some(thing) = self.thing.clone() else {
            warn!(
                "event=clarify_decide module=view status=no_thing decision={}",
                decision.as_str()
            );
            return Ok(());
        };
        let services = self.core.services().clone();
        let api = services.api();
        let notifier = services.notifier();

        match decision {
            ClarifyDecision::Quick => {
                if !services.prompter().confirm("이 작업을 지금 바로 완료하시겠습니까?") {
                    return Ok(());
                }
                self.core
                    .load_with_state(
                        api.update_thing_status(thing.id, ThingStatus::Done),
                        "완료 처리하는 중...",
                    )
                    .await?;
                notifier.success("작업이 완료로 처리되었습니다.");
                self.core.record_activity(format!("빠른 완료: {}", thing.title));
                self.core.navigate(DEFAULT_ROUTE);
            }
            ClarifyDecision::Action => {
                notifier.info("Action 기능은 곧 구현될 예정입니다.");
                self.core
                    .load_with_state(
                        api.update_thing_status(thing.id, ThingStatus::Done),
                        "Action으로 변환하는 중...",
                    )
                    .await?;
                self.core.record_activity(format!("Action 생성: {}", thing.title));
                self.core.navigate("actions");
            }
            ClarifyDecision::Project => {
                notifier.info("Project 기능은 곧 구현될 예정입니다.");
                self.core
                    .load_with_state(
                        api.update_thing_status(thing.id, ThingStatus::Done),
                        "Project로 변환하는 중...",
                    )
                    .await?;
                self.core.record_activity(format!("Project 생성: {}", thing.title));
                self.core.navigate("projects");
            }
            ClarifyDecision::Someday => {
                self.core
                    .load_with_state(
                        api.update_thing_status(thing.id, ThingStatus::Someday),
                        "Someday로 이동하는 중...",
                    )
                    .await?;
                notifier.success("Someday/Maybe 목록으로 이동되었습니다.");
                self.core.record_activity(format!("Someday 이동: {}", thing.title));
                self.core.navigate(DEFAULT_ROUTE);
            }
            ClarifyDecision::Delete => {
                let question = format!("\"{}\"을(를) 정말 삭제하시겠습니까?", thing.title);
                if !services.prompter().confirm(&question) {
                    return Ok(());
                }
                self.core
                    .load_with_state(api.delete_thing(thing.id), "삭제하는 중...")
                    .await?;
                notifier.success("항목이 삭제되었습니다.");
                self.core.record_activity(format!("삭제: {}", thing.title));
                self.core.navigate(DEFAULT_ROUTE);
            }
        }
        info!(
            "event=clarify_decide module=view status=ok id={} decision={}",
            thing.id,
            decision.as_str()
        );
        Ok(())
    }
}

#[async_trait(?Send)]
impl View for ClarifyView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    async fn on_show(&mut self, route: &Route) -> ViewResult {
        self.thing = None;
        self.core.render(CLARIFY_CONTENT, Vec::new());
        self.arm_listeners();

        match route.param("thingId").and_then(|raw| raw.trim().parse::<ThingId>().ok()) {
            Some(id) => self.load(id).await,
            None => {
                warn!("event=clarify_load module=view status=missing_param");
                self.bail(MISSING_PARAM_MESSAGE);
                Ok(())
            }
        }
    }

    async fn on_hide(&mut self) -> ViewResult {
        self.thing = None;
        Ok(())
    }

    async fn handle(&mut self, intent: Intent) -> ViewResult {
        match intent {
            Intent::Clarify(decision) => self.decide(decision).await,
            other => {
                debug!("event=view_intent module=view status=ignored view=clarify intent={other:?}");
                Ok(())
            }
        }
    }
}

fn render_thing(thing: &Thing) -> Vec<Node> {
    let description = if thing.description.trim().is_empty() {
        "설명 없음"
    } else {
        thing.description.as_str()
    };

    let options = OPTIONS.iter().map(|(decision, title, hint)| {
        Node::el("button")
            .class("option-btn")
            .class(&format!("option-{}", decision.as_str()))
            .data("action", decision.as_str())
            .child(Node::el("strong").with_text(*title))
            .child(Node::el("span").class("option-hint").with_text(*hint))
    });

    vec![
        Node::el("div")
            .class("clarify-thing")
            .data("thing-id", thing.id.to_string())
            .child(Node::el("h2").class("item-title").with_text(thing.title.as_str()))
            .child(Node::el("p").class("item-description").with_text(description)),
        Node::el("h3")
            .class("clarify-question")
            .with_text("이것은 무엇인가요? 행동이 필요한가요?"),
        Node::el("div")
            .class("clarify-options")
            .attr("role", "group")
            .children(options),
    ]
}

#[cfg(test)]
mod tests {
    use super::render_thing;
    use crate::model::{Thing, ThingStatus};
    use crate::ui::ClarifyDecision;

    #[test]
    fn renders_one_option_per_decision() {
        let nodes = render_thing(&Thing::new(4, "plan trip", ThingStatus::Pending));
        let mut decisions = Vec::new();
        for node in &nodes {
            node.walk(&mut |candidate| {
                if candidate.has_class("option-btn") {
                    decisions.push(candidate.dataset().get("action").cloned());
                }
            });
        }
        let parsed: Vec<_> = decisions
            .iter()
            .filter_map(|raw| raw.as_deref().and_then(ClarifyDecision::parse))
            .collect();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[0], ClarifyDecision::Quick);
        assert_eq!(parsed[4], ClarifyDecision::Delete);
    }
}
