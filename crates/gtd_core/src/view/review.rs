//! Review screen: status counts, recent activity and suggestions.

use super::{Services, View, ViewCore, ViewResult};
use crate::clock::Clock;
use crate::model::{Thing, ThingStatus};
use crate::router::Route;
use crate::storage::RecentActivity;
use crate::ui::layout::{REVIEW_CONTENT, REVIEW_VIEW};
use crate::ui::{relative_time, Node};
use async_trait::async_trait;
use log::info;

const LOADING_REVIEW: &str = "리뷰 데이터를 준비하는 중...";
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReviewSummary {
    pub total: usize,
    pub pending: usize,
    pub someday: usize,
    pub done: usize,
}

impl ReviewSummary {
    pub fn from_things(things: &[Thing]) -> Self {
        let count = |status: ThingStatus| things.iter().filter(|thing| thing.status == status).count();
        Self {
            total: things.len(),
            pending: count(ThingStatus::Pending),
            someday: count(ThingStatus::Someday),
            done: count(ThingStatus::Done),
        }
    }

    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut suggestions = Vec::new();
        if self.pending > 5 {
            suggestions.push("대기 중인 항목이 많습니다. 명확화를 진행해보세요.");
        }
        if self.someday > 10 {
            suggestions.push("연기된 항목이 많습니다. 정말 필요한 것들인지 검토해보세요.");
        }
        if self.done == 0 {
            suggestions.push("아직 완료된 항목이 없습니다. 작은 것부터 실행해보세요.");
        }
        if suggestions.is_empty() {
            suggestions.push("좋습니다! GTD 시스템을 잘 활용하고 있습니다.");
        }
        suggestions
    }
}

pub struct ReviewView {
    core: ViewCore,
    summary: Option<ReviewSummary>,
}

impl ReviewView {
    pub fn new(services: Services) -> Self {
        Self {
            core: ViewCore::new("review", REVIEW_VIEW, services),
            summary: None,
        }
    }

    pub fn summary(&self) -> Option<ReviewSummary> {
        self.summary
    }
}

#[async_trait(?Send)]
impl View for ReviewView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    async fn on_show(&mut self, _route: &Route) -> ViewResult {
        let things = self
            .core
            .load_with_state(self.core.services().api().list_things(), LOADING_REVIEW)
            .await?;
        let summary = ReviewSummary::from_things(&things);
        let activities = self.core.services().cache().recent_activities(RECENT_LIMIT);
        let now = self.core.services().clock().now_ms();
        info!(
            "event=review_load module=view status=ok total={} pending={} someday={} done={}",
            summary.total, summary.pending, summary.someday, summary.done
        );

        self.core
            .render(REVIEW_CONTENT, render_review(&summary, &activities, now));
        self.summary = Some(summary);
        self.core.record_activity("Review 확인");
        Ok(())
    }
}

fn render_review(summary: &ReviewSummary, activities: &[RecentActivity], now: i64) -> Vec<Node> {
    let stat = |modifier: Option<&str>, value: usize, label: &str| {
        let mut card = Node::el("div").class("stat-card");
        if let Some(modifier) = modifier {
            card = card.class(modifier);
        }
        card.child(Node::el("div").class("stat-number").with_text(value.to_string()))
            .child(Node::el("div").class("stat-label").with_text(label))
    };

    let recent: Vec<Node> = if activities.is_empty() {
        vec![Node::el("p").class("text-muted").with_text("최근 활동이 없습니다.")]
    } else {
        activities
            .iter()
            .map(|activity| {
                Node::el("div")
                    .class("activity-item")
                    .child(
                        Node::el("span")
                            .class("activity-text")
                            .with_text(activity.activity.as_str()),
                    )
                    .child(
                        Node::el("span")
                            .class("activity-time")
                            .with_text(relative_time(activity.timestamp, now)),
                    )
            })
            .collect()
    };

    let suggestions = summary.suggestions().into_iter().map(|suggestion| {
        Node::el("div")
            .class("suggestion-item")
            .with_text(format!("💡 {suggestion}"))
    });

    vec![
        Node::el("div")
            .class("review-summary")
            .child(Node::el("h3").with_text("📊 현재 상황"))
            .child(
                Node::el("div")
                    .class("stats-grid")
                    .child(stat(None, summary.total, "전체 Thing"))
                    .child(stat(Some("stat-pending"), summary.pending, "대기 중"))
                    .child(stat(Some("stat-someday"), summary.someday, "연기됨"))
                    .child(stat(Some("stat-done"), summary.done, "완료됨")),
            ),
        Node::el("div")
            .class("review-section")
            .child(Node::el("h3").with_text("📅 최근 활동"))
            .child(Node::el("div").class("recent-activities").children(recent)),
        Node::el("div")
            .class("review-section")
            .child(Node::el("h3").with_text("💡 개선 제안"))
            .child(
                Node::el("div")
                    .class("improvement-suggestions")
                    .children(suggestions),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{render_review, ReviewSummary};
    use crate::model::{Thing, ThingStatus};
    use crate::storage::RecentActivity;

    fn summary(pending: usize, someday: usize, done: usize) -> ReviewSummary {
        ReviewSummary {
            total: pending + someday + done,
            pending,
            someday,
            done,
        }
    }

    #[test]
    fn counts_each_status() {
        let things = [
            Thing::new(1, "a", ThingStatus::Pending),
            Thing::new(2, "b", ThingStatus::Pending),
            Thing::new(3, "c", ThingStatus::Someday),
            Thing::new(4, "d", ThingStatus::Done),
            Thing::new(5, "e", ThingStatus::Other(9)),
        ];
        assert_eq!(
            ReviewSummary::from_things(&things),
            ReviewSummary {
                total: 5,
                pending: 2,
                someday: 1,
                done: 1
            }
        );
    }

    #[test]
    fn suggestions_follow_thresholds() {
        assert_eq!(summary(1, 0, 1).suggestions().len(), 1);
        assert!(summary(1, 0, 1).suggestions()[0].starts_with("좋습니다"));

        let busy = summary(6, 11, 0).suggestions();
        assert_eq!(busy.len(), 3);
        assert!(busy[0].contains("대기 중인 항목"));
        assert!(busy[2].contains("완료된 항목이 없습니다"));

        assert_eq!(summary(5, 10, 1).suggestions().len(), 1);
    }

    #[test]
    fn renders_placeholder_without_activities() {
        let nodes = render_review(&summary(0, 0, 0), &[], 0);
        let text: String = nodes.iter().map(|node| node.text_content()).collect();
        assert!(text.contains("최근 활동이 없습니다."));
    }

    #[test]
    fn renders_activity_with_relative_time() {
        let activities = [RecentActivity {
            activity: "Inbox 새로고침".into(),
            timestamp: 0,
        }];
        let nodes = render_review(&summary(0, 0, 1), &activities, 120_000);
        let text: String = nodes.iter().map(|node| node.text_content()).collect();
        assert!(text.contains("Inbox 새로고침"));
        assert!(text.contains("2분 전"));
    }
}
