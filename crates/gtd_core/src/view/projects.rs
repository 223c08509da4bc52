//! Projects screen. No project source is wired yet, so it always shows the
//! empty state and makes no API call.

use super::{Services, View, ViewCore, ViewResult};
use crate::model::Project;
use crate::router::Route;
use crate::ui::layout::{PROJECTS_VIEW, PROJECT_LIST};
use crate::ui::Node;
use async_trait::async_trait;

pub struct ProjectsView {
    core: ViewCore,
    projects: Vec<Project>,
}

impl ProjectsView {
    pub fn new(services: Services) -> Self {
        Self {
            core: ViewCore::new("projects", PROJECTS_VIEW, services),
            projects: Vec::new(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn render(&self) {
        let nodes = if self.projects.is_empty() {
            vec![empty_state()]
        } else {
            self.projects.iter().map(project_item).collect()
        };
        self.core.render(PROJECT_LIST, nodes);
    }
}

#[async_trait(?Send)]
impl View for ProjectsView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    async fn on_show(&mut self, _route: &Route) -> ViewResult {
        self.projects.clear();
        self.render();
        self.core.record_activity("Projects 새로고침");
        Ok(())
    }
}

fn project_item(project: &Project) -> Node {
    Node::el("div")
        .class("project-item")
        .data("project-id", project.id.to_string())
        .attr("role", "listitem")
        .child(Node::el("h3").class("item-title").with_text(project.title.as_str()))
        .child(
            Node::el("p")
                .class("item-description")
                .with_text(project.description.as_str()),
        )
}

fn empty_state() -> Node {
    Node::el("div")
        .class("empty-state")
        .child(Node::el("h3").with_text("아직 프로젝트가 없습니다"))
        .child(
            Node::el("p")
                .class("text-muted")
                .with_text("복잡한 작업을 Inbox에서 명확화할 때 프로젝트로 만들 수 있습니다."),
        )
        .child(Node::el("p").class("text-muted").with_text(
            "프로젝트는 여러 개의 관련된 Action들을 그룹화하여 관리할 수 있게 해줍니다.",
        ))
}
