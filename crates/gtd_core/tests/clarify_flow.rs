use gtd_core::api::{ApiError, InMemoryGtdApi, NOT_FOUND_MESSAGE};
use gtd_core::clock::ManualClock;
use gtd_core::config::AppConfig;
use gtd_core::model::{Thing, ThingStatus};
use gtd_core::ui::layout::{CLARIFY_BACK, CLARIFY_CONTENT};
use gtd_core::ui::{FixedPrompter, ToastKind};
use gtd_core::App;
use std::rc::Rc;

async fn app_at(fragment: &str) -> (App, Rc<InMemoryGtdApi>, Rc<FixedPrompter>) {
    let api = Rc::new(InMemoryGtdApi::with_things(vec![
        Thing::new(1, "file taxes", ThingStatus::Pending).with_description("before May"),
        Thing::new(2, "learn piano", ThingStatus::Pending),
    ]));
    let prompter = Rc::new(FixedPrompter::new(true));
    let mut app = App::bootstrap(
        &AppConfig::default(),
        api.clone(),
        prompter.clone(),
        Rc::new(ManualClock::new(0)),
        fragment,
    )
    .unwrap();
    app.start().await.unwrap();
    (app, api, prompter)
}

fn toast(app: &App) -> Option<(String, ToastKind)> {
    app.services()
        .notifier()
        .current()
        .map(|toast| (toast.message, toast.kind))
}

#[tokio::test]
async fn shows_thing_with_five_options() {
    let (app, _api, _prompter) = app_at("clarify?thingId=1").await;
    assert_eq!(app.visible_view(), Some("clarify"));

    let surface = app.services().surface().borrow();
    let options: Vec<String> = surface
        .query(CLARIFY_CONTENT, "option-btn")
        .iter()
        .filter_map(|node| node.dataset().get("action").cloned())
        .collect();
    assert_eq!(options, vec!["quick", "action", "project", "someday", "delete"]);

    let title = surface.query(CLARIFY_CONTENT, "item-title");
    assert_eq!(title[0].text_content(), "file taxes");
    let description = surface.query(CLARIFY_CONTENT, "item-description");
    assert_eq!(description[0].text_content(), "before May");
    drop(surface);

    let recent = app.services().cache().recent_activities(1);
    assert_eq!(recent[0].activity, "명확화 검토: file taxes");
}

#[tokio::test]
async fn missing_thing_id_redirects_to_inbox() {
    let (app, api, _prompter) = app_at("clarify").await;
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app),
        Some(("명확화할 항목을 찾을 수 없습니다.".to_string(), ToastKind::Error))
    );
    assert_eq!(api.calls(), vec!["list_things".to_string()]);
}

#[tokio::test]
async fn malformed_thing_id_counts_as_missing() {
    let (app, _api, _prompter) = app_at("clarify?thingId=abc").await;
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app).map(|(message, _)| message),
        Some("명확화할 항목을 찾을 수 없습니다.".to_string())
    );
}

#[tokio::test]
async fn unknown_thing_id_redirects_to_inbox() {
    let (app, _api, _prompter) = app_at("clarify?thingId=99").await;
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app),
        Some(("해당 항목을 찾을 수 없습니다.".to_string(), ToastKind::Error))
    );
    assert!(app
        .services()
        .surface()
        .borrow()
        .query(CLARIFY_CONTENT, "option-btn")
        .is_empty());
}

#[tokio::test]
async fn load_failure_shows_error_and_returns_to_inbox() {
    let (mut app, api, _prompter) = app_at("").await;
    api.fail_next(ApiError::NotFound {
        endpoint: "/things/".into(),
    });
    app.set_fragment("clarify?thingId=1").await.unwrap();

    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app),
        Some((NOT_FOUND_MESSAGE.to_string(), ToastKind::Error))
    );
}

#[tokio::test]
async fn quick_decision_marks_done_after_confirmation() {
    let (mut app, api, prompter) = app_at("clarify?thingId=1").await;

    prompter.set_answer(false);
    app.click_rendered(CLARIFY_CONTENT, "option-quick", 0)
        .await
        .unwrap();
    assert_eq!(api.thing(1).map(|thing| thing.status), Some(ThingStatus::Pending));
    assert_eq!(app.visible_view(), Some("clarify"));

    prompter.set_answer(true);
    app.click_rendered(CLARIFY_CONTENT, "option-quick", 0)
        .await
        .unwrap();
    assert_eq!(api.thing(1).map(|thing| thing.status), Some(ThingStatus::Done));
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app),
        Some(("작업이 완료로 처리되었습니다.".to_string(), ToastKind::Success))
    );
}

#[tokio::test]
async fn someday_decision_moves_thing_and_returns_to_inbox() {
    let (mut app, api, prompter) = app_at("clarify?thingId=2").await;
    app.click_rendered(CLARIFY_CONTENT, "option-someday", 0)
        .await
        .unwrap();

    assert_eq!(api.thing(2).map(|thing| thing.status), Some(ThingStatus::Someday));
    assert!(prompter.asked().is_empty());
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app).map(|(message, _)| message),
        Some("Someday/Maybe 목록으로 이동되었습니다.".to_string())
    );
}

#[tokio::test]
async fn action_and_project_decisions_route_onwards() {
    let (mut app, api, _prompter) = app_at("clarify?thingId=1").await;
    app.click_rendered(CLARIFY_CONTENT, "option-action", 0)
        .await
        .unwrap();
    assert_eq!(api.thing(1).map(|thing| thing.status), Some(ThingStatus::Done));
    assert_eq!(app.visible_view(), Some("actions"));

    app.set_fragment("clarify?thingId=2").await.unwrap();
    app.click_rendered(CLARIFY_CONTENT, "option-project", 0)
        .await
        .unwrap();
    assert_eq!(api.thing(2).map(|thing| thing.status), Some(ThingStatus::Done));
    assert_eq!(app.visible_view(), Some("projects"));
}

#[tokio::test]
async fn delete_decision_removes_thing() {
    let (mut app, api, prompter) = app_at("clarify?thingId=2").await;
    app.click_rendered(CLARIFY_CONTENT, "option-delete", 0)
        .await
        .unwrap();

    assert!(api.thing(2).is_none());
    assert_eq!(
        prompter.asked(),
        vec!["\"learn piano\"을(를) 정말 삭제하시겠습니까?".to_string()]
    );
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(
        toast(&app).map(|(message, _)| message),
        Some("항목이 삭제되었습니다.".to_string())
    );
}

#[tokio::test]
async fn back_button_returns_to_inbox() {
    let (mut app, api, _prompter) = app_at("clarify?thingId=1").await;
    app.click(CLARIFY_BACK).await.unwrap();
    assert_eq!(app.visible_view(), Some("inbox"));
    assert_eq!(api.call_count("update_thing_status"), 0);
}
