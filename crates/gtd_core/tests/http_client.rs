use gtd_core::api::{
    ApiError, ApiResponse, GtdApi, HttpApiClient, NOT_FOUND_MESSAGE, SERVER_ERROR_MESSAGE,
};
use gtd_core::config::ApiConfig;
use gtd_core::model::{NewThing, ThingStatus};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpApiClient {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs: Some(5),
    };
    HttpApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn lists_things_from_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "a", "description": "", "status": 0},
            {"id": 2, "title": "b", "description": "x", "status": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let things = client(&server).list_things().await.unwrap();
    assert_eq!(things.len(), 2);
    assert_eq!(things[1].status, ThingStatus::Done);
    assert_eq!(things[1].description, "x");
}

#[tokio::test]
async fn not_found_and_server_errors_use_fixed_messages() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/things/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/things/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = client(&server);
    let missing = api.delete_thing(9).await.unwrap_err();
    assert_eq!(missing.to_string(), NOT_FOUND_MESSAGE);
    assert_eq!(missing.status(), Some(404));

    let broken = api
        .update_thing_status(9, ThingStatus::Someday)
        .await
        .unwrap_err();
    assert_eq!(broken.to_string(), SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn other_statuses_carry_code_and_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client(&server).list_projects().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "HTTP 403: Forbidden");
}

#[tokio::test]
async fn non_json_success_is_returned_raw() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/things/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(
        api.delete_thing(3).await.unwrap(),
        ApiResponse::Raw {
            status: 204,
            body: String::new()
        }
    );
    assert_eq!(
        api.get("/health", &[]).await.unwrap(),
        ApiResponse::Raw {
            status: 200,
            body: "ok".to_string()
        }
    );
}

#[tokio::test]
async fn get_appends_encoded_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/actions/"))
        .and(query_param("status", "todo"))
        .and(query_param("q", "할 일"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .get("/actions/", &[("status", "todo"), ("q", "할 일")])
        .await
        .unwrap();
    assert_eq!(response.as_json(), Some(&serde_json::json!([])));
}

#[tokio::test]
async fn create_thing_posts_pending_status_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/things/"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "title": "buy milk",
            "description": "2L",
            "status": 0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 10, "title": "buy milk", "description": "2L", "status": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_thing(&NewThing::new("buy milk", "2L"))
        .await
        .unwrap();
    assert_eq!(created.as_json().and_then(|body| body["id"].as_i64()), Some(10));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpApiClient::new(&ApiConfig {
        base_url: format!("http://{address}"),
        timeout_secs: Some(5),
    })
    .unwrap();

    let err = api.list_things().await.unwrap_err();
    assert!(err.is_network(), "{err:?}");
    assert!(matches!(err, ApiError::Network { .. }));
}
