//! REST backend access.
//!
//! # Responsibility
//! - Define the `GtdApi` seam the views depend on.
//! - Normalize transport and HTTP failures into `ApiError`, whose
//!   `Display` is the message shown to the user.
//!
//! # Invariants
//! - Any non-2xx status is an error carrying the numeric status.
//! - Bodies are decoded as JSON only when the content type says JSON.
//! - No retries, no backoff. A timeout applies only when configured.

pub mod http;
pub mod memory;

pub use http::HttpApiClient;
pub use memory::InMemoryGtdApi;

use crate::model::{
    Action, ActionId, ActionStatus, NewAction, NewProject, NewThing, Project, Thing, ThingId,
    ThingStatus,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub type ApiResult<T> = Result<T, ApiError>;

pub const NETWORK_ERROR_MESSAGE: &str = "서버에 연결할 수 없습니다. 네트워크 연결을 확인해주세요.";
pub const NOT_FOUND_MESSAGE: &str = "요청한 리소스를 찾을 수 없습니다.";
pub const SERVER_ERROR_MESSAGE: &str = "서버 내부 오류가 발생했습니다.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network { endpoint: String, reason: String },
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound { endpoint: String },
    #[error("{}", SERVER_ERROR_MESSAGE)]
    Server { endpoint: String },
    #[error("HTTP {status}: {reason}")]
    Status {
        endpoint: String,
        status: u16,
        reason: String,
    },
    #[error("invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
    #[error("invalid request URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Maps a non-2xx status to its user-facing variant.
    pub fn from_status(endpoint: &str, status: u16, reason: &str) -> Self {
        match status {
            404 => Self::NotFound {
                endpoint: endpoint.to_string(),
            },
            500 => Self::Server {
                endpoint: endpoint.to_string(),
            },
            _ => Self::Status {
                endpoint: endpoint.to_string(),
                status,
                reason: reason.to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Server { .. } => Some(500),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(serde_json::Value),
    /// Non-JSON response, returned as-is.
    Raw { status: u16, body: String },
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw { .. } => None,
        }
    }

    pub fn into_typed<T: DeserializeOwned>(self, endpoint: &str) -> ApiResult<T> {
        match self {
            Self::Json(value) => serde_json::from_value(value).map_err(|err| ApiError::Decode {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }),
            Self::Raw { status, .. } => Err(ApiError::Decode {
                endpoint: endpoint.to_string(),
                reason: format!("expected a JSON body, got a non-JSON response (HTTP {status})"),
            }),
        }
    }
}

pub const THINGS_ENDPOINT: &str = "/things/";
pub const ACTIONS_ENDPOINT: &str = "/actions/";
pub const PROJECTS_ENDPOINT: &str = "/projects/";

pub fn thing_endpoint(id: ThingId) -> String {
    format!("/things/{id}")
}

pub fn action_endpoint(id: ActionId) -> String {
    format!("/actions/{id}")
}

/// Backend operations used by the screens.
#[async_trait(?Send)]
pub trait GtdApi {
    async fn list_things(&self) -> ApiResult<Vec<Thing>>;
    /// Creates a thing; the payload always carries status `0`.
    async fn create_thing(&self, thing: &NewThing) -> ApiResult<ApiResponse>;
    async fn update_thing_status(&self, id: ThingId, status: ThingStatus)
        -> ApiResult<ApiResponse>;
    async fn delete_thing(&self, id: ThingId) -> ApiResult<ApiResponse>;

    async fn list_actions(&self) -> ApiResult<Vec<Action>>;
    async fn create_action(&self, action: &NewAction) -> ApiResult<ApiResponse>;
    async fn update_action_status(
        &self,
        id: ActionId,
        status: ActionStatus,
    ) -> ApiResult<ApiResponse>;

    async fn list_projects(&self) -> ApiResult<Vec<Project>>;
    async fn create_project(&self, project: &NewProject) -> ApiResult<ApiResponse>;
}
