//! `reqwest`-backed `GtdApi` implementation.

use super::{
    action_endpoint, thing_endpoint, ApiError, ApiResponse, ApiResult, GtdApi, ACTIONS_ENDPOINT,
    PROJECTS_ENDPOINT, THINGS_ENDPOINT,
};
use crate::config::ApiConfig;
use crate::model::{
    Action, ActionId, ActionStatus, NewAction, NewProject, NewThing, Project, Thing, ThingId,
    ThingStatus,
};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::{form_urlencoded, Url};

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        Url::parse(&config.base_url).map_err(|err| ApiError::InvalidUrl {
            url: config.base_url.clone(),
            reason: err.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::Client(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one call against `base_url + endpoint`.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<ApiResponse> {
        let result = self.send(method.clone(), endpoint, body).await;
        match &result {
            Ok(_) => debug!("event=api_request module=api status=ok method={method} endpoint={endpoint}"),
            Err(err) => error!(
                "event=api_request module=api status=error method={method} endpoint={endpoint} http_status={:?} error={err:?}",
                err.status()
            ),
        }
        result
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<ApiResponse> {
        let raw_url = format!("{}{}", self.base_url, endpoint);
        let url = Url::parse(&raw_url).map_err(|err| ApiError::InvalidUrl {
            url: raw_url.clone(),
            reason: err.to_string(),
        })?;

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|err| ApiError::Network {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(
                endpoint,
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        if is_json {
            let value = response
                .json::<serde_json::Value>()
                .await
                .map_err(|err| ApiError::Decode {
                    endpoint: endpoint.to_string(),
                    reason: err.to_string(),
                })?;
            return Ok(ApiResponse::Json(value));
        }

        let body = response.text().await.map_err(|err| ApiError::Network {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        Ok(ApiResponse::Raw {
            status: status.as_u16(),
            body,
        })
    }

    /// GET with `params` appended as a query string.
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<ApiResponse> {
        let endpoint = if params.is_empty() {
            endpoint.to_string()
        } else {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            format!("{endpoint}?{query}")
        };
        self.request(Method::GET, &endpoint, None).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &T,
    ) -> ApiResult<ApiResponse> {
        let body = encode(endpoint, data)?;
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &T,
    ) -> ApiResult<ApiResponse> {
        let body = encode(endpoint, data)?;
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<ApiResponse> {
        self.request(Method::DELETE, endpoint, None).await
    }
}

fn encode<T: Serialize + ?Sized>(endpoint: &str, data: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(data).map_err(|err| ApiError::Decode {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait(?Send)]
impl GtdApi for HttpApiClient {
    async fn list_things(&self) -> ApiResult<Vec<Thing>> {
        self.get(THINGS_ENDPOINT, &[])
            .await?
            .into_typed(THINGS_ENDPOINT)
    }

    async fn create_thing(&self, thing: &NewThing) -> ApiResult<ApiResponse> {
        let payload = NewThing::new(thing.title.clone(), thing.description.clone());
        self.post(THINGS_ENDPOINT, &payload).await
    }

    async fn update_thing_status(
        &self,
        id: ThingId,
        status: ThingStatus,
    ) -> ApiResult<ApiResponse> {
        self.put(&thing_endpoint(id), &serde_json::json!({ "status": status }))
            .await
    }

    async fn delete_thing(&self, id: ThingId) -> ApiResult<ApiResponse> {
        self.delete(&thing_endpoint(id)).await
    }

    async fn list_actions(&self) -> ApiResult<Vec<Action>> {
        self.get(ACTIONS_ENDPOINT, &[])
            .await?
            .into_typed(ACTIONS_ENDPOINT)
    }

    async fn create_action(&self, action: &NewAction) -> ApiResult<ApiResponse> {
        self.post(ACTIONS_ENDPOINT, action).await
    }

    async fn update_action_status(
        &self,
        id: ActionId,
        status: ActionStatus,
    ) -> ApiResult<ApiResponse> {
        self.put(&action_endpoint(id), &serde_json::json!({ "status": status }))
            .await
    }

    async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.get(PROJECTS_ENDPOINT, &[])
            .await?
            .into_typed(PROJECTS_ENDPOINT)
    }

    async fn create_project(&self, project: &NewProject) -> ApiResult<ApiResponse> {
        self.post(PROJECTS_ENDPOINT, project).await
    }
}

#[cfg(test)]
mod tests {
    use super::HttpApiClient;
    use crate::api::ApiError;
    use crate::config::ApiConfig;

    #[test]
    fn rejects_unparsable_base_url() {
        let config = ApiConfig {
            base_url: "not a url".into(),
            timeout_secs: None,
        };
        assert!(matches!(
            HttpApiClient::new(&config),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/".into(),
            timeout_secs: Some(5),
        };
        let client = HttpApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
