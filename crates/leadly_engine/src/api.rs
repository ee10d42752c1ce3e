use std::time::Duration;

use leadly_logging::{leadly_debug, leadly_info, leadly_warn, mask_secret};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::types::{AddSubredditBody, LeadsPayload, SubredditsPayload};
use crate::{JobStatusPayload, Lead, RequestError, RequestFailure, SearchAccepted, SearchRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api/v1";
/// Placeholder credential used when none has been configured.
pub const DEFAULT_API_KEY: &str = "dev-key";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Origin plus version prefix; endpoint paths are appended to it.
    pub base_url: String,
    /// Forwarded verbatim as `Authorization: Bearer <api_key>`.
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn submit_search(&self, request: &SearchRequest) -> Result<SearchAccepted, RequestError>;

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatusPayload, RequestError>;

    async fn fetch_leads(&self) -> Result<Vec<Lead>, RequestError>;

    async fn list_subreddits(&self) -> Result<Vec<String>, RequestError>;

    async fn add_subreddit(&self, name: &str) -> Result<(), RequestError>;

    /// True iff the backend answers its health endpoint with 200.
    async fn check_health(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    base_url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, RequestError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| RequestError::new(RequestFailure::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(RequestError::new(
                RequestFailure::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(RequestFailure::Network, err.to_string()))?;

        leadly_info!(
            "API client for {} using key {}",
            base_url,
            mask_secret(&settings.api_key)
        );
        Ok(Self {
            base_url,
            api_key: settings.api_key,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RequestError::new(RequestFailure::InvalidUrl, "base url cannot take a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, RequestError> {
        let url = self.endpoint(segments)?;
        leadly_debug!("{} {}", method, url.path());

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = request.send().await.map_err(|err| {
            let error = map_reqwest_error(err);
            leadly_warn!("{} {} failed ({}): {}", method, url.path(), error.kind, error);
            error
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let error = error_from_body(status, &body);
        leadly_warn!("{} {} answered {}: {}", method, url.path(), status, error);
        Err(error)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RequestError> {
        let response = self.send(Method::GET, segments, None).await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<reqwest::Response, RequestError> {
        let body = serde_json::to_vec(body)
            .map_err(|err| RequestError::new(RequestFailure::Decode, err.to_string()))?;
        self.send(Method::POST, segments, Some(body)).await
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn submit_search(&self, request: &SearchRequest) -> Result<SearchAccepted, RequestError> {
        let response = self.post_json(&["reddit", "search"], request).await?;
        decode(response).await
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatusPayload, RequestError> {
        self.get_json(&["reddit", "search", job_id]).await
    }

    async fn fetch_leads(&self) -> Result<Vec<Lead>, RequestError> {
        let payload: LeadsPayload = self.get_json(&["leads"]).await?;
        Ok(payload.leads)
    }

    async fn list_subreddits(&self) -> Result<Vec<String>, RequestError> {
        let payload: SubredditsPayload = self.get_json(&["config", "subreddits"]).await?;
        Ok(payload.subreddits)
    }

    async fn add_subreddit(&self, name: &str) -> Result<(), RequestError> {
        self.post_json(&["config", "subreddits"], &AddSubredditBody { subreddit: name })
            .await
            .map(|_| ())
    }

    async fn check_health(&self) -> bool {
        match self.send(Method::GET, &["health"], None).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RequestError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        leadly_warn!("Undecodable response body: {}", err);
        RequestError::new(RequestFailure::Decode, format!("unexpected response: {err}"))
    })
}

fn error_from_body(status: StatusCode, body: &str) -> RequestError {
    let message =
        detail_message(body).unwrap_or_else(|| format!("Request failed with status {status}"));
    RequestError::new(RequestFailure::HttpStatus(status.as_u16()), message)
}

/// Extracts the backend's `detail` field: a plain string, or the `msg` entries
/// of a validation error list.
pub(crate) fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(RequestFailure::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RequestError::new(RequestFailure::Decode, err.to_string());
    }
    RequestError::new(RequestFailure::Network, err.to_string())
}
