//! # Resource Client
//!
//! Request builder/executor for one named resource path (`book`,
//! `category`). Every operation is a single request mapped directly to a
//! `(status, parsed body)` result. There are no retries, and any
//! transport-level error propagates as a fatal
//! [`HarnessError::Transport`](crate::error::HarnessError).
//!
//! By-id lookups have one wrinkle. The service reports "not found" with a
//! response body that is the literal text `null`, and that must stay
//! distinguishable from a body that failed to parse.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::AuthToken;
use crate::error::HarnessError;

/// Status plus parsed body for one request/response exchange. The client
/// passes both through untouched; judging them is the oracle's job.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: T,
}

/// Client for one resource path under the service base URL.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: String,
    resource: &'static str,
}

impl ResourceClient {
    pub fn new(http: Client, base_url: &str, resource: &'static str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            resource,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.resource, id)
    }

    /// `GET /{resource}` — unauthenticated read of the full collection.
    pub async fn list<T: DeserializeOwned>(&self) -> Result<ApiResponse<Vec<T>>, HarnessError> {
        let step = format!("list {}", self.resource);
        let response = self
            .http
            .get(self.collection_url())
            .send()
            .await
            .map_err(|err| HarnessError::transport(&step, err))?;
        let status = response.status();
        let raw = read_body(&step, response).await?;
        let body = entity_or_status(&step, self.resource, status, &raw)?;
        Ok(ApiResponse { status, body })
    }

    /// `GET /{resource}/{id}` — unauthenticated read of one entity. A body
    /// of literal `null` is the absence sentinel and maps to `None`.
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        id: &str,
    ) -> Result<ApiResponse<Option<T>>, HarnessError> {
        let step = format!("get {} by id", self.resource);
        let response = self
            .http
            .get(self.item_url(id))
            .send()
            .await
            .map_err(|err| HarnessError::transport(&step, err))?;
        let status = response.status();
        let raw = read_body(&step, response).await?;
        let body = if raw.trim() == "null" {
            None
        } else {
            Some(entity_or_status(&step, self.resource, status, &raw)?)
        };
        Ok(ApiResponse { status, body })
    }

    /// `POST /{resource}` — authenticated create.
    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        payload: &B,
        token: &AuthToken,
    ) -> Result<ApiResponse<T>, HarnessError> {
        let step = format!("create {}", self.resource);
        let response = self
            .http
            .post(self.collection_url())
            .bearer_auth(token.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|err| HarnessError::transport(&step, err))?;
        let status = response.status();
        let raw = read_body(&step, response).await?;
        let body = entity_or_status(&step, self.resource, status, &raw)?;
        Ok(ApiResponse { status, body })
    }

    /// `PUT /{resource}/{id}` — authenticated update. Only the fields in the
    /// payload are supposed to change; verifying that is the scenario's job.
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        id: &str,
        payload: &B,
        token: &AuthToken,
    ) -> Result<ApiResponse<T>, HarnessError> {
        let step = format!("update {}", self.resource);
        let response = self
            .http
            .put(self.item_url(id))
            .bearer_auth(token.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|err| HarnessError::transport(&step, err))?;
        let status = response.status();
        let raw = read_body(&step, response).await?;
        let body = entity_or_status(&step, self.resource, status, &raw)?;
        Ok(ApiResponse { status, body })
    }

    /// `DELETE /{resource}/{id}` — authenticated delete. Only the status
    /// matters; the body is unspecified.
    pub async fn delete(&self, id: &str, token: &AuthToken) -> Result<StatusCode, HarnessError> {
        let step = format!("delete {}", self.resource);
        let response = self
            .http
            .delete(self.item_url(id))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|err| HarnessError::transport(&step, err))?;
        Ok(response.status())
    }
}

async fn read_body(step: &str, response: reqwest::Response) -> Result<String, HarnessError> {
    response
        .text()
        .await
        .map_err(|err| HarnessError::transport(step, err))
}

fn parse_entity<T: DeserializeOwned>(resource: &str, raw: &str) -> Result<T, HarnessError> {
    serde_json::from_str(raw).map_err(|err| HarnessError::parse(resource, err.to_string()))
}

/// Parse the body as the resource shape. When a non-success response carries
/// an error body instead, report the status — the contract's success code is
/// always 200 — rather than a misleading parse failure.
fn entity_or_status<T: DeserializeOwned>(
    step: &str,
    resource: &str,
    status: StatusCode,
    raw: &str,
) -> Result<T, HarnessError> {
    match parse_entity(resource, raw) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(HarnessError::UnexpectedStatus {
            step: step.to_string(),
            expected: StatusCode::OK.as_u16(),
            actual: status.as_u16(),
        }),
        Err(err) => Err(err),
    }
}
