//! reqwest-backed REST client

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{RestClient, RestError, RestMethod};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ATTEMPTS: u32 = 3;

/// HTTP implementation of [`RestClient`]
pub struct HttpRestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRestClient {
    /// Create a client against the given API base URL
    ///
    /// `base_url` should not carry a trailing slash; request paths start
    /// with one.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, RestError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RestError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    fn method_of(method: RestMethod) -> reqwest::Method {
        match method {
            RestMethod::Get => reqwest::Method::GET,
            RestMethod::Post => reqwest::Method::POST,
            RestMethod::Patch => reqwest::Method::PATCH,
            RestMethod::Put => reqwest::Method::PUT,
            RestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    async fn attempt(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RestError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(Self::method_of(method), &url)
            .header("Authorization", &self.token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RestError::Timeout
            } else {
                RestError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RestError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RestError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RestError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn request(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, RestError> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(method, path, body.as_ref()).await {
                Ok(value) => return Ok(value),
                // Auth rejections and 4xx answers will not improve with retries
                Err(e @ (RestError::Unauthorized | RestError::NotFound(_) | RestError::Api { .. } | RestError::Decode(_))) => {
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        method = method.as_str(),
                        path,
                        attempt,
                        error = %e,
                        "REST request failed, retrying"
                    );
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RestError::Http("request never attempted".to_string())))
    }
}
