//! Transport boundary
//!
//! The client issues abstract requests (`{method, path, body?}`) and reads
//! back abstract responses (`{status, body?}`). [`HttpTransport`] carries
//! them over real HTTP; the in-process mock API server implements the same
//! trait for tests. Connection handling, TLS, and token acquisition are the
//! transport's problem; nothing above this boundary sees them.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Content type for merge-style partial updates.
const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// HTTP verbs the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request against the API server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path plus query string, e.g. `/apis/apps.example.io/v1/widgets?labelSelector=app%3Dweb`.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Response every transport hands back. Interpretation (status mapping,
/// typed decoding) happens in the client layer.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract request/response boundary between the client and the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Carry one request to the server and return its response. Every call
    /// blocks the caller until the response (or a transport failure) is
    /// available; cancellation and timeouts are this layer's concern.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// HTTP transport backed by reqwest
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport from client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.effective_user_agent());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let base = Url::parse(&config.effective_base_url())
            .map_err(|e| Error::Transport(format!("invalid base url: {e}")))?;

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self
            .base
            .join(&request.path)
            .map_err(|e| Error::Transport(format!("invalid request path {}: {e}", request.path)))?;

        tracing::debug!("{} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = &request.body {
            builder = if request.method == Method::Patch {
                // Merge patches carry their own content type
                builder
                    .header(CONTENT_TYPE, MERGE_PATCH_CONTENT_TYPE)
                    .body(serde_json::to_vec(body)?)
            } else {
                builder.json(body)
            };
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        // Handle empty response
        let body = if text.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text)?)
        };

        Ok(ApiResponse { status, body })
    }
}
