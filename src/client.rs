use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::models::{ListWorkersParams, WorkerDraft, WorkerPage, WorkerPatch, WorkerRecord};

/// Failures seen by API consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response.
    Transport(String),
    /// The server answered with a non-success status.
    Api { status: u16, message: String },
    /// The response body was not what the API promises.
    Decode(String),
    /// Client-side setup problem (bad base URL, TLS init).
    Config(String),
}

impl ClientError {
    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status, message } if *status < 500 => message.clone(),
            _ => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "request failed: {}", msg),
            ClientError::Api { status, message } => write!(f, "API returned {}: {}", status, message),
            ClientError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            ClientError::Config(msg) => write!(f, "client configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Settings for API consumers.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// No timeout unless configured; a hung call stays pending.
    pub timeout: Option<Duration>,
    /// Page size requested when the listing view mounts.
    pub page_size: u32,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: None,
            page_size: 100,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base = std::env::var("WORKERS_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        let mut config = Self::new(&base).map_err(|e| anyhow::anyhow!(e))?;

        if let Ok(raw) = std::env::var("WORKERS_API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("WORKERS_API_TIMEOUT_SECS must be a number"))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(raw) = std::env::var("CATALOG_PAGE_SIZE") {
            config.page_size = raw
                .trim()
                .parse()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| anyhow::anyhow!("CATALOG_PAGE_SIZE must be a positive integer"))?;
        }

        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw).map_err(|e| ClientError::Config(format!("{}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ClientError::Config(format!(
            "{} must start with http:// or https://",
            raw
        )));
    }
    Ok(url)
}

/// Anything that can produce a page of workers for the listing view.
#[async_trait]
pub trait WorkerSource: Send + Sync {
    async fn fetch_workers(&self, params: &ListWorkersParams) -> Result<WorkerPage, ClientError>;
}

/// Anything that can accept a worker registration.
#[async_trait]
pub trait WorkerRegistrar: Send + Sync {
    async fn register_worker(&self, draft: &WorkerDraft) -> Result<WorkerRecord, ClientError>;
}

/// HTTP client for the worker catalog API.
#[derive(Clone)]
pub struct WorkersClient {
    client: reqwest::Client,
    base_url: Url,
}

impl WorkersClient {
    /// Creates a new `WorkersClient`.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("bad path {}: {}", path, e)))
    }

    /// Fetches one page of the listing.
    pub async fn list_workers(&self, params: &ListWorkersParams) -> Result<WorkerPage, ClientError> {
        let url = self.endpoint("/api/workers")?;
        tracing::debug!("Listing workers: {} {:?}", url, params);
        send_json(self.client.get(url).query(params)).await
    }

    pub async fn get_worker(&self, id: &str) -> Result<WorkerRecord, ClientError> {
        let mut url = self.endpoint("/api/workers/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(id);
        send_json(self.client.get(url)).await
    }

    pub async fn create_worker(&self, draft: &WorkerDraft) -> Result<WorkerRecord, ClientError> {
        let url = self.endpoint("/api/workers")?;
        tracing::info!("Submitting worker registration for {:?}", draft.name);
        send_json(self.client.post(url).json(draft)).await
    }

    pub async fn update_worker(
        &self,
        id: &str,
        patch: &WorkerPatch,
    ) -> Result<WorkerRecord, ClientError> {
        let mut url = self.endpoint("/api/workers/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(id);
        send_json(self.client.patch(url).json(patch)).await
    }
}

#[async_trait]
impl WorkerSource for WorkersClient {
    async fn fetch_workers(&self, params: &ListWorkersParams) -> Result<WorkerPage, ClientError> {
        self.list_workers(params).await
    }
}

#[async_trait]
impl WorkerRegistrar for WorkersClient {
    async fn register_worker(&self, draft: &WorkerDraft) -> Result<WorkerRecord, ClientError> {
        self.create_worker(draft).await
    }
}

/// Sends a request and decodes a JSON success body, or the API's `{ message }`.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(text);
        tracing::warn!("API returned {}: {}", status, message);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
