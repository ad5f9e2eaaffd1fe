use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{FormKind, FormRecord},
    error::ErrorBody,
    protocol::{HealthStatus, SubmissionAck, SubmissionStats},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server rejected request to {url} with status {status}")]
    Rejected {
        url: String,
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiFailure {
    /// Server-provided explanation, present only on rejections that carried a
    /// string `detail`.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiFailure::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiFailure::Rejected { status, .. } => Some(*status),
            ApiFailure::Transport { source, .. } | ApiFailure::Decode { source, .. } => {
                source.status()
            }
            ApiFailure::ClientBuild(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
    pub submission_id: Option<String>,
}

impl From<SubmissionAck> for SubmissionReceipt {
    fn from(ack: SubmissionAck) -> Self {
        Self {
            message: ack.message.filter(|message| !message.is_empty()),
            submission_id: ack.submission_id,
        }
    }
}

#[async_trait]
pub trait LeadApi: Send + Sync {
    async fn submit(
        &self,
        kind: FormKind,
        record: &FormRecord,
    ) -> Result<SubmissionReceipt, ApiFailure>;
}

#[derive(Clone)]
pub struct HttpLeadApi {
    http: Client,
    base_url: String,
}

impl HttpLeadApi {
    /// `base_url` is used as given; run it through
    /// [`crate::config::validate_backend_url`] first when it comes from a user.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiFailure> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build().map_err(ApiFailure::ClientBuild)?,
            base_url: settings.backend_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiFailure> {
        self.get_json("/api/health").await
    }

    pub async fn submission_stats(&self) -> Result<SubmissionStats, ApiFailure> {
        self.get_json("/api/submissions/stats").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiFailure> {
        let url = self.endpoint(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiFailure::Transport {
                url: url.clone(),
                source,
            })?;
        let response = ensure_success(url.clone(), response).await?;
        response
            .json()
            .await
            .map_err(|source| ApiFailure::Decode { url, source })
    }
}

#[async_trait]
impl LeadApi for HttpLeadApi {
    async fn submit(
        &self,
        kind: FormKind,
        record: &FormRecord,
    ) -> Result<SubmissionReceipt, ApiFailure> {
        let url = self.endpoint(kind.endpoint_path());
        debug!(form = %kind, %url, "api: posting form record");
        let response = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|source| ApiFailure::Transport {
                url: url.clone(),
                source,
            })?;
        let response = ensure_success(url.clone(), response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiFailure::Transport {
                url: url.clone(),
                source,
            })?;
        // Any 2xx is an accepted lead; the ack body is best-effort.
        match serde_json::from_slice::<SubmissionAck>(&body) {
            Ok(ack) => Ok(ack.into()),
            Err(err) => {
                warn!(form = %kind, %url, "api: undecodable success body: {err}");
                Ok(SubmissionReceipt::default())
            }
        }
    }
}

async fn ensure_success(url: String, response: Response) -> Result<Response, ApiFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body.detail_message().map(str::to_owned),
        Err(_) => None,
    };
    Err(ApiFailure::Rejected {
        url,
        status,
        detail,
    })
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
