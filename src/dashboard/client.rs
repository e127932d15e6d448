//! Prediction service client
//!
//! The dashboard talks to an external model service over two endpoints,
//! `POST /predict` and `POST /recommend`, both taking a [`PredictionRequest`].
//! [`PredictionService`] is the seam tests replace with an in-memory fake.

use async_trait::async_trait;
use std::time::Duration;

use crate::types::{PredictResponse, PredictionRequest, RecommendResponse, ServiceErrorBody};

/// Prediction client errors
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service returned status {status}: {message}")]
    Service {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("{0}")]
    Unavailable(String),
}

impl PredictionError {
    /// Text shown on the dashboard error banner: the service's own `error`
    /// field when it sent one, otherwise the transport message.
    pub fn detail(&self) -> String {
        match self {
            Self::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Model service operations used by the dashboard.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictResponse, PredictionError>;

    async fn recommend(
        &self,
        request: &PredictionRequest,
    ) -> Result<RecommendResponse, PredictionError>;
}

/// reqwest-backed [`PredictionService`].
#[derive(Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPredictionClient {
    /// Build a client for `base_url`; no timeout when `timeout` is `None`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, PredictionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &PredictionRequest,
    ) -> Result<T, PredictionError> {
        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ServiceErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => body.trim().to_string(),
        };
        Err(PredictionError::Service { status, message })
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictResponse, PredictionError> {
        self.post("predict", request).await
    }

    async fn recommend(
        &self,
        request: &PredictionRequest,
    ) -> Result<RecommendResponse, PredictionError> {
        self.post("recommend", request).await
    }
}
