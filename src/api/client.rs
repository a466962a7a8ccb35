//! HTTP client for the analysis backend.

use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::error::ApiError;
use super::types::{
    AnalysisResult, ComparisonResult, SourceCheck, TextRequest, UrlRequest,
};
use crate::TARGET_WEB_REQUEST;

pub const ANALYZE_URL_PATH: &str = "api/analyze-url";
pub const ANALYZE_TEXT_PATH: &str = "api/analyze";
pub const COMPARE_NEWS_PATH: &str = "api/compare-news";
pub const SOURCE_CHECK_PATH: &str = "api/source-check";

/// The backend operations the front-ends depend on.
#[async_trait]
pub trait BiasApi: Send + Sync {
    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, ApiError>;
    async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, ApiError>;
    async fn compare_news(&self, url: &str) -> Result<ComparisonResult, ApiError>;
    async fn check_source(&self, url: &str) -> Result<SourceCheck, ApiError>;
}

#[async_trait]
impl<T: BiasApi + ?Sized> BiasApi for Arc<T> {
    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, ApiError> {
        (**self).analyze_url(url).await
    }

    async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, ApiError> {
        (**self).analyze_text(text).await
    }

    async fn compare_news(&self, url: &str) -> Result<ComparisonResult, ApiError> {
        (**self).compare_news(url).await
    }

    async fn check_source(&self, url: &str) -> Result<SourceCheck, ApiError> {
        (**self).check_source(url).await
    }
}

/// How a non-success response body is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorBody {
    /// Report only the status code.
    Ignore,
    /// Prefer the body's `error` message over the status code.
    Read,
}

/// Create the HTTP client used for backend requests.
pub fn create_http_client() -> Result<reqwest::Client, ApiError> {
    debug!(target: TARGET_WEB_REQUEST, "Creating backend HTTP client");
    let client = reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()?;
    Ok(client)
}

/// Returns the non-empty `error` string carried by a response body, if any.
pub fn body_error(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}

#[derive(Debug, Clone)]
pub struct HttpBiasApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBiasApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: create_http_client()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn post<B, T>(&self, path: &str, body: &B, error_body: ErrorBody) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path)?;
        info!(target: TARGET_WEB_REQUEST, "POST {}", endpoint);

        let response = self
            .client
            .post(endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(target: TARGET_WEB_REQUEST, "{} responded {} ({} bytes)", endpoint, status, text.len());

        if !status.is_success() {
            warn!(target: TARGET_WEB_REQUEST, "{} failed with status {}", endpoint, status);
            let message = match error_body {
                ErrorBody::Read => serde_json::from_str::<Value>(&text)
                    .ok()
                    .and_then(|value| body_error(&value).map(str::to_string)),
                ErrorBody::Ignore => None,
            };
            return Err(match message {
                Some(message) => ApiError::Status {
                    status: status.as_u16(),
                    message,
                },
                None => ApiError::status(status.as_u16()),
            });
        }

        let value: Value = serde_json::from_str(&text)?;
        if let Some(message) = body_error(&value) {
            warn!(target: TARGET_WEB_REQUEST, "{} reported an error: {}", endpoint, message);
            return Err(ApiError::Backend(message.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl BiasApi for HttpBiasApi {
    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, ApiError> {
        self.post(ANALYZE_URL_PATH, &UrlRequest { url }, ErrorBody::Ignore)
            .await
    }

    async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, ApiError> {
        self.post(ANALYZE_TEXT_PATH, &TextRequest { text }, ErrorBody::Ignore)
            .await
    }

    async fn compare_news(&self, url: &str) -> Result<ComparisonResult, ApiError> {
        self.post(COMPARE_NEWS_PATH, &UrlRequest { url }, ErrorBody::Read)
            .await
    }

    async fn check_source(&self, url: &str) -> Result<SourceCheck, ApiError> {
        self.post(SOURCE_CHECK_PATH, &UrlRequest { url }, ErrorBody::Read)
            .await
    }
}
