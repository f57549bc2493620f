use std::time::Duration;

use log::{info, warn};
use serde_json::Value;
use tokio::time;
use url::Url;

use crate::{
    error::PsiError,
    settings::{PsiSettings, PsiStrategy},
};

use super::{extract::extract_report, types::PsiExtraction};

/// Runs PageSpeed Insights for a page and extracts the values the engine
/// reconciles against.
#[derive(Clone)]
pub struct PsiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    strategy: PsiStrategy,
    timeout: Duration,
}

impl PsiClient {
    pub fn new(settings: &PsiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            strategy: settings.strategy,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn request_url(&self, page_url: &str) -> Result<Url, PsiError> {
        let page = Url::parse(page_url).map_err(|err| PsiError::InvalidUrl {
            url: page_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(page.scheme(), "http" | "https") {
            return Err(PsiError::InvalidUrl {
                url: page_url.to_string(),
                reason: format!("unsupported scheme '{}'", page.scheme()),
            });
        }

        let mut request = Url::parse(&self.endpoint).map_err(|err| {
            PsiError::InvalidResponse(format!("bad PSI endpoint '{}': {err}", self.endpoint))
        })?;
        {
            let mut query = request.query_pairs_mut();
            query
                .append_pair("url", page.as_str())
                .append_pair("strategy", self.strategy.as_str())
                .append_pair("category", "performance");
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }
        Ok(request)
    }

    /// A request that outlives the timeout is a failure, not a pending fetch.
    pub async fn fetch(&self, page_url: &str) -> Result<PsiExtraction, PsiError> {
        let request_url = self.request_url(page_url)?;
        info!("requesting PSI report for {page_url}");

        match time::timeout(self.timeout, self.fetch_report(request_url)).await {
            Ok(Ok(report)) => Ok(extract_report(&report)),
            Ok(Err(err)) => {
                warn!("PSI request for {page_url} failed: {err}");
                Err(err)
            }
            Err(_) => {
                warn!("PSI request for {page_url} timed out");
                Err(PsiError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }

    async fn fetch_report(&self, request_url: Url) -> Result<Value, PsiError> {
        let response = self.http.get(request_url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PsiError::Http {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let report: Value = serde_json::from_str(&body)
            .map_err(|err| PsiError::InvalidResponse(err.to_string()))?;
        if let Some(message) = error_message(&body) {
            return Err(PsiError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(report)
    }
}

/// Google APIs report failures as `{ "error": { "message": ... } }`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
