use async_trait::async_trait;
use reqwest::{
    Client, Url,
    header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    Config,
    error::BackendError,
    model::{ConfidencePayload, ConfidenceQuery},
};

use super::{ChatBackend, ConfidenceSource};

const CONFIDENCE_PATH: &str = "confidence";
const CHAT_PATH: &str = "chat";

/// Talks JSON over HTTP to the WakaWeather backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url).map_err(|e| BackendError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(language) {
            Ok(value) => {
                headers.insert(ACCEPT_LANGUAGE, value);
            }
            Err(_) => warn!(language, "ignoring language preference that is not a valid header"),
        }

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(
            &config.base_url,
            &config.preferences.language,
            config.request_timeout(),
        )
    }

    /// Appends `name` as a path segment, so a base of `/api` and `/api/` behave the same.
    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }
}

#[async_trait]
impl ConfidenceSource for HttpBackend {
    async fn fetch_confidence(
        &self,
        query: &ConfidenceQuery,
    ) -> Result<ConfidencePayload, BackendError> {
        let url = self.endpoint(CONFIDENCE_PATH);
        debug!(%url, city = %query.city, lat = query.lat, lon = query.lon, "fetching confidence");

        let res = self
            .http
            .get(url)
            .query(&[("city", query.city.as_str())])
            .query(&[("lat", query.lat), ("lon", query.lon)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, message: &str) -> Result<String, BackendError> {
        let url = self.endpoint(CHAT_PATH);
        debug!(%url, len = message.len(), "sending chat message");

        let res = self
            .http
            .post(url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(reply_text(body))
    }
}

/// `{"reply": ...}` when the backend follows its schema, otherwise the body verbatim.
fn reply_text(body: String) -> String {
    match serde_json::from_str::<ChatReply>(&body) {
        Ok(parsed) => parsed.reply,
        Err(_) => body,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
