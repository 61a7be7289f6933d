use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gauge::{ConfidenceTier, Gauge};

/// Banner text used when the backend flags severe weather without an alert.
pub const DEFAULT_SEVERE_ALERT: &str = "Severe weather expected";

/// Parameters of a confidence request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceQuery {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// `{min, max}` pair as sent by the backend. Ordering is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePair {
    pub min: f64,
    pub max: f64,
}

impl RangePair {
    /// Copy with `min <= max`.
    pub fn ordered(&self) -> RangePair {
        if self.min <= self.max {
            *self
        } else {
            RangePair {
                min: self.max,
                max: self.min,
            }
        }
    }
}

/// One forecast source that went into the confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReading {
    pub name: String,
    pub temp: f64,
    pub rain: f64,
    pub wind: f64,
    pub condition: String,
}

/// Forecast-agreement summary returned by `GET /confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePayload {
    pub city: String,
    pub country: String,
    pub confidence: f64,
    pub label: String,
    #[serde(rename = "temp_range")]
    pub temperature_range: RangePair,
    pub rain_range: RangePair,
    pub conditions: Vec<String>,
    pub wind_max: f64,
    pub severe: bool,
    #[serde(default)]
    pub alert: Option<String>,
    pub recommendation: String,
    pub satellite_url: String,
    pub sources: Vec<SourceReading>,
    /// Already formatted by the backend; shown as-is.
    pub generated_at: String,
}

impl ConfidencePayload {
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_label(&self.label)
    }

    /// Tier the numeric score falls in, independent of the backend's label.
    pub fn score_tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_score(self.confidence)
    }

    pub fn gauge(&self) -> Gauge {
        Gauge::from_score(self.confidence)
    }

    /// Banner text, only when the payload is flagged severe.
    pub fn severe_banner(&self) -> Option<&str> {
        if !self.severe {
            return None;
        }
        Some(self.alert.as_deref().unwrap_or(DEFAULT_SEVERE_ALERT))
    }

    /// Satellite view link, if the backend sent something parseable.
    pub fn satellite_url(&self) -> Option<Url> {
        Url::parse(&self.satellite_url).ok()
    }
}

/// Delivery state of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// User message whose round trip has not completed yet.
    Pending,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text.into(), true, MessageStatus::Pending)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text.into(), false, MessageStatus::Delivered)
    }

    /// Locally generated assistant message standing in for a failed reply.
    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(text.into(), false, MessageStatus::Failed)
    }

    fn new(text: String, is_user: bool, status: MessageStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            is_user,
            timestamp: Utc::now(),
            status,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_payload_json() -> serde_json::Value {
    serde_json::json!({
        "city": "Suva",
        "country": "Fiji",
        "confidence": 82.0,
        "label": "High",
        "temp_range": { "min": 20.0, "max": 26.0 },
        "rain_range": { "min": 0.0, "max": 3.5 },
        "conditions": ["light rain", "scattered clouds"],
        "wind_max": 6.2,
        "severe": false,
        "alert": null,
        "recommendation": "Visit the beaches of Pacific Harbour",
        "satellite_url": "https://zoom.earth/#view=-18.1248,178.4501,7z/date=now",
        "sources": [
            { "name": "OpenWeatherMap", "temp": 26.0, "rain": 3.5, "wind": 6.2, "condition": "light rain" },
            { "name": "WeatherAPI", "temp": 20.0, "rain": 0.0, "wind": 4.1, "condition": "scattered clouds" }
        ],
        "generated_at": "2025-11-02T03:14:07.123456"
    })
}
