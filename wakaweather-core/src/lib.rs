//! Core library for the WakaWeather client.
//!
//! This crate defines:
//! - Configuration (backend URL, location, display preferences)
//! - The wire model of the confidence and chat endpoints
//! - An HTTP backend behind the `ConfidenceSource` / `ChatBackend` traits
//! - Two view-models: `ConfidenceLoader` and `ChatSession`
//! - Mapping of a confidence score and label onto the gauge
//!
//! It is used by `wakaweather-cli`, but any front end can drive the view-models
//! and follow their state through `subscribe()`.

pub mod backend;
pub mod chat;
pub mod confidence;
pub mod config;
pub mod error;
pub mod gauge;
pub mod model;

pub use backend::{ChatBackend, ConfidenceSource, HttpBackend};
pub use chat::{ChatSession, ChatState, FAILURE_REPLY, SendOutcome};
pub use confidence::{ConfidenceLoader, ConfidencePhase, ConfidenceState, LoadOutcome};
pub use config::{Config, Location, Preferences, Theme};
pub use error::BackendError;
pub use gauge::{ConfidenceTier, Gauge};
pub use model::{
    ChatMessage, ConfidencePayload, ConfidenceQuery, MessageStatus, RangePair, SourceReading,
};
