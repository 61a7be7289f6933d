use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::BackendError,
    model::{ConfidencePayload, ConfidenceQuery},
};

pub mod http;

pub use http::HttpBackend;

/// Where the confidence dashboard gets its payload from.
#[async_trait]
pub trait ConfidenceSource: Send + Sync + Debug {
    async fn fetch_confidence(
        &self,
        query: &ConfidenceQuery,
    ) -> Result<ConfidencePayload, BackendError>;
}

/// Chat assistant endpoint. Returns the reply text.
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    async fn send_chat(&self, message: &str) -> Result<String, BackendError>;
}
