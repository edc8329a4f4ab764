//! Providers of raw weekly source documents.
//!
//! The cache only ever sees the [`DocumentSource`] trait, so tests can script
//! responses without a network.

pub mod http;

use async_trait::async_trait;

use crate::api::WeekId;

pub use http::HttpDocumentSource;

/// Failure to obtain a week's document. Every variant is treated as a
/// transient transport failure by the refresh loop.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,
}

/// Anything that can return the raw bytes of one weekly document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_week(&self, week: WeekId) -> Result<Vec<u8>, SourceError>;
}
