//! HTTP implementation of [`DocumentSource`].

use async_trait::async_trait;
use std::time::Duration;

use super::{DocumentSource, SourceError};
use crate::api::WeekId;
use crate::config::{SourceSettings, WEEK_PLACEHOLDER};

/// Fetches `GET {url_template}` with `{week}` substituted.
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    client: reqwest::Client,
    url_template: String,
}

impl HttpDocumentSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    pub fn from_settings(settings: &SourceSettings) -> Result<Self, SourceError> {
        Self::new(settings.url_template.clone(), settings.request_timeout())
    }

    pub fn url_for(&self, week: WeekId) -> String {
        self.url_template
            .replace(WEEK_PLACEHOLDER, &week.value().to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch_week(&self, week: WeekId) -> Result<Vec<u8>, SourceError> {
        let url = self.url_for(week);
        log::debug!("Fetching week {} from {}", week, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
