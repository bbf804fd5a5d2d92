use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    clock::entities::{ClockRecord, TimeEntry, TimeEntryQuery},
    errors::ExternalServiceError,
};

use super::TimeTracker;

const SERVICE_NAME: &str = "Time tracker";

/// JSON over HTTP client for the time-tracking service.
pub struct HttpTimeTracker {
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl HttpTimeTracker {
    pub fn new(base_url: &str, api_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError {
                service: SERVICE_NAME,
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .context("Failed to reach the time tracker")?;

        Self::ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse time tracker response")
    }

    async fn post(&self, url: &str, body: Option<&TimeEntry>) -> Result<()> {
        debug!("POST {url}");
        let request = self.client.post(url).bearer_auth(&self.api_token);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = request
            .send()
            .await
            .context("Failed to reach the time tracker")?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TimeTracker for HttpTimeTracker {
    async fn clock_in(&self) -> Result<()> {
        self.post(&self.url("clock/in"), None).await
    }

    async fn clock_out(&self) -> Result<()> {
        self.post(&self.url("clock/out"), None).await
    }

    async fn list_clock_ins(&self) -> Result<Vec<ClockRecord>> {
        self.get(&self.url("clock"), &[]).await
    }

    async fn list_time_entries(&self, project: &str, query: TimeEntryQuery) -> Result<Vec<TimeEntry>> {
        let url = self.url(&format!("projects/{project}/time-entries"));
        self.get(
            &url,
            &[
                ("page", query.page.to_string()),
                ("pageSize", query.page_size.to_string()),
                ("sortBy", query.sort_by),
                ("sortOrder", query.sort_order.to_string()),
            ],
        )
        .await
    }

    async fn create_time_entry(&self, project: &str, entry: TimeEntry) -> Result<()> {
        let url = self.url(&format!("projects/{project}/time-entries"));
        self.post(&url, Some(&entry)).await
    }
}
