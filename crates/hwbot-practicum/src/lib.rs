//! Practicum adapter (homework statuses).
//!
//! Implements the `hwbot-core` HomeworkApi port over the Practicum user API.

use std::time::Duration;

use async_trait::async_trait;

use hwbot_core::{domain::PollCursor, errors::Error, ports::HomeworkApi, Result};

#[derive(Clone, Debug)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    fn request(&self, from_date: PollCursor) -> reqwest::RequestBuilder {
        self.http
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn homework_statuses(&self, from_date: PollCursor) -> Result<serde_json::Value> {
        let resp = self
            .request(from_date)
            .send()
            .await
            .map_err(|e| Error::ApiUnavailable(format!("request error: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ApiUnavailable(format!(
                "endpoint {} returned {status}: {}",
                self.endpoint,
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::ApiUnavailable(format!("undecodable response body: {e}")))?;

        tracing::debug!(%status, "practicum responded");
        Ok(v)
    }
}
