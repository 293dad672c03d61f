use crate::configuration::BackendConfiguration;
use crate::error::BackendError;
use crate::Backend;
use async_trait::async_trait;
use ballot_common::{
    candidate::Vote, mutation::ConfigMutation, snapshot::RawSnapshot, types::UNIT_SCORE,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// [`Backend`] speaking to a published form and its companion web app.
pub struct HttpBackend {
    client: Client,
    conf: BackendConfiguration,
}

impl HttpBackend {
    pub fn new(conf: BackendConfiguration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(conf.request_timeout_millis))
            .build()
            .map_err(BackendError::Transport)?;
        Ok(Self { client, conf })
    }

    pub fn conf(&self) -> &BackendConfiguration {
        &self.conf
    }

    async fn read(&self) -> Result<Response, BackendError> {
        let res = self
            .client
            .get(&self.conf.script_url)
            .query(&[("t", cache_buster())])
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(res)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn submit_vote(&self, vote: &Vote) -> Result<(), BackendError> {
        let fields = &self.conf.form_fields;
        let params = [
            (fields.candidate_id.as_str(), vote.candidate_id.as_str()),
            (fields.category.as_str(), vote.category.as_str()),
            (fields.score.as_str(), UNIT_SCORE),
        ];

        // The form never answers with anything readable; the body is dropped.
        self.client
            .post(&self.conf.form_action_url)
            .form(&params)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        tracing::trace!(
            candidate_id = %vote.candidate_id,
            category = %vote.category,
            "vote sent"
        );
        Ok(())
    }

    async fn send_config(&self, mutation: &ConfigMutation) -> Result<(), BackendError> {
        let body = serde_json::to_string(mutation).map_err(BackendError::Encode)?;

        self.client
            .post(&self.conf.script_url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        tracing::debug!(action = mutation.action(), "config mutation sent");
        Ok(())
    }

    async fn fetch_snapshot(&self) -> Result<RawSnapshot, BackendError> {
        let res = self.read().await?;
        let body = res.bytes().await.map_err(BackendError::Transport)?;
        serde_json::from_slice(&body).map_err(BackendError::Decode)
    }

    async fn probe(&self) -> Result<(), BackendError> {
        self.read().await.map(|_| ())
    }

    fn form_view_url(&self) -> Option<String> {
        Some(form_view_url(&self.conf.form_action_url))
    }
}

fn form_view_url(form_action_url: &str) -> String {
    form_action_url.replace("formResponse", "viewform")
}

fn cache_buster() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
