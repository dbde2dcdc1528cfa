// src/discord/backend.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// HTTP client for the credential backend, as seen from the bot.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    issue_url: String,
    check_url: String,
}

impl BackendClient {
    pub fn new(client: Client, issue_url: String, check_url: String) -> Self {
        Self {
            client,
            issue_url,
            check_url,
        }
    }

    pub async fn issue_credential(&self, address: &str, credential: &str) -> Result<Value> {
        self.post(
            &self.issue_url,
            json!({ "subject_address": address, "credentialType": credential }),
        )
        .await
    }

    pub async fn check_verification(&self, address: &str) -> Result<Value> {
        self.post(&self.check_url, json!({ "subject_address": address }))
            .await
    }

    // Non-2xx responses are errors, so a backend 500 maps to the generic failure reply.
    async fn post(&self, url: &str, body: Value) -> Result<Value> {
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", url))?;
        let status = resp.status();
        debug!(url, status = %status, "Backend response");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Backend error: {} - {}", status, text);
        }
        resp.json().await.context("Backend returned invalid JSON")
    }
}
