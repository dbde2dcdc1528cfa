// src/blockchain/services/issuer.rs

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Text the issuer returns in `message` when a credential was accepted.
pub const ISSUED_MESSAGE: &str = "Credential issued successfully";

/// Parsed body of the issuer's response. Any JSON value is accepted; only a
/// string `message` member is ever read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerReceipt(Value);

impl IssuerReceipt {
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    pub fn is_issued(&self) -> bool {
        self.message() == Some(ISSUED_MESSAGE)
    }
}

/// Client for the Humanity Protocol credential issuer API.
pub struct HumanityIssuer {
    client: Client,
    base_url: String,
    api_key: SecretString,
    credential_type: String,
}

impl HumanityIssuer {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: SecretString,
        credential_type: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            credential_type: credential_type.into(),
        }
    }

    /// Registers a KYC claim for `subject_address` with the issuer.
    ///
    /// The response body is returned as-is whatever the HTTP status; callers
    /// decide success from [`IssuerReceipt::is_issued`].
    pub async fn issue_credential(&self, subject_address: &str) -> Result<IssuerReceipt> {
        let url = format!("{}/credentials/issue", self.base_url.trim_end_matches('/'));
        info!(subject = subject_address, "Requesting off-chain credential from issuer");

        let resp = self
            .client
            .post(&url)
            .header("X-API-Token", self.api_key.expose_secret())
            .json(&json!({
                "subject_address": subject_address,
                "claims": { "kyc": "passed" },
                "credentialType": self.credential_type,
            }))
            .send()
            .await
            .context("Failed to call issuer API")?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "Issuer response");

        serde_json::from_str(&body).map(IssuerReceipt).map_err(|_| {
            anyhow!("Issuer API returned a non-JSON response: status={} body={}", status, body)
        })
    }
}
