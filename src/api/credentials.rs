// src/api/credentials.rs

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{api::error::ApiError, blockchain::models::{CredentialDetails, IssuanceOutcome}, AppState};

/// Sentinel returned instead of a transaction hash when nothing was submitted.
pub const ALREADY_ISSUED_MESSAGE: &str = "Credential already issued";

// --- Request and Response Models ---

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialRequest {
    #[validate(length(min = 1, message = "subject_address is required"))]
    pub subject_address: String,
    #[serde(rename = "credentialType")]
    #[validate(length(min = 1, message = "credentialType is required"))]
    pub credential_type: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubjectRequest {
    #[validate(length(min = 1, message = "subject_address is required"))]
    pub subject_address: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResult {
    pub success: bool,
    #[serde(rename = "txHash", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TransactionResult {
    fn submitted(tx_hash: ethers_core::types::H256) -> Self {
        Self {
            success: true,
            tx_hash: Some(format!("{:?}", tx_hash)),
            message: None,
        }
    }
}

impl From<IssuanceOutcome> for TransactionResult {
    fn from(outcome: IssuanceOutcome) -> Self {
        match outcome {
            IssuanceOutcome::Issued { tx_hash } => Self::submitted(tx_hash),
            IssuanceOutcome::AlreadyIssued => Self {
                success: true,
                tx_hash: None,
                message: Some(ALREADY_ISSUED_MESSAGE.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationResult {
    pub verified: bool,
}

fn accept<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(req) = payload?;
    req.validate()?;
    Ok(req)
}

// --- Handlers ---

pub async fn issue_credential_handler(
    State(state): State<AppState>,
    payload: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<Json<TransactionResult>, ApiError> {
    let req = accept(payload)?;
    info!(subject = %req.subject_address, credential_type = %req.credential_type, "issue-credential");

    let outcome = state
        .credentials
        .issue_credential(&req.subject_address, &req.credential_type)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn check_verification_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubjectRequest>, JsonRejection>,
) -> Result<Json<VerificationResult>, ApiError> {
    let req = accept(payload)?;
    info!(subject = %req.subject_address, "check-verification");

    let verified = state
        .credentials
        .check_verification(&req.subject_address)
        .await?;
    Ok(Json(VerificationResult { verified }))
}

pub async fn revoke_credential_handler(
    State(state): State<AppState>,
    payload: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<Json<TransactionResult>, ApiError> {
    let req = accept(payload)?;
    info!(subject = %req.subject_address, credential_type = %req.credential_type, "revoke-credential");

    let tx_hash = state
        .credentials
        .revoke_credential(&req.subject_address, &req.credential_type)
        .await?;
    Ok(Json(TransactionResult::submitted(tx_hash)))
}

pub async fn credential_details_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubjectRequest>, JsonRejection>,
) -> Result<Json<CredentialDetails>, ApiError> {
    let req = accept(payload)?;
    info!(subject = %req.subject_address, "credential-details");

    let details = state
        .credentials
        .credential_details(&req.subject_address)
        .await?;
    Ok(Json(details))
}
