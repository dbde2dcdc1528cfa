// src/blockchain/services/credentials.rs

//! Credential issuance, verification, revocation and lookup.
//!
//! Each operation is a short sequence of awaited calls against the issuer
//! API and the contracts. Nothing is cached: presence is read from the
//! registry contract on every call.

use std::str::FromStr;
use std::sync::Arc;

use ethers_core::{
    types::{Address, H256},
    utils::to_checksum,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::blockchain::{
    credential_key::{CredentialKey, CredentialKeyError},
    ledger::{CredentialLedger, VerificationRegistry},
    models::{CredentialDetails, IssuanceOutcome},
    services::issuer::HumanityIssuer,
};

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid subject address: {0}")]
    InvalidAddress(String),
    #[error("Invalid credential type: {0}")]
    InvalidCredentialType(#[from] CredentialKeyError),
    #[error("Credential issuance failed")]
    IssuanceRejected,
    #[error("Credential not issued")]
    NotIssued,
    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

// Mixed-case input must carry a valid EIP-55 checksum; all-lower or
// all-upper hex is accepted as is.
fn parse_subject(subject_address: &str) -> CredentialResult<Address> {
    let invalid = || CredentialError::InvalidAddress(subject_address.to_string());
    let text = subject_address.trim();
    let address = Address::from_str(text).map_err(|_| invalid())?;

    let digits = text.strip_prefix("0x").unwrap_or(text);
    let mixed_case = digits.chars().any(|c| c.is_ascii_lowercase())
        && digits.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case && to_checksum(&address, None) != format!("0x{}", digits) {
        return Err(invalid());
    }
    Ok(address)
}

pub struct CredentialService {
    issuer: HumanityIssuer,
    ledger: Arc<dyn CredentialLedger>,
    verifier: Arc<dyn VerificationRegistry>,
}

impl CredentialService {
    pub fn new(
        issuer: HumanityIssuer,
        ledger: Arc<dyn CredentialLedger>,
        verifier: Arc<dyn VerificationRegistry>,
    ) -> Self {
        Self {
            issuer,
            ledger,
            verifier,
        }
    }

    /// Off-chain issuance followed by on-chain marking.
    ///
    /// The two steps are not atomic: if the issuer accepts and the chain step
    /// fails, the error is logged and returned, and calling again is safe
    /// because marking is skipped once the credential is present.
    pub async fn issue_credential(
        &self,
        subject_address: &str,
        credential_type: &str,
    ) -> CredentialResult<IssuanceOutcome> {
        let subject = parse_subject(subject_address)?;
        let key = CredentialKey::encode(credential_type)?;

        let receipt = self.issuer.issue_credential(subject_address.trim()).await?;
        if !receipt.is_issued() {
            warn!(
                subject = subject_address,
                message = ?receipt.message(),
                "Issuer did not confirm the credential"
            );
            return Err(CredentialError::IssuanceRejected);
        }

        self.mark_credential_on_chain(subject, credential_type, key)
            .await
            .map_err(|e| {
                error!(
                    subject = subject_address,
                    credential_type,
                    error = %e,
                    "Issuer accepted the credential but on-chain marking failed"
                );
                e
            })
    }

    async fn mark_credential_on_chain(
        &self,
        subject: Address,
        credential_type: &str,
        key: CredentialKey,
    ) -> CredentialResult<IssuanceOutcome> {
        debug!(%key, credential_type, "Converted credential key");

        if self.ledger.has_credential(subject, key).await? {
            info!(
                subject = ?subject,
                credential_type,
                "Credential already issued, skipping transaction"
            );
            return Ok(IssuanceOutcome::AlreadyIssued);
        }

        let tx_hash = self.ledger.mark_credential_issued(subject, key).await?;
        info!(subject = ?subject, credential_type, tx_hash = ?tx_hash, "Credential marked on-chain");
        Ok(IssuanceOutcome::Issued { tx_hash })
    }

    /// Returns the verification contract's flag for `subject_address` unchanged.
    pub async fn check_verification(&self, subject_address: &str) -> CredentialResult<bool> {
        let subject = parse_subject(subject_address)?;
        let verified = self.verifier.is_verified(subject).await?;
        info!(subject = subject_address, verified, "Checked verification");
        Ok(verified)
    }

    pub async fn revoke_credential(
        &self,
        subject_address: &str,
        credential_type: &str,
    ) -> CredentialResult<H256> {
        let subject = parse_subject(subject_address)?;
        let key = CredentialKey::encode(credential_type)?;

        if !self.ledger.has_credential(subject, key).await? {
            return Err(CredentialError::NotIssued);
        }

        let tx_hash = self.ledger.revoke_credential(subject, key).await?;
        info!(subject = subject_address, credential_type, tx_hash = ?tx_hash, "Credential revoked");
        Ok(tx_hash)
    }

    pub async fn credential_details(
        &self,
        subject_address: &str,
    ) -> CredentialResult<CredentialDetails> {
        let subject = parse_subject(subject_address)?;
        let count = self.ledger.credential_count(subject).await?;
        let types = self
            .ledger
            .credential_types(subject)
            .await?
            .iter()
            .map(CredentialKey::decode)
            .collect::<Result<Vec<_>, _>>()?;

        info!(subject = subject_address, %count, ?types, "Fetched credential details");
        Ok(CredentialDetails { count, types })
    }
}
