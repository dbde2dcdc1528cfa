// src/blockchain/credential_key.rs

//! Fixed-width on-chain keys for credential types.
//!
//! The registry contract stores credential types as `bytes32`. A key is the
//! UTF-8 text of the type, right-padded with zeros; at least one trailing
//! zero is always kept so the text can be recovered by reading up to the
//! first zero byte.

use std::fmt;

use ethers_core::utils::{format_bytes32_string, parse_bytes32_string};
use thiserror::Error;

/// Longest credential type that still leaves room for the zero terminator.
pub const MAX_CREDENTIAL_TYPE_LEN: usize = 31;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialKeyError {
    #[error("credential type must not be empty")]
    Empty,
    #[error("credential type is {0} bytes long, must be at most 31 bytes")]
    TooLong(usize),
    #[error("credential type must not contain NUL characters")]
    ContainsNul,
    #[error("stored credential key is not valid UTF-8")]
    InvalidUtf8,
    #[error("stored credential key has no zero terminator")]
    Unterminated,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialKey([u8; 32]);

impl CredentialKey {
    /// Encodes a human-readable credential type into its `bytes32` key.
    pub fn encode(credential_type: &str) -> Result<Self, CredentialKeyError> {
        if credential_type.is_empty() {
            return Err(CredentialKeyError::Empty);
        }
        if credential_type.len() > MAX_CREDENTIAL_TYPE_LEN {
            return Err(CredentialKeyError::TooLong(credential_type.len()));
        }
        if credential_type.contains('\0') {
            return Err(CredentialKeyError::ContainsNul);
        }
        let bytes = format_bytes32_string(credential_type)
            .map_err(|_| CredentialKeyError::TooLong(credential_type.len()))?;
        Ok(Self(bytes))
    }

    /// Decodes the key back to the credential type it was built from.
    pub fn decode(&self) -> Result<String, CredentialKeyError> {
        if self.0[MAX_CREDENTIAL_TYPE_LEN] != 0 {
            return Err(CredentialKeyError::Unterminated);
        }
        parse_bytes32_string(&self.0)
            .map(str::to_owned)
            .map_err(|_| CredentialKeyError::InvalidUtf8)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialKey(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
