// src/blockchain/memory.rs

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use ethers_core::types::{Address, H256, U256};

use crate::blockchain::{
    credential_key::CredentialKey,
    ledger::{CredentialLedger, VerificationRegistry},
};

/// Ledger and verification registry kept in process memory.
///
/// Mirrors the registry contract's behaviour closely enough for tests and
/// local runs: marking an already-present key or revoking a missing one
/// fails like a contract revert, and every state change counts as one
/// submitted transaction.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    credentials: DashMap<Address, Vec<CredentialKey>>,
    verified: DashMap<Address, bool>,
    submitted: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_verified(&self, subject: Address, verified: bool) {
        self.verified.insert(subject, verified);
    }

    /// Number of state-changing transactions submitted so far.
    pub fn submitted_transactions(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    fn next_tx_hash(&self) -> H256 {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        H256::from_low_u64_be(n)
    }
}

#[async_trait]
impl CredentialLedger for InMemoryLedger {
    async fn has_credential(&self, subject: Address, key: CredentialKey) -> Result<bool> {
        Ok(self
            .credentials
            .get(&subject)
            .map(|keys| keys.contains(&key))
            .unwrap_or(false))
    }

    async fn mark_credential_issued(&self, subject: Address, key: CredentialKey) -> Result<H256> {
        let mut keys = self.credentials.entry(subject).or_default();
        if keys.contains(&key) {
            bail!("execution reverted: credential already issued");
        }
        keys.push(key);
        Ok(self.next_tx_hash())
    }

    async fn revoke_credential(&self, subject: Address, key: CredentialKey) -> Result<H256> {
        let mut keys = self.credentials.entry(subject).or_default();
        let Some(pos) = keys.iter().position(|k| *k == key) else {
            bail!("execution reverted: credential not issued");
        };
        keys.remove(pos);
        Ok(self.next_tx_hash())
    }

    async fn credential_count(&self, subject: Address) -> Result<U256> {
        let count = self.credentials.get(&subject).map(|keys| keys.len()).unwrap_or(0);
        Ok(U256::from(count))
    }

    async fn credential_types(&self, subject: Address) -> Result<Vec<CredentialKey>> {
        Ok(self
            .credentials
            .get(&subject)
            .map(|keys| keys.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl VerificationRegistry for InMemoryLedger {
    async fn is_verified(&self, subject: Address) -> Result<bool> {
        Ok(self.verified.get(&subject).map(|v| *v).unwrap_or(false))
    }
}
