// src/blockchain/models.rs
use ethers_core::types::{H256, U256, U64};
use serde::{Deserialize, Serialize};

/// The subset of `eth_getTransactionReceipt` the service looks at.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` on success, `0x0` when the transaction reverted.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TxReceipt {
    pub fn reverted(&self) -> bool {
        self.status == Some(U64::zero())
    }
}

/// Result of the on-chain marking step of issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceOutcome {
    /// A `markCredentialIssued` transaction was confirmed.
    Issued { tx_hash: H256 },
    /// The credential was already present; nothing was submitted.
    AlreadyIssued,
}

/// Count and decoded types stored on-chain for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialDetails {
    #[serde(serialize_with = "decimal_string")]
    pub count: U256,
    pub types: Vec<String>,
}

fn decimal_string<S: serde::Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}
