// src/blockchain/ledger.rs

//! Contract bindings for the credential registry and the verification
//! contract, behind the traits the service layer is written against.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers_core::abi::Token;
use ethers_core::types::{Address, TransactionRequest, H256, U256};
use ethers_signers::LocalWallet;
use tracing::info;

use crate::blockchain::{
    abi,
    client::RpcClient,
    credential_key::CredentialKey,
    nonce_manager::NonceManager,
    services::transactions::{send_evm_transaction, wait_for_confirmation, ReceiptPolicy},
};

/// On-chain credential presence, keyed by (subject, credential key).
#[async_trait]
pub trait CredentialLedger: Send + Sync {
    async fn has_credential(&self, subject: Address, key: CredentialKey) -> Result<bool>;

    /// Submits `markCredentialIssued` and waits for it to be confirmed.
    async fn mark_credential_issued(&self, subject: Address, key: CredentialKey) -> Result<H256>;

    /// Submits `revokeCredential` and waits for it to be confirmed.
    async fn revoke_credential(&self, subject: Address, key: CredentialKey) -> Result<H256>;

    async fn credential_count(&self, subject: Address) -> Result<U256>;

    async fn credential_types(&self, subject: Address) -> Result<Vec<CredentialKey>>;
}

/// Read-only view of whether an address passed Humanity verification.
#[async_trait]
pub trait VerificationRegistry: Send + Sync {
    async fn is_verified(&self, subject: Address) -> Result<bool>;
}

pub struct EvmCredentialLedger {
    rpc: RpcClient,
    contract: Address,
    wallet: LocalWallet,
    gas_limit: U256,
    nonce_manager: NonceManager,
    receipts: ReceiptPolicy,
}

impl EvmCredentialLedger {
    pub fn new(
        rpc: RpcClient,
        contract: Address,
        wallet: LocalWallet,
        gas_limit: u64,
        nonce_manager: NonceManager,
        receipts: ReceiptPolicy,
    ) -> Self {
        Self {
            rpc,
            contract,
            wallet,
            gas_limit: U256::from(gas_limit),
            nonce_manager,
            receipts,
        }
    }

    fn subject_and_key(subject: Address, key: CredentialKey) -> [Token; 2] {
        [
            Token::Address(subject),
            Token::FixedBytes(key.as_bytes().to_vec()),
        ]
    }

    async fn submit(&self, method: &str, subject: Address, key: CredentialKey) -> Result<H256> {
        let data = abi::encode_call(method, &Self::subject_and_key(subject, key));
        let tx = TransactionRequest::new()
            .to(self.contract)
            .data(data)
            .gas(self.gas_limit);

        let tx_hash = send_evm_transaction(&self.rpc, &self.wallet, tx, &self.nonce_manager)
            .await
            .with_context(|| format!("{} transaction failed", method))?;
        info!(method, tx_hash = ?tx_hash, "Transaction submitted, waiting for confirmation");

        wait_for_confirmation(&self.rpc, tx_hash, self.receipts).await?;
        Ok(tx_hash)
    }
}

#[async_trait]
impl CredentialLedger for EvmCredentialLedger {
    async fn has_credential(&self, subject: Address, key: CredentialKey) -> Result<bool> {
        let data = abi::encode_call(abi::HAS_CREDENTIAL, &Self::subject_and_key(subject, key));
        let out = self.rpc.call(self.contract, &data).await?;
        abi::decode_bool(&out)
    }

    async fn mark_credential_issued(&self, subject: Address, key: CredentialKey) -> Result<H256> {
        self.submit(abi::MARK_CREDENTIAL_ISSUED, subject, key).await
    }

    async fn revoke_credential(&self, subject: Address, key: CredentialKey) -> Result<H256> {
        self.submit(abi::REVOKE_CREDENTIAL, subject, key).await
    }

    async fn credential_count(&self, subject: Address) -> Result<U256> {
        let data = abi::encode_call(abi::GET_CREDENTIAL_COUNT, &[Token::Address(subject)]);
        let out = self.rpc.call(self.contract, &data).await?;
        abi::decode_uint(&out)
    }

    async fn credential_types(&self, subject: Address) -> Result<Vec<CredentialKey>> {
        let data = abi::encode_call(abi::GET_CREDENTIAL_TYPES, &[Token::Address(subject)]);
        let out = self.rpc.call(self.contract, &data).await?;
        abi::decode_credential_keys(&out)
    }
}

pub struct EvmVerificationRegistry {
    rpc: RpcClient,
    contract: Address,
}

impl EvmVerificationRegistry {
    pub fn new(rpc: RpcClient, contract: Address) -> Self {
        Self { rpc, contract }
    }
}

#[async_trait]
impl VerificationRegistry for EvmVerificationRegistry {
    async fn is_verified(&self, subject: Address) -> Result<bool> {
        let data = abi::encode_call(abi::IS_VERIFIED, &[Token::Address(subject)]);
        let out = self.rpc.call(self.contract, &data).await?;
        abi::decode_bool(&out)
    }
}
