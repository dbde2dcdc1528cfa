// src/lib.rs

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethers_signers::{LocalWallet, Signer};
use secrecy::ExposeSecret;

pub mod api;
pub mod blockchain;
pub mod config;
pub mod discord;

use blockchain::{
    client::RpcClient,
    ledger::{EvmCredentialLedger, EvmVerificationRegistry},
    nonce_manager::NonceManager,
    services::{
        credentials::CredentialService, issuer::HumanityIssuer, transactions::ReceiptPolicy,
    },
};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::Config>,
    /// Issuance, verification, revocation and lookup
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    /// Wires the issuer client and contract bindings described by `config`.
    pub fn from_config(config: config::Config) -> Result<Self> {
        let http = reqwest::Client::new();
        let rpc = RpcClient::new(http.clone(), config.rpc_url.clone());

        let wallet = LocalWallet::from_str(config.private_key.expose_secret())
            .context("PRIVATE_KEY is not a valid secp256k1 private key")?
            .with_chain_id(config.chain_id);
        tracing::info!(signer = ?wallet.address(), chain_id = config.chain_id, "Loaded signer");

        let ledger = EvmCredentialLedger::new(
            rpc.clone(),
            config.contract_address,
            wallet,
            config.gas_limit,
            NonceManager::new(),
            ReceiptPolicy {
                poll_interval: config.receipt_poll_interval,
                timeout: config.receipt_timeout,
            },
        );
        let verifier = EvmVerificationRegistry::new(rpc, config.vc_contract_address);
        let issuer = HumanityIssuer::new(
            http,
            config.issuer_api_url.clone(),
            config.issuer_api_key.clone(),
            config.issuer_credential_type.clone(),
        );

        let credentials = CredentialService::new(issuer, Arc::new(ledger), Arc::new(verifier));
        Ok(Self::new(config, credentials))
    }

    pub fn new(config: config::Config, credentials: CredentialService) -> Self {
        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
        }
    }
}
