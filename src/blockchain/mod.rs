// src/blockchain/mod.rs

pub mod abi;
pub mod client;
pub mod credential_key;
pub mod ledger;
pub mod memory;
pub mod models;
pub mod nonce_manager;
pub mod services;

pub use client::RpcClient;
pub use credential_key::CredentialKey;
pub use ledger::{CredentialLedger, VerificationRegistry};
