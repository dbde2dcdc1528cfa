// src/blockchain/nonce_manager.rs

use std::sync::Arc;

use dashmap::DashMap;
use ethers_core::types::{Address, U256};
use tokio::sync::Mutex;
use tracing::debug;

use crate::blockchain::client::RpcClient;

// Hands out sequential nonces per signer so concurrent requests never reuse one.
#[derive(Debug, Clone, Default)]
pub struct NonceManager {
    // One lock per signer; DashMap lets different signers proceed independently.
    nonces: Arc<DashMap<Address, Arc<Mutex<NonceState>>>>,
}

#[derive(Debug)]
struct NonceState {
    next_nonce: Option<U256>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the next nonce for `address`, reading the pending count from the
    /// node the first time (or after a [`reset`](Self::reset)).
    pub async fn get_next_nonce(&self, address: Address, rpc: &RpcClient) -> anyhow::Result<U256> {
        let address_nonce_lock = self
            .nonces
            .entry(address)
            .or_insert_with(|| Arc::new(Mutex::new(NonceState { next_nonce: None })))
            .clone();

        let mut state = address_nonce_lock.lock().await;

        let nonce_to_use = match state.next_nonce {
            Some(nonce) => nonce,
            None => {
                let nonce = rpc.transaction_count(address).await?;
                debug!(%address, %nonce, "Fetched starting nonce from node");
                nonce
            }
        };

        state.next_nonce = Some(nonce_to_use + U256::one());

        Ok(nonce_to_use)
    }

    /// Forgets the cached nonce so the next call re-reads it from the node.
    /// Called when a reserved nonce was never used on-chain.
    pub async fn reset(&self, address: Address) {
        let lock = self.nonces.get(&address).map(|entry| entry.value().clone());
        if let Some(lock) = lock {
            lock.lock().await.next_nonce = None;
        }
    }
}
