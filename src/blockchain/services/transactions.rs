// src/blockchain/services/transactions.rs

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use ethers_core::types::{transaction::eip2718::TypedTransaction, TransactionRequest, H256};
use ethers_signers::{LocalWallet, Signer};
use tracing::{debug, info, warn};

use crate::blockchain::{client::RpcClient, models::TxReceipt, nonce_manager::NonceManager};

/// How long to wait for a submitted transaction to be mined.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Signs and submits a legacy transaction from `wallet`.
/// The nonce comes from the shared NonceManager; if anything fails after the
/// nonce was reserved, the reservation is dropped so the next call re-reads it.
pub async fn send_evm_transaction(
    rpc: &RpcClient,
    wallet: &LocalWallet,
    tx_request: TransactionRequest,
    nonce_manager: &NonceManager,
) -> Result<H256> {
    let from_address = wallet.address();
    let nonce = nonce_manager.get_next_nonce(from_address, rpc).await?;

    let submitted = async {
        let mut tx = tx_request
            .from(from_address)
            .nonce(nonce)
            .chain_id(wallet.chain_id());

        if tx.gas_price.is_none() {
            tx = tx.gas_price(rpc.gas_price().await?);
        }

        let typed: TypedTransaction = tx.clone().into();
        let signature = wallet.sign_transaction(&typed).await?;
        let raw_tx = tx.rlp_signed(&signature);
        debug!(%from_address, %nonce, "Submitting signed transaction");

        rpc.send_raw_transaction(&raw_tx).await
    }
    .await;

    if submitted.is_err() {
        warn!(%from_address, %nonce, "Transaction not submitted; resetting nonce");
        nonce_manager.reset(from_address).await;
    }
    submitted
}

/// Polls for the receipt of `tx_hash` until it is mined or the policy's
/// timeout elapses. A reverted transaction is an error.
pub async fn wait_for_confirmation(
    rpc: &RpcClient,
    tx_hash: H256,
    policy: ReceiptPolicy,
) -> Result<TxReceipt> {
    let poll = async {
        loop {
            if let Some(receipt) = rpc.transaction_receipt(tx_hash).await? {
                return Ok::<_, anyhow::Error>(receipt);
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    };

    let receipt = tokio::time::timeout(policy.timeout, poll)
        .await
        .map_err(|_| {
            anyhow!(
                "timed out after {:?} waiting for transaction {:?} to be confirmed",
                policy.timeout,
                tx_hash
            )
        })??;

    if receipt.reverted() {
        bail!("transaction {:?} reverted", tx_hash);
    }
    info!(tx_hash = ?tx_hash, block = ?receipt.block_number, "Transaction confirmed");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn policy() -> ReceiptPolicy {
        ReceiptPolicy {
            poll_interval: Duration::from_millis(10),
            timeout: Duration::from_millis(500),
        }
    }

    fn receipt_body(hash: H256, status: &str) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "transactionHash": format!("{:?}", hash),
                "blockNumber": "0x2a",
                "status": status
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn confirmed_receipt_is_returned() {
        let hash = H256::repeat_byte(0x0c);
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(
                json!({ "method": "eth_getTransactionReceipt" }),
            ))
            .with_body(receipt_body(hash, "0x1"))
            .create_async()
            .await;

        let rpc = RpcClient::new(reqwest::Client::new(), server.url());
        let receipt = wait_for_confirmation(&rpc, hash, policy()).await.unwrap();
        assert_eq!(receipt.transaction_hash, hash);
    }

    #[tokio::test]
    async fn reverted_receipt_is_an_error() {
        let hash = H256::repeat_byte(0x0d);
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(receipt_body(hash, "0x0"))
            .create_async()
            .await;

        let rpc = RpcClient::new(reqwest::Client::new(), server.url());
        let err = wait_for_confirmation(&rpc, hash, policy()).await.unwrap_err();
        assert!(err.to_string().contains("reverted"));
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": null }).to_string())
            .create_async()
            .await;

        let rpc = RpcClient::new(reqwest::Client::new(), server.url());
        let err = wait_for_confirmation(&rpc, H256::zero(), policy())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn failed_submission_releases_the_nonce() {
        let mut server = mockito::Server::new_async().await;
        let nonce_mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(
                json!({ "method": "eth_getTransactionCount" }),
            ))
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x3" }).to_string())
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "eth_gasPrice" })))
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x3b9aca00" }).to_string())
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(
                json!({ "method": "eth_sendRawTransaction" }),
            ))
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32000, "message": "insufficient funds" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let rpc = RpcClient::new(reqwest::Client::new(), server.url());
        let wallet: LocalWallet =
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
                .parse::<LocalWallet>()
                .unwrap()
                .with_chain_id(1942999413u64);
        let nonces = NonceManager::new();

        for _ in 0..2 {
            let err = send_evm_transaction(&rpc, &wallet, TransactionRequest::new(), &nonces)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("insufficient funds"));
        }
        nonce_mock.assert_async().await;
    }
}
