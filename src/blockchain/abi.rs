// src/blockchain/abi.rs

use anyhow::{anyhow, Context, Result};
use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Bytes, U256};
use ethers_core::utils::keccak256;

use super::credential_key::CredentialKey;

// Credential registry methods
pub const HAS_CREDENTIAL: &str = "hasCredential(address,bytes32)";
pub const MARK_CREDENTIAL_ISSUED: &str = "markCredentialIssued(address,bytes32)";
pub const REVOKE_CREDENTIAL: &str = "revokeCredential(address,bytes32)";
pub const GET_CREDENTIAL_COUNT: &str = "getCredentialCount(address)";
pub const GET_CREDENTIAL_TYPES: &str = "getCredentialTypes(address)";

// Verification contract
pub const IS_VERIFIED: &str = "isVerified(address)";

pub fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

pub fn encode_call(sig: &str, tokens: &[Token]) -> Bytes {
    let mut out = selector(sig).to_vec();
    out.extend_from_slice(&encode(tokens));
    Bytes::from(out)
}

fn decode_single(kind: ParamType, data: &[u8], what: &str) -> Result<Token> {
    decode(&[kind], data)
        .with_context(|| format!("failed to decode {} from 0x{}", what, hex::encode(data)))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("empty {} return data", what))
}

pub fn decode_bool(data: &[u8]) -> Result<bool> {
    match decode_single(ParamType::Bool, data, "bool")? {
        Token::Bool(b) => Ok(b),
        other => Err(anyhow!("expected bool, got {:?}", other)),
    }
}

pub fn decode_uint(data: &[u8]) -> Result<U256> {
    match decode_single(ParamType::Uint(256), data, "uint256")? {
        Token::Uint(n) => Ok(n),
        other => Err(anyhow!("expected uint256, got {:?}", other)),
    }
}

pub fn decode_credential_keys(data: &[u8]) -> Result<Vec<CredentialKey>> {
    let kind = ParamType::Array(Box::new(ParamType::FixedBytes(32)));
    let items = match decode_single(kind, data, "bytes32[]")? {
        Token::Array(items) => items,
        other => return Err(anyhow!("expected bytes32[], got {:?}", other)),
    };

    items
        .into_iter()
        .map(|item| match item {
            Token::FixedBytes(b) if b.len() == 32 => {
                let mut raw = [0u8; 32];
                raw.copy_from_slice(&b);
                Ok(CredentialKey::from_bytes(raw))
            }
            other => Err(anyhow!("expected bytes32 element, got {:?}", other)),
        })
        .collect()
}
