// src/blockchain/services/mod.rs

pub mod credentials;
pub mod issuer;
pub mod transactions;
