// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use ethers_core::types::Address;
use secrecy::SecretString;
use url::Url;

/// Chain id of the Humanity Protocol testnet, used when `CHAIN_ID` is unset.
pub const DEFAULT_CHAIN_ID: u64 = 1_942_999_413;
pub const DEFAULT_ISSUER_API_URL: &str = "https://issuer.humanity.org";
/// Credential type registered with the issuer for off-chain claims.
pub const DEFAULT_ISSUER_CREDENTIAL_TYPE: &str = "music_artistss";
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

// Backend configuration, loaded once at startup from the environment / .env file.
#[derive(Debug)]
pub struct Config {
    // Server settings
    pub host: String,
    pub port: u16,

    // Blockchain settings
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: SecretString,
    pub contract_address: Address,
    pub vc_contract_address: Address,

    // Transaction settings
    pub gas_limit: u64,
    pub receipt_poll_interval: Duration,
    pub receipt_timeout: Duration,

    // Issuer API
    pub issuer_api_url: String,
    pub issuer_api_key: SecretString,
    pub issuer_credential_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            private_key: SecretString::new(String::new()),
            contract_address: Address::zero(),
            vc_contract_address: Address::zero(),
            gas_limit: DEFAULT_GAS_LIMIT,
            receipt_poll_interval: Duration::from_millis(1000),
            receipt_timeout: Duration::from_secs(120),
            issuer_api_url: DEFAULT_ISSUER_API_URL.to_string(),
            issuer_api_key: SecretString::new(String::new()),
            issuer_credential_type: DEFAULT_ISSUER_CREDENTIAL_TYPE.to_string(),
        }
    }
}

impl Config {
    /// Loads the backend configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let rpc_url = required("HUMANITY_RPC_URL")?;
        Url::parse(&rpc_url).context("HUMANITY_RPC_URL must be a valid URL")?;

        let issuer_api_url =
            env::var("ISSUER_API_URL").unwrap_or_else(|_| DEFAULT_ISSUER_API_URL.to_string());
        Url::parse(&issuer_api_url).context("ISSUER_API_URL must be a valid URL")?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_or("PORT", 3000)?,

            rpc_url,
            chain_id: parsed_or("CHAIN_ID", DEFAULT_CHAIN_ID)?,
            private_key: SecretString::new(required("PRIVATE_KEY")?),
            contract_address: address("CONTRACT_ADDRESS")?,
            vc_contract_address: address("VC_CONTRACT_ADDRESS")?,

            gas_limit: parsed_or("DEFAULT_GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
            receipt_poll_interval: Duration::from_millis(parsed_or(
                "RECEIPT_POLL_INTERVAL_MS",
                1000,
            )?),
            receipt_timeout: Duration::from_secs(parsed_or("RECEIPT_TIMEOUT_SECS", 120)?),

            issuer_api_url,
            issuer_api_key: SecretString::new(required("HUMANITY_API_KEY")?),
            issuer_credential_type: env::var("ISSUER_CREDENTIAL_TYPE")
                .unwrap_or_else(|_| DEFAULT_ISSUER_CREDENTIAL_TYPE.to_string()),
        })
    }
}

/// Discord bot configuration. The bot only talks to the backend over HTTP,
/// so it needs none of the chain settings.
#[derive(Debug)]
pub struct BotConfig {
    pub discord_token: SecretString,
    pub application_id: Option<u64>,
    pub guild_id: u64,
    pub backend_issue_url: String,
    pub backend_check_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let application_id = match env::var("CLIENT_ID") {
            Ok(raw) => Some(snowflake("CLIENT_ID", &raw)?),
            Err(_) => None,
        };

        let backend_issue_url = env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/issue-credential".to_string());
        Url::parse(&backend_issue_url).context("BACKEND_URL must be a valid URL")?;

        let backend_check_url = env::var("BACKEND_CHECK_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/check-verification".to_string());
        Url::parse(&backend_check_url).context("BACKEND_CHECK_URL must be a valid URL")?;

        Ok(BotConfig {
            discord_token: SecretString::new(required("DISCORD_TOKEN")?),
            application_id,
            guild_id: snowflake("GUILD_ID", &required("GUILD_ID")?)?,
            backend_issue_url,
            backend_check_url,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

// Discord ids are non-zero u64 snowflakes.
fn snowflake(key: &str, raw: &str) -> Result<u64> {
    let id: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a valid number", key))?;
    anyhow::ensure!(id != 0, "{} must not be zero", key);
    Ok(id)
}

fn address(key: &str) -> Result<Address> {
    let raw = required(key)?;
    Address::from_str(raw.trim())
        .with_context(|| format!("{} must be a valid EVM address", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_or_falls_back_when_unset() {
        let value: u64 = parsed_or("HUMANITY_TEST_UNSET_NUMBER", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parsed_or_rejects_garbage() {
        env::set_var("HUMANITY_TEST_BAD_NUMBER", "not-a-number");
        let err = parsed_or::<u64>("HUMANITY_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("HUMANITY_TEST_BAD_NUMBER"));
    }

    #[test]
    fn snowflake_rejects_zero() {
        assert!(snowflake("GUILD_ID", "0").is_err());
        assert_eq!(snowflake("GUILD_ID", " 1234 ").unwrap(), 1234);
    }

    #[test]
    fn address_rejects_malformed_values() {
        env::set_var("HUMANITY_TEST_ADDRESS", "0x1234");
        assert!(address("HUMANITY_TEST_ADDRESS").is_err());

        env::set_var(
            "HUMANITY_TEST_ADDRESS_OK",
            "0x000000000000000000000000000000000000dEaD",
        );
        assert!(address("HUMANITY_TEST_ADDRESS_OK").is_ok());
    }
}
