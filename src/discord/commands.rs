// src/discord/commands.rs

use serde_json::Value;
use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

pub const ISSUE_CREDENTIAL: &str = "issuecredential";
pub const CHECK_VERIFICATION: &str = "checkverification";

pub const ADDRESS_OPTION: &str = "address";
pub const CREDENTIAL_OPTION: &str = "credential";

/// Sentinel the backend uses when no transaction was needed.
const ALREADY_ISSUED: &str = "Credential already issued";

pub const ISSUE_FAILED_REPLY: &str =
    "There was an error issuing the credential. Please try again later.";
pub const CHECK_FAILED_REPLY: &str =
    "There was an error checking the verification. Please try again later.";

/// Slash commands registered for the guild.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(ISSUE_CREDENTIAL)
            .description("Issue a credential to a given Ethereum address")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    ADDRESS_OPTION,
                    "The Ethereum address (or DID) to issue the credential to",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    CREDENTIAL_OPTION,
                    "The type of credential (e.g., music_artist)",
                )
                .required(true),
            ),
        CreateCommand::new(CHECK_VERIFICATION)
            .description("Check if the given address is verified on Humanity Protocol")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    ADDRESS_OPTION,
                    "The Ethereum address (or DID) to check",
                )
                .required(true),
            ),
    ]
}

/// Chat reply for a successful `issue-credential` backend response.
pub fn issue_reply(address: &str, result: &Value) -> String {
    let tx_hash = result.get("txHash").and_then(Value::as_str);
    let message = result.get("message").and_then(Value::as_str);

    match tx_hash {
        Some(tx) if !tx.is_empty() && tx != ALREADY_ISSUED => {
            format!("Credential issued successfully. Transaction hash: {}", tx)
        }
        _ if tx_hash == Some(ALREADY_ISSUED) || message == Some(ALREADY_ISSUED) => {
            format!("Credential is already issued for {}.", address)
        }
        _ => format!("Result: {}", result),
    }
}

/// Chat reply for a successful `check-verification` backend response.
pub fn verification_reply(address: &str, result: &Value) -> String {
    if result.get("verified").and_then(Value::as_bool).unwrap_or(false) {
        format!("The address {} is verified on Humanity Protocol.", address)
    } else {
        format!("The address {} is NOT verified on Humanity Protocol.", address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issue_reply_with_transaction() {
        let reply = issue_reply("0xabc", &json!({ "success": true, "txHash": "0x1234" }));
        assert_eq!(reply, "Credential issued successfully. Transaction hash: 0x1234");
    }

    #[test]
    fn issue_reply_already_issued_in_either_field() {
        let expected = "Credential is already issued for 0xabc.";
        assert_eq!(
            issue_reply("0xabc", &json!({ "success": true, "message": ALREADY_ISSUED })),
            expected
        );
        assert_eq!(
            issue_reply("0xabc", &json!({ "success": true, "txHash": ALREADY_ISSUED })),
            expected
        );
    }

    #[test]
    fn issue_reply_falls_back_to_raw_json() {
        let reply = issue_reply("0xabc", &json!({ "success": false }));
        assert_eq!(reply, r#"Result: {"success":false}"#);
    }

    #[test]
    fn verification_reply_reflects_flag() {
        assert_eq!(
            verification_reply("0xabc", &json!({ "verified": true })),
            "The address 0xabc is verified on Humanity Protocol."
        );
        assert_eq!(
            verification_reply("0xabc", &json!({ "verified": false })),
            "The address 0xabc is NOT verified on Humanity Protocol."
        );
        assert_eq!(
            verification_reply("0xabc", &json!({})),
            "The address 0xabc is NOT verified on Humanity Protocol."
        );
    }

    #[test]
    fn registers_two_commands_with_required_options() {
        let commands = serde_json::to_value(definitions()).unwrap();
        let commands = commands.as_array().unwrap();
        assert_eq!(commands.len(), 2);

        assert_eq!(commands[0]["name"], ISSUE_CREDENTIAL);
        let options = commands[0]["options"].as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0]["name"], ADDRESS_OPTION);
        assert_eq!(options[1]["name"], CREDENTIAL_OPTION);
        assert!(options.iter().all(|o| o["required"] == json!(true)));

        assert_eq!(commands[1]["name"], CHECK_VERIFICATION);
        assert_eq!(commands[1]["options"].as_array().unwrap().len(), 1);
    }
}
