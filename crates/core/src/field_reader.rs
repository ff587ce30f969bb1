//! Dictionary-free field reading
//!
//! Reads one named member of a parameter object straight into a destination
//! type, for commands with no declared [`Dictionary`](crate::field::Dictionary).

use crate::domain::{AccountId, Hash256};
use crate::error::{MalformedReason, RpcError};
use crate::field::LedgerSelector;
use serde_json::Value;
use std::collections::BTreeSet;

/// A destination type decodable from one JSON member.
pub trait ReadField: Sized {
    fn read(value: &Value, name: &str) -> Result<Self, RpcError>;
}

impl ReadField for bool {
    fn read(value: &Value, name: &str) -> Result<Self, RpcError> {
        value.as_bool().ok_or_else(|| RpcError::expected(name, "bool"))
    }
}

impl ReadField for String {
    fn read(value: &Value, name: &str) -> Result<Self, RpcError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::expected(name, "string"))
    }
}

/// A lone string is a one-element list. An empty array is rejected: a field
/// that may be empty should be optional instead.
impl ReadField for Vec<String> {
    fn read(value: &Value, name: &str) -> Result<Self, RpcError> {
        if let Some(s) = value.as_str() {
            return Ok(vec![s.to_string()]);
        }
        let not_list = || RpcError::expected(name, "list of strings");
        match value.as_array() {
            Some(items) if !items.is_empty() => items
                .iter()
                .map(|v| v.as_str().map(str::to_string).ok_or_else(not_list))
                .collect(),
            _ => Err(not_list()),
        }
    }
}

impl ReadField for AccountId {
    fn read(value: &Value, name: &str) -> Result<Self, RpcError> {
        let text = String::read(value, name)?;
        read_account(&text, name)
    }
}

/// Stops at the first entry that fails to decode.
impl ReadField for BTreeSet<AccountId> {
    fn read(value: &Value, name: &str) -> Result<Self, RpcError> {
        Vec::<String>::read(value, name)?
            .iter()
            .map(|s| read_account(s, name))
            .collect()
    }
}

pub fn read_required<T: ReadField>(params: &Value, name: &str) -> Result<T, RpcError> {
    match params.get(name) {
        Some(value) => T::read(value, name),
        None => Err(RpcError::missing(name)),
    }
}

pub fn read_optional<T: ReadField>(params: &Value, name: &str) -> Result<Option<T>, RpcError> {
    params.get(name).map(|v| T::read(v, name)).transpose()
}

/// Account public key first, then base58 account id.
pub fn read_account(text: &str, name: &str) -> Result<AccountId, RpcError> {
    AccountId::from_public_base58(text)
        .or_else(|_| AccountId::from_base58(text))
        .map_err(|_| RpcError::malformed(name, MalformedReason::Account))
}

/// `{strict?: bool, account: string}`; strict mode accepts only account ids.
pub fn read_account_address(params: &Value) -> Result<AccountId, RpcError> {
    let strict = read_optional::<bool>(params, "strict")?.unwrap_or(false);
    let text: String = read_required(params, "account")?;
    if strict {
        return AccountId::from_base58(&text)
            .map_err(|_| RpcError::malformed("account", MalformedReason::Account));
    }
    read_account(&text, "account")
}

/// Legacy ledger selection through `ledger_hash` / `ledger_index`.
///
/// `ledger_hash` wins when both are present. `ledger_index` may be a number,
/// a numeric string, or one of `current`, `closed`, `validated`.
pub fn read_ledger(params: &Value) -> Result<LedgerSelector, RpcError> {
    if let Some(hash) = params.get("ledger_hash") {
        return hash
            .as_str()
            .and_then(|s| Hash256::from_hex(s).ok())
            .map(LedgerSelector::Hash)
            .ok_or_else(|| RpcError::malformed("ledger_hash", MalformedReason::LedgerHash));
    }

    let malformed = || RpcError::malformed("ledger_index", MalformedReason::LedgerIndex);
    match params.get("ledger_index") {
        None => Ok(LedgerSelector::Current),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(LedgerSelector::Index)
            .ok_or_else(malformed),
        Some(Value::String(s)) => match LedgerSelector::from_name(s) {
            Some(selector) => Ok(selector),
            None => s
                .parse::<u32>()
                .map(LedgerSelector::Index)
                .map_err(|_| malformed()),
        },
        Some(_) => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{encode_versioned, ACCOUNT_PUBLIC_VERSION};
    use crate::status::RpcErrorCode;
    use serde_json::json;

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const OTHER: &str = "rrrrrrrrrrrrrrrrrrrrrhoLvTp";

    #[test]
    fn test_scalar_types() {
        let params = json!({"flag": true, "text": "x", "num": 3});
        assert_eq!(read_required::<bool>(&params, "flag"), Ok(true));
        assert_eq!(
            read_required::<bool>(&params, "text"),
            Err(RpcError::expected("text", "bool"))
        );
        assert_eq!(read_required::<String>(&params, "text"), Ok("x".to_string()));
        assert_eq!(
            read_required::<String>(&params, "num"),
            Err(RpcError::expected("num", "string"))
        );
        assert_eq!(read_optional::<bool>(&params, "absent"), Ok(None));
        assert_eq!(
            read_required::<bool>(&params, "absent"),
            Err(RpcError::missing("absent"))
        );
    }

    #[test]
    fn test_list_of_strings() {
        let params = json!({"one": "a", "many": ["a", "b"], "empty": [], "mixed": ["a", 1]});
        assert_eq!(read_required::<Vec<String>>(&params, "one"), Ok(vec!["a".into()]));
        assert_eq!(
            read_required::<Vec<String>>(&params, "many"),
            Ok(vec!["a".into(), "b".into()])
        );
        for name in ["empty", "mixed"] {
            assert_eq!(
                read_required::<Vec<String>>(&params, name),
                Err(RpcError::expected(name, "list of strings"))
            );
        }
    }

    #[test]
    fn test_accounts() {
        let key = [0x03u8; 33];
        let public = encode_versioned(ACCOUNT_PUBLIC_VERSION, &key);
        let params = json!({"id": GENESIS, "key": public, "bad": "rBogus"});
        assert_eq!(
            read_required::<AccountId>(&params, "id"),
            Ok(AccountId::from_base58(GENESIS).unwrap())
        );
        assert_eq!(
            read_required::<AccountId>(&params, "key"),
            Ok(AccountId::from_public_key(&key))
        );
        let status = read_required::<AccountId>(&params, "bad")
            .unwrap_err()
            .into_status();
        assert_eq!(status.to_rpc(), Some(RpcErrorCode::ActMalformed));
    }

    #[test]
    fn test_account_set_stops_at_first_failure() {
        let params = json!({"set": [GENESIS, OTHER, GENESIS], "bad": [GENESIS, "nope", OTHER]});
        let set = read_required::<BTreeSet<AccountId>>(&params, "set").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            read_required::<BTreeSet<AccountId>>(&params, "bad"),
            Err(RpcError::malformed("bad", MalformedReason::Account))
        );
    }

    #[test]
    fn test_account_address_strict() {
        let public = encode_versioned(ACCOUNT_PUBLIC_VERSION, &[0x02u8; 33]);
        assert!(read_account_address(&json!({ "account": public })).is_ok());
        assert_eq!(
            read_account_address(&json!({ "account": public, "strict": true })),
            Err(RpcError::malformed("account", MalformedReason::Account))
        );
        assert!(read_account_address(&json!({"account": GENESIS, "strict": true})).is_ok());
        assert_eq!(
            read_account_address(&json!({"account": GENESIS, "strict": "yes"})),
            Err(RpcError::expected("strict", "bool"))
        );
        assert_eq!(read_account_address(&json!({})), Err(RpcError::missing("account")));
    }

    #[test]
    fn test_legacy_ledger_selection() {
        assert_eq!(read_ledger(&json!({})), Ok(LedgerSelector::Current));
        assert_eq!(read_ledger(&json!({"ledger_index": 7})), Ok(LedgerSelector::Index(7)));
        assert_eq!(read_ledger(&json!({"ledger_index": "7"})), Ok(LedgerSelector::Index(7)));
        assert_eq!(
            read_ledger(&json!({"ledger_index": "validated"})),
            Ok(LedgerSelector::Validated)
        );
        let hex = "AB".repeat(32);
        assert_eq!(
            read_ledger(&json!({ "ledger_hash": hex, "ledger_index": 7 })),
            Ok(LedgerSelector::Hash(Hash256::new([0xAB; 32])))
        );
        assert_eq!(
            read_ledger(&json!({"ledger_index": "nope"})),
            Err(RpcError::malformed("ledger_index", MalformedReason::LedgerIndex))
        );
        assert_eq!(
            read_ledger(&json!({"ledger_hash": 5})),
            Err(RpcError::malformed("ledger_hash", MalformedReason::LedgerHash))
        );
    }
}
