// Per-kind JSON compatibility and extraction rules

use super::{ledger::LedgerSelector, reference, FieldKind, FieldValue};
use crate::domain::{Amount, Hash256};
use crate::error::{MalformedReason, RpcError};
use serde_json::Value;

pub type MatchFn = fn(&Value) -> bool;
/// Decode a value that already passed `matches`; the name is used for errors.
pub type ExtractFn = fn(&Value, &str) -> Result<FieldValue, RpcError>;

/// Validator/extractor pair for one [`FieldKind`].
#[derive(Debug)]
pub struct KindRule {
    pub kind: FieldKind,
    pub name: &'static str,
    pub matches: MatchFn,
    pub extract: ExtractFn,
}

impl KindRule {
    /// `matches` then `extract`; a shape mismatch is `WrongType`.
    pub fn read(&self, json: &Value, name: &str) -> Result<FieldValue, RpcError> {
        if !(self.matches)(json) {
            return Err(RpcError::wrong_type(name));
        }
        (self.extract)(json, name)
    }
}

/// Indexed by `FieldKind as usize`.
pub static RULES: [KindRule; 14] = [
    KindRule {
        kind: FieldKind::Boolean,
        name: "Boolean",
        matches: Value::is_boolean,
        extract: |v, _| Ok(FieldValue::Bool(v.as_bool().unwrap_or_default())),
    },
    KindRule {
        kind: FieldKind::String,
        name: "String",
        matches: Value::is_string,
        extract: |v, _| Ok(FieldValue::String(as_str(v).to_string())),
    },
    KindRule {
        kind: FieldKind::Hash,
        name: "Hash",
        matches: Value::is_string,
        extract: |v, name| parse_hash(v, name).map(FieldValue::Hash),
    },
    KindRule {
        kind: FieldKind::SignedSmallInteger,
        name: "SignedSmallInteger",
        matches: |v| small_int(v).is_some(),
        extract: |v, name| {
            small_int(v)
                .map(FieldValue::Int)
                .ok_or_else(|| RpcError::wrong_type(name))
        },
    },
    KindRule {
        kind: FieldKind::UnsignedSmallInteger,
        name: "UnsignedSmallInteger",
        matches: |v| small_uint(v).is_some(),
        extract: |v, name| {
            small_uint(v)
                .map(FieldValue::Uint)
                .ok_or_else(|| RpcError::wrong_type(name))
        },
    },
    KindRule {
        kind: FieldKind::SignedSmallFloating,
        name: "SignedSmallFloating",
        matches: Value::is_number,
        extract: |v, _| Ok(FieldValue::Float(v.as_f64().unwrap_or_default())),
    },
    KindRule {
        kind: FieldKind::UnsignedSmallFloating,
        name: "UnsignedSmallFloating",
        matches: |v| v.as_f64().is_some_and(|f| f >= 0.0),
        extract: |v, _| Ok(FieldValue::Float(v.as_f64().unwrap_or_default())),
    },
    KindRule {
        kind: FieldKind::SignedBigInteger,
        name: "SignedBigInteger",
        matches: Value::is_string,
        extract: |v, name| {
            as_str(v)
                .parse::<i64>()
                .map(FieldValue::BigInt)
                .map_err(|_| RpcError::malformed(name, MalformedReason::Number))
        },
    },
    KindRule {
        kind: FieldKind::UnsignedBigInteger,
        name: "UnsignedBigInteger",
        matches: Value::is_string,
        extract: |v, name| {
            as_str(v)
                .parse::<u64>()
                .map(FieldValue::BigUint)
                .map_err(|_| RpcError::malformed(name, MalformedReason::Number))
        },
    },
    KindRule {
        kind: FieldKind::SignedBigFloating,
        name: "SignedBigFloating",
        matches: Value::is_string,
        extract: |v, name| parse_amount(v, name).map(FieldValue::Amount),
    },
    KindRule {
        kind: FieldKind::UnsignedBigFloating,
        name: "UnsignedBigFloating",
        matches: Value::is_string,
        extract: |v, name| {
            let amount = parse_amount(v, name)?;
            if amount.is_negative() {
                return Err(RpcError::malformed(name, MalformedReason::Amount));
            }
            Ok(FieldValue::Amount(amount))
        },
    },
    KindRule {
        kind: FieldKind::Ledger,
        name: "Ledger",
        matches: Value::is_object,
        extract: |v, name| LedgerSelector::from_json(v, name).map(FieldValue::Ledger),
    },
    KindRule {
        kind: FieldKind::Directory,
        name: "Directory",
        matches: string_or_object,
        extract: |v, name| reference::directory_index(v, name).map(FieldValue::Index),
    },
    KindRule {
        kind: FieldKind::Offer,
        name: "Offer",
        matches: string_or_object,
        extract: |v, name| reference::offer_index(v, name).map(FieldValue::Index),
    },
];

fn as_str(v: &Value) -> &str {
    v.as_str().unwrap_or_default()
}

fn string_or_object(v: &Value) -> bool {
    v.is_string() || v.is_object()
}

// Integral JSON numbers only; 5.0 is not an integer.
fn small_int(v: &Value) -> Option<i32> {
    v.as_i64().and_then(|n| i32::try_from(n).ok())
}

fn small_uint(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn parse_hash(v: &Value, name: &str) -> Result<Hash256, RpcError> {
    Hash256::from_hex(as_str(v)).map_err(|_| RpcError::malformed(name, MalformedReason::Hash))
}

fn parse_amount(v: &Value, name: &str) -> Result<Amount, RpcError> {
    as_str(v)
        .parse::<Amount>()
        .map_err(|_| RpcError::malformed(name, MalformedReason::Amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(kind: FieldKind, v: Value) -> Result<FieldValue, RpcError> {
        kind.rule().read(&v, "f")
    }

    #[test]
    fn test_table_is_indexed_by_kind() {
        for kind in FieldKind::ALL {
            assert_eq!(kind.rule().kind, kind);
            assert_eq!(super::super::kind_name(kind), kind.name());
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(read(FieldKind::Boolean, json!(true)), Ok(FieldValue::Bool(true)));
        assert_eq!(read(FieldKind::Boolean, json!(1)), Err(RpcError::wrong_type("f")));
        assert_eq!(
            read(FieldKind::String, json!("x")),
            Ok(FieldValue::String("x".into()))
        );
        assert_eq!(read(FieldKind::String, json!(null)), Err(RpcError::wrong_type("f")));
    }

    #[test]
    fn test_hash() {
        let hex = "DEADBEEF".repeat(8);
        assert!(matches!(read(FieldKind::Hash, json!(hex)), Ok(FieldValue::Hash(_))));
        assert_eq!(
            read(FieldKind::Hash, json!("not-hex")),
            Err(RpcError::malformed("f", MalformedReason::Hash))
        );
        assert_eq!(read(FieldKind::Hash, json!(12)), Err(RpcError::wrong_type("f")));
    }

    #[test]
    fn test_unsigned_small_rejects_every_negative() {
        for n in [json!(-1), json!(-2147483648i64), json!(-1e10)] {
            assert_eq!(
                read(FieldKind::UnsignedSmallInteger, n),
                Err(RpcError::wrong_type("f"))
            );
        }
        assert_eq!(
            read(FieldKind::UnsignedSmallFloating, json!(-0.5)),
            Err(RpcError::wrong_type("f"))
        );
        assert_eq!(
            read(FieldKind::UnsignedSmallInteger, json!(7)),
            Ok(FieldValue::Uint(7))
        );
    }

    #[test]
    fn test_small_integers() {
        assert_eq!(
            read(FieldKind::SignedSmallInteger, json!(-7)),
            Ok(FieldValue::Int(-7))
        );
        assert!(read(FieldKind::SignedSmallInteger, json!(1.5)).is_err());
        assert!(read(FieldKind::SignedSmallInteger, json!("7")).is_err());
        assert!(read(FieldKind::UnsignedSmallInteger, json!(5_000_000_000u64)).is_err());
        assert_eq!(
            read(FieldKind::SignedSmallFloating, json!(-2)),
            Ok(FieldValue::Float(-2.0))
        );
    }

    #[test]
    fn test_big_kinds_require_strings() {
        for kind in [
            FieldKind::SignedBigInteger,
            FieldKind::UnsignedBigInteger,
            FieldKind::SignedBigFloating,
            FieldKind::UnsignedBigFloating,
        ] {
            assert_eq!(read(kind, json!(12)), Err(RpcError::wrong_type("f")));
        }
        assert_eq!(
            read(FieldKind::UnsignedBigInteger, json!("18446744073709551615")),
            Ok(FieldValue::BigUint(u64::MAX))
        );
        assert_eq!(
            read(FieldKind::SignedBigInteger, json!("-9")),
            Ok(FieldValue::BigInt(-9))
        );
        assert_eq!(
            read(FieldKind::UnsignedBigInteger, json!("-9")),
            Err(RpcError::malformed("f", MalformedReason::Number))
        );
        assert_eq!(
            read(FieldKind::SignedBigFloating, json!("1.25")),
            Ok(FieldValue::Amount("1.25".parse().unwrap()))
        );
        assert_eq!(
            read(FieldKind::UnsignedBigFloating, json!("-1.25")),
            Err(RpcError::malformed("f", MalformedReason::Amount))
        );
    }
}
