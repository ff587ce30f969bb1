// Ledger reference: a hash, index or name selecting one ledger snapshot

use super::typed::{Hash, Integer, Text, TypedField};
use super::{Dictionary, FieldDescriptor, FieldKind};
use crate::domain::{Hash256, LedgerHandle, LedgerSeq};
use crate::error::{MalformedReason, Result, RpcError};
use crate::port::LedgerState;
use serde_json::Value;
use std::fmt;

/// Sub-fields of a ledger reference object.
pub static LEDGER_FIELDS: Dictionary = Dictionary::new(&[
    ("hash", FieldDescriptor::optional(FieldKind::Hash)),
    ("index", FieldDescriptor::optional(FieldKind::SignedSmallInteger)),
    ("name", FieldDescriptor::optional(FieldKind::String)),
]);

/// Which ledger a request asks for. Decoding only validates the selector;
/// [`LedgerSelector::resolve`] performs the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LedgerSelector {
    #[default]
    Current,
    Closed,
    Validated,
    Hash(Hash256),
    Index(LedgerSeq),
}

impl LedgerSelector {
    /// Decode `{hash?, index?, name?}` where at most one member is set.
    pub fn from_json(json: &Value, name: &str) -> std::result::Result<Self, RpcError> {
        let mut hash = TypedField::<Hash>::bind(&LEDGER_FIELDS, "hash")?;
        let mut index = TypedField::<Integer>::bind(&LEDGER_FIELDS, "index")?;
        let mut tag = TypedField::<Text>::bind(&LEDGER_FIELDS, "name")?;
        hash.set_from(json)?;
        index.set_from(json)?;
        tag.set_from(json)?;

        let set = [hash.is_set(), index.is_set(), tag.is_set()]
            .into_iter()
            .filter(|s| *s)
            .count();
        if set > 1 {
            return Err(RpcError::malformed(
                name,
                MalformedReason::LedgerSelectorConflict,
            ));
        }

        if let Some(hash) = hash.take() {
            return Ok(LedgerSelector::Hash(hash));
        }
        if let Some(index) = index.take() {
            return LedgerSeq::try_from(index)
                .map(LedgerSelector::Index)
                .map_err(|_| RpcError::malformed("index", MalformedReason::LedgerIndex));
        }
        match tag.get().map(String::as_str) {
            None => Ok(LedgerSelector::Current),
            Some(tag) => Self::from_name(tag).ok_or_else(|| {
                RpcError::malformed("name", MalformedReason::LedgerIndex)
            }),
        }
    }

    /// `current`, `closed` or `validated`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "current" => Some(LedgerSelector::Current),
            "closed" => Some(LedgerSelector::Closed),
            "validated" => Some(LedgerSelector::Validated),
            _ => None,
        }
    }

    /// Look the ledger up; lookup failures propagate unchanged.
    pub async fn resolve(&self, state: &dyn LedgerState) -> Result<LedgerHandle> {
        match self {
            LedgerSelector::Current => state.current_ledger().await,
            LedgerSelector::Closed => state.closed_ledger().await,
            LedgerSelector::Validated => state.validated_ledger().await,
            LedgerSelector::Hash(hash) => state.ledger_by_hash(hash).await,
            LedgerSelector::Index(seq) => state.ledger_by_seq(*seq).await,
        }
    }
}

impl fmt::Display for LedgerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSelector::Current => write!(f, "current"),
            LedgerSelector::Closed => write!(f, "closed"),
            LedgerSelector::Validated => write!(f, "validated"),
            LedgerSelector::Hash(hash) => write!(f, "{}", hash),
            LedgerSelector::Index(seq) => write!(f, "{}", seq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::ledger_state::mocks::MockLedgerState;
    use crate::status::RpcErrorCode;
    use serde_json::json;

    fn select(v: Value) -> std::result::Result<LedgerSelector, RpcError> {
        LedgerSelector::from_json(&v, "ledger")
    }

    #[test]
    fn test_selector_forms() {
        assert_eq!(select(json!({})), Ok(LedgerSelector::Current));
        assert_eq!(select(json!({"name": "current"})), Ok(LedgerSelector::Current));
        assert_eq!(select(json!({"name": "closed"})), Ok(LedgerSelector::Closed));
        assert_eq!(select(json!({"name": "validated"})), Ok(LedgerSelector::Validated));
        assert_eq!(select(json!({"index": 5})), Ok(LedgerSelector::Index(5)));
        let hex = "AA".repeat(32);
        assert_eq!(
            select(json!({ "hash": hex })),
            Ok(LedgerSelector::Hash(Hash256::new([0xAA; 32])))
        );
    }

    #[test]
    fn test_more_than_one_selector_is_rejected() {
        let hex = "AA".repeat(32);
        let err = select(json!({"index": 5, "hash": hex})).unwrap_err();
        assert_eq!(
            err.into_status().message(),
            "More than one of hash, index or name are set."
        );
        // Conflict wins even when no member would resolve
        let err = select(json!({"index": 999999, "name": "validated"})).unwrap_err();
        assert_eq!(
            err,
            RpcError::malformed("ledger", MalformedReason::LedgerSelectorConflict)
        );
    }

    #[test]
    fn test_bad_names_and_indexes() {
        let status = select(json!({"name": "latest"})).unwrap_err().into_status();
        assert_eq!(status.message(), "ledgerIndexMalformed");
        assert_eq!(status.to_rpc(), Some(RpcErrorCode::InvalidParams));

        let status = select(json!({"index": -3})).unwrap_err().into_status();
        assert_eq!(status.message(), "ledgerIndexMalformed");

        assert_eq!(select(json!({"index": "5"})), Err(RpcError::wrong_type("index")));
        assert_eq!(
            select(json!({"hash": "zz"})),
            Err(RpcError::malformed("hash", MalformedReason::Hash))
        );
    }

    #[tokio::test]
    async fn test_resolve_delegates_to_state() {
        let state = MockLedgerState::with_chain(4);
        let current = LedgerSelector::Current.resolve(&state).await.unwrap();
        assert_eq!(current.seq, 4);
        let closed = LedgerSelector::Closed.resolve(&state).await.unwrap();
        assert_eq!(closed.seq, 3);
        let by_seq = LedgerSelector::Index(2).resolve(&state).await.unwrap();
        let by_hash = LedgerSelector::Hash(by_seq.hash).resolve(&state).await.unwrap();
        assert_eq!(by_hash.seq, 2);

        let missing = LedgerSelector::Index(40).resolve(&state).await.unwrap_err();
        assert_eq!(missing.to_rpc(), Some(RpcErrorCode::LgrNotFound));
    }
}
