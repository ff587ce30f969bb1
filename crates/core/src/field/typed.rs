// A dictionary entry bound to its kind's extraction rule

use super::{Dictionary, FieldDescriptor, FieldKind, FieldValue, LedgerSelector};
use crate::domain::{Amount, Hash256};
use crate::error::RpcError;
use crate::status::{RpcErrorCode, Status};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Compile-time tag tying a Rust value type to a [`FieldKind`].
pub trait Kind {
    const KIND: FieldKind;
    type Value;

    fn unpack(value: FieldValue) -> Option<Self::Value>;
}

macro_rules! kind_marker {
    ($(#[$doc:meta])* $marker:ident, $kind:ident, $value:ty, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Kind for $marker {
            const KIND: FieldKind = FieldKind::$kind;
            type Value = $value;

            fn unpack(value: FieldValue) -> Option<$value> {
                match value {
                    FieldValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

kind_marker!(Boolean, Boolean, bool, Bool);
kind_marker!(
    /// JSON string
    Text, String, String, String
);
kind_marker!(Hash, Hash, Hash256, Hash);
kind_marker!(Integer, SignedSmallInteger, i32, Int);
kind_marker!(Unsigned, UnsignedSmallInteger, u32, Uint);
kind_marker!(Floating, SignedSmallFloating, f64, Float);
kind_marker!(UnsignedFloating, UnsignedSmallFloating, f64, Float);
kind_marker!(BigInteger, SignedBigInteger, i64, BigInt);
kind_marker!(BigUnsigned, UnsignedBigInteger, u64, BigUint);
kind_marker!(BigFloating, SignedBigFloating, Amount, Amount);
kind_marker!(BigUnsignedFloating, UnsignedBigFloating, Amount, Amount);
kind_marker!(Ledger, Ledger, LedgerSelector, Ledger);
kind_marker!(
    /// Directory page index
    Directory, Directory, Hash256, Index
);
kind_marker!(
    /// Offer index
    Offer, Offer, Hash256, Index
);

/// One field of a command, bound to its dictionary entry.
///
/// The value is absent until [`TypedField::set_from`] succeeds; a failed call
/// leaves it absent.
pub struct TypedField<K: Kind> {
    name: &'static str,
    descriptor: &'static FieldDescriptor,
    value: Option<K::Value>,
    _kind: PhantomData<K>,
}

impl<K: Kind> TypedField<K> {
    /// Bind to `dictionary[name]`, whose declared type must be `K`'s kind.
    pub fn bind(dictionary: &'static Dictionary, name: &str) -> Result<Self, Status> {
        let Some((name, descriptor)) = dictionary.entry(name) else {
            return Err(Status::new(
                RpcErrorCode::Internal,
                vec!["Missing key in dictionary".to_string(), name.to_string()],
            ));
        };
        if descriptor.type_name != K::KIND.name() {
            return Err(Status::new(
                RpcErrorCode::Internal,
                vec![
                    "Field type mismatch".to_string(),
                    name.to_string(),
                    descriptor.type_name.to_string(),
                ],
            ));
        }
        Ok(Self {
            name,
            descriptor,
            value: None,
            _kind: PhantomData,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// Read this field from the parameter object `json`.
    pub fn set_from(&mut self, json: &Value) -> Result<(), RpcError> {
        self.value = None;
        let Some(node) = json.get(self.name) else {
            if self.descriptor.is_required() {
                return Err(RpcError::missing(self.name));
            }
            return Ok(());
        };
        let value = K::KIND.rule().read(node, self.name)?;
        self.value = K::unpack(value);
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&K::Value> {
        self.value.as_ref()
    }

    pub fn take(&mut self) -> Option<K::Value> {
        self.value.take()
    }
}

impl<K: Kind> fmt::Debug for TypedField<K>
where
    K::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedField")
            .field("name", &self.name)
            .field("kind", &K::KIND)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;
    use crate::field::Required;
    use serde_json::json;

    static DICT: Dictionary = Dictionary::new(&[
        ("hash", FieldDescriptor::optional(FieldKind::Hash)),
        ("limit", FieldDescriptor::required(FieldKind::UnsignedSmallInteger)),
        ("amount", FieldDescriptor::new(FieldKind::SignedBigInteger, Required::No, &[])),
    ]);

    #[test]
    fn test_optional_hash_scenarios() {
        let mut hash = TypedField::<Hash>::bind(&DICT, "hash").unwrap();
        assert!(!hash.is_set());

        let hex = "DEADBEEF".repeat(8);
        hash.set_from(&json!({ "hash": hex })).unwrap();
        assert_eq!(hash.get().unwrap().to_string(), hex);

        let err = hash.set_from(&json!({"hash": "not-hex"})).unwrap_err();
        assert_eq!(err, RpcError::malformed("hash", MalformedReason::Hash));
        assert!(!hash.is_set());

        hash.set_from(&json!({})).unwrap();
        assert!(!hash.is_set());
    }

    #[test]
    fn test_required_missing_names_the_field() {
        let mut limit = TypedField::<Unsigned>::bind(&DICT, "limit").unwrap();
        assert_eq!(limit.set_from(&json!({})), Err(RpcError::missing("limit")));
        assert_eq!(
            limit.set_from(&json!({"limit": -1})),
            Err(RpcError::wrong_type("limit"))
        );
        limit.set_from(&json!({"limit": 10})).unwrap();
        assert_eq!(limit.get(), Some(&10));
    }

    #[test]
    fn test_big_integer_rejects_native_number() {
        let mut amount = TypedField::<BigInteger>::bind(&DICT, "amount").unwrap();
        assert_eq!(
            amount.set_from(&json!({"amount": 12})),
            Err(RpcError::wrong_type("amount"))
        );
        amount.set_from(&json!({"amount": "-12"})).unwrap();
        assert_eq!(amount.take(), Some(-12));
        assert!(!amount.is_set());
    }

    #[test]
    fn test_bind_checks_dictionary() {
        let err = TypedField::<Hash>::bind(&DICT, "missing").unwrap_err();
        assert_eq!(err.message(), "Missing key in dictionary");
        assert_eq!(err.to_rpc(), Some(RpcErrorCode::Internal));

        let err = TypedField::<Boolean>::bind(&DICT, "hash").unwrap_err();
        assert_eq!(err.message(), "Field type mismatch");
    }
}
