//! Dictionary-driven typed fields
//!
//! A command declares its parameters once in a static [`Dictionary`]. Each
//! entry names a [`FieldKind`]; the kind's rule (see [`kinds`]) decides which
//! JSON shapes are acceptable and how they decode. [`typed::TypedField`]
//! binds one dictionary entry and extracts its value from a parameter object.

pub mod kinds;
pub mod ledger;
pub mod reference;
pub mod typed;

pub use kinds::KindRule;
pub use ledger::LedgerSelector;
pub use typed::TypedField;

use crate::domain::{Amount, Hash256};
use serde_json::{json, Value};
use std::fmt;

/// Is a field required?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    No,
    Yes,
}

/// Every field kind the framework understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    String,
    Hash,
    SignedSmallInteger,
    UnsignedSmallInteger,
    SignedSmallFloating,
    UnsignedSmallFloating,
    SignedBigInteger,
    UnsignedBigInteger,
    SignedBigFloating,
    UnsignedBigFloating,
    Ledger,
    Directory,
    Offer,
}

impl FieldKind {
    pub const ALL: [FieldKind; 14] = [
        FieldKind::Boolean,
        FieldKind::String,
        FieldKind::Hash,
        FieldKind::SignedSmallInteger,
        FieldKind::UnsignedSmallInteger,
        FieldKind::SignedSmallFloating,
        FieldKind::UnsignedSmallFloating,
        FieldKind::SignedBigInteger,
        FieldKind::UnsignedBigInteger,
        FieldKind::SignedBigFloating,
        FieldKind::UnsignedBigFloating,
        FieldKind::Ledger,
        FieldKind::Directory,
        FieldKind::Offer,
    ];

    /// The validator/extractor pair for this kind.
    pub fn rule(self) -> &'static KindRule {
        &kinds::RULES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.rule().name
    }

    /// Reverse of [`FieldKind::name`].
    pub fn from_name(name: &str) -> Option<FieldKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata for one named field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub type_name: &'static str,
    pub required: Required,
    pub help: &'static [&'static str],
}

impl FieldDescriptor {
    pub const fn new(kind: FieldKind, required: Required, help: &'static [&'static str]) -> Self {
        Self {
            type_name: kind_name(kind),
            required,
            help,
        }
    }

    pub const fn optional(kind: FieldKind) -> Self {
        Self::new(kind, Required::No, &[])
    }

    pub const fn required(kind: FieldKind) -> Self {
        Self::new(kind, Required::Yes, &[])
    }

    pub fn is_required(&self) -> bool {
        self.required == Required::Yes
    }
}

// Const mirror of the rule table names; `kinds::tests` keeps both in step.
const fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Boolean => "Boolean",
        FieldKind::String => "String",
        FieldKind::Hash => "Hash",
        FieldKind::SignedSmallInteger => "SignedSmallInteger",
        FieldKind::UnsignedSmallInteger => "UnsignedSmallInteger",
        FieldKind::SignedSmallFloating => "SignedSmallFloating",
        FieldKind::UnsignedSmallFloating => "UnsignedSmallFloating",
        FieldKind::SignedBigInteger => "SignedBigInteger",
        FieldKind::UnsignedBigInteger => "UnsignedBigInteger",
        FieldKind::SignedBigFloating => "SignedBigFloating",
        FieldKind::UnsignedBigFloating => "UnsignedBigFloating",
        FieldKind::Ledger => "Ledger",
        FieldKind::Directory => "Directory",
        FieldKind::Offer => "Offer",
    }
}

/// Static per-command mapping from field name to descriptor.
#[derive(Debug)]
pub struct Dictionary {
    entries: &'static [(&'static str, FieldDescriptor)],
}

impl Dictionary {
    pub const fn new(entries: &'static [(&'static str, FieldDescriptor)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| d)
    }

    /// Dictionary entry with its `'static` name
    pub fn entry(&self, name: &str) -> Option<(&'static str, &'static FieldDescriptor)> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, d)| (*n, d))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static FieldDescriptor)> {
        self.entries.iter().map(|(n, d)| (*n, d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON description of every field, for help output.
    pub fn describe(&self) -> Value {
        let fields: serde_json::Map<String, Value> = self
            .iter()
            .map(|(name, d)| {
                (
                    name.to_string(),
                    json!({
                        "type": d.type_name,
                        "required": d.is_required(),
                        "help": d.help,
                    }),
                )
            })
            .collect();
        Value::Object(fields)
    }

    /// One line per field: `name (Type, required): help`.
    pub fn describe_text(&self) -> String {
        self.iter()
            .map(|(name, d)| {
                let req = if d.is_required() { "required" } else { "optional" };
                let mut line = format!("{} ({}, {})", name, d.type_name, req);
                if !d.help.is_empty() {
                    line.push_str(": ");
                    line.push_str(&d.help.join(" "));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A decoded field value, tagged by the kind that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    String(String),
    Hash(Hash256),
    Int(i32),
    Uint(u32),
    Float(f64),
    BigInt(i64),
    BigUint(u64),
    Amount(Amount),
    Ledger(LedgerSelector),
    /// Directory page or offer index
    Index(Hash256),
}
