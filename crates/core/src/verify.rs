//! JSON shape assertions
//!
//! `verify_json(value, ["foo.bar:string", "baz:int"])` checks that each named
//! member exists and, when a type is given, that it converts to that type.
//! Specifiers are `name`, `name:type` or `parent.name[:type]`.

use crate::status::{RpcErrorCode, Status};
use serde_json::Value;

/// Type tokens accepted after `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Int,
    Uint,
    Real,
    String,
    Boolean,
    Array,
    Object,
}

impl JsonType {
    pub const ALL: [JsonType; 8] = [
        JsonType::Null,
        JsonType::Int,
        JsonType::Uint,
        JsonType::Real,
        JsonType::String,
        JsonType::Boolean,
        JsonType::Array,
        JsonType::Object,
    ];

    pub fn token(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Int => "int",
            JsonType::Uint => "uint",
            JsonType::Real => "real",
            JsonType::String => "string",
            JsonType::Boolean => "boolean",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.token() == token)
    }

    /// Lossless conversion rules; `null` converts to everything.
    pub fn accepts(self, value: &Value) -> bool {
        let integral = |min: f64, max: f64| match value {
            Value::Number(n) => n
                .as_f64()
                .is_some_and(|f| f.fract() == 0.0 && f >= min && f <= max),
            _ => false,
        };
        match (self, value) {
            (_, Value::Null) => true,
            (JsonType::Null, v) => is_empty_like(v),
            (JsonType::Int | JsonType::Uint | JsonType::Real | JsonType::Boolean, Value::Bool(_)) => {
                true
            }
            (JsonType::Int, _) => integral(i32::MIN as f64, i32::MAX as f64),
            (JsonType::Uint, _) => integral(0.0, u32::MAX as f64),
            (JsonType::Real | JsonType::Boolean, v) => v.is_number(),
            (JsonType::String, v) => !v.is_array() && !v.is_object(),
            (JsonType::Array, v) => v.is_array(),
            (JsonType::Object, v) => v.is_object(),
        }
    }
}

fn is_empty_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

pub fn missing_field_message(name: &str) -> String {
    format!("Missing field '{}'.", name)
}

pub fn object_field_message(name: &str) -> String {
    format!("Invalid field '{}', not object.", name)
}

fn chop_type(name: &str) -> &str {
    name.split(':').next().unwrap_or(name)
}

/// Check one specifier; `None` when it holds.
fn verify_one(value: &Value, name: &str, prefix: &str) -> Option<String> {
    if let Some(loc) = name.find('.') {
        if loc == 0 || loc == name.len() - 1 {
            return Some(format!("Invalid . in verifier {}{}", prefix, name));
        }
        let object = &name[..loc];
        let Some(member) = value.get(object) else {
            return Some(missing_field_message(&format!("{}{}", prefix, chop_type(name))));
        };
        if !member.is_object() {
            return Some(object_field_message(&format!("{}{}", prefix, object)));
        }
        let prefix = format!("{}{}", prefix, &name[..=loc]);
        return verify_one(member, &name[loc + 1..], &prefix);
    }

    let (field, type_name) = match name.find(':') {
        Some(loc) if loc == 0 || loc == name.len() - 1 => {
            return Some(format!("Invalid : in verifier {}{}", prefix, name));
        }
        Some(loc) => (&name[..loc], Some(&name[loc + 1..])),
        None => (name, None),
    };

    let Some(member) = value.get(field) else {
        return Some(missing_field_message(&format!("{}{}", prefix, field)));
    };

    let type_name = type_name?;
    let Some(json_type) = JsonType::from_token(type_name) else {
        return Some(format!(
            "Invalid verifier type {} in {}{}",
            type_name, prefix, name
        ));
    };
    if !json_type.accepts(member) {
        return Some(format!(
            "Can't convert property {}{} to {}.",
            prefix, field, type_name
        ));
    }
    None
}

/// Verify every specifier in order, failing on the first with an
/// `rpcINVALID_PARAMS` status.
pub fn verify_json<'a>(
    value: &Value,
    specifiers: impl IntoIterator<Item = &'a str>,
) -> Result<(), Status> {
    for specifier in specifiers {
        if let Some(message) = verify_one(value, specifier, "") {
            return Err(Status::with_message(RpcErrorCode::InvalidParams, message));
        }
    }
    Ok(())
}
