//! Unified Status Codes
//!
//! Folds three independently numbered code spaces (ledger-engine results,
//! RPC errors, generic exceptions) into one integer channel. Each domain's
//! nonzero raw codes are shifted by a domain-unique offset; zero always means
//! success, in every domain.

pub mod codes;

pub use codes::{RpcErrorCode, Ter, EXCEPTION_ERROR};

use serde_json::{json, Map, Value};
use std::fmt;

/// Code domains sharing the canonical integer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Ledger-engine transaction result (`Ter`)
    Ter,
    /// RPC error (`RpcErrorCode`)
    Rpc,
    /// Generic exception
    Exception,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Ter, Domain::Rpc, Domain::Exception];

    pub const fn offset(self) -> i32 {
        match self {
            Domain::Ter => TER_OFFSET,
            Domain::Rpc => RPC_OFFSET,
            Domain::Exception => EXCEPTION_OFFSET,
        }
    }
}

pub const TER_OFFSET: i32 = 0x10000;
pub const RPC_OFFSET: i32 = 0x20000;
pub const EXCEPTION_OFFSET: i32 = 0x30000;

/// Raw domain codes must lie strictly inside `(-RAW_CODE_LIMIT, RAW_CODE_LIMIT)`
/// so that encoded ranges of different domains never overlap.
pub const RAW_CODE_LIMIT: i32 = 0x8000;

/// Encode a raw domain code into the canonical space.
///
/// The domain's success value (0) stays 0; any other raw code gets the
/// domain offset.
pub const fn encode(domain: Domain, raw: i32) -> i32 {
    if raw == 0 {
        0
    } else {
        raw + domain.offset()
    }
}

/// Exact inverse of [`encode`].
pub const fn decode(domain: Domain, code: i32) -> i32 {
    if code == 0 {
        0
    } else {
        code - domain.offset()
    }
}

/// Canonical status code. `0` is success regardless of domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusCode(i32);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);

    /// A canonical code taken as-is (no domain offset applied).
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn from_domain(domain: Domain, raw: i32) -> Self {
        Self(encode(domain, raw))
    }

    pub fn exception() -> Self {
        Self::from_domain(Domain::Exception, EXCEPTION_ERROR)
    }

    /// Read a legacy `{"error_code": n}` object as an RPC-domain code.
    pub fn from_error_json(value: &Value) -> Self {
        let raw = value
            .get("error_code")
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0);
        Self::from_domain(Domain::Rpc, raw)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Recover the domain of a canonical code; `None` for success or for
    /// codes that were never domain-encoded.
    pub fn domain(self) -> Option<Domain> {
        if self.is_ok() {
            return None;
        }
        Domain::ALL.into_iter().find(|d| {
            let raw = decode(*d, self.0);
            raw > -RAW_CODE_LIMIT && raw < RAW_CODE_LIMIT
        })
    }

    /// Raw value read back under `domain`.
    pub const fn raw_in(self, domain: Domain) -> i32 {
        decode(domain, self.0)
    }

    /// Failure on the exception path: a generic exception or an internal error.
    pub fn is_exception(self) -> bool {
        self.domain() == Some(Domain::Exception) || self.to_rpc() == Some(RpcErrorCode::Internal)
    }

    pub fn to_ter(self) -> Option<Ter> {
        Ter::from_raw(self.raw_in(Domain::Ter))
    }

    pub fn to_rpc(self) -> Option<RpcErrorCode> {
        RpcErrorCode::from_raw(self.raw_in(Domain::Rpc))
    }

    /// Empty for success, `"<token>: <description>"` for known codes,
    /// otherwise the decimal canonical code.
    pub fn code_string(self) -> String {
        if self.is_ok() {
            return String::new();
        }
        let info = match self.domain() {
            Some(Domain::Ter) => self.to_ter().map(Ter::info),
            Some(Domain::Rpc) => self.to_rpc().map(RpcErrorCode::info),
            Some(Domain::Exception) => Some(("exception", "Exception.")),
            None => None,
        };
        match info {
            Some((token, description)) => format!("{}: {}", token, description),
            None => self.0.to_string(),
        }
    }
}

impl From<Ter> for StatusCode {
    fn from(t: Ter) -> Self {
        Self::from_domain(Domain::Ter, t.raw())
    }
}

impl From<RpcErrorCode> for StatusCode {
    fn from(e: RpcErrorCode) -> Self {
        Self::from_domain(Domain::Rpc, e.raw())
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        Self::new(code)
    }
}

/// An immutable outcome: canonical code plus diagnostic messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    code: StatusCode,
    messages: Vec<String>,
}

impl Status {
    pub const OK: Status = Status {
        code: StatusCode::OK,
        messages: Vec::new(),
    };

    pub fn new(code: impl Into<StatusCode>, messages: Vec<String>) -> Self {
        Self {
            code: code.into(),
            messages,
        }
    }

    pub fn with_message(code: impl Into<StatusCode>, message: impl Into<String>) -> Self {
        Self::new(code, vec![message.into()])
    }

    /// Status carrying source location diagnostics (see [`bail_status!`]).
    pub fn located(
        code: impl Into<StatusCode>,
        file: &str,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, vec![message.into(), file.to_string(), line.to_string()])
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Short diagnostic: the first message, or empty.
    pub fn message(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or("")
    }

    pub fn code_string(&self) -> String {
        self.code.code_string()
    }

    pub fn to_ter(&self) -> Option<Ter> {
        self.code.to_ter()
    }

    pub fn to_rpc(&self) -> Option<RpcErrorCode> {
        self.code.to_rpc()
    }

    /// The `{code, message, data}` error object, or `None` on success.
    pub fn error_object(&self) -> Option<Value> {
        if self.is_ok() {
            return None;
        }
        let message = match self.messages.first() {
            Some(m) => m.clone(),
            None => self.code_string(),
        };
        let data: Vec<&String> = self.messages.iter().skip(1).collect();
        Some(json!({
            "code": self.code.code(),
            "message": message,
            "data": data,
        }))
    }

    /// Write the `error` member into `object`; success writes nothing.
    pub fn fill_json(&self, object: &mut Map<String, Value>) {
        if let Some(error) = self.error_object() {
            object.insert("error".to_string(), error);
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            write!(f, "{}", self.code_string())
        } else {
            write!(f, "{}", self.message())
        }
    }
}

impl std::error::Error for Status {}

impl From<Ter> for Status {
    fn from(t: Ter) -> Self {
        Self::new(t, Vec::new())
    }
}

impl From<RpcErrorCode> for Status {
    fn from(e: RpcErrorCode) -> Self {
        Self::new(e, Vec::new())
    }
}

impl From<StatusCode> for Status {
    fn from(code: StatusCode) -> Self {
        Self::new(code, Vec::new())
    }
}

/// Return early with a located [`Status`].
#[macro_export]
macro_rules! bail_status {
    ($code:expr, $message:expr) => {
        return Err($crate::status::Status::located($code, file!(), line!(), $message))
    };
}
