// Central Error Taxonomy for the command layer

use crate::status::{RpcErrorCode, Status};
use thiserror::Error;

/// Why a present, correctly-typed value could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    Hash,
    Number,
    Amount,
    LedgerSelectorConflict,
    LedgerIndex,
    LedgerHash,
    Account,
    Directory,
    Offer,
}

impl MalformedReason {
    /// Stable machine-readable token.
    pub fn token(self) -> &'static str {
        match self {
            MalformedReason::Hash => "hashMalformed",
            MalformedReason::Number => "numberMalformed",
            MalformedReason::Amount => "amountMalformed",
            MalformedReason::LedgerSelectorConflict => {
                "More than one of hash, index or name are set."
            }
            MalformedReason::LedgerIndex => "ledgerIndexMalformed",
            MalformedReason::LedgerHash => "ledgerHashMalformed",
            MalformedReason::Account => "actMalformed",
            MalformedReason::Directory => "malformedDirectory",
            MalformedReason::Offer => "malformedOffer",
        }
    }

    pub fn rpc_code(self) -> RpcErrorCode {
        match self {
            MalformedReason::Account => RpcErrorCode::ActMalformed,
            _ => RpcErrorCode::InvalidParams,
        }
    }
}

/// Every failure the command layer can surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("Missing field '{0}'.")]
    MissingField(String),

    #[error("Invalid field '{0}'.")]
    WrongType(String),

    #[error("Invalid field '{name}', not {expected}.")]
    ExpectedType { name: String, expected: &'static str },

    #[error("{}", .reason.token())]
    MalformedValue { name: String, reason: MalformedReason },

    #[error("Unknown method '{0}'.")]
    UnknownCommand(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Server is overloaded")]
    Overloaded,

    #[error("{0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Handler(Status),
}

impl RpcError {
    pub fn missing(name: impl Into<String>) -> Self {
        RpcError::MissingField(name.into())
    }

    pub fn wrong_type(name: impl Into<String>) -> Self {
        RpcError::WrongType(name.into())
    }

    pub fn expected(name: impl Into<String>, expected: &'static str) -> Self {
        RpcError::ExpectedType {
            name: name.into(),
            expected,
        }
    }

    pub fn malformed(name: impl Into<String>, reason: MalformedReason) -> Self {
        RpcError::MalformedValue {
            name: name.into(),
            reason,
        }
    }

    /// Convert into the single envelope-shaped outcome.
    pub fn into_status(self) -> Status {
        match self {
            RpcError::Handler(status) => status,
            RpcError::MalformedValue { name, reason } => Status::new(
                reason.rpc_code(),
                vec![reason.token().to_string(), name],
            ),
            other => {
                let code = match &other {
                    RpcError::MissingField(_)
                    | RpcError::WrongType(_)
                    | RpcError::ExpectedType { .. } => RpcErrorCode::InvalidParams,
                    RpcError::UnknownCommand(_) => RpcErrorCode::UnknownCommand,
                    RpcError::Forbidden => RpcErrorCode::Forbidden,
                    RpcError::Overloaded => RpcErrorCode::SlowDown,
                    _ => RpcErrorCode::BadSyntax,
                };
                Status::with_message(code, other.to_string())
            }
        }
    }
}

impl From<Status> for RpcError {
    fn from(status: Status) -> Self {
        RpcError::Handler(status)
    }
}

impl From<RpcError> for Status {
    fn from(err: RpcError) -> Self {
        err.into_status()
    }
}

/// Result type alias using Status
pub type Result<T> = std::result::Result<T, Status>;
