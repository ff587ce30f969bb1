// Ledger RPC Core - Status codes, typed fields & ports
// NO transport or runtime wiring (hexagonal core)

pub mod domain;
pub mod error;
pub mod field;
pub mod field_reader;
pub mod port;
pub mod status;
pub mod verify;

pub use error::{MalformedReason, Result, RpcError};
pub use status::{RpcErrorCode, Status, StatusCode, Ter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
