// Port Layer - Interfaces for external collaborators

pub mod ledger_state;
pub mod role_policy;
pub mod time_provider; // For deterministic decay tests

// Re-exports
pub use ledger_state::LedgerState;
pub use role_policy::RolePolicy;
pub use time_provider::{SystemTimeProvider, TimeProvider};
