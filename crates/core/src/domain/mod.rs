// Domain Layer - Ledger value types shared by every command

pub mod account;
pub mod amount;
pub mod charge;
pub mod hash;
pub mod keylet;
pub mod ledger;
pub mod role;

// Re-exports
pub use account::{AccountId, AccountParseError};
pub use amount::{Amount, AmountParseError};
pub use charge::Charge;
pub use hash::{sha512_half, Hash256, HashParseError};
pub use ledger::{AccountRoot, LedgerHandle, LedgerHeader, LedgerSeq, OfferEntry, TrustLine};
pub use role::Role;
