// Ledger RPC Infrastructure - In-memory ledger adapter
// Implements: LedgerState (stands in for the ledger engine)

mod fixture;
mod ledger_state;

pub use fixture::{FixtureError, LedgerFixture, OwnedOffer, GENESIS_ACCOUNT, GENESIS_COINS};
pub use ledger_state::InMemoryLedgerState;
