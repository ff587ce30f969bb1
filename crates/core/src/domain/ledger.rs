// Ledger snapshot model (headers and the objects commands read)

use super::{AccountId, Amount, Hash256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ledger sequence number
pub type LedgerSeq = u32;

/// Header of one ledger snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    pub seq: LedgerSeq,
    pub hash: Hash256,
    pub parent_hash: Hash256,
    pub close_time: i64, // epoch seconds
    pub total_coins: u64,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub validated: bool,
}

/// Account state as stored in a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRoot {
    pub account: AccountId,
    pub balance: u64, // drops
    pub sequence: u32,
    #[serde(default)]
    pub owner_count: u32,
    #[serde(default)]
    pub flags: u32,
}

/// A standing offer owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferEntry {
    pub seq: u32,
    pub flags: u32,
    pub taker_pays: Amount,
    pub taker_gets: Amount,
}

/// One side of a trust line, seen from `account`.
///
/// A negative balance means `account` owes `peer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLine {
    pub account: AccountId,
    pub peer: AccountId,
    pub currency: String,
    pub balance: Amount,
}

/// Shared, immutable handle to a resolved ledger.
pub type LedgerHandle = Arc<LedgerHeader>;
