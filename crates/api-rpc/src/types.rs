//! RPC Response Types
//!
//! Result objects of the built-in commands.

use ledger_rpc_core::domain::{AccountId, AccountRoot, Amount, Hash256, LedgerHeader, LedgerSeq, OfferEntry};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// ledger - header of the selected ledger
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub ledger_index: LedgerSeq,
    pub ledger_hash: Hash256,
    pub parent_hash: Hash256,
    pub close_time: i64,
    /// Drops, as a string (exceeds the JSON safe integer range)
    pub total_coins: String,
    pub closed: bool,
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<AccountRoot>>,
}

impl From<&LedgerHeader> for LedgerSummary {
    fn from(header: &LedgerHeader) -> Self {
        Self {
            ledger_index: header.seq,
            ledger_hash: header.hash,
            parent_hash: header.parent_hash,
            close_time: header.close_time,
            total_coins: header.total_coins.to_string(),
            closed: header.closed,
            validated: header.validated,
            accounts: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerResponse {
    pub ledger: LedgerSummary,
}

/// server_info
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfoResponse {
    pub info: ServerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub build_version: String,
    pub uptime: u64,
    /// `"<first>-<last>"` or `"empty"`
    pub complete_ledgers: String,
    pub server_state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_ledger: Option<LedgerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_ledger: Option<LedgerRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerRef {
    pub seq: LedgerSeq,
    pub hash: Hash256,
    pub close_time: i64,
}

impl From<&LedgerHeader> for LedgerRef {
    fn from(header: &LedgerHeader) -> Self {
        Self {
            seq: header.seq,
            hash: header.hash,
            close_time: header.close_time,
        }
    }
}

/// account_info
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfoResponse {
    pub account_data: AccountRoot,
    pub ledger_index: LedgerSeq,
    pub validated: bool,
}

/// account_offers
#[derive(Debug, Clone, Serialize)]
pub struct AccountOffersResponse {
    pub account: AccountId,
    pub offers: Vec<OfferEntry>,
    pub ledger_index: LedgerSeq,
    /// Present when the list was truncated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Echoed when the caller supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_index: Option<u32>,
}

/// ledger_entry
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryResponse {
    pub index: Hash256,
    pub node: Value,
    pub ledger_index: LedgerSeq,
}

/// One currency amount held with a counterparty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyBalance {
    pub currency: String,
    pub value: Amount,
}

/// gateway_balances
#[derive(Debug, Clone, Default, Serialize)]
pub struct GatewayBalancesResponse {
    pub account: String,
    pub ledger_index: LedgerSeq,
    /// Issued to everyone but the hot wallets, summed per currency
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub obligations: BTreeMap<String, Amount>,
    /// Issued to each hot wallet
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub balances: BTreeMap<String, Vec<CurrencyBalance>>,
    /// Held by the gateway, issued by others
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, Vec<CurrencyBalance>>,
}
