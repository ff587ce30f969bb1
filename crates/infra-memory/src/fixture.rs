// JSON ledger fixtures

use ledger_rpc_core::domain::{AccountId, AccountRoot, OfferEntry, TrustLine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Genesis account of a fresh network
pub const GENESIS_ACCOUNT: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

/// Total native coins in drops at genesis
pub const GENESIS_COINS: u64 = 100_000_000_000_000_000;

const DEFAULT_CHAIN_LENGTH: u32 = 3;
const DEFAULT_CLOSE_TIME: i64 = 1_700_000_000;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fixture must contain at least one ledger")]
    EmptyChain,
}

/// An offer together with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedOffer {
    pub account: AccountId,
    #[serde(flatten)]
    pub offer: OfferEntry,
}

/// Initial ledger contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFixture {
    /// Number of ledgers in the starting chain; the last one is open
    #[serde(default = "default_chain_length")]
    pub ledgers: u32,
    #[serde(default = "default_close_time")]
    pub close_time: i64,
    #[serde(default = "default_total_coins")]
    pub total_coins: u64,
    #[serde(default)]
    pub accounts: Vec<AccountRoot>,
    #[serde(default)]
    pub offers: Vec<OwnedOffer>,
    /// Each line is stored once; the peer's side is derived
    #[serde(default)]
    pub trust_lines: Vec<TrustLine>,
}

fn default_chain_length() -> u32 {
    DEFAULT_CHAIN_LENGTH
}

fn default_close_time() -> i64 {
    DEFAULT_CLOSE_TIME
}

fn default_total_coins() -> u64 {
    GENESIS_COINS
}

impl LedgerFixture {
    /// A fresh network: the genesis account holds every coin.
    pub fn genesis() -> Self {
        let accounts = AccountId::from_base58(GENESIS_ACCOUNT)
            .map(|account| {
                vec![AccountRoot {
                    account,
                    balance: GENESIS_COINS,
                    sequence: 1,
                    owner_count: 0,
                    flags: 0,
                }]
            })
            .unwrap_or_default();
        Self {
            ledgers: DEFAULT_CHAIN_LENGTH,
            close_time: DEFAULT_CLOSE_TIME,
            total_coins: GENESIS_COINS,
            accounts,
            offers: Vec::new(),
            trust_lines: Vec::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        let fixture: Self = serde_json::from_str(text)?;
        if fixture.ledgers == 0 {
            return Err(FixtureError::EmptyChain);
        }
        Ok(fixture)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

impl Default for LedgerFixture {
    fn default() -> Self {
        Self::genesis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_fixture() {
        let fixture = LedgerFixture::genesis();
        assert_eq!(fixture.accounts.len(), 1);
        assert_eq!(fixture.accounts[0].account.to_base58(), GENESIS_ACCOUNT);
    }

    #[test]
    fn test_parse_with_defaults() {
        let fixture = LedgerFixture::from_json(&format!(
            r#"{{
                "offers": [{{"account": "{}", "seq": 4, "flags": 0,
                             "taker_pays": "10", "taker_gets": "2.5"}}]
            }}"#,
            GENESIS_ACCOUNT
        ))
        .unwrap();
        assert_eq!(fixture.ledgers, 3);
        assert!(fixture.accounts.is_empty());
        assert_eq!(fixture.offers[0].offer.seq, 4);
        assert_eq!(fixture.offers[0].offer.taker_gets.to_string(), "2.5");
    }

    #[test]
    fn test_rejects_empty_chain_and_bad_json() {
        assert!(matches!(
            LedgerFixture::from_json(r#"{"ledgers": 0}"#),
            Err(FixtureError::EmptyChain)
        ));
        assert!(matches!(
            LedgerFixture::from_json("{"),
            Err(FixtureError::Parse(_))
        ));
        assert!(matches!(
            LedgerFixture::from_path("/nonexistent/fixture.json"),
            Err(FixtureError::Io { .. })
        ));
    }

    #[test]
    fn test_bundled_devnet_fixture_parses() {
        let fixture = LedgerFixture::from_json(include_str!("../fixtures/devnet.json")).unwrap();
        assert!(fixture.accounts.len() >= 2);
        assert!(!fixture.trust_lines.is_empty());
    }
}
