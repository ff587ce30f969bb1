// Ledger state port: the node's view of its ledger chain
// reason: async-trait needed for dyn dispatch from handlers
use crate::domain::{
    AccountId, AccountRoot, Hash256, LedgerHandle, LedgerHeader, LedgerSeq, OfferEntry,
    TrustLine,
};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Lookups against the ledger engine.
///
/// Ledger lookups fail with a `Status` (e.g. `rpcLGR_NOT_FOUND`) that callers
/// propagate unchanged; object lookups return `None` when the object does not
/// exist in the given ledger.
#[async_trait]
pub trait LedgerState: Send + Sync {
    /// The open, in-progress ledger
    async fn current_ledger(&self) -> Result<LedgerHandle>;

    /// The most recently closed ledger
    async fn closed_ledger(&self) -> Result<LedgerHandle>;

    /// The most recently validated ledger
    async fn validated_ledger(&self) -> Result<LedgerHandle>;

    async fn ledger_by_hash(&self, hash: &Hash256) -> Result<LedgerHandle>;

    async fn ledger_by_seq(&self, seq: LedgerSeq) -> Result<LedgerHandle>;

    async fn account_root(
        &self,
        ledger: &LedgerHeader,
        account: &AccountId,
    ) -> Result<Option<AccountRoot>>;

    /// Every account root in `ledger`, ordered by account id
    async fn accounts(&self, ledger: &LedgerHeader) -> Result<Vec<AccountRoot>>;

    /// Offers owned by `account`, in owner-directory order
    async fn account_offers(
        &self,
        ledger: &LedgerHeader,
        account: &AccountId,
    ) -> Result<Vec<OfferEntry>>;

    /// Trust lines of `account`, each seen from `account`'s side
    async fn trust_lines(&self, ledger: &LedgerHeader, account: &AccountId)
        -> Result<Vec<TrustLine>>;

    /// Raw JSON form of the entry stored at `index`
    async fn ledger_entry(&self, ledger: &LedgerHeader, index: &Hash256)
        -> Result<Option<Value>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::status::{RpcErrorCode, Status};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock LedgerState: a fixed chain of headers plus per-account objects.
    ///
    /// The last header is current, the one before it closed and validated.
    #[derive(Default)]
    pub struct MockLedgerState {
        inner: Mutex<MockInner>,
    }

    #[derive(Default)]
    struct MockInner {
        ledgers: Vec<LedgerHandle>,
        accounts: HashMap<AccountId, AccountRoot>,
        offers: HashMap<AccountId, Vec<OfferEntry>>,
        lines: HashMap<AccountId, Vec<TrustLine>>,
        entries: HashMap<Hash256, Value>,
        lookups: usize,
    }

    impl MockLedgerState {
        /// Chain of `count` ledgers with sequences `1..=count`.
        pub fn with_chain(count: u32) -> Self {
            let mock = Self::default();
            {
                let mut inner = mock.inner.lock().unwrap();
                let mut parent = Hash256::ZERO;
                for seq in 1..=count {
                    let mut bytes = [0u8; 32];
                    bytes[28..].copy_from_slice(&seq.to_be_bytes());
                    let hash = Hash256::new(bytes);
                    inner.ledgers.push(Arc::new(LedgerHeader {
                        seq,
                        hash,
                        parent_hash: parent,
                        close_time: 1_700_000_000 + seq as i64 * 4,
                        total_coins: 100_000_000_000_000_000,
                        closed: seq < count,
                        validated: seq < count,
                    }));
                    parent = hash;
                }
            }
            mock
        }

        pub fn add_account(&self, root: AccountRoot) {
            self.inner.lock().unwrap().accounts.insert(root.account, root);
        }

        pub fn add_offer(&self, account: AccountId, offer: OfferEntry) {
            self.inner
                .lock()
                .unwrap()
                .offers
                .entry(account)
                .or_default()
                .push(offer);
        }

        pub fn add_trust_line(&self, line: TrustLine) {
            self.inner
                .lock()
                .unwrap()
                .lines
                .entry(line.account)
                .or_default()
                .push(line);
        }

        pub fn add_entry(&self, index: Hash256, entry: Value) {
            self.inner.lock().unwrap().entries.insert(index, entry);
        }

        /// Number of ledger lookups served so far.
        pub fn lookups(&self) -> usize {
            self.inner.lock().unwrap().lookups
        }

        fn nth_from_end(&self, back: usize) -> Result<LedgerHandle> {
            let mut inner = self.inner.lock().unwrap();
            inner.lookups += 1;
            let len = inner.ledgers.len();
            len.checked_sub(back + 1)
                .and_then(|i| inner.ledgers.get(i).cloned())
                .ok_or_else(|| Status::from(RpcErrorCode::NoCurrent))
        }
    }

    #[async_trait]
    impl LedgerState for MockLedgerState {
        async fn current_ledger(&self) -> Result<LedgerHandle> {
            self.nth_from_end(0)
        }
        async fn closed_ledger(&self) -> Result<LedgerHandle> {
            self.nth_from_end(1)
        }
        async fn validated_ledger(&self) -> Result<LedgerHandle> {
            self.nth_from_end(1)
        }
        async fn ledger_by_hash(&self, hash: &Hash256) -> Result<LedgerHandle> {
            let mut inner = self.inner.lock().unwrap();
            inner.lookups += 1;
            inner
                .ledgers
                .iter()
                .find(|l| l.hash == *hash)
                .cloned()
                .ok_or_else(|| Status::with_message(RpcErrorCode::LgrNotFound, "ledgerNotFound"))
        }
        async fn ledger_by_seq(&self, seq: LedgerSeq) -> Result<LedgerHandle> {
            let mut inner = self.inner.lock().unwrap();
            inner.lookups += 1;
            inner
                .ledgers
                .iter()
                .find(|l| l.seq == seq)
                .cloned()
                .ok_or_else(|| Status::with_message(RpcErrorCode::LgrNotFound, "ledgerNotFound"))
        }
        async fn account_root(
            &self,
            _ledger: &LedgerHeader,
            account: &AccountId,
        ) -> Result<Option<AccountRoot>> {
            Ok(self.inner.lock().unwrap().accounts.get(account).cloned())
        }
        async fn accounts(&self, _ledger: &LedgerHeader) -> Result<Vec<AccountRoot>> {
            let mut roots: Vec<AccountRoot> =
                self.inner.lock().unwrap().accounts.values().cloned().collect();
            roots.sort_by_key(|r| r.account);
            Ok(roots)
        }
        async fn account_offers(
            &self,
            _ledger: &LedgerHeader,
            account: &AccountId,
        ) -> Result<Vec<OfferEntry>> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .offers
                .get(account)
                .cloned()
                .unwrap_or_default())
        }
        async fn trust_lines(
            &self,
            _ledger: &LedgerHeader,
            account: &AccountId,
        ) -> Result<Vec<TrustLine>> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .lines
                .get(account)
                .cloned()
                .unwrap_or_default())
        }
        async fn ledger_entry(
            &self,
            _ledger: &LedgerHeader,
            index: &Hash256,
        ) -> Result<Option<Value>> {
            Ok(self.inner.lock().unwrap().entries.get(index).cloned())
        }
    }
}
