// In-memory LedgerState Implementation

use crate::fixture::LedgerFixture;
use async_trait::async_trait;
use ledger_rpc_core::domain::{
    keylet, sha512_half, AccountId, AccountRoot, Hash256, LedgerHandle, LedgerHeader, LedgerSeq,
    OfferEntry, TrustLine,
};
use ledger_rpc_core::error::Result;
use ledger_rpc_core::port::LedgerState;
use ledger_rpc_core::status::{RpcErrorCode, Status};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Seconds between consecutive ledger closes in a generated chain
const CLOSE_INTERVAL_SECS: i64 = 4;

/// Ledger chain plus one shared object store.
///
/// Object state is not versioned per ledger: every ledger in the chain sees
/// the same accounts, offers and lines.
pub struct InMemoryLedgerState {
    inner: RwLock<Inner>,
}

struct Inner {
    /// Oldest first; the last entry is the open ledger
    chain: Vec<LedgerHandle>,
    accounts: BTreeMap<AccountId, AccountRoot>,
    offers: BTreeMap<AccountId, Vec<OfferEntry>>,
    lines: BTreeMap<AccountId, Vec<TrustLine>>,
    entries: HashMap<Hash256, Value>,
}

fn ledger_not_found() -> Status {
    Status::with_message(RpcErrorCode::LgrNotFound, "ledgerNotFound")
}

fn lock_poisoned() -> Status {
    Status::with_message(RpcErrorCode::Internal, "ledger state lock poisoned")
}

impl InMemoryLedgerState {
    pub fn from_fixture(fixture: LedgerFixture) -> Self {
        let mut accounts = BTreeMap::new();
        for root in fixture.accounts {
            accounts.insert(root.account, root);
        }

        let mut offers: BTreeMap<AccountId, Vec<OfferEntry>> = BTreeMap::new();
        for owned in fixture.offers {
            offers.entry(owned.account).or_default().push(owned.offer);
        }
        for list in offers.values_mut() {
            list.sort_by_key(|o| o.seq);
        }

        let mut lines: BTreeMap<AccountId, Vec<TrustLine>> = BTreeMap::new();
        for line in fixture.trust_lines {
            let mirrored = TrustLine {
                account: line.peer,
                peer: line.account,
                currency: line.currency.clone(),
                balance: line.balance.negate(),
            };
            lines.entry(line.account).or_default().push(line);
            lines.entry(mirrored.account).or_default().push(mirrored);
        }

        let mut chain = Vec::with_capacity(fixture.ledgers as usize);
        let mut parent = Hash256::ZERO;
        for seq in 1..=fixture.ledgers {
            let header = make_header(
                seq,
                parent,
                fixture.close_time + seq as i64 * CLOSE_INTERVAL_SECS,
                fixture.total_coins,
            );
            parent = header.hash;
            chain.push(Arc::new(header));
        }
        mark_tags(&mut chain);

        let mut inner = Inner {
            chain,
            accounts,
            offers,
            lines,
            entries: HashMap::new(),
        };
        inner.rebuild_entries();

        info!(
            ledgers = inner.chain.len(),
            accounts = inner.accounts.len(),
            entries = inner.entries.len(),
            "In-memory ledger state loaded"
        );

        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Close the open ledger and open its successor.
    ///
    /// The closed ledger becomes the last closed ledger and its predecessor the
    /// last validated one.
    pub fn close_ledger(&self) -> Result<LedgerHandle> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        let open = inner.chain.last().cloned().ok_or_else(ledger_not_found)?;
        let next = make_header(
            open.seq + 1,
            open.hash,
            open.close_time + CLOSE_INTERVAL_SECS,
            open.total_coins,
        );
        inner.chain.push(Arc::new(next));
        mark_tags(&mut inner.chain);
        debug!(seq = open.seq, "Ledger closed");
        inner.chain.last().cloned().ok_or_else(ledger_not_found)
    }

    /// Insert or replace an account root.
    pub fn put_account(&self, root: AccountRoot) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        inner.accounts.insert(root.account, root);
        inner.rebuild_entries();
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| lock_poisoned())
    }

    /// Chain entry `back` positions before the open ledger.
    fn from_end(&self, back: usize) -> Result<LedgerHandle> {
        let inner = self.read()?;
        let len = inner.chain.len();
        len.checked_sub(back + 1)
            .and_then(|i| inner.chain.get(i).cloned())
            .ok_or_else(|| Status::from(RpcErrorCode::NoClosed))
    }
}

fn make_header(seq: LedgerSeq, parent: Hash256, close_time: i64, total_coins: u64) -> LedgerHeader {
    let hash = sha512_half(&[
        b"LWR\0",
        &seq.to_be_bytes(),
        parent.as_bytes(),
        &close_time.to_be_bytes(),
    ]);
    LedgerHeader {
        seq,
        hash,
        parent_hash: parent,
        close_time,
        total_coins,
        closed: false,
        validated: false,
    }
}

/// All but the open ledger are closed; all but the newest closed one are validated.
fn mark_tags(chain: &mut [LedgerHandle]) {
    let len = chain.len();
    for (i, handle) in chain.iter_mut().enumerate() {
        let closed = i + 1 < len;
        let validated = i + 2 < len;
        if handle.closed != closed || handle.validated != validated {
            let mut header = (**handle).clone();
            header.closed = closed;
            header.validated = validated;
            *handle = Arc::new(header);
        }
    }
}

impl Inner {
    /// Index every object by its keylet; owner directories list owned objects.
    fn rebuild_entries(&mut self) {
        let mut entries = HashMap::new();
        let mut owned: BTreeMap<AccountId, Vec<Hash256>> = BTreeMap::new();

        for root in self.accounts.values() {
            entries.insert(
                keylet::account_root(&root.account),
                json!({
                    "LedgerEntryType": "AccountRoot",
                    "Account": root.account,
                    "Balance": root.balance.to_string(),
                    "Sequence": root.sequence,
                    "OwnerCount": root.owner_count,
                    "Flags": root.flags,
                }),
            );
        }

        for (account, offers) in &self.offers {
            for offer in offers {
                let index = keylet::offer(account, offer.seq);
                entries.insert(
                    index,
                    json!({
                        "LedgerEntryType": "Offer",
                        "Account": account,
                        "Sequence": offer.seq,
                        "Flags": offer.flags,
                        "TakerPays": offer.taker_pays,
                        "TakerGets": offer.taker_gets,
                    }),
                );
                owned.entry(*account).or_default().push(index);
            }
        }

        for (account, lines) in &self.lines {
            for line in lines {
                let index = keylet::ripple_state(account, &line.peer, &line.currency);
                // Stored once, from the low account's side
                if account < &line.peer {
                    entries.insert(
                        index,
                        json!({
                            "LedgerEntryType": "RippleState",
                            "LowAccount": account,
                            "HighAccount": line.peer,
                            "Currency": line.currency,
                            "Balance": line.balance,
                        }),
                    );
                }
                owned.entry(*account).or_default().push(index);
            }
        }

        for (account, indexes) in owned {
            let root = keylet::owner_dir(&account);
            let indexes: Vec<String> = indexes.iter().map(Hash256::to_string).collect();
            entries.insert(
                root,
                json!({
                    "LedgerEntryType": "DirectoryNode",
                    "Owner": account,
                    "RootIndex": root,
                    "Indexes": indexes,
                }),
            );
        }

        self.entries = entries;
    }
}

#[async_trait]
impl LedgerState for InMemoryLedgerState {
    async fn current_ledger(&self) -> Result<LedgerHandle> {
        self.from_end(0)
    }

    async fn closed_ledger(&self) -> Result<LedgerHandle> {
        self.from_end(1)
    }

    async fn validated_ledger(&self) -> Result<LedgerHandle> {
        self.from_end(2)
    }

    async fn ledger_by_hash(&self, hash: &Hash256) -> Result<LedgerHandle> {
        let inner = self.read()?;
        inner
            .chain
            .iter()
            .find(|l| l.hash == *hash)
            .cloned()
            .ok_or_else(ledger_not_found)
    }

    async fn ledger_by_seq(&self, seq: LedgerSeq) -> Result<LedgerHandle> {
        let inner = self.read()?;
        // Sequences are contiguous from 1
        seq.checked_sub(1)
            .and_then(|i| inner.chain.get(i as usize))
            .cloned()
            .ok_or_else(ledger_not_found)
    }

    async fn account_root(
        &self,
        _ledger: &LedgerHeader,
        account: &AccountId,
    ) -> Result<Option<AccountRoot>> {
        Ok(self.read()?.accounts.get(account).cloned())
    }

    async fn accounts(&self, _ledger: &LedgerHeader) -> Result<Vec<AccountRoot>> {
        Ok(self.read()?.accounts.values().cloned().collect())
    }

    async fn account_offers(
        &self,
        _ledger: &LedgerHeader,
        account: &AccountId,
    ) -> Result<Vec<OfferEntry>> {
        Ok(self.read()?.offers.get(account).cloned().unwrap_or_default())
    }

    async fn trust_lines(
        &self,
        _ledger: &LedgerHeader,
        account: &AccountId,
    ) -> Result<Vec<TrustLine>> {
        Ok(self.read()?.lines.get(account).cloned().unwrap_or_default())
    }

    async fn ledger_entry(&self, _ledger: &LedgerHeader, index: &Hash256) -> Result<Option<Value>> {
        Ok(self.read()?.entries.get(index).cloned())
    }
}
