//! Admission Control (per-endpoint usage accounting)
//!
//! Every caller endpoint owns a [`Consumer`] whose balance grows with each
//! charged command and decays over time. The pipeline gates a request on the
//! balance accumulated by earlier requests and charges the request's own cost
//! only after its handler has run.
//!
//! Balance and last-decay timestamp are packed into one `AtomicU64` and
//! updated with CAS loops, so concurrent requests from one endpoint never lock
//! and unrelated endpoints never contend (the consumer map is sharded).

use dashmap::DashMap;
use ledger_rpc_core::domain::Charge;
use ledger_rpc_core::port::TimeProvider;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_WARNING_THRESHOLD: u32 = 500;
pub const DEFAULT_DROP_THRESHOLD: u32 = 1500;
pub const DEFAULT_DECAY_WINDOW_SECS: u32 = 32;

/// Admission thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    pub warning_threshold: u32,
    pub drop_threshold: u32,
    /// Seconds over which a balance decays
    pub decay_window_secs: u32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            drop_threshold: DEFAULT_DROP_THRESHOLD,
            decay_window_secs: DEFAULT_DECAY_WINDOW_SECS,
        }
    }
}

/// Identity a balance is accounted against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Untrusted caller, keyed by address without port
    Inbound(IpAddr),
    Admin(String),
}

impl Endpoint {
    pub fn is_admin(&self) -> bool {
        matches!(self, Endpoint::Admin(_))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Inbound(ip) => write!(f, "{}", ip),
            Endpoint::Admin(name) => write!(f, "admin:{}", name),
        }
    }
}

/// Outcome of a charge, judged on the resulting balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ok,
    /// Past the warning threshold
    Warn,
    /// Past the drop threshold; further requests will be refused
    Drop,
}

// Upper 32 bits: balance. Lower 32 bits: seconds timestamp of the last decay.
struct Entry {
    endpoint: Endpoint,
    packed: AtomicU64,
}

fn pack(balance: u32, stamp: u32) -> u64 {
    ((balance as u64) << 32) | stamp as u64
}

fn unpack(packed: u64) -> (u32, u32) {
    ((packed >> 32) as u32, (packed & 0xFFFF_FFFF) as u32)
}

fn stamp(now_secs: i64) -> u32 {
    u32::try_from(now_secs.max(0)).unwrap_or(u32::MAX)
}

/// One decay step per elapsed second, each removing `ceil(balance / window)`.
fn decay(mut balance: u32, elapsed_secs: u32, window: u32) -> u32 {
    let window = window.max(1);
    let mut steps = elapsed_secs;
    while steps > 0 && balance > 0 {
        balance -= balance.div_ceil(window);
        steps -= 1;
    }
    balance
}

impl Entry {
    fn new(endpoint: Endpoint, now: u32) -> Self {
        Self {
            endpoint,
            packed: AtomicU64::new(pack(0, now)),
        }
    }

    /// Apply decay up to `now` and add `cost`; returns the new balance.
    fn update(&self, now: u32, window: u32, cost: u32) -> u32 {
        let mut current = self.packed.load(Ordering::Acquire);
        loop {
            let (balance, last) = unpack(current);
            let decayed = decay(balance, now.saturating_sub(last), window);
            let next = decayed.saturating_add(cost);
            // Never move the stamp backwards
            let new_packed = pack(next, now.max(last));
            if new_packed == current {
                return next;
            }
            match self.packed.compare_exchange_weak(
                current,
                new_packed,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Decayed balance without storing it.
    fn peek(&self, now: u32, window: u32) -> u32 {
        let (balance, last) = unpack(self.packed.load(Ordering::Acquire));
        decay(balance, now.saturating_sub(last), window)
    }
}

/// Handle to one endpoint's usage record.
#[derive(Clone)]
pub struct Consumer {
    entry: Arc<Entry>,
    clock: Arc<dyn TimeProvider>,
    config: ResourceConfig,
}

impl Consumer {
    fn now(&self) -> u32 {
        stamp(self.clock.now_secs())
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.entry.endpoint
    }

    pub fn is_admin(&self) -> bool {
        self.entry.endpoint.is_admin()
    }

    /// Current decayed balance.
    pub fn balance(&self) -> u32 {
        self.entry.update(self.now(), self.config.decay_window_secs, 0)
    }

    /// Debit `charge`. Admin endpoints record usage but are always `Ok`.
    pub fn charge(&self, charge: Charge) -> Disposition {
        let balance = self
            .entry
            .update(self.now(), self.config.decay_window_secs, charge.cost());
        debug!(endpoint = %self.entry.endpoint, charge = %charge, balance, "Consumer charged");
        if self.is_admin() {
            return Disposition::Ok;
        }
        if balance > self.config.drop_threshold {
            Disposition::Drop
        } else if balance > self.config.warning_threshold {
            Disposition::Warn
        } else {
            Disposition::Ok
        }
    }

    /// `true` iff this endpoint must be refused before any work is done.
    pub fn disconnect(&self) -> bool {
        !self.is_admin() && self.balance() > self.config.drop_threshold
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("endpoint", &self.entry.endpoint)
            .field("balance", &self.entry.peek(self.now(), self.config.decay_window_secs))
            .finish()
    }
}

/// Registry of consumers, one per endpoint.
pub struct ResourceManager {
    consumers: DashMap<Endpoint, Arc<Entry>>,
    clock: Arc<dyn TimeProvider>,
    config: ResourceConfig,
}

impl ResourceManager {
    pub fn new(config: ResourceConfig, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            consumers: DashMap::new(),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn consumer(&self, endpoint: Endpoint) -> Consumer {
        let now = stamp(self.clock.now_secs());
        let key = endpoint.clone();
        let entry = self
            .consumers
            .entry(endpoint)
            .or_insert_with(|| Arc::new(Entry::new(key, now)))
            .value()
            .clone();
        Consumer {
            entry,
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }

    /// Consumer for an untrusted caller; the port is ignored.
    pub fn new_inbound_endpoint(&self, remote: SocketAddr) -> Consumer {
        self.consumer(Endpoint::Inbound(remote.ip()))
    }

    pub fn new_admin_endpoint(&self, name: impl Into<String>) -> Consumer {
        self.consumer(Endpoint::Admin(name.into()))
    }

    /// Drop records that decayed to zero and have no live handle.
    /// Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = stamp(self.clock.now_secs());
        let window = self.config.decay_window_secs;
        let before = self.consumers.len();
        self.consumers
            .retain(|_, entry| Arc::strong_count(entry) > 1 || entry.peek(now, window) > 0);
        let removed = before.saturating_sub(self.consumers.len());
        if removed > 0 {
            debug!(removed, remaining = self.consumers.len(), "Swept idle consumers");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}
