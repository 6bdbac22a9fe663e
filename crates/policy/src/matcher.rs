//! The hot-reloadable policy matcher: the runtime object that evaluates a
//! `Policy` against a source IP.
//!
//! The current policy is held behind an [`ArcSwap`], never a lock. A reader
//! never observes a torn mix of two snapshots: it loads one `Arc<Policy>`
//! at the start of [`Matcher::is_allowed`] and evaluates entirely against
//! it, even if [`Matcher::reload`] publishes a new snapshot concurrently.

use crate::model::{DefaultAction, Mode, Policy};
use crate::reason::Reason;
use arc_swap::ArcSwap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counters {
    total: AtomicU64,
    admitted: AtomicU64,
    denied: AtomicU64,
}

/// A consistent read of the matcher's request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Total requests evaluated.
    pub total: u64,
    /// Requests admitted.
    pub admitted: u64,
    /// Requests denied.
    pub denied: u64,
}

/// Evaluates source IPs against the current policy snapshot and tracks
/// admit/deny statistics. Never blocks, never fails.
pub struct Matcher {
    policy: ArcSwap<Policy>,
    counters: Counters,
}

impl Matcher {
    /// Construct a matcher seeded with an initial policy.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self { policy: ArcSwap::from_pointee(policy), counters: Counters::default() }
    }

    /// Evaluate `ip` against the current policy snapshot.
    ///
    /// Match order is fixed: the deny set is checked first (deny always
    /// wins), then the allow set, then the mode-dependent default. An
    /// IPv4-mapped IPv6 address is matched against IPv6 rules as-is — it is
    /// not converted to IPv4.
    #[must_use]
    pub fn is_allowed(&self, ip: IpAddr) -> (bool, Reason) {
        let policy = self.policy.load();

        for rule in policy.deny() {
            if rule.contains(ip) {
                self.record(false);
                return (false, Reason::BlacklistRule { rule: rule.to_string() });
            }
        }
        for rule in policy.allow() {
            if rule.contains(ip) {
                self.record(true);
                return (true, Reason::WhitelistRule { rule: rule.to_string() });
            }
        }
        if !policy.allow().is_empty() {
            self.record(false);
            return (false, Reason::NotInWhitelist);
        }
        match (policy.mode(), policy.default_action()) {
            (Mode::BlacklistOnly, DefaultAction::Allow) => {
                self.record(true);
                (true, Reason::NotInBlacklist)
            }
            _ => {
                self.record(false);
                (false, Reason::EmptyWhitelist)
            }
        }
    }

    fn record(&self, admitted: bool) {
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        if admitted {
            self.counters.admitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.denied.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Publish a new policy snapshot. Readers observe either the old or the
    /// new snapshot for any call in flight, never a mix of the two.
    ///
    /// Takes an already-validated `Policy` — construction is the only
    /// fallible step (see [`crate::model::Policy::new`]), so there is
    /// nothing left to reject here.
    pub fn reload(&self, policy: Policy) {
        self.policy.store(Arc::new(policy));
    }

    /// A read-only handle to the current policy snapshot, for diagnostics.
    #[must_use]
    pub fn current_policy(&self) -> Arc<Policy> {
        self.policy.load_full()
    }

    /// A consistent read of the request counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.counters.total.load(Ordering::Relaxed),
            admitted: self.counters.admitted.load(Ordering::Relaxed),
            denied: self.counters.denied.load(Ordering::Relaxed),
        }
    }
}
