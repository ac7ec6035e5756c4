use std::collections::{BTreeMap, BTreeSet};

use crate::user::UserRecord;

/// Per-item engagement counters.
///
/// The heart count is never stored; it is always derived from the size of
/// `hearted_by`, so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerEntry {
    pub views: u64,
    pub hearted_by: BTreeSet<String>,
}

impl LedgerEntry {
    pub fn hearts(&self) -> u64 {
        self.hearted_by.len() as u64
    }
}

/// Result of a `query` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementSnapshot {
    pub views: u64,
    pub hearts: u64,
    pub has_viewed: bool,
    pub has_hearted: bool,
}

/// Entry-set changes applied while mirroring the ledger against a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileDelta {
    pub added: usize,
    pub removed: usize,
}

/// The in-memory counter store, keyed by catalog item id.
///
/// Entries are created lazily, zero-initialized, the first time an id is
/// referenced by a mutation. Queries never create entries; a missing id
/// reads as all zeroes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LedgerEntry> {
        self.entries.get(id)
    }

    /// Returns the entry for `id`, zero-initializing it if absent.
    pub fn upsert(&mut self, id: &str) -> &mut LedgerEntry {
        self.entries.entry(id.to_string()).or_default()
    }

    pub fn delete(&mut self, id: &str) -> Option<LedgerEntry> {
        self.entries.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LedgerEntry)> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Unconditionally counts one view; anonymous callers cannot be deduped.
    /// Returns the new view count.
    pub fn record_anonymous_view(&mut self, id: &str) -> u64 {
        let entry = self.upsert(id);
        entry.views += 1;
        entry.views
    }

    /// Counts one view for `user` unless the user already viewed `id`.
    /// Returns whether any state changed.
    pub fn record_user_view(&mut self, id: &str, user: &mut UserRecord) -> bool {
        if !user.viewed.insert(id.to_string()) {
            return false;
        }
        self.upsert(id).views += 1;
        true
    }

    /// Flips `username`'s heart on `id`, mirroring the membership into the
    /// user's own hearted set. Returns whether the item is hearted afterwards.
    pub fn toggle_heart(&mut self, id: &str, username: &str, user: &mut UserRecord) -> bool {
        let entry = self.upsert(id);
        if entry.hearted_by.remove(username) {
            user.hearted.remove(id);
            false
        } else {
            entry.hearted_by.insert(username.to_string());
            user.hearted.insert(id.to_string());
            true
        }
    }

    /// Reads the counters for `id` without mutating anything. Membership
    /// flags are false for anonymous callers.
    pub fn query(&self, id: &str, user: Option<&UserRecord>) -> EngagementSnapshot {
        let (views, hearts) = match self.entries.get(id) {
            Some(entry) => (entry.views, entry.hearts()),
            None => (0, 0),
        };
        let (has_viewed, has_hearted) = match user {
            Some(user) => (user.viewed.contains(id), user.hearted.contains(id)),
            None => (false, false),
        };
        EngagementSnapshot {
            views,
            hearts,
            has_viewed,
            has_hearted,
        }
    }

    /// Replaces the whole entry set with zeroed entries for exactly `ids`.
    /// Destructive; meant for maintenance.
    pub fn reset_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = ids
            .into_iter()
            .map(|id| (id.into(), LedgerEntry::default()))
            .collect();
    }

    /// Mirrors the entry key set against the authoritative catalog id set:
    /// missing ids get zeroed entries, ids outside the set are deleted, and
    /// surviving entries keep their counts.
    pub fn retain_ids(&mut self, keep: &BTreeSet<String>) -> ReconcileDelta {
        let mut delta = ReconcileDelta::default();
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !keep.contains(*id))
            .cloned()
            .collect();
        for id in stale {
            self.entries.remove(&id);
            delta.removed += 1;
        }
        for id in keep {
            if !self.entries.contains_key(id) {
                self.entries.insert(id.clone(), LedgerEntry::default());
                delta.added += 1;
            }
        }
        delta
    }
}
