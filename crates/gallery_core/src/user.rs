use std::collections::{BTreeMap, BTreeSet};

/// One registered user, keyed by username in [`Users`].
///
/// The credential is compared by exact match elsewhere; hardening it is
/// explicitly out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserRecord {
    pub email: String,
    pub credential: String,
    /// Ids already counted as viewed by this user (view dedup marker).
    pub viewed: BTreeSet<String>,
    /// Ids this user currently hearts. Must mirror the ledger:
    /// `id ∈ hearted` exactly when the username is in `ledger[id].hearted_by`.
    pub hearted: BTreeSet<String>,
}

/// The user store, username to record.
pub type Users = BTreeMap<String, UserRecord>;
