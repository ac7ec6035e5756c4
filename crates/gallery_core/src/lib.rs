//! Gallery core: pure engagement-ledger state and dedup helpers.
mod ledger;
mod normalize;
mod user;

pub use ledger::{EngagementSnapshot, Ledger, LedgerEntry, ReconcileDelta};
pub use normalize::normalize_source_for_dedupe;
pub use user::{UserRecord, Users};
