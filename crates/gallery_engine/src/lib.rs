//! Gallery engine: catalog pipeline, reachability probing, and ledger persistence.
mod dedupe;
mod extract;
mod handle;
mod probe;
mod reconcile;
mod service;
mod store;
mod types;

pub use dedupe::dedupe_blocks;
pub use extract::{scan_gallery, ExtractSettings};
pub use handle::LedgerHandle;
pub use probe::{ProbeSettings, Prober, ReqwestProber};
pub use reconcile::reconcile_catalog;
pub use service::{LedgerService, ServiceError};
pub use store::{
    entry_from_value, user_from_value, write_atomic, JsonLedgerStore, JsonUserStore, Store,
    StoreError,
};
pub use types::{
    CatalogBlock, DedupeDecision, DedupeOutput, DedupeRecord, DropReason, GalleryScan,
    KeepReason, ProbeOutcome, ReconcileOutcome, ReconcileSummary,
};
