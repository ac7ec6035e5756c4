use std::fmt;
use std::ops::Range;

/// One gallery item block as it appears in the catalog markup.
///
/// `raw` is the exact markup span of the block; the reconciler writes kept
/// blocks back verbatim, so it must never be re-serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogBlock {
    pub id: String,
    pub raw: String,
    /// First embedded image reference, or empty when the block has none.
    pub image_source: String,
}

/// Extraction result: blocks in document order plus the byte range of the
/// gallery region's inner content, when a region was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryScan {
    pub blocks: Vec<CatalogBlock>,
    pub region: Option<Range<usize>>,
}

/// Why a block survived deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    /// Local or relative source, kept unconditionally.
    Local,
    /// Absolute source confirmed reachable as an image.
    Probed,
}

/// Why a block was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    DuplicateId,
    DuplicateSource,
    MissingSource,
    Unreachable,
}

/// Per-block verdict, reported for every scanned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeDecision {
    Kept(KeepReason),
    Dropped(DropReason),
}

impl DedupeDecision {
    pub fn is_kept(&self) -> bool {
        matches!(self, DedupeDecision::Kept(_))
    }
}

impl fmt::Display for DedupeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupeDecision::Kept(KeepReason::Local) => write!(f, "local"),
            DedupeDecision::Kept(KeepReason::Probed) => write!(f, "probed"),
            DedupeDecision::Dropped(DropReason::DuplicateId) => write!(f, "duplicate-id"),
            DedupeDecision::Dropped(DropReason::DuplicateSource) => write!(f, "duplicate-src"),
            DedupeDecision::Dropped(DropReason::MissingSource) => write!(f, "no-src"),
            DedupeDecision::Dropped(DropReason::Unreachable) => write!(f, "unreachable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeRecord {
    pub id: String,
    pub source: String,
    pub decision: DedupeDecision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeOutput {
    pub kept: Vec<CatalogBlock>,
    pub report: Vec<DedupeRecord>,
}

/// Classification of a reachability probe. Failures of any kind collapse
/// into `ok == false`; the probe never errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeOutcome {
    pub ok: bool,
    pub status: Option<u16>,
    pub content_type: Option<String>,
}

impl ProbeOutcome {
    pub(crate) fn failed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    pub scanned: usize,
    pub added: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub pruned_markup: String,
    pub summary: ReconcileSummary,
    pub report: Vec<DedupeRecord>,
}
