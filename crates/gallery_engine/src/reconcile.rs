use std::collections::BTreeSet;
use std::ops::Range;

use gallery_core::Ledger;
use gallery_logging::gallery_info;

use crate::dedupe::dedupe_blocks;
use crate::extract::{scan_gallery, ExtractSettings};
use crate::probe::Prober;
use crate::types::{CatalogBlock, ReconcileOutcome, ReconcileSummary};

/// Aligns the ledger's entry set with the catalog and prunes the markup.
///
/// Pure composition: scan the gallery region, deduplicate (probing absolute
/// sources), take the surviving ids as the authoritative set, then
/// zero-init missing entries and delete stale ones. Surviving entries keep
/// their counts. The returned markup replaces the gallery region's content
/// with the kept blocks' original spans, in document order; everything
/// outside the region is untouched. Running it again on its own output
/// with a reachable catalog reports zero added and removed.
///
/// Offline maintenance step; assumes exclusive access to catalog and ledger.
pub async fn reconcile_catalog(
    markup: &str,
    ledger: &mut Ledger,
    prober: &dyn Prober,
    settings: &ExtractSettings,
) -> ReconcileOutcome {
    let scan = scan_gallery(markup, settings);
    let scanned = scan.blocks.len();
    let region = scan.region;

    let output = dedupe_blocks(scan.blocks, prober).await;

    let keep_ids: BTreeSet<String> = output.kept.iter().map(|block| block.id.clone()).collect();
    let delta = ledger.retain_ids(&keep_ids);

    let pruned_markup = match region {
        Some(region) => rewrite_region(markup, region, &output.kept),
        None => markup.to_string(),
    };

    let summary = ReconcileSummary {
        scanned,
        added: delta.added,
        removed: delta.removed,
    };
    gallery_info!(
        "reconcile: scanned {} blocks, kept {}, added {}, removed {}",
        summary.scanned,
        keep_ids.len(),
        summary.added,
        summary.removed
    );

    ReconcileOutcome {
        pruned_markup,
        summary,
        report: output.report,
    }
}

fn rewrite_region(markup: &str, region: Range<usize>, kept: &[CatalogBlock]) -> String {
    let mut out = String::with_capacity(markup.len());
    out.push_str(&markup[..region.start]);
    out.push('\n');
    for block in kept {
        out.push_str(&block.raw);
        out.push('\n');
    }
    out.push_str(&markup[region.end..]);
    out
}
