use std::collections::BTreeSet;

use url::Url;

use gallery_core::normalize_source_for_dedupe;
use gallery_logging::gallery_debug;

use crate::probe::Prober;
use crate::types::{CatalogBlock, DedupeDecision, DedupeOutput, DedupeRecord, DropReason, KeepReason};

/// Single pass over the extracted blocks, dropping repeats and dead sources.
///
/// Rule order per block: duplicate id, duplicate normalized source, missing
/// source, local source (kept as-is), absolute source (kept only when the
/// probe confirms a 2xx image). Ids and non-empty normalized sources enter
/// their seen-sets on first sight, so a repeated unreachable source is
/// reported as a duplicate and probed only once. Kept blocks stay in
/// first-seen order, and rerunning the pass over its own kept output is a
/// fixpoint.
pub async fn dedupe_blocks(blocks: Vec<CatalogBlock>, prober: &dyn Prober) -> DedupeOutput {
    let mut seen_ids: BTreeSet<String> = BTreeSet::new();
    let mut seen_sources: BTreeSet<String> = BTreeSet::new();
    let mut kept = Vec::new();
    let mut report = Vec::new();

    for block in blocks {
        let decision = decide(&block, &mut seen_ids, &mut seen_sources, prober).await;
        gallery_debug!(
            "dedupe '{}' ({}): {}",
            block.id,
            block.image_source,
            decision
        );
        report.push(DedupeRecord {
            id: block.id.clone(),
            source: block.image_source.clone(),
            decision,
        });
        if decision.is_kept() {
            kept.push(block);
        }
    }

    DedupeOutput { kept, report }
}

async fn decide(
    block: &CatalogBlock,
    seen_ids: &mut BTreeSet<String>,
    seen_sources: &mut BTreeSet<String>,
    prober: &dyn Prober,
) -> DedupeDecision {
    if !seen_ids.insert(block.id.clone()) {
        return DedupeDecision::Dropped(DropReason::DuplicateId);
    }

    let source = block.image_source.trim();
    let normalized = normalize_source_for_dedupe(source);
    if !normalized.is_empty() && !seen_sources.insert(normalized) {
        return DedupeDecision::Dropped(DropReason::DuplicateSource);
    }

    if source.is_empty() {
        return DedupeDecision::Dropped(DropReason::MissingSource);
    }

    // No scheme means a local or relative path; nothing to probe.
    if Url::parse(source).is_err() {
        return DedupeDecision::Kept(KeepReason::Local);
    }

    if prober.probe(source).await.ok {
        DedupeDecision::Kept(KeepReason::Probed)
    } else {
        DedupeDecision::Dropped(DropReason::Unreachable)
    }
}
