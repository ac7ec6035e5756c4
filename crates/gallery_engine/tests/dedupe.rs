use std::collections::BTreeSet;
use std::sync::{Mutex, Once};

use pretty_assertions::assert_eq;

use gallery_engine::{
    dedupe_blocks, CatalogBlock, DedupeDecision, DropReason, KeepReason, ProbeOutcome, Prober,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(gallery_logging::initialize_for_tests);
}

fn block(id: &str, source: &str) -> CatalogBlock {
    CatalogBlock {
        id: id.to_string(),
        raw: format!(r#"<div class="item" id="{id}"><img src="{source}"></div>"#),
        image_source: source.to_string(),
    }
}

/// Probe stub answering from a fixed set of reachable URLs, recording calls.
struct StubProber {
    reachable: BTreeSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StubProber {
    fn new<const N: usize>(reachable: [&str; N]) -> Self {
        Self {
            reachable: reachable.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Prober for StubProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.calls.lock().unwrap().push(url.to_string());
        if self.reachable.contains(url) {
            ProbeOutcome {
                ok: true,
                status: Some(200),
                content_type: Some("image/png".to_string()),
            }
        } else {
            ProbeOutcome::default()
        }
    }
}

#[tokio::test]
async fn duplicate_ids_keep_first_occurrence() {
    init_logging();
    let prober = StubProber::new([]);
    let blocks = vec![
        block("a", "images/one.png"),
        block("b", "images/two.png"),
        block("a", "images/three.png"),
    ];

    let output = dedupe_blocks(blocks, &prober).await;

    let kept_ids: Vec<&str> = output.kept.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(kept_ids, vec!["a", "b"]);

    let dup_drops: Vec<_> = output
        .report
        .iter()
        .filter(|r| r.decision == DedupeDecision::Dropped(DropReason::DuplicateId))
        .collect();
    assert_eq!(dup_drops.len(), 1);
    assert_eq!(dup_drops[0].id, "a");
}

#[tokio::test]
async fn normalized_source_variants_are_duplicates() {
    init_logging();
    let prober = StubProber::new(["https://example.com/cat.png?v=2"]);
    let blocks = vec![
        block("a", "https://example.com/cat.png?v=2"),
        block("b", "HTTPS://EXAMPLE.COM/cat.png"),
    ];

    let output = dedupe_blocks(blocks, &prober).await;

    assert_eq!(output.kept.len(), 1);
    assert_eq!(
        output.report[1].decision,
        DedupeDecision::Dropped(DropReason::DuplicateSource)
    );
}

#[tokio::test]
async fn blocks_without_a_source_are_dropped() {
    init_logging();
    let prober = StubProber::new([]);
    let output = dedupe_blocks(vec![block("a", "")], &prober).await;

    assert!(output.kept.is_empty());
    assert_eq!(
        output.report[0].decision,
        DedupeDecision::Dropped(DropReason::MissingSource)
    );
    assert_eq!(prober.call_count(), 0);
}

#[tokio::test]
async fn local_sources_skip_the_probe() {
    init_logging();
    let prober = StubProber::new([]);
    let output = dedupe_blocks(vec![block("a", "images/local.png")], &prober).await;

    assert_eq!(
        output.report[0].decision,
        DedupeDecision::Kept(KeepReason::Local)
    );
    assert_eq!(prober.call_count(), 0);
}

#[tokio::test]
async fn absolute_sources_keep_only_reachable_images() {
    init_logging();
    let prober = StubProber::new(["https://cdn.example.com/ok.png"]);
    let blocks = vec![
        block("ok", "https://cdn.example.com/ok.png"),
        block("dead", "https://cdn.example.com/gone.png"),
    ];

    let output = dedupe_blocks(blocks, &prober).await;

    let kept_ids: Vec<&str> = output.kept.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(kept_ids, vec!["ok"]);
    assert_eq!(
        output.report[1].decision,
        DedupeDecision::Dropped(DropReason::Unreachable)
    );
}

#[tokio::test]
async fn repeated_unreachable_source_is_probed_once() {
    init_logging();
    let prober = StubProber::new([]);
    let blocks = vec![
        block("a", "https://cdn.example.com/gone.png"),
        block("b", "https://cdn.example.com/gone.png"),
    ];

    let output = dedupe_blocks(blocks, &prober).await;

    assert_eq!(
        output.report[0].decision,
        DedupeDecision::Dropped(DropReason::Unreachable)
    );
    assert_eq!(
        output.report[1].decision,
        DedupeDecision::Dropped(DropReason::DuplicateSource)
    );
    assert_eq!(prober.call_count(), 1);
}

#[tokio::test]
async fn dedupe_is_idempotent_on_its_own_output() {
    init_logging();
    let prober = StubProber::new(["https://cdn.example.com/ok.png"]);
    let blocks = vec![
        block("a", "images/one.png"),
        block("a", "images/dup-id.png"),
        block("b", "https://cdn.example.com/ok.png"),
        block("c", ""),
    ];

    let first = dedupe_blocks(blocks, &prober).await;
    let second = dedupe_blocks(first.kept.clone(), &prober).await;

    assert_eq!(second.kept, first.kept);
    assert!(second.report.iter().all(|r| r.decision.is_kept()));
}
