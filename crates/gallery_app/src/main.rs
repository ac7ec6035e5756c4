//! Maintenance CLI for the gallery ledger.
//!
//! `reconcile` rewrites the catalog markup with the surviving blocks and
//! resynchronizes the ledger store's entry set. `reset` zero-initializes
//! the ledger for an explicit id list. Both are offline operations and
//! expect exclusive access to the files they touch.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

use gallery_engine::{
    reconcile_catalog, write_atomic, ExtractSettings, JsonLedgerStore, ProbeSettings,
    ReqwestProber, Store,
};
use gallery_logging::gallery_error;

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.split_first() {
        Some((cmd, rest)) if cmd == "reconcile" && rest.len() == 2 => {
            reconcile(Path::new(&rest[0]), Path::new(&rest[1]))
        }
        Some((cmd, rest)) if cmd == "reset" && !rest.is_empty() => {
            reset(Path::new(&rest[0]), &rest[1..])
        }
        _ => {
            eprintln!("usage: gallery_app reconcile <catalog.html> <ledger.json>");
            eprintln!("       gallery_app reset <ledger.json> <id>...");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            gallery_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn reconcile(catalog_path: &Path, ledger_path: &Path) -> Result<()> {
    let markup = fs::read_to_string(catalog_path)
        .with_context(|| format!("reading catalog {catalog_path:?}"))?;
    let store = JsonLedgerStore::new(PathBuf::from(ledger_path));
    let mut ledger = store.load();

    let prober = ReqwestProber::new(ProbeSettings::default());
    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    let outcome = runtime.block_on(reconcile_catalog(
        &markup,
        &mut ledger,
        &prober,
        &ExtractSettings::default(),
    ));

    write_atomic(catalog_path, &outcome.pruned_markup)
        .with_context(|| format!("writing pruned catalog {catalog_path:?}"))?;
    store
        .save(&ledger)
        .with_context(|| format!("writing ledger {ledger_path:?}"))?;

    for record in &outcome.report {
        println!("{}: {} ({})", record.id, record.decision, record.source);
    }
    println!(
        "scanned {} blocks: {} entries added, {} removed",
        outcome.summary.scanned, outcome.summary.added, outcome.summary.removed
    );
    Ok(())
}

fn reset(ledger_path: &Path, ids: &[String]) -> Result<()> {
    let store = JsonLedgerStore::new(PathBuf::from(ledger_path));
    let mut ledger = store.load();
    ledger.reset_all(ids.iter().cloned());
    store
        .save(&ledger)
        .with_context(|| format!("writing ledger {ledger_path:?}"))?;
    println!("reset {} entries", ids.len());
    Ok(())
}

fn init_logging() {
    // Ignore the error if a logger is already set.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
