//! Terminal rendering for the ledger and run summaries.

use arrow::util::pretty::pretty_format_batches;
use plenum_core::Ledger;
use plenum_store::ledger::ledger_batch;

use crate::pipeline::{RunStats, SegmentStats};

/// Print the ledger as a table in ledger order, followed by per-flag counts.
pub fn print_ledger(ledger: &Ledger) -> anyhow::Result<()> {
    if ledger.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }
    let batch = ledger_batch(ledger)?;
    println!("{}", pretty_format_batches(&[batch])?);
    println!();
    for (flag, count) in ledger.counts() {
        println!("  {:<18} {count:>6}", flag.as_str());
    }
    println!("  {:<18} {:>6}", "total", ledger.len());
    Ok(())
}

pub fn print_segment_stats(stats: &SegmentStats) {
    println!("=== Segmentation ===");
    row("documents", stats.documents);
    row("skipped", stats.skipped);
    row("dates", stats.dates);
    row("utterances", stats.utterances);
}

pub fn print_run_stats(stats: &RunStats) {
    println!("=== Matching ===");
    row("dates", stats.dates);
    row("matched", stats.matched);
    row("already matched", stats.already_matched);
    row("no matches found", stats.no_matches);
    row("hanging recordings", stats.hanging_recordings);
    row("hanging sessions", stats.hanging_sessions);
    row("records written", stats.records_written);
    if stats.unreadable > 0 {
        row("unreadable inputs", stats.unreadable);
    }
}

fn row(label: &str, value: usize) {
    println!("  {label:<20} {value:>6}");
}
