//! Text and JSON rendering of command results.
//!
//! Text goes to stdout one line per submission; logs stay on stderr.
use crate::batch::{BatchEntry, BatchReport, EntryStatus};
use crate::verify::VerifyReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

pub fn print_json<T: Serialize>(value: &T, what: &str) -> Result<()> {
    let text = serde_json::to_string_pretty(value).with_context(|| format!("serialize {what}"))?;
    println!("{text}");
    Ok(())
}

pub fn print_batch(report: &BatchReport) {
    print!("{}", render_batch(report));
}

pub fn print_verify(report: &VerifyReport) {
    print!("{}", render_verify(report));
}

fn entry_line(entry: &BatchEntry) -> String {
    let id = entry.submission_id;
    let root = entry
        .package_root
        .as_ref()
        .map(|root| root.display().to_string())
        .unwrap_or_default();
    match entry.status {
        EntryStatus::Exported => {
            format!("exported {id} -> {root} ({} files)", entry.staged_files)
        }
        EntryStatus::AlreadyExported => {
            format!("skipped {id}: already exported at {root} (use --overwrite)")
        }
        EntryStatus::NotFound => format!("skipped {id}: submission not found"),
        EntryStatus::Failed => format!(
            "failed {id}: {}",
            entry.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

pub fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let _ = writeln!(out, "{}", entry_line(entry));
        for diagnostic in &entry.diagnostics {
            let _ = writeln!(out, "  warning: {diagnostic}");
        }
    }
    let _ = writeln!(
        out,
        "journal {} ({}): {} exported, {} not exported",
        report.journal,
        report.mode,
        report.exported,
        report.not_exported()
    );
    out
}

pub fn render_verify(report: &VerifyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "package: {}", report.package_root.display());
    let _ = writeln!(out, "staged files: {}", report.staged_files);
    for diagnostic in &report.diagnostics {
        let _ = writeln!(out, "  malformed: {diagnostic}");
    }
    for issue in &report.identifier_issues {
        let _ = writeln!(out, "  identifier {}: {}", issue.object_id, issue.problem);
    }
    for dangling in &report.dangling_references {
        let _ = writeln!(
            out,
            "  missing target in {}: {}",
            dangling.document, dangling.reference
        );
    }
    for path in &report.unreferenced_files {
        let _ = writeln!(out, "  unreferenced: {path}");
    }
    let verdict = if report.is_ok() { "ok" } else { "problems found" };
    let _ = writeln!(out, "result: {verdict}");
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
