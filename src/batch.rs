//! Multi-submission runs that record every outcome and keep going.
use crate::assembler::{BuildOutcome, SipAssembler};
use crate::model::Journal;
use crate::paths::BuildMode;
use crate::provider::MetadataProvider;
use crate::xml::XmlDiagnostic;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Exported,
    AlreadyExported,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub submission_id: u64,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_root: Option<PathBuf>,
    pub staged_files: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<XmlDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    fn new(submission_id: u64, status: EntryStatus) -> Self {
        BatchEntry {
            submission_id,
            status,
            package_root: None,
            staged_files: 0,
            diagnostics: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub journal: String,
    pub mode: BuildMode,
    pub entries: Vec<BatchEntry>,
    pub exported: usize,
    pub already_exported: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl BatchReport {
    fn new(journal: &Journal, mode: BuildMode) -> Self {
        BatchReport {
            journal: journal.path.clone(),
            mode,
            entries: Vec::new(),
            exported: 0,
            already_exported: 0,
            not_found: 0,
            failed: 0,
        }
    }

    fn record(&mut self, entry: BatchEntry) {
        match entry.status {
            EntryStatus::Exported => self.exported += 1,
            EntryStatus::AlreadyExported => self.already_exported += 1,
            EntryStatus::NotFound => self.not_found += 1,
            EntryStatus::Failed => self.failed += 1,
        }
        self.entries.push(entry);
    }

    /// Submissions that were not exported by this run, for any reason.
    pub fn not_exported(&self) -> usize {
        self.already_exported + self.not_found + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Build each id in order; one failure never stops the rest.
pub fn build_batch<P: MetadataProvider + ?Sized>(
    assembler: &SipAssembler<'_, P>,
    journal: &Journal,
    ids: &[u64],
    overwrite: bool,
    mode: BuildMode,
) -> BatchReport {
    let mut report = BatchReport::new(journal, mode);
    for &submission_id in ids {
        let entry = match assembler.build(submission_id, journal, overwrite, mode) {
            Ok(BuildOutcome::Exported(build)) => BatchEntry {
                package_root: Some(build.package_root),
                staged_files: build.staged.len(),
                diagnostics: build.diagnostics,
                ..BatchEntry::new(submission_id, EntryStatus::Exported)
            },
            Ok(BuildOutcome::AlreadyExported { package_root }) => BatchEntry {
                package_root: Some(package_root),
                ..BatchEntry::new(submission_id, EntryStatus::AlreadyExported)
            },
            Ok(BuildOutcome::NotFound) => BatchEntry::new(submission_id, EntryStatus::NotFound),
            Err(err) => {
                let message = error_chain_message(&err);
                tracing::error!(submission_id, error = %message, "package build failed");
                BatchEntry {
                    error: Some(message),
                    ..BatchEntry::new(submission_id, EntryStatus::Failed)
                }
            }
        };
        report.record(entry);
    }
    report
}

/// Every submission of the journal in the exportable status.
pub fn build_all<P: MetadataProvider + ?Sized>(
    assembler: &SipAssembler<'_, P>,
    journal: &Journal,
    status: u32,
    overwrite: bool,
    mode: BuildMode,
) -> Result<BatchReport> {
    let ids = assembler
        .provider()
        .exportable_submissions(journal.id, status)
        .with_context(|| format!("list exportable submissions of {}", journal.path))?;
    tracing::info!(
        journal = %journal.path,
        count = ids.len(),
        "building all exportable submissions"
    );
    Ok(build_batch(assembler, journal, &ids, overwrite, mode))
}

pub fn error_chain_message(err: &anyhow::Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
