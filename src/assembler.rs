//! One package build per submission.
//!
//! The assembler checks the idempotency marker, collects the inventory, stages
//! content, renders both documents into the staged tree, and publishes the tree
//! over the previous package in one swap.
use crate::config::ExportConfig;
use crate::inventory::{Bucket, PackageInventory};
use crate::mets::{build_mets, check_identifiers};
use crate::model::Journal;
use crate::paths::{
    package_dir_name, BuildMode, PackagePaths, METS_FILE_NAME, PROVENANCE_FILE_NAME,
};
use crate::provenance::build_provenance;
use crate::provider::MetadataProvider;
use crate::staging::{
    check_galley_names, write_staged_bytes, FileStager, PackageStaging, StagedFile,
};
use crate::xml::{check_well_formed, to_pretty_bytes, Element, XmlDiagnostic};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of a finished build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub submission_id: u64,
    pub mode: BuildMode,
    pub package_root: PathBuf,
    pub staged: Vec<StagedFile>,
    /// Well-formedness problems found after serialization; files are still
    /// written.
    pub diagnostics: Vec<XmlDiagnostic>,
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Exported(BuildReport),
    /// The marker exists and overwrite was not requested; nothing was touched.
    AlreadyExported { package_root: PathBuf },
    /// The id does not resolve to a submission of the requested journal.
    NotFound,
}

pub struct SipAssembler<'a, P: MetadataProvider + ?Sized> {
    provider: &'a P,
    config: &'a ExportConfig,
    build_date: NaiveDate,
}

impl<'a, P: MetadataProvider + ?Sized> SipAssembler<'a, P> {
    pub fn new(provider: &'a P, config: &'a ExportConfig, build_date: NaiveDate) -> Self {
        SipAssembler {
            provider,
            config,
            build_date,
        }
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    /// `<export_dir>/<acronym>[-test]-<id>`.
    pub fn package_root(&self, journal: &Journal, submission_id: u64, mode: BuildMode) -> PathBuf {
        self.config
            .export_dir()
            .join(package_dir_name(&journal.acronym(), submission_id, mode))
    }

    pub fn build(
        &self,
        submission_id: u64,
        journal: &Journal,
        overwrite: bool,
        mode: BuildMode,
    ) -> Result<BuildOutcome> {
        let submission = self
            .provider
            .submission(submission_id)
            .with_context(|| format!("load submission {submission_id}"))?;
        let Some(submission) = submission.filter(|s| s.context_id == journal.id) else {
            tracing::warn!(submission_id, journal = %journal.path, "submission not found");
            return Ok(BuildOutcome::NotFound);
        };

        let package_root = self.package_root(journal, submission_id, mode);
        let marker = PackagePaths::new(package_root.clone()).mets_path();
        if marker.is_file() && !overwrite {
            tracing::info!(
                submission_id,
                package = %package_root.display(),
                "package already exported"
            );
            return Ok(BuildOutcome::AlreadyExported { package_root });
        }

        let publication = self
            .provider
            .current_publication(submission_id)
            .with_context(|| format!("load current publication of submission {submission_id}"))?
            .ok_or_else(|| anyhow!("submission {submission_id} has no current publication"))?;
        let inventory =
            PackageInventory::collect(self.provider, submission, publication, &self.config.genres)?;

        tracing::debug!(
            submission_id,
            package = %package_root.display(),
            %mode,
            "building package"
        );
        let staging = PackageStaging::begin(&self.config.export_dir(), package_root)?;
        let staged = stage_content(&self.config.files_dir, staging.tree(), &inventory)?;

        let mut diagnostics = Vec::new();
        let mets = build_mets(&inventory, &self.config.package, self.build_date);
        let issues = check_identifiers(&mets);
        if !issues.is_empty() {
            let listing: Vec<String> = issues
                .iter()
                .map(|issue| format!("{}: {}", issue.object_id, issue.problem))
                .collect();
            return Err(anyhow!(
                "inconsistent object identifiers in {METS_FILE_NAME}: {}",
                listing.join("; ")
            ));
        }
        diagnostics.extend(write_document(
            &mets,
            &staging.tree().mets_path(),
            METS_FILE_NAME,
        )?);

        let provenance = build_provenance(&inventory);
        diagnostics.extend(write_document(
            &provenance,
            &staging.tree().provenance_path(),
            PROVENANCE_FILE_NAME,
        )?);
        for diagnostic in &diagnostics {
            tracing::warn!(submission_id, %diagnostic, "generated document is not well-formed");
        }

        let package_root = staging.publish()?;
        tracing::info!(
            submission_id,
            package = %package_root.display(),
            files = staged.len(),
            "package exported"
        );
        Ok(BuildOutcome::Exported(BuildReport {
            submission_id,
            mode,
            package_root,
            staged,
            diagnostics,
        }))
    }
}

/// Galleys first, then each bucket in fixed order.
fn stage_content(
    files_dir: &Path,
    tree: &PackagePaths,
    inventory: &PackageInventory,
) -> Result<Vec<StagedFile>> {
    check_galley_names(&inventory.galleys)?;
    let stager = FileStager::new(files_dir, tree);
    let mut staged = Vec::new();
    for entry in &inventory.galleys {
        staged.push(
            stager
                .stage_galley(&entry.file)
                .with_context(|| format!("stage {}", entry.id))?,
        );
    }
    for bucket in Bucket::ALL {
        let files = inventory.bucket(bucket);
        for file in files {
            staged.push(
                stager
                    .stage(file, bucket)
                    .with_context(|| format!("stage {}", bucket.object_id(file.id())))?,
            );
        }
        tracing::debug!(%bucket, files = files.len(), "staged bucket");
    }
    Ok(staged)
}

/// Serialize, check, and write; returns the well-formedness diagnostics.
fn write_document(root: &Element, path: &Path, document: &str) -> Result<Vec<XmlDiagnostic>> {
    let bytes = to_pretty_bytes(root).with_context(|| format!("serialize {document}"))?;
    let diagnostics = check_well_formed(&bytes, document);
    write_staged_bytes(path, &bytes)?;
    Ok(diagnostics)
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
