//! Re-reading a published package and checking its cross references.
use crate::mets::{check_identifiers, file_locations, IdentifierIssue};
use crate::paths::{PackagePaths, METS_FILE_NAME, PROVENANCE_FILE_NAME};
use crate::provenance::file_relations;
use crate::staging::collect_files_recursive;
use crate::xml::{parse, Element, XmlDiagnostic};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A reference in one of the documents that does not resolve to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub document: String,
    pub reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub package_root: PathBuf,
    pub diagnostics: Vec<XmlDiagnostic>,
    pub identifier_issues: Vec<IdentifierIssue>,
    pub dangling_references: Vec<DanglingReference>,
    pub staged_files: usize,
    /// Files under `content/streams` that no file entry points at.
    pub unreferenced_files: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
            && self.identifier_issues.is_empty()
            && self.dangling_references.is_empty()
            && self.unreferenced_files.is_empty()
    }
}

pub fn verify_package(package_root: &Path) -> Result<VerifyReport> {
    let paths = PackagePaths::new(package_root.to_path_buf());
    if !paths.mets_path().is_file() {
        return Err(anyhow!(
            "{} is not a package: {} missing",
            package_root.display(),
            paths.mets_path().display()
        ));
    }
    let mut report = VerifyReport {
        package_root: package_root.to_path_buf(),
        diagnostics: Vec::new(),
        identifier_issues: Vec::new(),
        dangling_references: Vec::new(),
        staged_files: 0,
        unreferenced_files: Vec::new(),
    };

    let mut referenced = BTreeSet::new();
    if let Some(mets) = read_document(&paths.mets_path(), METS_FILE_NAME, &mut report)? {
        report.identifier_issues = check_identifiers(&mets);
        for (_, href) in file_locations(&mets) {
            if !paths.stream_target(&href).is_file() {
                report.dangling_references.push(DanglingReference {
                    document: METS_FILE_NAME.to_string(),
                    reference: href.clone(),
                });
            }
            referenced.insert(href);
        }
    }
    if let Some(article) =
        read_document(&paths.provenance_path(), PROVENANCE_FILE_NAME, &mut report)?
    {
        for relation in file_relations(&article) {
            if !paths.stream_target(&relation).is_file() {
                report.dangling_references.push(DanglingReference {
                    document: PROVENANCE_FILE_NAME.to_string(),
                    reference: relation,
                });
            }
        }
    }

    let streams = paths.streams_dir();
    let staged = collect_files_recursive(&streams)?;
    report.staged_files = staged.len();
    for path in staged {
        let relative = path
            .strip_prefix(&streams)
            .with_context(|| format!("relativize {}", path.display()))?
            .to_string_lossy()
            .replace('\\', "/");
        if !referenced.contains(&relative) {
            report.unreferenced_files.push(relative);
        }
    }

    tracing::debug!(
        package = %package_root.display(),
        ok = report.is_ok(),
        staged = report.staged_files,
        "verified package"
    );
    Ok(report)
}

/// Parse one document; a missing or malformed document becomes a diagnostic.
fn read_document(
    path: &Path,
    document: &str,
    report: &mut VerifyReport,
) -> Result<Option<Element>> {
    if !path.is_file() {
        report.diagnostics.push(XmlDiagnostic {
            document: document.to_string(),
            position: 0,
            message: "document missing".to_string(),
        });
        return Ok(None);
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    match parse(&bytes) {
        Ok(root) => Ok(Some(root)),
        Err(err) => {
            report.diagnostics.push(XmlDiagnostic {
                document: document.to_string(),
                position: err.position,
                message: err.message,
            });
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
