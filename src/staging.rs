//! Building a package beside the live one and swapping it into place.
//!
//! Every build writes into a fresh temporary tree inside the export directory.
//! Publishing renames the previous package into that temporary directory,
//! renames the new tree onto the package root, and lets the temporary
//! directory (with the retired tree) be removed on drop. A build that fails
//! before publishing leaves the previous package untouched.
use crate::inventory::{Bucket, GalleyEntry, PackageFile};
use crate::paths::{PackagePaths, PROVENANCE_FILE_NAME};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STAGING_PREFIX: &str = ".staging-";

pub struct PackageStaging {
    temp: TempDir,
    tree: PackagePaths,
    target: PathBuf,
}

impl PackageStaging {
    /// Create an empty package skeleton destined for `target`.
    pub fn begin(export_dir: &Path, target: PathBuf) -> Result<Self> {
        fs::create_dir_all(export_dir)
            .with_context(|| format!("create {}", export_dir.display()))?;
        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(export_dir)
            .with_context(|| format!("create staging dir in {}", export_dir.display()))?;
        let tree = PackagePaths::new(temp.path().join("package"));
        for bucket in Bucket::ALL {
            let dir = tree.bucket_dir(bucket);
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(PackageStaging { temp, tree, target })
    }

    /// Layout of the tree under construction.
    pub fn tree(&self) -> &PackagePaths {
        &self.tree
    }

    /// Swap the staged tree onto the package root and retire the old one.
    pub fn publish(self) -> Result<PathBuf> {
        let retired = self.temp.path().join("retired");
        let replacing = self.target.exists();
        if replacing {
            fs::rename(&self.target, &retired)
                .with_context(|| format!("retire {}", self.target.display()))?;
        }
        if let Err(err) = fs::rename(self.tree.root(), &self.target) {
            if replacing {
                restore_retired(self.temp, &retired, &self.target)
                    .with_context(|| format!("publish {} failed: {err}", self.target.display()))?;
            }
            return Err(err).with_context(|| format!("publish {}", self.target.display()));
        }
        tracing::debug!(
            package = %self.target.display(),
            replaced = replacing,
            "published staged package"
        );
        Ok(self.target)
    }
}

/// Move a retired package back onto its root. If that fails the staging
/// directory is kept on disk, since dropping it would delete the old package.
fn restore_retired(temp: TempDir, retired: &Path, target: &Path) -> Result<()> {
    if let Err(err) = fs::rename(retired, target) {
        let kept = temp.into_path();
        tracing::error!(
            package = %target.display(),
            kept = %kept.display(),
            "previous package could not be restored"
        );
        return Err(err).with_context(|| {
            format!(
                "restore previous package to {}; it is kept at {}",
                target.display(),
                retired.display()
            )
        });
    }
    Ok(())
}

/// Galleys share `content/streams` with the provenance document and the
/// bucket directories. A galley whose name collides with either, or with a
/// different galley file, fails the build.
pub fn check_galley_names(galleys: &[GalleyEntry]) -> Result<()> {
    let mut seen: BTreeMap<&str, &GalleyEntry> = BTreeMap::new();
    for entry in galleys {
        let name = entry.file.name.as_str();
        let reserved = name == PROVENANCE_FILE_NAME
            || Bucket::ALL.iter().any(|bucket| bucket.as_str() == name);
        if reserved {
            return Err(anyhow!(
                "galley {} file name {name:?} is reserved in content/streams",
                entry.galley.id
            ));
        }
        if let Some(other) = seen.insert(name, entry) {
            if other.file.id() != entry.file.id() {
                return Err(anyhow!(
                    "galleys {} and {} both stage a file named {name:?}",
                    other.galley.id,
                    entry.galley.id
                ));
            }
        }
    }
    Ok(())
}

pub fn write_staged_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// One copied content file, addressed relative to `content/streams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub file_id: u64,
    pub relative_path: String,
    pub bytes: u64,
}

/// Copies submission content from storage into a package tree.
pub struct FileStager<'a> {
    files_dir: &'a Path,
    tree: &'a PackagePaths,
}

impl<'a> FileStager<'a> {
    pub fn new(files_dir: &'a Path, tree: &'a PackagePaths) -> Self {
        FileStager { files_dir, tree }
    }

    pub fn stage_galley(&self, file: &PackageFile) -> Result<StagedFile> {
        let bytes = self.copy(file, &self.tree.galley_file(file))?;
        Ok(StagedFile {
            file_id: file.id(),
            relative_path: file.name.clone(),
            bytes,
        })
    }

    pub fn stage(&self, file: &PackageFile, bucket: Bucket) -> Result<StagedFile> {
        let bytes = self.copy(file, &self.tree.bucket_file(bucket, file))?;
        Ok(StagedFile {
            file_id: file.id(),
            relative_path: bucket.relative_path(file),
            bytes,
        })
    }

    /// Copy one file and confirm the byte count; missing sources fail.
    fn copy(&self, file: &PackageFile, dest: &Path) -> Result<u64> {
        let source = self.files_dir.join(&file.file.path);
        let expected = fs::metadata(&source)
            .with_context(|| {
                format!(
                    "missing content for submission file {} at {}",
                    file.id(),
                    source.display()
                )
            })?
            .len();
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let copied = fs::copy(&source, dest)
            .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
        if copied != expected {
            return Err(anyhow!(
                "short copy of submission file {}: {copied} of {expected} bytes",
                file.id()
            ));
        }
        Ok(copied)
    }
}

pub fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_files_recursive(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
