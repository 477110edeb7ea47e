//! Typed paths into a package layout.
//!
//! The same helper addresses a published package and a tree under
//! construction, so staged paths and final paths never disagree.
use crate::inventory::{Bucket, PackageFile};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const METS_FILE_NAME: &str = "mets.xml";
pub const PROVENANCE_FILE_NAME: &str = "publication_process.xml";

/// Final packages go to the archive; test packages are marked in their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    Final,
    Test,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Final => "final",
            BuildMode::Test => "test",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<acronym>-<id>` or `<acronym>-test-<id>`.
pub fn package_dir_name(acronym: &str, submission_id: u64, mode: BuildMode) -> String {
    match mode {
        BuildMode::Final => format!("{acronym}-{submission_id}"),
        BuildMode::Test => format!("{acronym}-test-{submission_id}"),
    }
}

#[derive(Debug, Clone)]
pub struct PackagePaths {
    root: PathBuf,
}

impl PackagePaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `content/` directory path.
    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    /// Return the `content/streams/` directory path.
    pub fn streams_dir(&self) -> PathBuf {
        self.content_dir().join("streams")
    }

    /// Return the `content/mets.xml` path; its presence marks a finished package.
    pub fn mets_path(&self) -> PathBuf {
        self.content_dir().join(METS_FILE_NAME)
    }

    /// Return the `content/streams/publication_process.xml` path.
    pub fn provenance_path(&self) -> PathBuf {
        self.streams_dir().join(PROVENANCE_FILE_NAME)
    }

    pub fn bucket_dir(&self, bucket: Bucket) -> PathBuf {
        self.streams_dir().join(bucket.as_str())
    }

    /// Destination of a bucket file: `content/streams/<bucket>/<id>/<name>`.
    pub fn bucket_file(&self, bucket: Bucket, file: &PackageFile) -> PathBuf {
        self.streams_dir().join(bucket.relative_path(file))
    }

    /// Galleys sit flat in `content/streams/<name>`.
    pub fn galley_file(&self, file: &PackageFile) -> PathBuf {
        self.streams_dir().join(&file.name)
    }

    /// Resolve a stream-relative reference from either document.
    pub fn stream_target(&self, href: &str) -> PathBuf {
        self.streams_dir().join(href)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
