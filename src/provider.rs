//! Read-only access to journal records.
//!
//! Builders only see the [`MetadataProvider`] trait; the snapshot provider is
//! the concrete backend used by the CLI.
use crate::model::{
    DiscussionThread, EditorialDecision, Issue, Journal, Note, Publication, ReviewAssignment,
    ReviewComment, ReviewRound, Submission, SubmissionFile,
};
use std::path::PathBuf;
use thiserror::Error;

pub mod snapshot;

pub use snapshot::SnapshotProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("read snapshot {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse snapshot {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported snapshot schema_version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },
    #[error("{table} row references missing {target} {id}")]
    DanglingReference {
        table: &'static str,
        target: &'static str,
        id: u64,
    },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Queries the package builders run against the host's records.
///
/// Sequences come back in the store's retrieval order; builders rely on that
/// order for rounds, assignments, files, and notes.
pub trait MetadataProvider {
    fn journal_by_path(&self, path: &str) -> ProviderResult<Option<Journal>>;
    fn journal(&self, journal_id: u64) -> ProviderResult<Option<Journal>>;
    fn issue(&self, issue_id: u64) -> ProviderResult<Option<Issue>>;

    fn submission(&self, submission_id: u64) -> ProviderResult<Option<Submission>>;
    fn current_publication(&self, submission_id: u64) -> ProviderResult<Option<Publication>>;
    /// Every file of the submission, dependent files included.
    fn submission_files(&self, submission_id: u64) -> ProviderResult<Vec<SubmissionFile>>;
    fn submission_file(&self, file_id: u64) -> ProviderResult<Option<SubmissionFile>>;
    /// Submission ids in the journal with the given status, ascending.
    fn exportable_submissions(&self, journal_id: u64, status: u32) -> ProviderResult<Vec<u64>>;

    fn review_rounds(&self, submission_id: u64) -> ProviderResult<Vec<ReviewRound>>;
    fn review_round_files(&self, round_id: u64, genre_id: u32)
        -> ProviderResult<Vec<SubmissionFile>>;
    fn review_assignments(&self, round_id: u64) -> ProviderResult<Vec<ReviewAssignment>>;
    fn review_assignment_files(
        &self,
        assignment_id: u64,
        genre_id: u32,
    ) -> ProviderResult<Vec<SubmissionFile>>;
    fn review_comments(&self, assignment_id: u64) -> ProviderResult<Vec<ReviewComment>>;
    /// Most recent decision recorded for the round.
    fn latest_decision(&self, round_id: u64) -> ProviderResult<Option<EditorialDecision>>;

    fn discussion_threads(&self, submission_id: u64) -> ProviderResult<Vec<DiscussionThread>>;
    fn thread_notes(&self, thread_id: u64) -> ProviderResult<Vec<Note>>;

    fn user_display_name(&self, user_id: u64, locale: &str) -> ProviderResult<Option<String>>;
}
