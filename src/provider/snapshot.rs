//! Provider backed by a JSON export of the host's tables.
use super::{MetadataProvider, ProviderError, ProviderResult};
use crate::model::{
    DiscussionThread, EditorialDecision, Issue, Journal, Note, Publication, ReviewAssignment,
    ReviewComment, ReviewRound, Submission, SubmissionFile, User,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Join row linking a round or assignment to a submission file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLink {
    pub owner_id: u64,
    pub submission_file_id: u64,
}

/// One table per record kind, rows in retrieval order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub journals: Vec<Journal>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub submission_files: Vec<SubmissionFile>,
    #[serde(default)]
    pub review_rounds: Vec<ReviewRound>,
    #[serde(default)]
    pub review_round_files: Vec<FileLink>,
    #[serde(default)]
    pub review_assignments: Vec<ReviewAssignment>,
    #[serde(default)]
    pub review_files: Vec<FileLink>,
    #[serde(default)]
    pub review_comments: Vec<ReviewComment>,
    #[serde(default)]
    pub discussions: Vec<DiscussionThread>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub decisions: Vec<EditorialDecision>,
}

#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    snapshot: Snapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> ProviderResult<Self> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(ProviderError::UnsupportedSchema {
                found: snapshot.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        check_references(&snapshot)?;
        Ok(SnapshotProvider { snapshot })
    }

    pub fn load(path: &Path) -> ProviderResult<Self> {
        let bytes = fs::read(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|source| ProviderError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(snapshot)
    }

    fn linked_files(
        &self,
        links: &[FileLink],
        owner_id: u64,
        genre_id: u32,
    ) -> Vec<SubmissionFile> {
        links
            .iter()
            .filter(|link| link.owner_id == owner_id)
            .filter_map(|link| self.file_by_id(link.submission_file_id))
            .filter(|file| file.genre_id == Some(genre_id))
            .cloned()
            .collect()
    }

    fn file_by_id(&self, file_id: u64) -> Option<&SubmissionFile> {
        self.snapshot
            .submission_files
            .iter()
            .find(|file| file.id == file_id)
    }
}

fn check_references(snapshot: &Snapshot) -> ProviderResult<()> {
    let file_ids: BTreeSet<u64> = snapshot.submission_files.iter().map(|f| f.id).collect();
    let submission_ids: BTreeSet<u64> = snapshot.submissions.iter().map(|s| s.id).collect();
    let round_ids: BTreeSet<u64> = snapshot.review_rounds.iter().map(|r| r.id).collect();
    let assignment_ids: BTreeSet<u64> =
        snapshot.review_assignments.iter().map(|a| a.id).collect();

    let dangling = |table: &'static str, target: &'static str, id: u64| {
        ProviderError::DanglingReference { table, target, id }
    };

    for (table, links, owners) in [
        ("review_round_files", &snapshot.review_round_files, &round_ids),
        ("review_files", &snapshot.review_files, &assignment_ids),
    ] {
        for link in links {
            if !file_ids.contains(&link.submission_file_id) {
                return Err(dangling(table, "submission file", link.submission_file_id));
            }
            if !owners.contains(&link.owner_id) {
                return Err(dangling(table, "owner", link.owner_id));
            }
        }
    }
    for publication in &snapshot.publications {
        if !submission_ids.contains(&publication.submission_id) {
            return Err(dangling("publications", "submission", publication.submission_id));
        }
    }
    for assignment in &snapshot.review_assignments {
        if !round_ids.contains(&assignment.review_round_id) {
            return Err(dangling(
                "review_assignments",
                "review round",
                assignment.review_round_id,
            ));
        }
    }
    Ok(())
}

impl MetadataProvider for SnapshotProvider {
    fn journal_by_path(&self, path: &str) -> ProviderResult<Option<Journal>> {
        Ok(self
            .snapshot
            .journals
            .iter()
            .find(|journal| journal.path == path)
            .cloned())
    }

    fn journal(&self, journal_id: u64) -> ProviderResult<Option<Journal>> {
        Ok(self
            .snapshot
            .journals
            .iter()
            .find(|journal| journal.id == journal_id)
            .cloned())
    }

    fn issue(&self, issue_id: u64) -> ProviderResult<Option<Issue>> {
        Ok(self
            .snapshot
            .issues
            .iter()
            .find(|issue| issue.id == issue_id)
            .cloned())
    }

    fn submission(&self, submission_id: u64) -> ProviderResult<Option<Submission>> {
        Ok(self
            .snapshot
            .submissions
            .iter()
            .find(|submission| submission.id == submission_id)
            .cloned())
    }

    fn current_publication(&self, submission_id: u64) -> ProviderResult<Option<Publication>> {
        let Some(submission) = self.submission(submission_id)? else {
            return Ok(None);
        };
        Ok(self
            .snapshot
            .publications
            .iter()
            .find(|publication| {
                publication.id == submission.current_publication_id
                    && publication.submission_id == submission_id
            })
            .cloned())
    }

    fn submission_files(&self, submission_id: u64) -> ProviderResult<Vec<SubmissionFile>> {
        Ok(self
            .snapshot
            .submission_files
            .iter()
            .filter(|file| file.submission_id == submission_id)
            .cloned()
            .collect())
    }

    fn submission_file(&self, file_id: u64) -> ProviderResult<Option<SubmissionFile>> {
        Ok(self.file_by_id(file_id).cloned())
    }

    fn exportable_submissions(&self, journal_id: u64, status: u32) -> ProviderResult<Vec<u64>> {
        let ids: BTreeSet<u64> = self
            .snapshot
            .submissions
            .iter()
            .filter(|submission| {
                submission.context_id == journal_id && submission.status == status
            })
            .map(|submission| submission.id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    fn review_rounds(&self, submission_id: u64) -> ProviderResult<Vec<ReviewRound>> {
        Ok(self
            .snapshot
            .review_rounds
            .iter()
            .filter(|round| round.submission_id == submission_id)
            .cloned()
            .collect())
    }

    fn review_round_files(
        &self,
        round_id: u64,
        genre_id: u32,
    ) -> ProviderResult<Vec<SubmissionFile>> {
        Ok(self.linked_files(&self.snapshot.review_round_files, round_id, genre_id))
    }

    fn review_assignments(&self, round_id: u64) -> ProviderResult<Vec<ReviewAssignment>> {
        Ok(self
            .snapshot
            .review_assignments
            .iter()
            .filter(|assignment| assignment.review_round_id == round_id)
            .cloned()
            .collect())
    }

    fn review_assignment_files(
        &self,
        assignment_id: u64,
        genre_id: u32,
    ) -> ProviderResult<Vec<SubmissionFile>> {
        Ok(self.linked_files(&self.snapshot.review_files, assignment_id, genre_id))
    }

    fn review_comments(&self, assignment_id: u64) -> ProviderResult<Vec<ReviewComment>> {
        Ok(self
            .snapshot
            .review_comments
            .iter()
            .filter(|comment| comment.review_assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    fn latest_decision(&self, round_id: u64) -> ProviderResult<Option<EditorialDecision>> {
        // max_by_key keeps the last of equal keys, so later rows win ties.
        Ok(self
            .snapshot
            .decisions
            .iter()
            .filter(|decision| decision.review_round_id == round_id)
            .max_by_key(|decision| decision.date_decided)
            .cloned())
    }

    fn discussion_threads(&self, submission_id: u64) -> ProviderResult<Vec<DiscussionThread>> {
        let mut threads: Vec<DiscussionThread> = self
            .snapshot
            .discussions
            .iter()
            .filter(|thread| thread.submission_id == submission_id)
            .cloned()
            .collect();
        threads.sort_by_key(|thread| thread.seq);
        Ok(threads)
    }

    fn thread_notes(&self, thread_id: u64) -> ProviderResult<Vec<Note>> {
        Ok(self
            .snapshot
            .notes
            .iter()
            .filter(|note| note.thread_id == thread_id)
            .cloned()
            .collect())
    }

    fn user_display_name(&self, user_id: u64, locale: &str) -> ProviderResult<Option<String>> {
        Ok(self
            .snapshot
            .users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.display_name(locale))
            .filter(|name| !name.is_empty()))
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
