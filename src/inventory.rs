//! Everything one package build needs, gathered once from the provider.
//!
//! The inventory fixes galley identifiers, bucket membership, and staged file
//! names up front so the stager and both document builders agree on them.
use crate::config::{GenreMap, ReviewRole};
use crate::model::{
    EditorialDecision, Galley, Journal, Note, Publication, ReviewAssignment, ReviewComment,
    ReviewRound, StageClass, Submission, SubmissionFile,
};
use crate::provider::MetadataProvider;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Archival content category under `content/streams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    Manuscript,
    PeerReview,
    PublicationProof,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [
        Bucket::Manuscript,
        Bucket::PeerReview,
        Bucket::PublicationProof,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Manuscript => "manuscript",
            Bucket::PeerReview => "peer_review",
            Bucket::PublicationProof => "publication_proof",
        }
    }

    /// Bucket a file joins through the flat file list.
    pub fn for_stage(class: StageClass) -> Option<Bucket> {
        match class {
            StageClass::Manuscript => Some(Bucket::Manuscript),
            StageClass::PublicationProof => Some(Bucket::PublicationProof),
            StageClass::Excluded => None,
        }
    }

    /// Identifier shared by the admin section, file entry, and structure map.
    pub fn object_id(self, file_id: u64) -> String {
        format!("{}-{file_id}", self.as_str())
    }

    /// Path below `content/streams`.
    pub fn relative_path(self, file: &PackageFile) -> String {
        format!("{}/{}/{}", self.as_str(), file.file.id, file.name)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission file with its display name resolved for this package.
#[derive(Debug, Clone)]
pub struct PackageFile {
    pub file: SubmissionFile,
    pub name: String,
}

impl PackageFile {
    pub fn new(file: SubmissionFile, locale: &str) -> Self {
        let name = file.file_name(locale);
        PackageFile { file, name }
    }

    pub fn id(&self) -> u64 {
        self.file.id
    }
}

/// `galley`, `galley1`, `galley2`, ... by slot.
pub fn galley_identifier(slot: usize) -> String {
    if slot == 0 {
        "galley".to_string()
    } else {
        format!("galley{slot}")
    }
}

#[derive(Debug, Clone)]
pub struct GalleyEntry {
    pub id: String,
    pub galley: Galley,
    pub file: PackageFile,
}

#[derive(Debug, Clone, Default)]
struct RoundFiles {
    reviewed: Arc<[PackageFile]>,
    revised: Arc<[PackageFile]>,
}

#[derive(Debug, Clone)]
pub struct AssignmentEntry {
    pub assignment: ReviewAssignment,
    reviewed: Vec<PackageFile>,
    revised: Vec<PackageFile>,
    pub comments: Vec<ReviewComment>,
}

impl AssignmentEntry {
    /// Files the reviewer attached in `role`; round files are not included.
    pub fn own_files(&self, role: ReviewRole) -> &[PackageFile] {
        match role {
            ReviewRole::Reviewed => &self.reviewed,
            ReviewRole::Revised => &self.revised,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundEntry {
    pub round: ReviewRound,
    pub decision: Option<EditorialDecision>,
    pub assignments: Vec<AssignmentEntry>,
}

/// Review rounds with round-level files kept once per round and shared by
/// reference between the round view and every assignment view.
#[derive(Debug, Clone, Default)]
pub struct ReviewIndex {
    rounds: Vec<RoundEntry>,
    files: BTreeMap<u64, RoundFiles>,
}

impl ReviewIndex {
    pub fn rounds(&self) -> &[RoundEntry] {
        &self.rounds
    }

    pub fn round_files(&self, round_id: u64, role: ReviewRole) -> Arc<[PackageFile]> {
        let Some(files) = self.files.get(&round_id) else {
            return Arc::from(Vec::new());
        };
        match role {
            ReviewRole::Reviewed => Arc::clone(&files.reviewed),
            ReviewRole::Revised => Arc::clone(&files.revised),
        }
    }

    /// Each reachable file once, in first-reference order.
    pub fn unique_files(&self) -> Vec<PackageFile> {
        let mut seen = BTreeSet::new();
        let mut unique = Vec::new();
        for entry in &self.rounds {
            let round_id = entry.round.id;
            let mut candidates: Vec<PackageFile> = Vec::new();
            for role in ReviewRole::ALL {
                candidates.extend(self.round_files(round_id, role).iter().cloned());
            }
            for assignment in &entry.assignments {
                for role in ReviewRole::ALL {
                    candidates.extend(assignment.own_files(role).iter().cloned());
                }
            }
            for file in candidates {
                if seen.insert(file.id()) {
                    unique.push(file);
                }
            }
        }
        unique
    }
}

/// Journal and issue data used for source statements.
#[derive(Debug, Clone)]
pub struct JournalSource {
    pub journal: Journal,
    pub volume: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PackageInventory {
    pub submission: Submission,
    pub publication: Publication,
    pub galleys: Vec<GalleyEntry>,
    pub manuscript: Vec<PackageFile>,
    pub peer_review: Vec<PackageFile>,
    pub publication_proof: Vec<PackageFile>,
    pub review: ReviewIndex,
    pub notes: Vec<Note>,
    pub source: Option<JournalSource>,
    people: BTreeMap<u64, String>,
}

impl PackageInventory {
    pub fn collect<P: MetadataProvider + ?Sized>(
        provider: &P,
        submission: Submission,
        publication: Publication,
        genres: &GenreMap,
    ) -> Result<Self> {
        let locale = publication.locale.clone();
        let submission_id = submission.id;

        let galleys = collect_galleys(provider, &publication, &locale)?;

        let mut manuscript = Vec::new();
        let mut publication_proof = Vec::new();
        let files = provider
            .submission_files(submission_id)
            .with_context(|| format!("load files of submission {submission_id}"))?;
        for file in files {
            match Bucket::for_stage(file.file_stage.class()) {
                Some(Bucket::Manuscript) => manuscript.push(PackageFile::new(file, &locale)),
                Some(Bucket::PublicationProof) => {
                    publication_proof.push(PackageFile::new(file, &locale))
                }
                Some(Bucket::PeerReview) | None => {}
            }
        }

        let review = collect_review(provider, submission_id, genres, &locale)?;
        let peer_review = review.unique_files();

        let mut notes = Vec::new();
        let threads = provider
            .discussion_threads(submission_id)
            .with_context(|| format!("load discussions of submission {submission_id}"))?;
        for thread in threads {
            let thread_notes = provider
                .thread_notes(thread.id)
                .with_context(|| format!("load notes of discussion {}", thread.id))?;
            notes.extend(thread_notes);
        }

        let source = collect_source(provider, &publication)?;

        let mut inventory = PackageInventory {
            submission,
            publication,
            galleys,
            manuscript,
            peer_review,
            publication_proof,
            review,
            notes,
            source,
            people: BTreeMap::new(),
        };
        inventory.people = resolve_people(provider, &inventory.referenced_people(), &locale)?;
        tracing::debug!(
            submission_id,
            galleys = inventory.galleys.len(),
            manuscript = inventory.manuscript.len(),
            peer_review = inventory.peer_review.len(),
            publication_proof = inventory.publication_proof.len(),
            "collected package inventory"
        );
        Ok(inventory)
    }

    pub fn bucket(&self, bucket: Bucket) -> &[PackageFile] {
        match bucket {
            Bucket::Manuscript => &self.manuscript,
            Bucket::PeerReview => &self.peer_review,
            Bucket::PublicationProof => &self.publication_proof,
        }
    }

    /// Display name of a referenced user, if one was resolved.
    pub fn person(&self, user_id: Option<u64>) -> Option<&str> {
        user_id.and_then(|id| self.people.get(&id)).map(String::as_str)
    }

    fn referenced_people(&self) -> BTreeSet<u64> {
        let mut ids = BTreeSet::new();
        for bucket in Bucket::ALL {
            ids.extend(self.bucket(bucket).iter().filter_map(|f| f.file.uploader_user_id));
        }
        for round in self.review.rounds() {
            ids.extend(round.decision.as_ref().and_then(|d| d.editor_id));
            for entry in &round.assignments {
                ids.insert(entry.assignment.reviewer_id);
                ids.extend(entry.comments.iter().filter_map(|c| c.author_id));
            }
        }
        ids.extend(self.notes.iter().filter_map(|note| note.user_id));
        ids
    }
}

fn collect_galleys<P: MetadataProvider + ?Sized>(
    provider: &P,
    publication: &Publication,
    locale: &str,
) -> Result<Vec<GalleyEntry>> {
    let mut entries = Vec::new();
    for galley in publication.ordered_galleys() {
        let Some(file_id) = galley.submission_file_id else {
            tracing::debug!(galley_id = galley.id, "galley has no linked content; skipped");
            continue;
        };
        let file = provider
            .submission_file(file_id)
            .with_context(|| format!("load galley file {file_id}"))?;
        let Some(file) = file else {
            tracing::warn!(galley_id = galley.id, file_id, "galley file not found; skipped");
            continue;
        };
        entries.push(GalleyEntry {
            id: galley_identifier(entries.len()),
            galley: galley.clone(),
            file: PackageFile::new(file, locale),
        });
    }
    Ok(entries)
}

fn collect_review<P: MetadataProvider + ?Sized>(
    provider: &P,
    submission_id: u64,
    genres: &GenreMap,
    locale: &str,
) -> Result<ReviewIndex> {
    let wrap = |files: Vec<SubmissionFile>| -> Vec<PackageFile> {
        files
            .into_iter()
            .map(|file| PackageFile::new(file, locale))
            .collect()
    };
    let mut index = ReviewIndex::default();
    let rounds = provider
        .review_rounds(submission_id)
        .with_context(|| format!("load review rounds of submission {submission_id}"))?;
    for round in rounds {
        let round_id = round.id;
        let reviewed = provider
            .review_round_files(round_id, genres.genre_for(ReviewRole::Reviewed))
            .with_context(|| format!("load reviewed files of round {round_id}"))?;
        let revised = provider
            .review_round_files(round_id, genres.genre_for(ReviewRole::Revised))
            .with_context(|| format!("load revised files of round {round_id}"))?;
        index.files.insert(
            round_id,
            RoundFiles {
                reviewed: wrap(reviewed).into(),
                revised: wrap(revised).into(),
            },
        );

        let decision = provider
            .latest_decision(round_id)
            .with_context(|| format!("load decision of round {round_id}"))?;

        let mut assignments = Vec::new();
        let rows = provider
            .review_assignments(round_id)
            .with_context(|| format!("load assignments of round {round_id}"))?;
        for assignment in rows {
            let id = assignment.id;
            let reviewed = provider
                .review_assignment_files(id, genres.genre_for(ReviewRole::Reviewed))
                .with_context(|| format!("load reviewed files of assignment {id}"))?;
            let revised = provider
                .review_assignment_files(id, genres.genre_for(ReviewRole::Revised))
                .with_context(|| format!("load revised files of assignment {id}"))?;
            let comments = provider
                .review_comments(id)
                .with_context(|| format!("load comments of assignment {id}"))?;
            assignments.push(AssignmentEntry {
                assignment,
                reviewed: wrap(reviewed),
                revised: wrap(revised),
                comments,
            });
        }
        index.rounds.push(RoundEntry {
            round,
            decision,
            assignments,
        });
    }
    Ok(index)
}

fn collect_source<P: MetadataProvider + ?Sized>(
    provider: &P,
    publication: &Publication,
) -> Result<Option<JournalSource>> {
    let Some(issue_id) = publication.issue_id else {
        return Ok(None);
    };
    let Some(issue) = provider
        .issue(issue_id)
        .with_context(|| format!("load issue {issue_id}"))?
    else {
        tracing::warn!(issue_id, "issue not found; source metadata omitted");
        return Ok(None);
    };
    let Some(journal) = provider
        .journal(issue.journal_id)
        .with_context(|| format!("load journal {}", issue.journal_id))?
    else {
        tracing::warn!(
            journal_id = issue.journal_id,
            "journal not found; source metadata omitted"
        );
        return Ok(None);
    };
    Ok(Some(JournalSource {
        journal,
        volume: issue.volume.filter(|v| !v.trim().is_empty()),
        year: issue.year.filter(|y| !y.trim().is_empty()),
    }))
}

fn resolve_people<P: MetadataProvider + ?Sized>(
    provider: &P,
    ids: &BTreeSet<u64>,
    locale: &str,
) -> Result<BTreeMap<u64, String>> {
    let mut people = BTreeMap::new();
    for &user_id in ids {
        match provider
            .user_display_name(user_id, locale)
            .with_context(|| format!("resolve user {user_id}"))?
        {
            Some(name) => {
                people.insert(user_id, name);
            }
            None => tracing::warn!(user_id, "user name not resolved"),
        }
    }
    Ok(people)
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
