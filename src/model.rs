//! Journal records read from the metadata provider.
//!
//! Rows mirror the host application's tables closely enough that a snapshot
//! export can be deserialized directly. Integer classifiers from the host
//! (file stages, decision codes, recommendations) are closed enums here.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Text keyed by locale (`en_US`, `de_DE`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Localized(pub BTreeMap<String, String>);

impl Localized {
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .get(locale)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Value for `locale`, falling back to the first non-empty value.
    pub fn preferred(&self, locale: &str) -> Option<&str> {
        self.get(locale)
            .or_else(|| self.non_empty().next().map(|(_, value)| value))
    }

    /// Non-empty values in locale order.
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(locale, value)| (locale.as_str(), value.trim()))
            .filter(|(_, value)| !value.is_empty())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Localized {
    fn from(entries: [(&str, &str); N]) -> Self {
        Localized(
            entries
                .into_iter()
                .map(|(locale, value)| (locale.to_string(), value.to_string()))
                .collect(),
        )
    }
}

/// Lists keyed by locale (keywords, subjects, supporting agencies).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedList(pub BTreeMap<String, Vec<String>>);

impl LocalizedList {
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(locale, values)| {
            values
                .iter()
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(move |value| (locale.as_str(), value))
        })
    }
}

/// Database timestamp with lenient parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Timestamp(value));
            }
        }
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Some(Timestamp(value.naive_local()));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Timestamp)
    }

    /// ISO 8601 calendar date.
    pub fn date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
    }
}

/// Join given and family names for `locale`.
pub fn full_name(given: &Localized, family: &Localized, locale: &str) -> String {
    let parts = [given.preferred(locale), family.preferred(locale)];
    parts.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

/// A journal; the build context is always one journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: u64,
    /// URL path segment used to select the journal on the command line.
    pub path: String,
    #[serde(default)]
    pub acronym: Localized,
    #[serde(default)]
    pub name: Localized,
    pub primary_locale: String,
    #[serde(default)]
    pub online_issn: Option<String>,
    #[serde(default)]
    pub print_issn: Option<String>,
}

impl Journal {
    /// Acronym used in package directory names; falls back to the path.
    pub fn acronym(&self) -> String {
        self.acronym
            .preferred(&self.primary_locale)
            .map(str::to_string)
            .unwrap_or_else(|| self.path.clone())
    }

    pub fn issns(&self) -> impl Iterator<Item = &str> {
        [self.online_issn.as_deref(), self.print_issn.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|issn| !issn.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub journal_id: u64,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub given_name: Localized,
    #[serde(default)]
    pub family_name: Localized,
}

impl User {
    pub fn display_name(&self, locale: &str) -> String {
        full_name(&self.given_name, &self.family_name, locale)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub context_id: u64,
    pub status: u32,
    pub current_publication_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub seq: u32,
    #[serde(default)]
    pub given_name: Localized,
    #[serde(default)]
    pub family_name: Localized,
}

impl Author {
    pub fn full_name(&self, locale: &str) -> String {
        full_name(&self.given_name, &self.family_name, locale)
    }
}

/// Public rendition of a publication, optionally backed by a submission file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Galley {
    pub id: u64,
    #[serde(default)]
    pub seq: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub submission_file_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub id: u64,
    pub submission_id: u64,
    pub locale: String,
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub prefix: Localized,
    #[serde(default)]
    pub subtitle: Localized,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Localized,
    #[serde(default)]
    pub keywords: LocalizedList,
    #[serde(default)]
    pub subjects: LocalizedList,
    #[serde(default)]
    pub supporting_agencies: LocalizedList,
    #[serde(default)]
    pub date_published: Option<Timestamp>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
    #[serde(default)]
    pub copyright_holder: Localized,
    #[serde(default)]
    pub copyright_year: Option<u32>,
    #[serde(default)]
    pub coverage: Localized,
    #[serde(default)]
    pub issue_id: Option<u64>,
    #[serde(default)]
    pub galleys: Vec<Galley>,
}

impl Publication {
    /// Prefix, title and subtitle in `locale`, falling back per part.
    pub fn full_title(&self, locale: &str) -> Option<String> {
        let title = self.title.preferred(locale)?;
        let mut full = match self.prefix.preferred(locale) {
            Some(prefix) => format!("{prefix} {title}"),
            None => title.to_string(),
        };
        if let Some(subtitle) = self.subtitle.preferred(locale) {
            full.push_str(": ");
            full.push_str(subtitle);
        }
        Some(full)
    }

    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().map(str::trim).filter(|doi| !doi.is_empty())
    }

    /// Authors in display order.
    pub fn ordered_authors(&self) -> Vec<&Author> {
        let mut authors: Vec<&Author> = self.authors.iter().collect();
        authors.sort_by_key(|author| author.seq);
        authors
    }

    /// Galleys in display order.
    pub fn ordered_galleys(&self) -> Vec<&Galley> {
        let mut galleys: Vec<&Galley> = self.galleys.iter().collect();
        galleys.sort_by_key(|galley| galley.seq);
        galleys
    }
}

/// Lifecycle stage of a submission file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    #[serde(alias = "manuscript")]
    Submission,
    Note,
    ReviewFile,
    ReviewAttachment,
    Final,
    Copyedit,
    Proof,
    ProductionReady,
    Attachment,
    ReviewRevision,
    Dependent,
    Query,
}

/// Where the flat file list places a file. Review content is reached only
/// through rounds and assignments, never through this mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageClass {
    Manuscript,
    PublicationProof,
    Excluded,
}

impl FileStage {
    pub fn class(self) -> StageClass {
        match self {
            FileStage::Submission => StageClass::Manuscript,
            FileStage::Proof | FileStage::Final => StageClass::PublicationProof,
            FileStage::Note
            | FileStage::ReviewFile
            | FileStage::ReviewAttachment
            | FileStage::Copyedit
            | FileStage::ProductionReady
            | FileStage::Attachment
            | FileStage::ReviewRevision
            | FileStage::Dependent
            | FileStage::Query => StageClass::Excluded,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionFile {
    pub id: u64,
    pub submission_id: u64,
    pub file_stage: FileStage,
    #[serde(default)]
    pub genre_id: Option<u32>,
    /// Path relative to the storage root.
    pub path: String,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub name: Localized,
    #[serde(default)]
    pub creator: Localized,
    #[serde(default)]
    pub uploader_user_id: Option<u64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubmissionFile {
    /// Display name safe to use as a single path segment.
    pub fn file_name(&self, locale: &str) -> String {
        let raw = self
            .name
            .preferred(locale)
            .map(str::to_string)
            .unwrap_or_else(|| format!("file-{}", self.id));
        let cleaned: String = raw
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | '\0' => '_',
                other => other,
            })
            .collect();
        match cleaned.trim() {
            "" | "." | ".." => format!("file-{}", self.id),
            name => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRound {
    pub id: u64,
    pub submission_id: u64,
    #[serde(default)]
    pub round: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAssignment {
    pub id: u64,
    pub review_round_id: u64,
    pub reviewer_id: u64,
    #[serde(default)]
    pub recommendation: Option<ReviewerRecommendation>,
    #[serde(default)]
    pub date_assigned: Option<Timestamp>,
    #[serde(default)]
    pub date_completed: Option<Timestamp>,
}

impl ReviewAssignment {
    /// Completion date, or the assignment date for unfinished reviews.
    pub fn decision_date(&self) -> Option<Timestamp> {
        self.date_completed.or(self.date_assigned)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub review_assignment_id: u64,
    #[serde(default)]
    pub author_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub date_posted: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionThread {
    pub id: u64,
    pub submission_id: u64,
    #[serde(default)]
    pub seq: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub thread_id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub date_created: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorialDecision {
    pub id: u64,
    pub submission_id: u64,
    pub review_round_id: u64,
    #[serde(default)]
    pub editor_id: Option<u64>,
    pub decision: DecisionCode,
    #[serde(default)]
    pub date_decided: Option<Timestamp>,
}

/// Editorial decision codes as stored by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum DecisionCode {
    InternalReview,
    Accept,
    ExternalReview,
    PendingRevisions,
    Resubmit,
    Decline,
    SendToProduction,
    InitialDecline,
    RecommendAccept,
    RecommendPendingRevisions,
    RecommendResubmit,
    RecommendDecline,
    NewExternalRound,
    RevertDecline,
    RevertInitialDecline,
    SkipExternalReview,
    BackFromProduction,
    BackFromCopyediting,
    CancelReviewRound,
    Unknown(u32),
}

const DECISION_CODES: [(u32, DecisionCode); 19] = [
    (1, DecisionCode::InternalReview),
    (2, DecisionCode::Accept),
    (3, DecisionCode::ExternalReview),
    (4, DecisionCode::PendingRevisions),
    (5, DecisionCode::Resubmit),
    (6, DecisionCode::Decline),
    (7, DecisionCode::SendToProduction),
    (8, DecisionCode::InitialDecline),
    (11, DecisionCode::RecommendAccept),
    (12, DecisionCode::RecommendPendingRevisions),
    (13, DecisionCode::RecommendResubmit),
    (14, DecisionCode::RecommendDecline),
    (16, DecisionCode::NewExternalRound),
    (17, DecisionCode::RevertDecline),
    (18, DecisionCode::RevertInitialDecline),
    (19, DecisionCode::SkipExternalReview),
    (29, DecisionCode::BackFromProduction),
    (30, DecisionCode::BackFromCopyediting),
    (31, DecisionCode::CancelReviewRound),
];

impl From<u32> for DecisionCode {
    fn from(code: u32) -> Self {
        DECISION_CODES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, decision)| *decision)
            .unwrap_or(DecisionCode::Unknown(code))
    }
}

impl From<DecisionCode> for u32 {
    fn from(decision: DecisionCode) -> Self {
        if let DecisionCode::Unknown(code) = decision {
            return code;
        }
        DECISION_CODES
            .iter()
            .find(|(_, known)| *known == decision)
            .map(|(code, _)| *code)
            .unwrap_or_default()
    }
}

impl DecisionCode {
    /// Preservation label; unknown codes have none.
    pub fn label(self) -> &'static str {
        match self {
            DecisionCode::InternalReview => "Internal Review",
            DecisionCode::Accept => "Accept Submission",
            DecisionCode::ExternalReview => "Send for Review",
            DecisionCode::PendingRevisions => "Revisions Required",
            DecisionCode::Resubmit => "Resubmit for Review",
            DecisionCode::Decline | DecisionCode::InitialDecline => "Decline Submission",
            DecisionCode::SendToProduction => "Send To Production",
            DecisionCode::RecommendAccept => "Recommend Accept",
            DecisionCode::RecommendPendingRevisions => "Recommend Revisions",
            DecisionCode::RecommendResubmit => "Recommend Resubmit",
            DecisionCode::RecommendDecline => "Recommend Decline",
            DecisionCode::NewExternalRound => "New Review Round",
            DecisionCode::RevertDecline | DecisionCode::RevertInitialDecline => "Revert Decline",
            DecisionCode::SkipExternalReview => "Accept and Skip Review",
            DecisionCode::BackFromProduction => "Back to Copyediting",
            DecisionCode::BackFromCopyediting => "Cancel Copyediting",
            DecisionCode::CancelReviewRound => "Cancel Review Round",
            DecisionCode::Unknown(_) => "",
        }
    }
}

/// Reviewer recommendation codes as stored by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ReviewerRecommendation {
    Accept,
    PendingRevisions,
    ResubmitHere,
    ResubmitElsewhere,
    Decline,
    SeeComments,
    Unknown(u32),
}

impl From<u32> for ReviewerRecommendation {
    fn from(code: u32) -> Self {
        match code {
            1 => ReviewerRecommendation::Accept,
            2 => ReviewerRecommendation::PendingRevisions,
            3 => ReviewerRecommendation::ResubmitHere,
            4 => ReviewerRecommendation::ResubmitElsewhere,
            5 => ReviewerRecommendation::Decline,
            6 => ReviewerRecommendation::SeeComments,
            other => ReviewerRecommendation::Unknown(other),
        }
    }
}

impl From<ReviewerRecommendation> for u32 {
    fn from(recommendation: ReviewerRecommendation) -> Self {
        match recommendation {
            ReviewerRecommendation::Accept => 1,
            ReviewerRecommendation::PendingRevisions => 2,
            ReviewerRecommendation::ResubmitHere => 3,
            ReviewerRecommendation::ResubmitElsewhere => 4,
            ReviewerRecommendation::Decline => 5,
            ReviewerRecommendation::SeeComments => 6,
            ReviewerRecommendation::Unknown(code) => code,
        }
    }
}

impl ReviewerRecommendation {
    pub fn label(self) -> &'static str {
        match self {
            ReviewerRecommendation::Accept => "Accept Submission",
            ReviewerRecommendation::PendingRevisions => "Revisions Required",
            ReviewerRecommendation::ResubmitHere => "Resubmit for Review",
            ReviewerRecommendation::ResubmitElsewhere => "Resubmit Elsewhere",
            ReviewerRecommendation::Decline => "Decline Submission",
            ReviewerRecommendation::SeeComments => "See Comments",
            ReviewerRecommendation::Unknown(_) => "",
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
