//! Sample journal records and storage for unit tests.
use crate::config::{default_config, ExportConfig, GenreMap};
use crate::inventory::PackageInventory;
use crate::provider::snapshot::Snapshot;
use crate::provider::{MetadataProvider, SnapshotProvider};
use chrono::NaiveDate;
use serde_json::json;
use std::fs;
use std::path::Path;

pub fn build_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

/// Submission 5 in journal `jlp`: two linked galleys plus one without content,
/// manuscript 10, proofs 11 and 12, one review round with two assignments.
pub fn sample_snapshot() -> Snapshot {
    serde_json::from_value(json!({
        "schema_version": 1,
        "journals": [{
            "id": 1,
            "path": "jlp",
            "acronym": {"en_US": "JLP"},
            "name": {"en_US": "Journal of Long Preservation", "de_DE": "Zeitschrift für Langzeitarchivierung"},
            "primary_locale": "en_US",
            "online_issn": "1234-5678",
            "print_issn": ""
        }],
        "issues": [{"id": 1, "journal_id": 1, "volume": "7", "year": "2023"}],
        "users": [
            {"id": 1, "given_name": {"en_US": "Ada"}, "family_name": {"en_US": "Lovelace"}},
            {"id": 2, "given_name": {"en_US": "Grace"}, "family_name": {"en_US": "Hopper"}},
            {"id": 3, "given_name": {"en_US": "Alan"}, "family_name": {"en_US": "Turing"}},
            {"id": 4, "given_name": {"en_US": "Emmy"}, "family_name": {"en_US": "Noether"}}
        ],
        "submissions": [
            {"id": 5, "context_id": 1, "status": 3, "current_publication_id": 50},
            {"id": 6, "context_id": 1, "status": 1, "current_publication_id": 60},
            {"id": 7, "context_id": 2, "status": 3, "current_publication_id": 70}
        ],
        "publications": [{
            "id": 50,
            "submission_id": 5,
            "locale": "en_US",
            "title": {"en_US": "On <i>Archives</i> &amp; Time", "de_DE": "Über Archive"},
            "authors": [
                {"seq": 1, "given_name": {"en_US": "Grace"}, "family_name": {"en_US": "Hopper"}},
                {"seq": 0, "given_name": {"en_US": "Ada"}, "family_name": {"en_US": "Lovelace"}}
            ],
            "abstract": {"en_US": "<p>How archives age.</p>", "de_DE": ""},
            "keywords": {"en_US": ["preservation", "metadata"], "de_DE": ["Archiv"]},
            "supporting_agencies": {"en_US": ["Research Council"]},
            "date_published": "2023-06-01 00:00:00",
            "doi": "10.1234/jlp.5",
            "url_path": "archives-and-time",
            "license_url": "https://creativecommons.org/licenses/by/4.0/",
            "copyright_holder": {"en_US": "Ada Lovelace"},
            "copyright_year": 2023,
            "coverage": {"en_US": "Europe"},
            "issue_id": 1,
            "galleys": [
                {"id": 1, "seq": 0, "label": "PDF", "url_path": "pdf", "submission_file_id": 20},
                {"id": 2, "seq": 1, "label": "Remote", "url_path": "remote"},
                {"id": 3, "seq": 2, "label": "XML", "url_path": "xml", "submission_file_id": 21}
            ]
        }],
        "submission_files": [
            file_row(10, "submission", None, "manuscript.pdf", "application/pdf"),
            file_row(11, "proof", None, "proof.pdf", "application/pdf"),
            file_row(12, "final", None, "final.docx", "application/msword"),
            file_row(13, "copyedit", None, "copyedit.docx", "application/msword"),
            file_row(20, "production_ready", None, "draft.pdf", "application/pdf"),
            file_row(21, "production_ready", None, "article.xml", "text/xml"),
            file_row(30, "review_file", Some(13), "review-copy.pdf", "application/pdf"),
            file_row(31, "review_revision", Some(15), "revised.pdf", "application/pdf"),
            file_row(32, "review_attachment", Some(13), "reviewer-notes.pdf", "application/pdf")
        ],
        "review_rounds": [{"id": 100, "submission_id": 5, "round": 1}],
        "review_round_files": [
            {"owner_id": 100, "submission_file_id": 30},
            {"owner_id": 100, "submission_file_id": 31}
        ],
        "review_assignments": [
            {
                "id": 200,
                "review_round_id": 100,
                "reviewer_id": 3,
                "recommendation": 2,
                "date_assigned": "2023-02-01 09:00:00",
                "date_completed": "2023-02-20 17:30:00"
            },
            {
                "id": 201,
                "review_round_id": 100,
                "reviewer_id": 4,
                "date_assigned": "2023-02-03 09:00:00"
            }
        ],
        "review_files": [{"owner_id": 200, "submission_file_id": 32}],
        "review_comments": [{
            "id": 400,
            "review_assignment_id": 200,
            "author_id": 3,
            "title": "Summary",
            "body": "Section 2 needs work ]]> badly.",
            "date_posted": "2023-02-20 17:00:00"
        }],
        "discussions": [{"id": 300, "submission_id": 5, "seq": 1}],
        "notes": [{
            "id": 500,
            "thread_id": 300,
            "user_id": 2,
            "title": "Layout",
            "contents": "<p>Please fix the figures.</p>",
            "date_created": "2023-04-01 08:00:00"
        }],
        "decisions": [
            {
                "id": 600,
                "submission_id": 5,
                "review_round_id": 100,
                "editor_id": 2,
                "decision": 4,
                "date_decided": "2023-03-01 10:00:00"
            },
            {
                "id": 601,
                "submission_id": 5,
                "review_round_id": 100,
                "editor_id": 2,
                "decision": 2,
                "date_decided": "2023-03-15 10:00:00"
            }
        ]
    }))
    .expect("sample snapshot parses")
}

/// One linked galley (`draft.pdf`), manuscript 10, and one review round with
/// an accept decision and no assignments.
pub fn scenario_snapshot() -> Snapshot {
    let mut snapshot = sample_snapshot();
    snapshot
        .submission_files
        .retain(|file| file.id == 10 || file.id == 20);
    for publication in &mut snapshot.publications {
        publication.galleys.retain(|galley| galley.id == 1);
    }
    snapshot.review_round_files.clear();
    snapshot.review_assignments.clear();
    snapshot.review_files.clear();
    snapshot.review_comments.clear();
    snapshot.decisions.retain(|decision| decision.id == 601);
    snapshot
}

fn file_row(
    id: u64,
    stage: &str,
    genre: Option<u32>,
    name: &str,
    mimetype: &str,
) -> serde_json::Value {
    json!({
        "id": id,
        "submission_id": 5,
        "file_stage": stage,
        "genre_id": genre,
        "path": storage_path(id),
        "mimetype": mimetype,
        "name": {"en_US": name},
        "uploader_user_id": 1,
        "created_at": "2023-01-10 12:00:00",
        "updated_at": "2023-01-11 12:00:00"
    })
}

pub fn storage_path(file_id: u64) -> String {
    format!("journals/1/articles/5/{file_id}.bin")
}

pub fn storage_content(file_id: u64) -> String {
    format!("content of file {file_id}\n")
}

pub fn sample_provider() -> SnapshotProvider {
    SnapshotProvider::new(sample_snapshot()).expect("sample snapshot is consistent")
}

pub fn inventory_from(provider: &SnapshotProvider, submission_id: u64) -> PackageInventory {
    let submission = provider
        .submission(submission_id)
        .expect("query submission")
        .expect("submission exists");
    let publication = provider
        .current_publication(submission_id)
        .expect("query publication")
        .expect("publication exists");
    PackageInventory::collect(provider, submission, publication, &GenreMap::default())
        .expect("collect inventory")
}

pub fn sample_inventory() -> PackageInventory {
    inventory_from(&sample_provider(), 5)
}

/// Write every file of the snapshot below `files_dir`.
pub fn write_storage(files_dir: &Path, snapshot: &Snapshot) {
    for file in &snapshot.submission_files {
        let path = files_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create storage dir");
        }
        fs::write(&path, storage_content(file.id)).expect("write storage file");
    }
}

/// Config rooted in `root`, with storage in `root/files` and packages in
/// `root/export`.
pub fn config_in(root: &Path) -> ExportConfig {
    let mut config = default_config();
    config.files_dir = root.join("files");
    config.export_dir = Some(root.join("export"));
    config.snapshot = None;
    config
}
