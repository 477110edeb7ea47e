use super::*;
use crate::fixtures::{inventory_from, sample_provider, sample_snapshot};
use crate::provider::SnapshotProvider;

fn collect(provider: &SnapshotProvider) -> PackageInventory {
    inventory_from(provider, 5)
}

fn ids(files: &[PackageFile]) -> Vec<u64> {
    files.iter().map(PackageFile::id).collect()
}

#[test]
fn galleys_without_content_do_not_consume_slots() {
    let inventory = collect(&sample_provider());
    let galleys: Vec<(&str, &str)> = inventory
        .galleys
        .iter()
        .map(|entry| (entry.id.as_str(), entry.file.name.as_str()))
        .collect();
    assert_eq!(galleys, vec![("galley", "draft.pdf"), ("galley1", "article.xml")]);
}

#[test]
fn galley_identifiers_follow_slot_order() {
    let names: Vec<String> = (0..4).map(galley_identifier).collect();
    assert_eq!(names, ["galley", "galley1", "galley2", "galley3"]);
}

#[test]
fn flat_file_list_fills_manuscript_and_proof_buckets() {
    let inventory = collect(&sample_provider());
    assert_eq!(ids(&inventory.manuscript), vec![10]);
    assert_eq!(ids(&inventory.publication_proof), vec![11, 12]);
    let all: Vec<u64> = Bucket::ALL
        .into_iter()
        .flat_map(|bucket| ids(inventory.bucket(bucket)))
        .collect();
    let unique: BTreeSet<u64> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len(), "no file in two buckets");
    assert!(!unique.contains(&13), "copyedit files are excluded");
}

#[test]
fn review_index_shares_round_files_and_dedups_bucket() {
    let inventory = collect(&sample_provider());
    let round = &inventory.review.rounds()[0];
    assert_eq!(round.assignments.len(), 2);
    assert_eq!(
        round.decision.as_ref().map(|d| d.decision),
        Some(crate::model::DecisionCode::Accept)
    );

    let first = inventory.review.round_files(100, ReviewRole::Reviewed);
    let second = inventory.review.round_files(100, ReviewRole::Reviewed);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ids(&first), vec![30]);
    assert_eq!(
        ids(&inventory.review.round_files(100, ReviewRole::Revised)),
        vec![31]
    );
    assert!(inventory.review.round_files(999, ReviewRole::Reviewed).is_empty());

    assert_eq!(ids(&inventory.peer_review), vec![30, 31, 32]);
}

#[test]
fn peer_review_bucket_lists_shared_files_once() {
    let mut snapshot = sample_snapshot();
    snapshot
        .review_files
        .push(crate::provider::snapshot::FileLink {
            owner_id: 201,
            submission_file_id: 30,
        });
    let provider = SnapshotProvider::new(snapshot).expect("provider");
    let inventory = collect(&provider);
    assert_eq!(ids(&inventory.peer_review), vec![30, 31, 32]);
}

#[test]
fn people_and_notes_are_resolved() {
    let inventory = collect(&sample_provider());
    assert_eq!(inventory.person(Some(3)), Some("Alan Turing"));
    assert_eq!(inventory.person(Some(99)), None);
    assert_eq!(inventory.person(None), None);
    assert_eq!(inventory.notes.len(), 1);
    let source = inventory.source.as_ref().expect("journal source");
    assert_eq!(source.volume.as_deref(), Some("7"));
    assert_eq!(source.journal.issns().collect::<Vec<_>>(), vec!["1234-5678"]);
}

#[test]
fn bucket_paths_and_ids() {
    let inventory = collect(&sample_provider());
    let file = &inventory.manuscript[0];
    assert_eq!(Bucket::Manuscript.object_id(file.id()), "manuscript-10");
    assert_eq!(
        Bucket::Manuscript.relative_path(file),
        "manuscript/10/manuscript.pdf"
    );
    assert_eq!(Bucket::PeerReview.to_string(), "peer_review");
}
