use super::*;

fn file_named(name: &str) -> SubmissionFile {
    SubmissionFile {
        id: 42,
        submission_id: 1,
        file_stage: FileStage::Submission,
        genre_id: None,
        path: "journals/1/42.pdf".to_string(),
        mimetype: "application/pdf".to_string(),
        name: Localized::from([("en_US", name)]),
        creator: Localized::default(),
        uploader_user_id: None,
        created_at: Timestamp::parse("2023-01-02 03:04:05").expect("timestamp"),
        updated_at: Timestamp::parse("2023-01-02 03:04:05").expect("timestamp"),
    }
}

#[test]
fn stage_classes_cover_archival_buckets() {
    assert_eq!(FileStage::Submission.class(), StageClass::Manuscript);
    assert_eq!(FileStage::Proof.class(), StageClass::PublicationProof);
    assert_eq!(FileStage::Final.class(), StageClass::PublicationProof);
    for stage in [
        FileStage::Note,
        FileStage::ReviewFile,
        FileStage::ReviewAttachment,
        FileStage::Copyedit,
        FileStage::ProductionReady,
        FileStage::Attachment,
        FileStage::ReviewRevision,
        FileStage::Dependent,
        FileStage::Query,
    ] {
        assert_eq!(stage.class(), StageClass::Excluded, "{stage:?}");
    }
}

#[test]
fn file_stage_accepts_manuscript_alias() {
    let stage: FileStage = serde_json::from_str("\"manuscript\"").expect("parse stage");
    assert_eq!(stage, FileStage::Submission);
    let stage: FileStage = serde_json::from_str("\"review_attachment\"").expect("parse stage");
    assert_eq!(stage, FileStage::ReviewAttachment);
}

#[test]
fn timestamp_parses_common_formats() {
    for raw in [
        "2024-05-06 07:08:09",
        "2024-05-06T07:08:09",
        "2024-05-06T07:08:09+00:00",
    ] {
        let ts = Timestamp::parse(raw).expect(raw);
        assert_eq!(ts.date_string(), "2024-05-06");
        assert_eq!(ts.to_string(), "2024-05-06 07:08:09");
    }
    assert_eq!(
        Timestamp::parse("2024-05-06").expect("date").date_string(),
        "2024-05-06"
    );
    assert!(Timestamp::parse("yesterday").is_none());
}

#[test]
fn offset_timestamp_keeps_recorded_date() {
    let ts = Timestamp::parse("2023-05-01T00:30:00+02:00").expect("rfc 3339");
    assert_eq!(ts.date_string(), "2023-05-01");
    assert_eq!(ts.to_string(), "2023-05-01 00:30:00");
}

#[test]
fn localized_prefers_requested_locale() {
    let text = Localized::from([("de_DE", "Titel"), ("en_US", "Title"), ("fr_FR", "  ")]);
    assert_eq!(text.preferred("en_US"), Some("Title"));
    assert_eq!(text.preferred("fr_FR"), Some("Titel"));
    assert_eq!(text.non_empty().count(), 2);
}

#[test]
fn file_name_cannot_escape_its_directory() {
    assert_eq!(file_named("draft.pdf").file_name("en_US"), "draft.pdf");
    assert_eq!(file_named("../etc/passwd").file_name("en_US"), ".._etc_passwd");
    assert_eq!(file_named("..").file_name("en_US"), "file-42");
    assert_eq!(file_named("").file_name("en_US"), "file-42");
}

#[test]
fn decision_codes_round_trip_and_label() {
    assert_eq!(DecisionCode::from(2), DecisionCode::Accept);
    assert_eq!(DecisionCode::Accept.label(), "Accept Submission");
    assert_eq!(u32::from(DecisionCode::CancelReviewRound), 31);
    assert_eq!(DecisionCode::from(99), DecisionCode::Unknown(99));
    assert_eq!(DecisionCode::from(99).label(), "");
    assert_eq!(
        DecisionCode::from(8).label(),
        DecisionCode::Decline.label()
    );
}

#[test]
fn recommendation_labels_follow_reviewer_table() {
    let recommendation: ReviewerRecommendation = serde_json::from_str("4").expect("parse");
    assert_eq!(recommendation.label(), "Resubmit Elsewhere");
    assert_eq!(ReviewerRecommendation::from(0).label(), "");
}

#[test]
fn full_title_joins_prefix_and_subtitle() {
    let publication: Publication = serde_json::from_value(serde_json::json!({
        "id": 1,
        "submission_id": 1,
        "locale": "en_US",
        "prefix": {"en_US": "The"},
        "title": {"en_US": "Study"},
        "subtitle": {"en_US": "A Sequel"}
    }))
    .expect("parse publication");
    assert_eq!(
        publication.full_title("en_US").as_deref(),
        Some("The Study: A Sequel")
    );
}
