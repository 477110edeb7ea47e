use super::*;

#[test]
fn dir_name_marks_test_packages() {
    assert_eq!(package_dir_name("JLP", 5, BuildMode::Final), "JLP-5");
    assert_eq!(package_dir_name("JLP", 5, BuildMode::Test), "JLP-test-5");
}

#[test]
fn layout_paths() {
    let paths = PackagePaths::new(PathBuf::from("/export/JLP-5"));
    assert_eq!(paths.mets_path(), PathBuf::from("/export/JLP-5/content/mets.xml"));
    assert_eq!(
        paths.provenance_path(),
        PathBuf::from("/export/JLP-5/content/streams/publication_process.xml")
    );
    assert_eq!(
        paths.bucket_dir(Bucket::PeerReview),
        PathBuf::from("/export/JLP-5/content/streams/peer_review")
    );
}
