//! `verify` and `init-config` through the `jsip` binary.

mod common;

use common::{json_stdout, jsip_bare, stderr, stdout, Workspace};
use std::fs;

fn built(workspace: &Workspace) -> std::path::PathBuf {
    let output = workspace.jsip(&["build", "--journal", "jlp", "5"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    workspace.package_root("JLP-5")
}

#[test]
fn verify_accepts_fresh_package() {
    let workspace = Workspace::create();
    let root = built(&workspace);
    let package = root.to_string_lossy().into_owned();

    let output = jsip_bare(&["verify", "--package", &package, "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report = json_stdout(&output);
    assert_eq!(report["staged_files"], 5);
    assert_eq!(report["dangling_references"], serde_json::json!([]));
    assert_eq!(report["unreferenced_files"], serde_json::json!([]));
}

#[test]
fn verify_reports_missing_stream_file() {
    let workspace = Workspace::create();
    let root = built(&workspace);
    fs::remove_file(root.join("content/streams/publication_proof/11/proof.pdf"))
        .expect("remove staged file");
    let package = root.to_string_lossy().into_owned();

    let output = jsip_bare(&["verify", "--package", &package]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("missing target in mets.xml: publication_proof/11/proof.pdf"));
    assert!(text.contains("missing target in publication_process.xml: publication_proof/11/proof.pdf"));
    assert!(text.ends_with("result: problems found\n"));
}

#[test]
fn verify_rejects_plain_directory() {
    let workspace = Workspace::create();
    let dir = workspace.root().to_string_lossy().into_owned();
    let output = jsip_bare(&["verify", "--package", &dir]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not a package"));
}

#[test]
fn init_config_writes_stub_once() {
    let workspace = Workspace::create();
    let out = workspace.root().join("conf/jsip.json");
    let out_arg = out.to_string_lossy().into_owned();

    let first = jsip_bare(&["init-config", "--out", &out_arg]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let stub: serde_json::Value =
        serde_json::from_slice(&fs::read(&out).expect("read stub")).expect("stub is JSON");
    assert_eq!(stub["schema_version"], 1);
    assert_eq!(stub["exportable_status"], 3);
    assert_eq!(stub["genres"]["reviewed_manuscript"], 13);

    let second = jsip_bare(&["init-config", "--out", &out_arg]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("use --force"));

    let forced = jsip_bare(&["init-config", "--out", &out_arg, "--force"]);
    assert!(forced.status.success(), "stderr: {}", stderr(&forced));
}
