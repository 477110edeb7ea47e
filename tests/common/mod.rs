//! Shared test infrastructure for integration tests.
//!
//! A `Workspace` is a temp directory holding a metadata snapshot, the storage
//! tree it points into, and a config wiring both to an export directory.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// File ids with content in storage: galley 20, manuscript 10, proof 11,
/// reviewed manuscript 30 for submission 5, manuscript 40 for submission 6.
pub const STORED_FILES: [u64; 5] = [10, 11, 20, 30, 40];

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let workspace = Workspace { dir };
        fs::write(
            workspace.snapshot_path(),
            serde_json::to_vec_pretty(&snapshot()).expect("serialize snapshot"),
        )
        .expect("write snapshot");
        for id in STORED_FILES {
            let path = workspace.storage_path(id);
            fs::create_dir_all(path.parent().expect("storage parent")).expect("mkdir");
            fs::write(&path, format!("stored bytes of file {id}\n")).expect("write storage");
        }
        let config = json!({
            "schema_version": 1,
            "files_dir": workspace.files_dir(),
            "export_dir": workspace.export_dir(),
            "snapshot": workspace.snapshot_path(),
        });
        fs::write(
            workspace.config_path(),
            serde_json::to_vec_pretty(&config).expect("serialize config"),
        )
        .expect("write config");
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root().join("files")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.root().join("export")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root().join("snapshot.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("jsip.json")
    }

    pub fn storage_path(&self, file_id: u64) -> PathBuf {
        self.files_dir().join(storage_relative(file_id))
    }

    pub fn package_root(&self, name: &str) -> PathBuf {
        self.export_dir().join(name)
    }

    /// Run `jsip --config <workspace config> <args>`.
    pub fn jsip(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_jsip"))
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("run jsip")
    }
}

/// Run the binary without the workspace config.
pub fn jsip_bare(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jsip"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run jsip")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn json_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!("stdout is not JSON ({err}): {}", stdout(output));
    })
}

/// Every file under `dir` keyed by its `/`-separated relative path.
pub fn read_tree(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut tree = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path
                    .strip_prefix(dir)
                    .expect("under dir")
                    .to_string_lossy()
                    .replace('\\', "/");
                tree.insert(relative, fs::read(&path).expect("read file"));
            }
        }
    }
    tree
}

fn storage_relative(file_id: u64) -> String {
    format!("journals/1/articles/{file_id}.bin")
}

fn file_row(id: u64, submission_id: u64, stage: &str, genre: Option<u32>, name: &str) -> Value {
    json!({
        "id": id,
        "submission_id": submission_id,
        "file_stage": stage,
        "genre_id": genre,
        "path": storage_relative(id),
        "mimetype": "application/pdf",
        "name": {"en_US": name},
        "uploader_user_id": 1,
        "created_at": "2023-01-10 12:00:00",
        "updated_at": "2023-01-11 12:00:00"
    })
}

fn publication(id: u64, submission_id: u64, title: &str, galleys: Value) -> Value {
    json!({
        "id": id,
        "submission_id": submission_id,
        "locale": "en_US",
        "title": {"en_US": title},
        "authors": [{"seq": 0, "given_name": {"en_US": "Ada"}, "family_name": {"en_US": "Lovelace"}}],
        "date_published": "2023-06-01 00:00:00",
        "doi": format!("10.1234/jlp.{submission_id}"),
        "galleys": galleys
    })
}

/// Journal `jlp` (acronym JLP) with submissions 5 and 6 published (status 3)
/// and submission 8 still in review (status 1).
fn snapshot() -> Value {
    json!({
        "schema_version": 1,
        "journals": [{
            "id": 1,
            "path": "jlp",
            "acronym": {"en_US": "JLP"},
            "name": {"en_US": "Journal of Long Preservation"},
            "primary_locale": "en_US"
        }],
        "users": [
            {"id": 1, "given_name": {"en_US": "Ada"}, "family_name": {"en_US": "Lovelace"}},
            {"id": 2, "given_name": {"en_US": "Grace"}, "family_name": {"en_US": "Hopper"}}
        ],
        "submissions": [
            {"id": 5, "context_id": 1, "status": 3, "current_publication_id": 50},
            {"id": 6, "context_id": 1, "status": 3, "current_publication_id": 60},
            {"id": 8, "context_id": 1, "status": 1, "current_publication_id": 80}
        ],
        "publications": [
            publication(50, 5, "Archives & Time", json!([
                {"id": 1, "seq": 0, "label": "PDF", "url_path": "pdf", "submission_file_id": 20}
            ])),
            publication(60, 6, "Second Thoughts", json!([])),
            publication(80, 8, "Under Review", json!([]))
        ],
        "submission_files": [
            file_row(10, 5, "submission", None, "manuscript.pdf"),
            file_row(11, 5, "proof", None, "proof.pdf"),
            file_row(20, 5, "production_ready", None, "article.pdf"),
            file_row(30, 5, "review_file", Some(13), "review-copy.pdf"),
            file_row(40, 6, "submission", None, "second.pdf")
        ],
        "review_rounds": [{"id": 100, "submission_id": 5, "round": 1}],
        "review_round_files": [{"owner_id": 100, "submission_file_id": 30}],
        "decisions": [{
            "id": 600,
            "submission_id": 5,
            "review_round_id": 100,
            "editor_id": 2,
            "decision": 2,
            "date_decided": "2023-03-15 10:00:00"
        }]
    })
}
