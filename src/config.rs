//! Export configuration helpers.
//!
//! The config is a small JSON document naming the storage root, the export
//! directory, and the host-specific constants (genre ids, status filter,
//! package labels) that would otherwise be magic numbers in the builders.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "jsip";
const DEFAULT_EXPORT_DIR_NAME: &str = "sip";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub schema_version: u32,
    /// Storage root that submission file paths are relative to.
    pub files_dir: PathBuf,
    /// Where packages are written; defaults to `<files_dir>/sip`.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Metadata snapshot consumed by the provider.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    #[serde(default = "default_exportable_status")]
    pub exportable_status: u32,
    #[serde(default)]
    pub genres: GenreMap,
    #[serde(default)]
    pub package: PackageLabels,
}

/// Genre ids separating reviewed from revised manuscripts in review rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreMap {
    pub reviewed_manuscript: u32,
    pub revised_manuscript: u32,
}

impl Default for GenreMap {
    fn default() -> Self {
        GenreMap {
            reviewed_manuscript: 13,
            revised_manuscript: 15,
        }
    }
}

/// Role of a file inside a review round or assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewRole {
    Reviewed,
    Revised,
}

impl ReviewRole {
    pub const ALL: [ReviewRole; 2] = [ReviewRole::Reviewed, ReviewRole::Revised];

    /// Provenance element name for files in this role.
    pub fn node_name(self) -> &'static str {
        match self {
            ReviewRole::Reviewed => "reviewed_manuscript",
            ReviewRole::Revised => "revised_manuscript",
        }
    }
}

impl GenreMap {
    pub fn genre_for(&self, role: ReviewRole) -> u32 {
        match role {
            ReviewRole::Reviewed => self.reviewed_manuscript,
            ReviewRole::Revised => self.revised_manuscript,
        }
    }
}

/// Fixed values written into the package-level DNX record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLabels {
    pub submission_reason: String,
    pub ie_entity_type: String,
    pub object_identifier_type: String,
}

impl Default for PackageLabels {
    fn default() -> Self {
        PackageLabels {
            submission_reason: "LZV Bayern".to_string(),
            ie_entity_type: "Monograph".to_string(),
            object_identifier_type: "OJS-Export".to_string(),
        }
    }
}

fn default_exportable_status() -> u32 {
    3
}

/// Build the default config used by `init-config`.
pub fn default_config() -> ExportConfig {
    ExportConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        files_dir: PathBuf::from("files"),
        export_dir: None,
        snapshot: Some(PathBuf::from("snapshot.json")),
        exportable_status: default_exportable_status(),
        genres: GenreMap::default(),
        package: PackageLabels::default(),
    }
}

/// Pretty JSON as written by `init-config`.
pub fn render_config(config: &ExportConfig) -> Result<String> {
    serde_json::to_string_pretty(config).context("serialize config")
}

/// Default location under the user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Config from an explicit path, or from the default location if present.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Option<ExportConfig>> {
    if let Some(path) = explicit {
        return load_config(path).map(Some);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config(&path).map(Some),
        _ => Ok(None),
    }
}

pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ExportConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    Ok(config)
}

/// Persist a config; refuses to replace an existing file unless `force`.
pub fn write_config(path: &Path, config: &ExportConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "config already exists at {} (use --force to replace)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = render_config(config)?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &ExportConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.files_dir.as_os_str().is_empty() {
        return Err(anyhow!("files_dir must not be empty"));
    }
    if config.genres.reviewed_manuscript == config.genres.revised_manuscript {
        return Err(anyhow!(
            "reviewed and revised manuscript genres must differ (both {})",
            config.genres.reviewed_manuscript
        ));
    }
    let labels = [
        ("submission_reason", &config.package.submission_reason),
        ("ie_entity_type", &config.package.ie_entity_type),
        ("object_identifier_type", &config.package.object_identifier_type),
    ];
    for (name, value) in labels {
        if value.trim().is_empty() {
            return Err(anyhow!("package.{name} must not be empty"));
        }
    }
    Ok(())
}

impl ExportConfig {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.files_dir.join(DEFAULT_EXPORT_DIR_NAME))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
