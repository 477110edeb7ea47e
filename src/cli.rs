//! CLI argument parsing for package builds.
//!
//! The CLI only gathers inputs; config resolution and building live in
//! `workflow` so the same core can be driven from tests.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "jsip",
    version,
    about = "Build archival submission packages for journal articles",
    after_help = "Commands:\n  build --journal <path> <ID>...   Build packages for the given submissions\n  build-all --journal <path>       Build every exportable submission\n  verify --package <dir>           Re-read a package and check its references\n  init-config --out <path>         Write a config stub\n\nExamples:\n  jsip init-config --out ./jsip.json\n  jsip --config ./jsip.json build --journal jlp 5 6\n  jsip --config ./jsip.json build-all --journal jlp --test --json\n  jsip verify --package ./files/sip/JLP-5",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to the user config dir, then built-in defaults)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Storage root that submission file paths are relative to
    #[arg(long, global = true, value_name = "DIR")]
    pub files_dir: Option<PathBuf>,

    /// Directory that receives packages
    #[arg(long, global = true, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Metadata snapshot JSON
    #[arg(long, global = true, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Log build steps to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Build(BuildArgs),
    BuildAll(BuildAllArgs),
    Verify(VerifyArgs),
    InitConfig(InitConfigArgs),
}

/// Flags shared by both build commands.
#[derive(Args, Debug, Clone)]
pub struct BuildFlags {
    /// Journal path (URL segment) the submissions belong to
    #[arg(long, value_name = "PATH")]
    pub journal: String,

    /// Rebuild packages that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Write test packages (`<acronym>-test-<id>`)
    #[arg(long)]
    pub test: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Build packages for specific submissions")]
pub struct BuildArgs {
    #[command(flatten)]
    pub flags: BuildFlags,

    /// Submission ids
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Build packages for every exportable submission of a journal")]
pub struct BuildAllArgs {
    #[command(flatten)]
    pub flags: BuildFlags,
}

#[derive(Parser, Debug)]
#[command(about = "Check a package's documents and file references")]
pub struct VerifyArgs {
    /// Package root (`<export_dir>/<acronym>-<id>`)
    #[arg(long, value_name = "DIR")]
    pub package: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Write a config stub")]
pub struct InitConfigArgs {
    /// Destination (defaults to the user config dir)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
