//! Command handlers: resolve config, open the snapshot, run, report.
use crate::assembler::SipAssembler;
use crate::batch::{build_all, build_batch, BatchReport};
use crate::cli::{BuildAllArgs, BuildArgs, BuildFlags, GlobalArgs, InitConfigArgs, VerifyArgs};
use crate::config::{
    default_config, default_config_path, resolve_config, validate_config, write_config,
    ExportConfig,
};
use crate::model::Journal;
use crate::output::{print_batch, print_json, print_verify};
use crate::paths::BuildMode;
use crate::provider::{MetadataProvider, SnapshotProvider};
use crate::verify::verify_package;
use anyhow::{anyhow, Context, Result};
use chrono::Local;

/// Config from file (or defaults) with command-line overrides applied.
pub fn effective_config(global: &GlobalArgs) -> Result<ExportConfig> {
    let mut config = resolve_config(global.config.as_deref())?.unwrap_or_else(default_config);
    if let Some(files_dir) = &global.files_dir {
        config.files_dir = files_dir.clone();
    }
    if let Some(export_dir) = &global.export_dir {
        config.export_dir = Some(export_dir.clone());
    }
    if let Some(snapshot) = &global.snapshot {
        config.snapshot = Some(snapshot.clone());
    }
    validate_config(&config)?;
    Ok(config)
}

fn open_provider(config: &ExportConfig) -> Result<SnapshotProvider> {
    let path = config.snapshot.as_deref().ok_or_else(|| {
        anyhow!("no snapshot configured (pass --snapshot or set it in the config)")
    })?;
    let provider = SnapshotProvider::load(path)
        .with_context(|| format!("open metadata snapshot {}", path.display()))?;
    tracing::debug!(snapshot = %path.display(), "loaded metadata snapshot");
    Ok(provider)
}

fn find_journal(provider: &SnapshotProvider, path: &str) -> Result<Journal> {
    provider
        .journal_by_path(path)
        .with_context(|| format!("look up journal {path}"))?
        .ok_or_else(|| anyhow!("journal {path} not found"))
}

fn mode_for(flags: &BuildFlags) -> BuildMode {
    if flags.test {
        BuildMode::Test
    } else {
        BuildMode::Final
    }
}

fn run_with_assembler<F>(global: &GlobalArgs, flags: &BuildFlags, run: F) -> Result<()>
where
    F: FnOnce(
        &SipAssembler<'_, SnapshotProvider>,
        &Journal,
        &ExportConfig,
    ) -> Result<BatchReport>,
{
    let config = effective_config(global)?;
    let provider = open_provider(&config)?;
    let journal = find_journal(&provider, &flags.journal)?;
    let assembler = SipAssembler::new(&provider, &config, Local::now().date_naive());
    let report = run(&assembler, &journal, &config)?;
    if flags.json {
        print_json(&report, "batch report")?;
    } else {
        print_batch(&report);
    }
    if report.has_failures() {
        return Err(anyhow!("{} submission(s) failed to build", report.failed));
    }
    Ok(())
}

pub fn run_build(global: &GlobalArgs, args: BuildArgs) -> Result<()> {
    let mode = mode_for(&args.flags);
    let overwrite = args.flags.overwrite;
    run_with_assembler(global, &args.flags, |assembler, journal, _| {
        Ok(build_batch(assembler, journal, &args.ids, overwrite, mode))
    })
}

pub fn run_build_all(global: &GlobalArgs, args: BuildAllArgs) -> Result<()> {
    let mode = mode_for(&args.flags);
    let overwrite = args.flags.overwrite;
    run_with_assembler(global, &args.flags, |assembler, journal, config| {
        build_all(assembler, journal, config.exportable_status, overwrite, mode)
    })
}

pub fn run_verify(args: VerifyArgs) -> Result<()> {
    let report = verify_package(&args.package)?;
    if args.json {
        print_json(&report, "verify report")?;
    } else {
        print_verify(&report);
    }
    if !report.is_ok() {
        return Err(anyhow!("package {} has problems", args.package.display()));
    }
    Ok(())
}

pub fn run_init_config(args: InitConfigArgs) -> Result<()> {
    let path = match args.out {
        Some(path) => path,
        None => default_config_path()
            .ok_or_else(|| anyhow!("no user config directory; pass --out"))?,
    };
    write_config(&path, &default_config(), args.force)?;
    println!("wrote {}", path.display());
    Ok(())
}
