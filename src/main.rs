use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod assembler;
mod batch;
mod cli;
mod config;
mod dublin_core;
#[cfg(test)]
mod fixtures;
mod inventory;
mod mets;
mod model;
mod output;
mod paths;
mod provenance;
mod provider;
mod staging;
mod text;
mod verify;
mod workflow;
mod xml;

use cli::{Command, RootArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_logging(args.global.verbose);

    match args.command {
        Command::Build(build) => workflow::run_build(&args.global, build),
        Command::BuildAll(build) => workflow::run_build_all(&args.global, build),
        Command::Verify(verify) => workflow::run_verify(verify),
        Command::InitConfig(init) => workflow::run_init_config(init),
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
