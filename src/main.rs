mod availability;
mod cli;
mod config;
mod error;
mod fetcher;
mod html;
mod inventory;
mod mirror;
mod negotiator;
mod parser;
mod remote;
mod session;
#[cfg(test)]
mod test_server;
mod types;
mod unpacker;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use config::Settings;
use log::{error, info, LevelFilter};
use mirror::Mirror;
use session::PhenocamClient;
use std::process::ExitCode;
use types::{MirrorSummary, UnitOutcome};

const CONNECTION_LOG_TARGET: &str = "reqwest::connect::verbose";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);
    info!("Starting PhenoCam mirror");

    match run(cli).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Mirror run failed: {:#}", e);
            eprintln!("{}", format!("{e:#}").red());
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` still wins over the flags.
fn init_logging(verbose: bool, debug: bool) {
    logging_builder(verbose, debug).parse_default_env().init();
}

/// `-v` shows progress, `-d` adds debug logs and reqwest's connection dump,
/// which it emits at trace level.
fn logging_builder(verbose: bool, debug: bool) -> env_logger::Builder {
    let level = if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if debug {
        builder.filter_module(CONNECTION_LOG_TARGET, LevelFilter::Trace);
    }
    builder
}

async fn run(cli: Cli) -> anyhow::Result<MirrorSummary> {
    // everything that can fail locally fails before the first request
    let settings = Settings::from_cli(&cli)?;
    let specs = parser::parse_config(&cli.config)
        .await
        .with_context(|| format!("Failed to read config {}", cli.config.display()))?;
    info!("Parsed {} download specs from {}", specs.len(), cli.config.display());

    let client = PhenocamClient::new(settings.clone())?;
    let mut mirror = Mirror::new(client, settings.mirror_root.clone());
    Ok(mirror.run(&specs).await?)
}

fn print_summary(summary: &MirrorSummary) {
    println!("\n{}", "Mirror Summary:".bold());
    println!("Units downloaded: {}", summary.unpacked().to_string().green());
    println!("Units already mirrored: {}", summary.skipped());
    println!("Months without remote data: {}", summary.pruned());
    println!(
        "Units without archive: {}",
        summary.missing_remote().to_string().yellow()
    );
    println!(
        "Files written: {} ({:.2} MB)",
        summary.files_written(),
        summary.bytes_written() as f64 / 1_048_576.0
    );
    println!("Total duration: {:.2?}", summary.total_duration);

    if summary.missing_remote() > 0 {
        println!("\n{}", "No archive returned for:".yellow().bold());
        for report in summary
            .reports
            .iter()
            .filter(|r| r.outcome == UnitOutcome::MissingRemote)
        {
            println!("  {}", report.unit);
        }
    }
}
