//! jrxml-scanner - Report Definition Tree Scanner
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use jrxml_scanner::config::{CliArgs, ScanConfig};
use jrxml_scanner::error::ScanError;
use jrxml_scanner::progress::{print_header, print_summary, ProgressReporter};
use jrxml_scanner::tables::export::export_tables;
use jrxml_scanner::walker::ScanCoordinator;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;

    // Print header
    if config.show_progress {
        print_header(
            &config.root_dir.display().to_string(),
            &config.extension,
            config.max_in_flight,
            &config.output_dir.display().to_string(),
        );
    }

    // Create tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(async { run_inner(config).await })
}

async fn run_inner(config: ScanConfig) -> Result<()> {
    let coordinator = ScanCoordinator::new(config.clone());

    // Create progress reporter
    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status("Discovering report files...");
    }

    // Run the scan
    let result = if let Some(ref p) = progress {
        let handle = p.handle();
        coordinator
            .run_with_progress(move |percent, completed, total| {
                handle.update(percent, completed, total);
            })
            .await
    } else {
        coordinator.run().await
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(ScanError::Files { failures }) => {
            if let Some(ref p) = progress {
                p.finish("Scan failed");
            }
            for failure in &failures {
                eprintln!("  {}", failure.error);
            }
            anyhow::bail!("{} file(s) failed to scan; no tables written", failures.len());
        }
        Err(e) => return Err(e).context("Scan failed"),
    };

    // Finish progress
    if let Some(ref p) = progress {
        p.finish("Scan completed");
    }

    // Write the tables
    let written = export_tables(
        &outcome.tables,
        &config.output_dir,
        config.table_selection.as_deref(),
    )
    .context("Failed to write CSV tables")?;

    // Print summary
    if config.show_progress {
        let names: Vec<String> = written
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        print_summary(
            outcome.report.files_scanned,
            outcome.report.rows_emitted,
            outcome.report.duration,
            &config.output_dir.display().to_string(),
            &names,
        );
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("jrxml_scanner=debug,warn")
    } else {
        EnvFilter::new("jrxml_scanner=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
