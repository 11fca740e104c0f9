use crate::cli::AnalyzeArgs;
use crate::config::{DefaultsConfig, PartialAnalysisConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use pcnminer::engine::progress::ProgressReporter;
use pcnminer::engine::report::{BatchResult, UnitOutcome};
use pcnminer::workflows;
use tracing::{info, warn};

pub async fn run(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    let partial_config = PartialAnalysisConfig::load(&args)?;
    info!("Merging configuration from file and CLI arguments...");
    let request = partial_config.merge_with_cli(&args, &DefaultsConfig::default())?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let callback = progress_handler.get_callback();

    println!(
        "Starting {} analysis in {}...",
        request.family,
        request.working_dir.display()
    );
    info!("Invoking the core analysis workflow...");

    let batch = tokio::task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(callback);
        workflows::analyze::run(&request, &reporter)
    })
    .await
    .map_err(|e| CliError::Worker(e.to_string()))??;

    info!("{} protein(s) processed.", progress_handler.finished_phases());
    print_summary(&batch);
    Ok(())
}

fn print_summary(batch: &BatchResult) {
    info!(
        "Workflow finished: {} completed, {} skipped, {} failed.",
        batch.completed(),
        batch.skipped(),
        batch.failed()
    );
    for unit in &batch.units {
        let k = unit.k.or(unit.requested_k).map(|k| format!(" k={}", k)).unwrap_or_default();
        match &unit.outcome {
            UnitOutcome::Skipped { reason } => {
                println!("  - {} {}{}: skipped ({})", unit.protein, unit.algorithm, k, reason);
            }
            UnitOutcome::Failed { error } => {
                warn!("{} {}{} failed: {}", unit.protein, unit.algorithm, k, error);
                println!("  ✗ {} {}{}: {}", unit.protein, unit.algorithm, k, error);
            }
            UnitOutcome::Completed { .. } => {}
        }
    }
    println!(
        "Analysis complete: {} completed, {} skipped, {} failed.",
        batch.completed(),
        batch.skipped(),
        batch.failed()
    );
}
