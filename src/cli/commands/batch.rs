//! Batch command implementation.

use crate::batch::{BatchEvent, BatchRunner};
use crate::cli::output::preview;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the batch command.
pub async fn run_batch(
    input: Option<String>,
    output_dir: Option<String>,
    strategy: Option<String>,
    concurrency: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let input = input
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| settings.batch_input());
    let output_dir = output_dir
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| settings.output_dir());
    let strategy = strategy.unwrap_or_else(|| settings.agent.strategy.clone());
    let concurrency = concurrency.unwrap_or(settings.batch.concurrency);

    if concurrency == 0 {
        anyhow::bail!("--concurrency must be at least 1");
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Batch { input: &input }, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'delve doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let name = orchestrator.strategy(&strategy)?.name();
    let output = output_dir.join(format!("{}.jsonl", name));

    Output::info(&format!(
        "Researching topics from {} with '{}' strategy",
        input.display(),
        name
    ));

    let pb = Output::progress_bar(0, "starting");
    let summary = BatchRunner::new(&orchestrator, name)
        .with_concurrency(concurrency)
        .run(&input, &output, |event| match event {
            BatchEvent::Queued { .. } => pb.inc_length(1),
            BatchEvent::Completed {
                record,
                search_count,
            } => {
                pb.set_message(format!("{} ({} searches)", record.key(), search_count));
                pb.inc(1);
            }
            BatchEvent::Failed { record, error } => {
                pb.println(format!(
                    "  failed {}: {} ({})",
                    record.key(),
                    preview(&record.prompt, 60),
                    error
                ));
                pb.inc(1);
            }
        })
        .await;
    pb.finish_and_clear();

    let summary = summary?;

    if summary.skipped_existing > 0 {
        Output::info(&format!(
            "Skipped {} topic(s) already in {}",
            summary.skipped_existing,
            output.display()
        ));
    }
    if summary.malformed > 0 {
        Output::warning(&format!("Skipped {} malformed input line(s)", summary.malformed));
    }

    if summary.failed > 0 {
        Output::warning(&format!(
            "Completed {} topic(s), {} failed. Re-run to retry the failures.",
            summary.completed, summary.failed
        ));
    } else {
        Output::success(&format!(
            "Completed {} topic(s). Results in {}",
            summary.completed,
            output.display()
        ));
    }

    Ok(())
}
