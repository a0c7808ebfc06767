//! Research command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the research command.
pub async fn run_research(
    topic: &str,
    strategy: Option<String>,
    output: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Research, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'delve doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let strategy = strategy.unwrap_or_else(|| settings.agent.strategy.clone());
    let orchestrator = Orchestrator::new(settings)?;

    // Unknown names fail here, before the spinner and any API call.
    let name = orchestrator.strategy(&strategy)?.name();

    let spinner = Output::spinner(&format!("Researching with '{}' strategy...", name));
    let result = orchestrator.run_pipeline(topic, name).await;
    spinner.finish_and_clear();

    let research = match result {
        Ok(research) => research,
        Err(e) => {
            Output::error(&format!("Research failed: {}", e));
            return Err(e.into());
        }
    };

    let rendered = if json {
        serde_json::to_string_pretty(&research)?
    } else {
        research.report.clone()
    };

    match output {
        Some(path) => {
            let path = Settings::expand_path(&path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, format!("{}\n", rendered))?;
            Output::success(&format!(
                "Report written to {} ({} searches)",
                path.display(),
                research.metadata.search_count
            ));
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}
