//! Doctor command - verify configuration and credentials.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::strategy::StrategyRegistry;
use console::style;
use std::path::PathBuf;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    Output::header("Delve Doctor");
    println!();
    println!("Checking configuration and credentials...\n");

    let mut checks = Vec::new();

    let api_checks = vec![
        check_api_key(&settings.model.api_key_env, "Model API key"),
        check_api_key(&settings.search.api_key_env, "Search API key"),
    ];
    print_section("API Configuration", &api_checks);
    checks.extend(api_checks);

    let config_checks = vec![
        check_config_file(config_path),
        check_strategy(settings),
        check_prompts(settings),
    ];
    print_section("Configuration", &config_checks);
    checks.extend(config_checks);

    let batch_checks = vec![check_batch_input(settings)];
    print_section("Batch", &batch_checks);
    checks.extend(batch_checks);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Delve.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Delve is ready to use.");
    }

    Ok(())
}

/// Check that an API key environment variable is set, without printing it.
fn check_api_key(var: &str, label: &str) -> CheckResult {
    let name = format!("{} ({})", label, var);
    let hint = format!("Set with: export {}='...'", var);
    match std::env::var(var) {
        Ok(key) if key.trim().is_empty() => CheckResult::error(&name, "empty", &hint),
        Ok(key) => CheckResult::ok(&name, &format!("configured ({})", mask(&key))),
        Err(_) => CheckResult::error(&name, "not set", &hint),
    }
}

/// Show only the last four characters of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Check if config file exists.
fn check_config_file(config_path: Option<&PathBuf>) -> CheckResult {
    let config_path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: delve config init",
        )
    }
}

fn check_strategy(settings: &Settings) -> CheckResult {
    let registry = StrategyRegistry::builtin();
    if registry.contains(&settings.agent.strategy) {
        CheckResult::ok(
            "Default strategy",
            &format!(
                "{} (max {} iterations)",
                settings.agent.strategy, settings.agent.max_iterations
            ),
        )
    } else {
        CheckResult::error(
            "Default strategy",
            &format!("'{}' is not registered", settings.agent.strategy),
            "List the available ones with: delve strategies",
        )
    }
}

fn check_prompts(settings: &Settings) -> CheckResult {
    let source = settings
        .prompts
        .custom_dir
        .as_deref()
        .unwrap_or("built-in defaults");
    match Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    ) {
        Ok(_) => CheckResult::ok("Prompts", source),
        Err(e) => CheckResult::error(
            "Prompts",
            &format!("failed to load: {}", e),
            "Check the TOML files in prompts.custom_dir",
        ),
    }
}

fn check_batch_input(settings: &Settings) -> CheckResult {
    let input = settings.batch_input();
    if input.is_file() {
        CheckResult::ok("Batch input", &format!("{}", input.display()))
    } else {
        CheckResult::warning(
            "Batch input",
            &format!("{} (not found)", input.display()),
            "Only needed for 'delve batch'; pass --input or set batch.input",
        )
    }
}
