//! `strata destroy` command

use anyhow::{Context as _, Result};
use colored::Colorize;
use strata_core::{provider, Config, Context, DestroyAction, Status};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "STACK")]
    stack: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "REASON")]
    reason: String,
}

fn status_cell(status: &Status) -> String {
    let text = status.as_str();
    match status {
        Status::Complete(_) | Status::DoesNotExist(_) => text.green().to_string(),
        Status::Skipped(_) => text.yellow().to_string(),
        Status::Failed(_) | Status::Interrupted(_) => text.red().to_string(),
        Status::Pending | Status::Submitted(_) => text.to_string(),
    }
}

/// Destroy the configured stacks (or the named subset).
pub async fn destroy(
    config_path: &str,
    stacks: Vec<String>,
    force: bool,
    concurrency: usize,
    tail: bool,
    provider_override: Option<&str>,
) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    let provider_name = provider_override.unwrap_or(&config.provider).to_string();
    let provider = provider::factory(&provider_name)
        .with_context(|| format!("unknown provider: {}", provider_name))?;

    let context = Context::from_config(&config, stacks);
    let mut action = DestroyAction::new(context, provider);

    // First Ctrl-C interrupts the walk between polls; in-flight remote
    // operations are left to finish on the provider side.
    let cancel = action.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after in-flight polls");
            cancel.cancel();
        }
    });

    let summary = action.run(force, concurrency, tail).await?;

    if summary.outline_only {
        println!("{}", "Plan outline only; re-run with --force to destroy.".yellow());
        return Ok(());
    }

    let rows: Vec<StepRow> = summary
        .results
        .iter()
        .map(|(fqn, status)| StepRow {
            stack: fqn.clone(),
            status: status_cell(status),
            reason: status.reason().unwrap_or("").to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{}", table);

    let failed = summary.failed();
    if failed > 0 {
        println!("{}", format!("{} stack(s) failed to destroy", failed).red());
        std::process::exit(1);
    }

    Ok(())
}
