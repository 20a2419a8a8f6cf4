//! `sasctl run`
//!
//! Builds a registry from config, follows its events with an
//! [`EventIndexer`] task, and applies a script step by step.

use crate::commands::common;
use crate::script::{self, ScriptStep};
use anyhow::{bail, Context, Result};
use sas_core::RegistryConfig;
use sas_registry::{EventIndexer, RegistryStats, SharedRegistry};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Totals printed after a script finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Steps applied
    pub steps: usize,
    /// Steps that were rejected
    pub rejected: usize,
    /// Registry counters after the last step
    pub stats: RegistryStats,
    /// Devices the indexer saw registered and not removed
    pub indexed_registered: usize,
}

/// Load config and script from disk and run them
pub async fn run(
    config_path: &Path,
    script_path: &Path,
    fail_fast: bool,
    out: &mut impl Write,
) -> Result<RunSummary> {
    let config = common::load_config(config_path)?;
    let source = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let steps = script::parse_script(&source)
        .with_context(|| format!("Invalid script {}", script_path.display()))?;
    run_steps(config, &steps, fail_fast, out).await
}

/// Run already-parsed steps against a fresh registry
pub async fn run_steps(
    config: RegistryConfig,
    steps: &[ScriptStep],
    fail_fast: bool,
    out: &mut impl Write,
) -> Result<RunSummary> {
    let registry = SharedRegistry::new(config).context("Failed to bootstrap registry")?;
    let receiver = registry.subscribe();
    let indexer_task = tokio::spawn(async move {
        let mut indexer = EventIndexer::new();
        indexer.run(receiver).await;
        indexer
    });

    let mut rejected = 0;
    for (index, step) in steps.iter().enumerate() {
        let outcome = script::execute(&registry, step);
        writeln!(out, "{}", script::render_outcome(step, &outcome)?)?;
        // Let the indexer drain before the next step.
        tokio::task::yield_now().await;

        if let Err(err) = outcome {
            rejected += 1;
            if fail_fast {
                bail!("step {index} ({}) rejected: {}", step.op.name(), err.reason());
            }
        }
    }

    let stats = registry.stats();
    drop(registry);
    let indexer = indexer_task.await.context("Event indexer task failed")?;

    let summary = RunSummary {
        steps: steps.len(),
        rejected,
        stats,
        indexed_registered: indexer.registered_count(),
    };
    info!(
        steps = summary.steps,
        rejected = summary.rejected,
        last_sequence = stats.last_sequence,
        "Script finished"
    );
    writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    Ok(summary)
}
