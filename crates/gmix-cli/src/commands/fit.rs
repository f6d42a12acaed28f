//! Fit a model to a recorded observation stream.
//!
//! Input is JSON lines, one observation per line:
//!
//! ```text
//! {"label": 0, "density": 0.1, "thresh": 0.2, "value": [1.0, 2.0], "t": 0.5}
//! ```
//!
//! `t` is optional and in seconds; when present it drives the model clock
//! so that cluster expiry follows the recording rather than wall time.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use gmix::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::config::Config;

/// One line of the input stream.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub label: usize,
    pub density: f64,
    pub thresh: f64,
    pub value: [f64; 2],
    #[serde(default)]
    pub t: Option<f64>,
}

/// Result of feeding a stream into a model. Lifecycle counts live in the
/// model's own `ModelStats`.
pub struct FitSummary {
    pub records: usize,
    pub rejected: usize,
}

pub fn run(input: &str, name: Option<String>, snapshot: Option<String>) -> Result<()> {
    let path = Path::new(input);
    if !path.exists() {
        bail!("Input does not exist: {}", path.display());
    }

    let config = Config::load()?;
    let name = name.unwrap_or_else(|| config.fit.name.clone());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let records = parse_records(&content)
        .with_context(|| format!("Failed to parse: {}", path.display()))?;
    if records.is_empty() {
        bail!("No observations in {}", path.display());
    }

    println!(
        "{} Fitting {} observations into model {}...",
        "→".blue(),
        records.len().to_string().cyan(),
        name.cyan()
    );

    let mut model = Model::with_clock(&name, config.model.clone(), ManualClock::new())?;

    let pb = if config.fit.progress {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let summary = fit_records(&mut model, &records, |report| {
        pb.set_message(format!("{} clusters", report.num_clusters));
        pb.inc(1);
    });
    pb.finish_with_message("done");

    model.weigh_clusters();
    print_summary(&model, &summary);

    if let Some(out) = snapshot {
        let json = model.snapshot().to_json()?;
        std::fs::write(&out, json)
            .with_context(|| format!("Failed to write snapshot: {}", out))?;
        println!("{} Snapshot written to {}", "✓".green(), out.cyan());
    }

    Ok(())
}

/// Parse JSON lines, skipping blank lines. Line numbers in errors are
/// 1-based.
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Record =
            serde_json::from_str(line).with_context(|| format!("line {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Progress passed to the per-record callback.
pub struct Progress {
    pub num_clusters: usize,
}

/// Feed every record into `model`. Observations the model rejects are
/// logged and counted, not fatal.
pub fn fit_records<F>(
    model: &mut Model<ManualClock>,
    records: &[Record],
    mut on_record: F,
) -> FitSummary
where
    F: FnMut(&Progress),
{
    let mut summary = FitSummary {
        records: records.len(),
        rejected: 0,
    };

    for (i, record) in records.iter().enumerate() {
        if let Some(t) = record.t {
            model.clock_mut().set(Timestamp::from_secs(t));
        }
        let observation = Observation::new(record.label, record.density, record.thresh);
        if let Err(e) = model.add_value(&observation, &Vec2::from(record.value)) {
            warn!(record = i, error = %e, "skipping observation");
            summary.rejected += 1;
        }
        on_record(&Progress {
            num_clusters: model.num_clusters(),
        });
    }
    summary
}

fn print_summary(model: &Model<ManualClock>, summary: &FitSummary) {
    let stats = model.stats();

    println!();
    println!("{}", "gmix Model Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Stream".blue().bold());
    println!("  Records:           {}", summary.records.to_string().cyan());
    println!("  Rejected:          {}", summary.rejected.to_string().yellow());
    println!("  Stream end:        t = {:.3}s", model.clock().now().as_secs());
    println!("  Last max error:    {:.4}", model.last_max_error());
    println!("  Last best d²:      {:.4}", model.last_best_distance());
    println!();

    println!("{}", "Lifecycle".blue().bold());
    println!("  Spawned:           {}", stats.clusters_spawned.to_string().green());
    println!("  Pruned:            {}", stats.total_pruned().to_string().cyan());
    println!("    low score:       {}", stats.pruned_low_score);
    println!("    expired:         {}", stats.pruned_expired);
    println!("    degenerate:      {}", stats.pruned_degenerate);
    println!("  Skipped (distant): {}", stats.updates_skipped_distant);
    println!();

    println!(
        "{} ({} of {})",
        "Clusters".blue().bold(),
        model.num_clusters(),
        model.config().max_clusters
    );
    println!(
        "  {:>4}  {:>17}  {:>17}  {:>6}  {:>7}  {:>7}",
        "id", "mean in", "mean out", "score", "primary", "second"
    );
    for c in model.clusters() {
        let mean_in = c.gaussian_in().mean;
        let mean_out = c.gaussian_out().mean;
        println!(
            "  {:>4}  ({:7.3}, {:7.3})  ({:7.3}, {:7.3})  {:6.3}  {:7.3}  {:7.3}",
            c.id().to_string(),
            mean_in.a,
            mean_in.b,
            mean_out.a,
            mean_out.b,
            c.score_value(),
            c.primary_id(),
            c.secondary_id()
        );
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());
}
