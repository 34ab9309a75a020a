//! KPI dashboard CLI - derive task KPIs and manage saved configurations.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use kpi_configs::{ConfigurationStore, StoreConfig};
use kpi_core::{ConfigId, Field, FieldEdit, SavedConfiguration, TaskMetricsInput};
use kpi_metrics::{DashboardView, MetricsEngine};
use kpi_storage::JsonFileStorage;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kpi")]
#[command(about = "Task KPI dashboard", long_about = None)]
struct Cli {
    /// Directory holding saved configurations
    #[arg(long, global = true, default_value = ".kpi")]
    data_dir: PathBuf,

    /// Storage slot name
    #[arg(long, global = true, default_value = kpi_configs::STORAGE_KEY)]
    key: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Raw form values. Numbers are coerced the way the form does it.
#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Total tasks
    #[arg(long)]
    total: Option<String>,
    /// Tasks in progress
    #[arg(long)]
    in_progress: Option<String>,
    /// Blocked tasks
    #[arg(long)]
    blocked: Option<String>,
    /// Completed tasks
    #[arg(long)]
    completed: Option<String>,
    /// SAST iteration label
    #[arg(long)]
    sast: Option<String>,
}

impl InputArgs {
    fn edits(&self) -> Vec<FieldEdit> {
        [
            (Field::TotalTasks, &self.total),
            (Field::InProgress, &self.in_progress),
            (Field::Blocked, &self.blocked),
            (Field::Completed, &self.completed),
            (Field::SastIteration, &self.sast),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| FieldEdit::new(field, v.clone())))
        .collect()
    }

    fn apply_to(&self, mut base: TaskMetricsInput) -> TaskMetricsInput {
        base.apply_edits(&self.edits());
        base
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Derive KPIs for the given counts
    Metrics {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Save the given counts under a name
    Save {
        /// Configuration name
        #[arg(long)]
        name: String,
        /// Save even if every field is empty
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        input: InputArgs,
    },
    /// List saved configurations
    List,
    /// Show a saved configuration and its KPIs
    Show {
        /// Configuration ID
        id: String,
    },
    /// Update a saved configuration; omitted fields keep their values
    Update {
        /// Configuration ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Delete a saved configuration
    Delete {
        /// Configuration ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli { data_dir, key, json, command } = Cli::parse();
    let engine = MetricsEngine::new();

    match command {
        Commands::Metrics { input } => {
            let view = engine.summarize(&input.apply_to(TaskMetricsInput::default()));
            print_view(&view, json)?;
        }
        Commands::Save { name, force, input } => {
            let store = open_store(&data_dir, &key).await?;
            let data = input.apply_to(TaskMetricsInput::default());
            if !force && !store.has_unsaved_meaningful_data(&data) {
                anyhow::bail!("Nothing to save: all fields are empty (use --force to save anyway)");
            }
            let saved = store.save(&data, &name).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else {
                println!("Saved: {} - {}", saved.id, saved.name);
            }
        }
        Commands::List => {
            let store = open_store(&data_dir, &key).await?;
            let records = store.list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("Saved configurations ({})", records.len());
                for record in &records {
                    println!("  {}", format_record_line(record));
                }
            }
        }
        Commands::Show { id } => {
            let store = open_store(&data_dir, &key).await?;
            let id = ConfigId::from(id);
            let Some(record) = store.get(&id).await else {
                anyhow::bail!("Configuration not found: {}", id);
            };
            if json {
                let value = serde_json::json!({
                    "configuration": record,
                    "view": engine.summarize(&record.data),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Configuration: {}", record.id);
                println!("  Name: {}", record.name);
                println!("  Created: {}", record.created_at);
                println!("  Updated: {}", record.updated_at);
                print_view(&engine.summarize(&record.data), false)?;
            }
        }
        Commands::Update { id, name, input } => {
            let store = open_store(&data_dir, &key).await?;
            let id = ConfigId::from(id);
            let Some(current) = store.get(&id).await else {
                anyhow::bail!("Configuration not found: {}", id);
            };
            let data = input.apply_to(current.data);
            let name = name.unwrap_or(current.name);
            let updated = store.update(&id, &data, &name).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else {
                println!("Updated: {} - {}", updated.id, updated.name);
            }
        }
        Commands::Delete { id } => {
            let store = open_store(&data_dir, &key).await?;
            let id = ConfigId::from(id);
            store.delete(&id).await?;
            if !json {
                println!("Deleted: {}", id);
            }
        }
    }

    Ok(())
}

async fn open_store(data_dir: &Path, key: &str) -> Result<ConfigurationStore<JsonFileStorage>> {
    let storage = JsonFileStorage::new(data_dir).await?;
    let store =
        ConfigurationStore::open_with_config(storage, StoreConfig::default().with_key(key)).await;
    debug!(data_dir = %data_dir.display(), key, "Opened configuration store");
    Ok(store)
}

fn print_view(view: &DashboardView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    let input = &view.input;
    let m = &view.metrics;
    println!(
        "Tasks: {} total | {} in progress | {} blocked | {} completed",
        input.total_tasks, input.in_progress, input.blocked, input.completed
    );
    if m.has_sast_iteration {
        println!("SAST iteration: {}", input.sast_iteration.trim());
    }
    println!("  Completion:   {}% ({})", m.completion_rate, m.productivity_status);
    println!("  In progress:  {}%", m.progress_rate);
    println!("  Blocked:      {}%", m.blocked_rate);
    println!("  Pending:      {} ({}% of total)", m.pending_tasks, m.pending_rate);
    println!("  Efficiency:   {}%", m.efficiency_rate);
    println!("  Velocity:     {}x", m.velocity);
    println!("  Risk:         {}", m.risk_level);

    println!("Distribution");
    for slice in &view.distribution {
        println!("  {:<12} {}", slice.label, slice.count);
    }
    println!("Weekly trend (illustrative)");
    for point in &view.trend {
        println!(
            "  {:<4} completed {:>4}  in progress {:>4}",
            point.day, point.completed, point.in_progress
        );
    }
    Ok(())
}

fn format_record_line(record: &SavedConfiguration) -> String {
    let summary = record.summary();
    format!(
        "{} | {} | {} total, {} done, {} active, {} blocked{} | {}",
        record.id,
        record.name,
        summary.total,
        summary.completed,
        summary.in_progress,
        summary.blocked,
        if summary.has_sast { ", SAST" } else { "" },
        record.updated_at.format("%Y-%m-%d %H:%M"),
    )
}
