use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scenario_core::config::AppConfig;
use scenario_core::event::EventBus;
use scenario_graph::graph::Severity;
use scenario_graph::{
    resolve_with_deadline, validate_context, ReadyTracker, ScenarioContext, ScenarioGraph,
};

#[derive(Parser)]
#[command(name = "scenario", version, about = "Scenario workflow graph resolver")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "scenario.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the execution order and branch marks of a scenario
    Resolve {
        /// Scenario document (JSON with `blocks` and `edges`)
        file: PathBuf,
        /// Emit the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a scenario for cycles, isolated blocks and dangling edges
    Validate {
        /// Scenario document
        file: PathBuf,
    },
    /// Print blocks level by level as their dependencies complete
    Walk {
        /// Scenario document
        file: PathBuf,
    },
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Resolve { file, json } => run_resolve(&config, file, *json).await,
        Commands::Validate { file } => run_validate(&config, file),
        Commands::Walk { file } => run_walk(file),
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "scenario", &mut std::io::stdout());
            Ok(())
        }
    }
}

async fn run_resolve(config: &AppConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let ctx = ScenarioContext::load(file)?;
    let bus = Arc::new(EventBus::new(config.resolver.event_capacity));

    let resolution = match resolve_with_deadline(ctx, config.resolver.clone(), bus).await {
        Ok(r) => r,
        Err(e) if e.is_cycle() => {
            error!(error = %e, "Scenario rejected");
            anyhow::bail!("workflow contains a loop: {}", e);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("Resolution: {}", resolution.id);
    for (i, node) in resolution.order.iter().enumerate() {
        match resolution.branch_marks.get(node) {
            Some(marks) => println!("  {:>3}. {}  [{}]", i + 1, node, marks.join(", ")),
            None => println!("  {:>3}. {}", i + 1, node),
        }
    }
    if !resolution.isolated.is_empty() {
        println!();
        println!("  Not ordered (no connections): {}", resolution.isolated.join(", "));
    }
    Ok(())
}

fn run_validate(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let ctx = ScenarioContext::load(file)?;
    let bus = EventBus::new(config.resolver.event_capacity);
    let report = validate_context(&ctx, &config.validation, &bus);

    for issue in &report.issues {
        let icon = match issue.severity {
            Severity::Error => "[!!]",
            Severity::Warning => "[??]",
        };
        println!("  {} {}", icon, issue.message);
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    println!();
    println!("  {} errors, {} warnings", errors, warnings);
    info!(errors, warnings, file = %file.display(), "Validation finished");

    if !report.is_valid() {
        anyhow::bail!("scenario {} is invalid", file.display());
    }
    Ok(())
}

fn run_walk(file: &Path) -> anyhow::Result<()> {
    let ctx = ScenarioContext::load(file)?;
    let graph = ScenarioGraph::from_context(&ctx)?;
    let starts = graph.start_nodes();

    let levels = ReadyTracker::new(graph.graph()).levels(&starts);
    for (depth, level) in levels.iter().enumerate() {
        let labels: Vec<String> = level
            .iter()
            .map(|id| match ctx.block(id) {
                Some(block) => format!("{} ({})", id, block.node_type),
                None => id.clone(),
            })
            .collect();
        println!("  step {}: {}", depth + 1, labels.join(", "));
    }

    let walked: usize = levels.iter().map(Vec::len).sum();
    if walked < graph.blocks().len() {
        println!();
        println!(
            "  {} of {} blocks never became ready",
            graph.blocks().len() - walked,
            graph.blocks().len()
        );
    }
    Ok(())
}
