mod cmd;
mod output;
mod setup;
mod tools;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use overseer_core::config::Config;
use overseer_core::types::Aggression;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "overseer",
    about = "Phase lifecycle manager: plan, run, and gate project phases kept as markdown",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: overseer.yaml in the working directory)
    #[arg(long, global = true, env = "OVERSEER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory that project names are resolved against
    #[arg(long, global = true, env = "OVERSEER_BASE_PATH")]
    base_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the phase index and phase documents from templates
    Plan {
        /// Project name (relative to the base directory) or path
        project: String,
        /// Template names, in phase order
        #[arg(required = true)]
        phases: Vec<String>,
    },

    /// Check a phase's checklist against the project and start the phase
    Run {
        project: String,
        phase: String,
        /// conservative | normal | bossmode
        #[arg(long, default_value = "normal")]
        aggression: Aggression,
    },

    /// Lock a finished phase and start the next one
    Advance { project: String, phase: String },

    /// Show every phase and the current one
    Status { project: String },

    /// Add, update, or remove phases from a JSON list of modifications
    Update {
        project: String,
        /// Modifications as inline JSON
        #[arg(conflicts_with = "file")]
        modifications: Option<String>,
        /// Read modifications from a JSON file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Move a phase one step forward without checking its checklist
    Step { project: String, phase: String },

    /// Block a phase
    Block {
        project: String,
        phase: String,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Release a blocked phase
    Unblock { project: String, phase: String },

    /// Regenerate missing phase documents and restore missing sections
    Sync {
        project: String,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the index and phase documents for required sections
    Check {
        project: String,
        /// Only check this phase
        #[arg(long)]
        phase: Option<String>,
        /// Exit non-zero when any check fails
        #[arg(long)]
        strict: bool,
    },

    /// List the phase templates available to plan
    Templates,

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run as an MCP stdio server
    Mcp,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Mcp => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = setup::load_config(cli.config.as_deref(), cli.base_dir.as_deref())
        .and_then(|config| dispatch(cli.command, &config, cli.json));

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(command: Commands, config: &Config, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Plan { project, phases } => cmd::plan::run(config, &project, &phases, json),
        Commands::Run {
            project,
            phase,
            aggression,
        } => cmd::run::run(config, &project, &phase, aggression, json),
        Commands::Advance { project, phase } => cmd::advance::run(config, &project, &phase, json),
        Commands::Status { project } => cmd::status::run(config, &project, json),
        Commands::Update {
            project,
            modifications,
            file,
        } => cmd::update::run(
            config,
            &project,
            modifications.as_deref(),
            file.as_deref(),
            json,
        ),
        Commands::Step { project, phase } => cmd::transition::step(config, &project, &phase, json),
        Commands::Block {
            project,
            phase,
            reason,
        } => cmd::transition::block(config, &project, &phase, reason.as_deref(), json),
        Commands::Unblock { project, phase } => {
            cmd::transition::unblock(config, &project, &phase, json)
        }
        Commands::Sync { project, dry_run } => cmd::sync::run(config, &project, dry_run, json),
        Commands::Check {
            project,
            phase,
            strict,
        } => cmd::check::run(config, &project, phase.as_deref(), strict, json),
        Commands::Templates => cmd::templates::run(config, json),
        Commands::Config { subcommand } => cmd::config::run(config, subcommand, json),
        Commands::Mcp => cmd::mcp::run(config),
    }
}
