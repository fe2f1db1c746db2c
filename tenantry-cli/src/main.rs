//! Tenantry CLI - migration publishing and configuration tools.
//!
//! # Commands
//!
//! - `tenantry plan` - Show where each migration stub would be published
//! - `tenantry publish` - Copy migration stubs and the config file into the project
//! - `tenantry config` - Print the effective configuration

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tenantry::{ConfigService, TenancyBootstrap};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::{config, plan, publish};
use error::CliResult;

/// Tenantry CLI - multi-tenancy tooling
#[derive(Parser)]
#[command(name = "tenantry")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "CLI tool for Tenantry - publish migrations and inspect configuration")]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} tenantry plan\n  {} tenantry publish --tag migrations\n  {} tenantry config --key resolver",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file (json, toml or .env); may be repeated
    #[arg(short, long = "config", global = true, value_name = "FILE")]
    config_files: Vec<PathBuf>,

    /// Prefix of environment variables that override configuration
    #[arg(long, global = true, default_value = "TENANTRY")]
    env_prefix: String,

    /// Load a .env file before reading the environment
    #[arg(long, global = true, value_name = "FILE")]
    dotenv: Option<PathBuf>,

    /// Project root that publish destinations are relative to
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    project_root: PathBuf,

    /// Directory of migration stubs to publish instead of the bundled ones
    #[arg(long, global = true, value_name = "DIR")]
    stubs: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the migration publish plan
    #[command(alias = "p")]
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish migration stubs and configuration into the project
    Publish {
        /// Only publish one group
        #[arg(long, value_enum)]
        tag: Option<PublishTag>,

        /// Overwrite files that were already published
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    #[command(alias = "c")]
    Config {
        /// Print a single key
        #[arg(short, long)]
        key: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PublishTag {
    Migrations,
    Config,
}

impl GlobalArgs {
    fn config_service(&self) -> CliResult<ConfigService> {
        let mut builder = ConfigService::builder().with_prefix(self.env_prefix.clone());
        for path in &self.config_files {
            builder = builder.add_file(path.clone());
        }
        builder = match &self.dotenv {
            Some(path) => builder.load_dotenv(Some(path.clone())),
            None => builder.load_env(),
        };
        Ok(builder.build()?)
    }

    fn bootstrap(&self, service: &ConfigService) -> CliResult<TenancyBootstrap> {
        let bootstrap = TenancyBootstrap::from_service(service)?
            .with_project_root(self.project_root.clone());
        Ok(match &self.stubs {
            Some(dir) => bootstrap.with_stubs_dir(dir.clone()),
            None => bootstrap,
        })
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let service = cli.global.config_service()?;

    match cli.command {
        Commands::Plan { json } => {
            let bootstrap = cli.global.bootstrap(&service)?;
            plan::run(&bootstrap, json)
        }
        Commands::Publish { tag, force } => {
            let bootstrap = cli.global.bootstrap(&service)?;
            let tag = tag.map(|tag| match tag {
                PublishTag::Migrations => bootstrap.migrations_tag(),
                PublishTag::Config => bootstrap.config_tag(),
            });
            publish::run(&bootstrap, tag.as_deref(), force)
        }
        Commands::Config { key } => config::run(&service, key.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.global.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.global.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

// ========== Output Helpers ==========

fn success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

fn warn(msg: &str) {
    println!("  {} {}", "⚠".yellow().bold(), msg.yellow());
}

fn info(msg: &str) {
    println!("  {} {}", "→".cyan(), msg);
}
