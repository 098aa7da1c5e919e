//! fwsim - Firewall rule simulator
//!
//! Command-line front end: loads rules and packets, classifies every packet
//! with first-match-wins semantics, prints a report, and saves the decision
//! log.
//!
//! # Usage
//!
//! ```bash
//! fwsim                                   # run with rules.json / packets.json
//! fwsim run --rules r.json --packets p.json --log out/log.json
//! fwsim check --rules r.json              # validate inputs only
//! fwsim flows --log out/log.json          # render saved decisions
//! fwsim flows --format dot | dot -Tsvg > flows.svg
//! fwsim audit -n 20                       # recent runs, saves, load failures
//! fwsim init-config                       # write a default config file
//! ```

use clap::{Args, Parser, Subcommand};
use fwsim::config::{self, AppConfig, ColorMode};
use fwsim::core::{decision_log, loader};
use fwsim::render::{self, FlowFormat};
use fwsim::report::{self, Summary};
use fwsim::{Error, Result, apply_rules, audit, utils};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

shadow_rs::shadow!(build);

#[derive(Parser)]
#[command(name = "fwsim")]
#[command(about = "Firewall rule simulator - first-match packet classification", long_about = None)]
#[command(version, long_version = build::CLAP_LONG_VERSION)]
struct Cli {
    /// Configuration file (default: <data dir>/config.json)
    #[arg(long, global = true, value_name = "PATH", env = "FWSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct InputArgs {
    /// Rules file (JSON array of {src, dst, port, protocol, action})
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
    /// Packets file (JSON array of {src, dst, port, protocol})
    #[arg(long, value_name = "PATH")]
    packets: Option<PathBuf>,
}

#[derive(Args, Default)]
struct RunArgs {
    #[command(flatten)]
    inputs: InputArgs,
    /// Decision log output file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Don't write the decision log
    #[arg(long)]
    no_log: bool,
    /// Only print the summary, not every decision
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify packets and save the decision log (default)
    Run(RunArgs),
    /// Load and validate rules and packets without classifying
    Check(InputArgs),
    /// Render flows from a saved decision log
    Flows {
        /// Decision log to read
        #[arg(long, value_name = "PATH")]
        log: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = FlowFormat::Text)]
        format: FlowFormat,
        /// When to use colors in text output
        #[arg(long, value_enum)]
        color: Option<ColorMode>,
    },
    /// Show recent audit events, newest first
    Audit {
        /// Number of events to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Write the default configuration to the config path
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = utils::ensure_dirs() {
        warn!("Failed to create data/state directories: {e}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(handle_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let translation = e.translate();
            eprintln!("{}", translation.user_message);
            for suggestion in translation.suggestions {
                eprintln!("  - {suggestion}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn handle_cli(cli: Cli) -> Result<()> {
    if let Some(Commands::InitConfig { force }) = cli.command {
        return init_config(cli.config, force).await;
    }

    let config = config::load_config(cli.config.as_deref()).await?;
    debug!(?config, "Loaded configuration");

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args, &config).await,
        Commands::Check(inputs) => check(inputs, &config).await,
        Commands::Flows { log, format, color } => {
            let path = log.unwrap_or_else(|| config.log_path.clone());
            let decisions = decision_log::load_decisions(&path).await?;
            let output = match format {
                FlowFormat::Text => {
                    let color = color.unwrap_or(config.color);
                    render::render_flows_terminal(&decisions, color.enabled(utils::stdout_is_tty()))
                }
                FlowFormat::Dot => render::render_flows_dot(&decisions),
            };
            print!("{output}");
            Ok(())
        }
        Commands::Audit { count } => show_audit(count).await,
        Commands::InitConfig { force } => init_config(cli.config, force).await,
    }
}

async fn load(
    inputs: InputArgs,
    config: &AppConfig,
) -> Result<(Vec<fwsim::Rule>, Vec<fwsim::Packet>)> {
    let rules_path = inputs.rules.unwrap_or_else(|| config.rules_path.clone());
    let packets_path = inputs.packets.unwrap_or_else(|| config.packets_path.clone());

    match loader::load_inputs(&rules_path, &packets_path).await {
        Ok(loaded) => Ok(loaded),
        Err(e) => {
            if config.audit_enabled {
                audit::log_load_failed(e.path(), e.to_string()).await;
            }
            Err(Error::Load(e))
        }
    }
}

async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    let (rules, packets) = load(args.inputs, config).await?;

    let decisions = apply_rules(&packets, &rules);

    {
        let mut out = std::io::stdout().lock();
        if !args.quiet {
            report::write_decisions(&mut out, &decisions)?;
        }
        report::write_summary(&mut out, &Summary::new(packets.len(), rules.len(), &decisions))?;
        out.flush()?;
    }

    if !args.no_log {
        let log_path = args.log.unwrap_or_else(|| config.log_path.clone());
        let saved = decision_log::save_decisions(&log_path, &decisions, config.write_checksum).await;
        if config.audit_enabled {
            audit::log_save(&log_path, saved.is_ok(), saved.as_ref().err().map(ToString::to_string))
                .await;
        }
        saved?;
        println!("\nSimulation results saved to {}", log_path.display());
    }

    if config.audit_enabled {
        audit::log_run(packets.len(), rules.len(), decisions.len()).await;
    }

    Ok(())
}

async fn check(inputs: InputArgs, config: &AppConfig) -> Result<()> {
    let (rules, packets) = load(inputs, config).await?;
    println!("✓ {} rules, {} packets loaded", rules.len(), packets.len());
    Ok(())
}

async fn show_audit(count: usize) -> Result<()> {
    let audit = audit::AuditLog::new()?;
    let events = match audit.read_recent(count).await {
        Ok(events) => events,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No audit events recorded ({})", audit.path().display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for event in &events {
        println!("{}", event.summary_line());
    }
    Ok(())
}

async fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path
        .or_else(config::default_config_path)
        .ok_or_else(|| Error::Config("no config path: data directory not found".to_string()))?;

    if !force && tokio::fs::try_exists(&path).await? {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    config::save_config(&path, &AppConfig::default()).await?;
    println!("✓ Wrote default configuration to {}", path.display());
    Ok(())
}
