//! reposweep: run one operation across every git repository under a set of roots

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use reposweep::commands::{
    handle_commit_command, handle_env_command, handle_exec_command, handle_list_command,
    handle_pull_command, handle_script_command,
};
use reposweep::core::{
    Completion, Console, Interrupt, Settings, SweepError, Verbosity, WalkOptions, Walker,
    INTERRUPTED_MESSAGE,
};
use reposweep::git::GitRunner;
use reposweep::utils::set_terminal_title;

const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "reposweep", version, about = "Run one operation across many git repositories")]
struct Cli {
    /// Only print errors and generated output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More output; repeat for debug diagnostics
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Process repositories one at a time, in discovery order
    #[arg(long, global = true)]
    serial: bool,

    /// Exact number of worker threads
    #[arg(short, long, global = true, conflicts_with = "serial")]
    jobs: Option<usize>,

    /// Fraction of CPU cores to use as workers, in (0, 1]
    #[arg(long, global = true)]
    fraction: Option<f64>,

    /// Per-command timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Config file (default: ~/.config/reposweep/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every repository found
    List {
        /// Print a JSON array instead of one path per line
        #[arg(long)]
        json: bool,
        /// Roots: `$VAR` or a path (default: configured roots)
        roots: Vec<String>,
    },
    /// Stage and commit all changes in every repository
    Commit {
        #[arg(short, long)]
        message: String,
        roots: Vec<String>,
    },
    /// Fast-forward every repository from its upstream
    Pull { roots: Vec<String> },
    /// Run a shell command inside every repository
    Exec {
        command: String,
        roots: Vec<String>,
    },
    /// Print `export NAME="path"` lines, one per repository
    Env { roots: Vec<String> },
    /// Print a shell script that clones every repository
    Script { roots: Vec<String> },
}

impl Commands {
    fn roots(&self) -> &[String] {
        match self {
            Commands::List { roots, .. }
            | Commands::Commit { roots, .. }
            | Commands::Pull { roots }
            | Commands::Exec { roots, .. }
            | Commands::Env { roots }
            | Commands::Script { roots } => roots,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    setup_logging(verbosity);

    let (console, guard) = Console::start(verbosity);
    set_terminal_title("🚀 reposweep");

    let code = match run(cli, &console) {
        Ok(Completion::Finished) => ExitCode::SUCCESS,
        Ok(Completion::Interrupted) => {
            console.error(INTERRUPTED_MESSAGE);
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            console.error(format!("Error: {e:#}"));
            let configuration = e
                .downcast_ref::<SweepError>()
                .is_some_and(SweepError::is_configuration);
            if configuration {
                ExitCode::from(EXIT_CONFIG_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    };

    drop(console);
    guard.finish();
    set_terminal_title("✅ reposweep");
    code
}

fn run(cli: Cli, console: &Console) -> Result<Completion> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        settings.git_timeout = timeout;
    }
    if let Some(fraction) = cli.fraction {
        settings.worker_fraction = fraction;
    }

    let options = WalkOptions {
        serial: cli.serial,
        worker_fraction: settings.worker_fraction,
        jobs: cli.jobs,
    };
    options.validate()?;

    let interrupt = Interrupt::new();
    interrupt
        .install_ctrlc_handler()
        .context("Failed to install Ctrl-C handler")?;

    let walker = Walker::from_args(cli.command.roots(), settings)?
        .with_options(options)
        .with_interrupt(interrupt);
    debug!(roots = walker.roots().len(), "resolved roots");
    if walker.roots().is_empty() {
        console.verbose("No roots given and no default_roots configured");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let runner = GitRunner::new(runtime.handle().clone());

    match &cli.command {
        Commands::List { json, .. } => handle_list_command(&walker, console, *json),
        Commands::Commit { message, .. } => handle_commit_command(&walker, console, &runner, message),
        Commands::Pull { .. } => handle_pull_command(&walker, console, &runner),
        Commands::Exec { command, .. } => handle_exec_command(&walker, console, &runner, command),
        Commands::Env { .. } => handle_env_command(&walker, console),
        Commands::Script { .. } => handle_script_command(&walker, console, &runner),
    }
}

fn setup_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.tracing_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
