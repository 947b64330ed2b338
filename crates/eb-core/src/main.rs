//! edgeburst CLI entry point.
//!
//! Reads relationship offsets from a JSON file, detects bursts per key and
//! ranks nodes by bursting degree over time. Command payloads go to stdout as
//! JSON; logs go to stderr.

use clap::{Args, Parser, Subcommand};
use eb_config::load_config;
use eb_core::cli::{
    run_bursts, run_config, run_degrees, BurstOverrides, BurstsOptions, CommandError,
    DegreesOptions,
};
use eb_core::exit_codes::ExitCode;
use eb_core::logging::{event_names, init_logging, LogConfig, LogFormat, LogLevel};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edgeburst")]
#[command(author, version, about = "Burst detection over timestamped relationships")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect bursts for every key and print the intervals
    Bursts(BurstsArgs),

    /// Rank nodes by bursting degree in each time slice
    Degrees(DegreesArgs),

    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug)]
struct BurstParamArgs {
    /// Rate ratio between consecutive levels (> 1)
    #[arg(long)]
    s: Option<f64>,

    /// Cost of moving up one level (> 0)
    #[arg(long)]
    gamma: Option<f64>,

    /// Record failing keys and continue instead of aborting
    #[arg(long)]
    skip_failures: bool,

    /// Give keys with fewer than two distinct timestamps a baseline interval
    #[arg(long)]
    baseline_short: bool,

    /// Process keys on the current thread only
    #[arg(long)]
    sequential: bool,
}

impl From<&BurstParamArgs> for BurstOverrides {
    fn from(args: &BurstParamArgs) -> Self {
        BurstOverrides {
            s: args.s,
            gamma: args.gamma,
            skip_failures: args.skip_failures,
            baseline_short: args.baseline_short,
            sequential: args.sequential,
        }
    }
}

#[derive(Args, Debug)]
struct BurstsArgs {
    /// Input offsets file
    #[arg(long, short)]
    input: PathBuf,

    #[command(flatten)]
    params: BurstParamArgs,

    /// Print nested bursts instead of flat intervals
    #[arg(long)]
    nested: bool,
}

#[derive(Args, Debug)]
struct DegreesArgs {
    /// Input offsets file
    #[arg(long, short)]
    input: PathBuf,

    #[command(flatten)]
    params: BurstParamArgs,

    /// Number of time slices
    #[arg(long)]
    ticks: Option<usize>,

    /// Degree mode (in, out, total; "both" is total)
    #[arg(long)]
    mode: Option<String>,

    /// Nodes kept per slice
    #[arg(long)]
    top: Option<usize>,

    /// Label slices with their numeric upper bound instead of a UTC date
    #[arg(long)]
    numeric_labels: bool,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else if cli.global.verbose > 0 {
        let base = cli.global.log_level.unwrap_or(LogConfig::default().level);
        Some((0..cli.global.verbose).fold(base, |level, _| level.louder()))
    } else {
        cli.global.log_level
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let code = match run(&cli) {
        Ok(payload) => emit(&payload),
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("edgeburst: {}", err);
            let code = err.exit_code();
            emit(&err.to_json());
            code
        }
    };

    std::process::exit(code.as_i32());
}

fn run(cli: &Cli) -> Result<Value, CommandError> {
    let loaded = load_config(cli.global.config.as_deref())?;
    match &loaded.path {
        Some(path) => tracing::info!(
            event = event_names::CONFIG_LOADED,
            path = %path.display(),
            source = %loaded.source,
            "Configuration loaded"
        ),
        None => tracing::debug!(
            event = event_names::CONFIG_DEFAULT_USED,
            "Using built-in configuration"
        ),
    }

    match &cli.command {
        Commands::Bursts(args) => run_bursts(
            &loaded.config,
            &BurstsOptions {
                input: args.input.clone(),
                burst: BurstOverrides::from(&args.params),
                nested: args.nested,
            },
        ),
        Commands::Degrees(args) => run_degrees(
            &loaded.config,
            &DegreesOptions {
                input: args.input.clone(),
                burst: BurstOverrides::from(&args.params),
                ticks: args.ticks,
                mode: args.mode.clone(),
                top: args.top,
                numeric_labels: args.numeric_labels,
            },
        ),
        Commands::Config => Ok(run_config(&loaded)),
    }
}

fn emit(payload: &Value) -> ExitCode {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(err) => {
            eprintln!("edgeburst: failed to serialize output: {}", err);
            ExitCode::InternalError
        }
    }
}
