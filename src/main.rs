//! Spork CLI
//!
//! Drives the runtime from the command line.
//!
//! ```text
//! spork [OPTIONS] <COMMAND>
//!
//! Commands:
//!   demo    Build ((2,2),(8,19)) and print it
//!   stress  Allocate many values and report collector statistics
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use spork_runtime::{GcReport, GcStats, RuntimeConfig, State};
use spork_utils::logger::init_logging;

#[derive(Parser)]
#[command(name = "spork")]
#[command(version)]
#[command(about = "A small mark-and-sweep value runtime", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    runtime: RuntimeArgs,
}

#[derive(Args)]
struct RuntimeArgs {
    /// Slots per arena chunk
    #[arg(long, global = true, value_name = "SLOTS")]
    chunk_capacity: Option<usize>,

    /// TOML configuration file (requires the `toml-config` feature)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every collection cycle
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the nested pair ((2,2),(8,19)) and print it
    Demo,

    /// Allocate numbers, keeping every K-th one rooted, and report statistics
    Stress {
        /// Number of values to allocate
        #[arg(long, default_value_t = 100_000)]
        count: i64,

        /// Keep every K-th value rooted (0 keeps nothing)
        #[arg(long, default_value_t = 10)]
        keep: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.runtime)?;
    init_logging(&config.logging.filter);

    let mut state = State::from_config(&config);
    match cli.command {
        Commands::Demo => demo(&mut state),
        Commands::Stress { count, keep } => stress(&mut state, count, keep),
    }

    let stats = state.close();
    print_stats(&stats);
    Ok(())
}

fn load_config(args: &RuntimeArgs) -> Result<RuntimeConfig> {
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::from_file(path)?.merge_with_env(),
        None => RuntimeConfig::from_env(),
    };
    if let Some(capacity) = args.chunk_capacity {
        config.gc.chunk_capacity = capacity.max(1);
    }
    if args.verbose {
        config.logging.report_cycles = true;
    }
    Ok(config)
}

fn demo(state: &mut State) {
    state.make_number(2);
    state.make_number(2);
    state.make_pair();
    state.make_number(8);
    state.make_number(19);
    state.make_pair();
    state.make_pair();

    let result = state.pop();
    println!("{}", state.render(result));
}

fn stress(state: &mut State, count: i64, keep: i64) {
    for n in 0..count {
        state.make_number(n);
        if keep == 0 || n % keep != 0 {
            state.pop();
        }
    }

    tracing::info!(roots = state.root_count(), "allocation finished");
    let report = state.collect();
    print_report(&report);
}

fn print_report(report: &GcReport) {
    println!(
        "{} survivors {} reclaimed {} threshold {}",
        "[gc]".cyan().bold(),
        report.survivors,
        report.reclaimed,
        report.threshold
    );
}

fn print_stats(stats: &GcStats) {
    println!(
        "{} collections {} reclaimed {} strings released {} time {:?}",
        "[gc total]".cyan().bold(),
        stats.collections,
        stats.total_reclaimed,
        stats.total_strings_released,
        stats.total_duration
    );
}
