mod commands;
mod config;
mod html;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, init, normalize, render, stats, ApplyArgs, InitArgs, NormalizeArgs, RenderArgs,
    StatsArgs,
};
use tracing_subscriber::EnvFilter;

/// Zebra CLI - edit, normalize and render rich articles
#[derive(Parser, Debug)]
#[command(name = "zebra")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editing operations (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Zebra project
    Init(InitArgs),

    /// Render an article to HTML
    Render(RenderArgs),

    /// Print article statistics
    Stats(StatsArgs),

    /// Rewrite an article in canonical form
    Normalize(NormalizeArgs),

    /// Replay an edit script against an article
    Apply(ApplyArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Stats(args) => stats(args, &cwd),
        Command::Normalize(args) => normalize(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
