mod check;
mod normalize;
mod satisfies;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "oxt")]
#[command(about = "Check Python package requirements of an office extension")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check installed packages against tool.oxt.requirements and py_packages
    Check(check::CheckArgs),

    /// Print the canonical form of a requirement
    Normalize(normalize::NormalizeArgs),

    /// Check whether a version satisfies a requirement
    Satisfies(satisfies::SatisfiesArgs),
}

fn init_logger(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Check(args) => check::execute(args),
        Commands::Normalize(args) => normalize::execute(args),
        Commands::Satisfies(args) => satisfies::execute(args),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
