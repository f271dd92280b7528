//! Command-line harness for the creature AI.
//!
//! Loads a level, a creature catalog and optional tuning, then runs seeded
//! rounds. Run with: `creature-sim <command> --map <FILE> --catalog <FILE>`

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Run, Verify};

/// Seeded creature AI runs
#[derive(Parser)]
#[command(name = "creature-sim")]
#[command(about = "Runs the creature AI over a level", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to `creature-sim.log` in this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scenario and print where every creature ended up
    Run(Run),

    /// Run a scenario twice and fail unless both runs match turn for turn
    Verify(Verify),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_dir.as_deref())?;

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Verify(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_dir_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "creature-sim",
            "verify",
            "--map",
            "level.ron",
            "--catalog",
            "creatures.ron",
            "--log-dir",
            "logs",
        ])
        .unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("logs")));
        assert!(matches!(cli.command, Command::Verify(_)));
    }
}
