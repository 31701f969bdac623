// src/cli.rs
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "An interactive CLI tool to log workouts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use this database file instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Write listings as CSV instead of tables
    #[arg(long, global = true)]
    pub export_csv: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a new workout session interactively
    Log,
    /// View logged sessions and sets
    View(ViewArgs),
    /// Delete a session (with its sets) or a single set
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },
    /// Delete every session and set
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate a shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default, Clone, Copy)]
pub struct ViewArgs {
    /// Merge each exercise's sets across all sessions
    #[arg(short, long)]
    pub aggregate: bool,
    /// Skip the session table in the full listing
    #[arg(long, conflicts_with = "aggregate")]
    pub no_sessions: bool,
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    /// Delete a session and all of its sets
    Session { id: i64 },
    /// Delete one set by its id
    Set { id: i64 },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
