use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slotplan", version, about = "Half-hour day planner for the terminal")]
pub struct Cli {
    /// Config file (defaults to the per-user config.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Task database path, overriding the config file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive planner
    Tui,
    /// Add a task without opening the planner
    Add {
        /// Title of the task
        title: String,
        /// Day in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Start time in HH:MM format (defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// Duration in minutes (defaults to the configured default)
        #[arg(long)]
        duration: Option<String>,
    },
    /// Print the tasks planned for a day
    List {
        /// Day in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a task as done
    Done {
        /// Task id as shown by `list`
        id: i64,
        /// Mark the task as not done instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a task
    Delete {
        /// Task id as shown by `list`
        id: i64,
    },
}
