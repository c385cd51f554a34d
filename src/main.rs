mod app;
mod cli;
mod clock;
mod commands;
mod config;
mod event;
mod form;
mod grid;
mod logging;
mod model;
mod storage;
mod ui;
mod viewport;

use anyhow::Result;
use clap::Parser;
use tracing::info;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::Config::load(args.config.as_deref())?;
    logging::init(&config.log_path()?)?;
    let db_path = config.database_path(args.db.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting slotplan");

    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Tui => commands::tui(&config, &db_path),
        cli::Command::Add {
            title,
            date,
            at,
            duration,
        } => commands::add(&config, &db_path, title, date, at, duration),
        cli::Command::List { date } => commands::list(&db_path, date),
        cli::Command::Done { id, undo } => commands::done(&db_path, id, !undo),
        cli::Command::Delete { id } => commands::delete(&db_path, id),
    }
}
