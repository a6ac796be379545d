//! Larder CLI - offline-first household inventory
//!
//! Provides commands for:
//! - Logging in to the family inventory service
//! - Adding, listing, editing, and removing ingredients
//! - Managing dishes
//! - Running and observing synchronization

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    add::AddCommand,
    dish::DishCommand,
    edit::EditCommand,
    list::ListCommand,
    login::{LoginCommand, LogoutCommand},
    remove::RemoveCommand,
    status::StatusCommand,
    sync::SyncCommand,
    watch::WatchCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "larder", version, about = "Offline-first household inventory")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with an email code and select the household
    Login(LoginCommand),
    /// Remove the stored session
    Logout(LogoutCommand),
    /// Add an ingredient
    Add(AddCommand),
    /// List ingredients
    List(ListCommand),
    /// Edit an ingredient
    Edit(EditCommand),
    /// Remove an ingredient
    Remove(RemoveCommand),
    /// Manage dishes
    #[command(subcommand)]
    Dish(DishCommand),
    /// Run one sync pass now
    Sync(SyncCommand),
    /// Show record and sync status
    Status(StatusCommand),
    /// Run the periodic sync trigger in the foreground
    Watch(WatchCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Login(cmd) => cmd.execute(format).await,
        Commands::Logout(cmd) => cmd.execute(format).await,
        Commands::Add(cmd) => cmd.execute(format).await,
        Commands::List(cmd) => cmd.execute(format).await,
        Commands::Edit(cmd) => cmd.execute(format).await,
        Commands::Remove(cmd) => cmd.execute(format).await,
        Commands::Dish(cmd) => cmd.execute(format).await,
        Commands::Sync(cmd) => cmd.execute(format).await,
        Commands::Status(cmd) => cmd.execute(format).await,
        Commands::Watch(cmd) => cmd.execute(format).await,
    }
}
