//! `teamnotes` operator shell.
//!
//! Opens the configured store and prints read-only views as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use teamnotes_core::db::migrations::current_user_version;
use teamnotes_core::{core_version, init_from_config, CoreConfig, ShareService, TeamId};

/// teamnotes - shared folders and notes for teams
#[derive(Parser, Debug)]
#[command(name = "teamnotes", version, about, long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, global = true, default_value = "teamnotes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the store, apply migrations and print the schema version
    Init,

    /// Print everything one user owns or has been granted
    UserAssets {
        user_id: String,
    },

    /// Print everything a team's roster owns or has been granted
    TeamAssets {
        team_id: TeamId,
    },

    /// Print the core version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Command::Version = cli.command {
        println!("teamnotes_core {}", core_version());
        return Ok(());
    }

    let config = CoreConfig::load(&cli.config)?;
    init_from_config(&config).map_err(anyhow::Error::msg)?;
    let conn = config.open_store().context("failed to open store")?;

    match cli.command {
        Command::Init => {
            let version = current_user_version(&conn)?;
            let location = config
                .db_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string());
            println!("store={location} schema_version={version}");
        }
        Command::UserAssets { user_id } => {
            let bundle = ShareService::from_connection(&conn)?.get_user_assets(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Command::TeamAssets { team_id } => {
            let bundle = ShareService::from_connection(&conn)?.get_team_assets(team_id)?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Command::Version => {}
    }
    log::info!("event=cli_exit module=cli status=ok");
    Ok(())
}
