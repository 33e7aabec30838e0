//! `habitrack` executable.
//!
//! # Responsibility
//! - Load configuration (environment, optional `.env`, CLI overrides).
//! - Initialize logging once, then run the selected command.

use anyhow::Context;
use clap::{Parser, Subcommand};
use habitrack_core::db::migrations::current_version;
use habitrack_core::db::open_db;
use habitrack_web::ServerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "habitrack", version, about = "Personal habit and goal tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// SQLite database file (overrides HABITRACK_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Run the web server (default)
    Serve {
        /// Listen address (overrides HABITRACK_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Create or upgrade the database schema, then exit
    Migrate,
    /// Print the version
    Version,
    /// Check that the core library is linked
    Ping,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("habitrack error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve { bind: None });

    match command {
        Command::Version => {
            println!("habitrack {}", habitrack_core::core_version());
            return Ok(());
        }
        Command::Ping => {
            println!("habitrack_core ping={}", habitrack_core::ping());
            return Ok(());
        }
        Command::Serve { .. } | Command::Migrate => {}
    }

    // A missing .env file is normal.
    dotenvy::dotenv().ok();
    let mut config = ServerConfig::from_env().context("failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Command::Serve {
        bind: Some(bind), ..
    } = command
    {
        config.bind = bind;
    }

    habitrack_core::init_logging(&config.log_level, config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    match command {
        Command::Migrate => {
            let conn = open_db(&config.database).with_context(|| {
                format!("failed to open database {}", config.database.display())
            })?;
            println!(
                "database {} at schema version {}",
                config.database.display(),
                current_version(&conn)?
            );
            Ok(())
        }
        _ => habitrack_web::serve(config)
            .await
            .context("server stopped with an error"),
    }
}
