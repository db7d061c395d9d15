pub mod commands;
pub mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::{self, AppConfig};

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio CMS backend: HTTP server and admin tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "YAML config file used instead of the environment preset")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve,

    #[command(about = "Create an admin account, or promote an existing one")]
    CreateAdmin {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, help = "Account password (at least 6 characters)")]
        password: String,
        #[arg(long, default_value = "Administrator", help = "Display name")]
        name: String,
    },

    #[command(about = "Print a bcrypt hash for a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Resolves the configuration: an explicit file wins over the environment preset.
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    match &cli.config {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None => Ok(config::config().clone()),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::CreateAdmin {
            email,
            password,
            name,
        } => commands::admin::create_admin(config, &email, &password, &name, output_format).await,
        Commands::HashPassword { password } => {
            commands::admin::hash_password(&config, &password, output_format)
        }
        Commands::Migrate => commands::admin::migrate(config, output_format).await,
    }
}
