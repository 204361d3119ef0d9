use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crm_board::Module;
use crm_board::config::CliOverrides;

mod cmd;

#[derive(Parser)]
#[command(name = "crm-board")]
#[command(version, about = "Kanban view of CRM leads and opportunities")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Path to a config file (defaults to ./crm-board.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL. Overrides config and CRM_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token. Overrides config and CRM_API_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Board module: leads or opportunities
    #[arg(short, long, global = true)]
    pub module: Option<Module>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            module: self.module,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the stages of the board, in display order
    Stages,
    /// List the users available to the owner filter
    Owners,
    /// Load and print the board
    Show {
        /// Only cards created by this user id (repeatable)
        #[arg(long = "owner")]
        owners: Vec<String>,
        /// Only cards whose lead status matches (repeatable)
        #[arg(long = "status")]
        statuses: Vec<String>,
        /// Only cards whose opportunity stage matches (repeatable)
        #[arg(long = "stage")]
        stages: Vec<String>,
        /// Created on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Created on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Case-insensitive text search
        #[arg(short, long, default_value = "")]
        search: String,
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a card to another stage and save it
    Move {
        /// Card id, e.g. leads-5
        card_id: String,
        /// Target stage id, e.g. stage-2
        target_stage_id: String,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default crm-board.toml in the current directory
    Init,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let overrides = cli.overrides();
    match &cli.command {
        Commands::Stages => cmd::cmd_stages(&overrides).await?,
        Commands::Owners => cmd::cmd_owners(&overrides).await?,
        Commands::Show {
            owners,
            statuses,
            stages,
            from,
            to,
            search,
            json,
        } => {
            let filters = crm_board::Filters {
                stages: stages.clone(),
                owners: owners.clone(),
                statuses: statuses.clone(),
                start_date: *from,
                end_date: *to,
            };
            cmd::cmd_show(&overrides, filters, search, *json).await?
        }
        Commands::Move {
            card_id,
            target_stage_id,
        } => cmd::cmd_move(&overrides, card_id, target_stage_id).await?,
        Commands::Config { command } => cmd::cmd_config(&overrides, command.clone())?,
    }

    Ok(())
}
