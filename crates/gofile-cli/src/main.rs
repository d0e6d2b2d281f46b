//! gofile - command line client for the Gofile API

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gofile")]
#[command(about = "Command line client for the Gofile file-hosting API")]
#[command(version)]
pub struct Args {
    /// Account access token
    #[arg(long, env = "GOFILE_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// API endpoint URL
    #[arg(long, default_value = gofile_client::DEFAULT_API_ENDPOINT, env = "GOFILE_API_URL")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", env = "GOFILE_TIMEOUT")]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(short, long, env = "GOFILE_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the best upload server
    Server,

    /// Print account details
    Account,

    /// Create a folder
    Mkdir {
        /// Parent folder ID
        parent: String,
        /// Name of the new folder
        name: String,
    },

    /// Copy contents into a folder
    Cp {
        /// Destination folder ID
        dest: String,
        /// Content IDs to copy
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete contents
    Rm {
        /// Content IDs to delete
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Set a folder option (public, password, description, expire, tags)
    SetOption {
        folder: String,
        option: String,
        value: String,
    },

    /// List a folder
    Ls {
        /// Folder ID
        content_id: String,
    },

    /// Upload a file
    Upload {
        /// File to upload
        file: PathBuf,

        /// Destination folder ID (defaults to the account root folder)
        #[arg(short, long)]
        folder: Option<String>,

        /// Upload server (discovered when omitted)
        #[arg(short, long)]
        server: Option<String>,

        /// Stage the request body in memory instead of a temp file
        #[arg(long)]
        memory: bool,

        /// Directory for the staging temp file
        #[arg(long, env = "GOFILE_TMP_DIR")]
        tmp_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gofile={},gofile_client={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    commands::run(args).await
}
