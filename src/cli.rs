use std::path::PathBuf;

use clap::Parser;

use crate::types::LogLevel;

/// Options left unset here fall back to the config file.
#[derive(Parser, Debug)]
#[command(
    name = "immich-albums",
    version,
    about = "Create Immich albums from local folders"
)]
pub struct Cli {
    /// Folder to turn into an album
    pub path: PathBuf,

    /// YAML file providing defaults for any option below
    #[arg(long)]
    pub config: Option<String>,

    /// Immich API key.
    /// Prefer the IMMICH_API_KEY environment variable or the config file:
    /// values passed via --api-key are visible in process listings.
    #[arg(long, env = "IMMICH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Immich API endpoint, e.g. https://localhost:2283/api
    #[arg(long, env = "IMMICH_API_HOST")]
    pub api_host: Option<String>,

    /// Path prefix of the folder on this host
    #[arg(long)]
    pub original_path: Option<String>,

    /// The same prefix as seen from the Immich server
    #[arg(long)]
    pub replace_path: Option<String>,

    /// Also process every subfolder
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Look up assets but create or change nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Subfolder name not to descend into (repeatable)
    #[arg(long = "skip", value_name = "FOLDER")]
    pub skip: Vec<String>,

    /// Leave folders that already have an album alone
    #[arg(long)]
    pub skip_existing: bool,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Also write a debug log file into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
