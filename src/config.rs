use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::cli::Cli;
use crate::sync::{PathRewrite, SyncConfig};

/// Read when `--config` is not given; silently skipped if absent.
const DEFAULT_CONFIG_PATH: &str = "~/.config/immich-albums/config.yml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Defaults loaded from the YAML config file. Keys mirror the long CLI
/// option names in snake_case, e.g. `api_key`, `original_path`, `skip`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    api_key: Option<String>,
    api_host: Option<String>,
    original_path: Option<String>,
    replace_path: Option<String>,
    recursive: Option<bool>,
    dry_run: Option<bool>,
    skip: Option<Vec<String>>,
    skip_existing: Option<bool>,
    timeout: Option<u64>,
}

impl ConfigFile {
    pub(crate) fn parse(contents: &str) -> anyhow::Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Application configuration: CLI options layered over the config file.
pub struct Config {
    /// Canonical absolute path of the folder to sync.
    pub path: PathBuf,
    pub api_host: String,
    pub api_key: String,
    pub timeout: Duration,
    pub sync: SyncConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("api_host", &self.api_host)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("sync", &self.sync)
            .finish()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn required(value: Option<String>, option: &str) -> anyhow::Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => anyhow::bail!(
            "--{} is required (or set {} in the config file)",
            option,
            option.replace('-', "_")
        ),
    }
}

impl Config {
    /// Resolve the config file named by `--config` (or the default location)
    /// and merge it under the CLI options.
    pub fn load(cli: Cli) -> anyhow::Result<Self> {
        let file = match cli.config.as_deref() {
            Some(explicit) => ConfigFile::load(&expand_tilde(explicit))?,
            None => {
                let default_path = expand_tilde(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    ConfigFile::load(&default_path)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        Self::from_sources(cli, file)
    }

    /// CLI values win; the file fills anything left unset. Boolean flags are
    /// on if either source turns them on.
    pub(crate) fn from_sources(cli: Cli, file: ConfigFile) -> anyhow::Result<Self> {
        let api_key = required(cli.api_key.or(file.api_key), "api-key")?;
        let api_host = required(cli.api_host.or(file.api_host), "api-host")?;
        let original_path = required(cli.original_path.or(file.original_path), "original-path")?;
        let replace_path = required(cli.replace_path.or(file.replace_path), "replace-path")?;

        let path = std::fs::canonicalize(&cli.path)
            .with_context(|| format!("Cannot access {}", cli.path.display()))?;
        if !path.is_dir() {
            anyhow::bail!("{} is not a directory", path.display());
        }

        let skip: HashSet<String> = if cli.skip.is_empty() {
            file.skip.unwrap_or_default().into_iter().collect()
        } else {
            cli.skip.into_iter().collect()
        };

        let timeout = Duration::from_secs(
            cli.timeout
                .or(file.timeout)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Ok(Self {
            path,
            api_host,
            api_key,
            timeout,
            sync: SyncConfig {
                rewrite: PathRewrite::new(original_path, replace_path),
                recursive: cli.recursive || file.recursive.unwrap_or(false),
                dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
                skip,
                skip_existing: cli.skip_existing || file.skip_existing.unwrap_or(false),
            },
        })
    }
}
