//! Layered configuration: defaults, then the optional TOML file, then flags.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use number_rush_core::TimerStartPolicy;
use number_rush_system_persistence::RemoteConfig;
use serde::Deserialize;
use tracing::warn;

use crate::Args;

const DEFAULT_SAVE_DIR: &str = ".number-rush";
const DEFAULT_BASE_URL: &str = "https://api.jsonbin.io/v3";
const DEFAULT_KEY_ENV: &str = "NUMBER_RUSH_REMOTE_KEY";
const DEFAULT_AUTH_HEADER: &str = "X-Master-Key";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Contents of the configuration file. Every section is optional.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    game: GameSection,
    storage: StorageSection,
    remote: Option<RemoteSection>,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GameSection {
    timer_start: TimerStartPolicy,
    seed: Option<u64>,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StorageSection {
    directory: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_SAVE_DIR),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct RemoteSection {
    #[serde(default = "default_base_url")]
    base_url: String,
    bin_id: String,
    #[serde(default = "default_key_env")]
    key_env: String,
    #[serde(default = "default_auth_header")]
    auth_header: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_owned()
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_owned()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config toml contents")
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) timer_start: TimerStartPolicy,
    pub(crate) seed: u64,
    pub(crate) save_dir: PathBuf,
    pub(crate) remote: Option<RemoteConfig>,
}

impl Settings {
    /// Merges flags over the file, reading the remote secret through `lookup_env`.
    pub(crate) fn resolve<F>(args: &Args, file: FileConfig, lookup_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timer_start = args
            .timer_start
            .map_or(file.game.timer_start, TimerStartPolicy::from);
        let seed = args
            .seed
            .or(file.game.seed)
            .unwrap_or_else(rand::random::<u64>);
        let save_dir = args
            .save_dir
            .clone()
            .unwrap_or(file.storage.directory);
        let remote = file
            .remote
            .and_then(|section| remote_config(section, &lookup_env));

        Self {
            timer_start,
            seed,
            save_dir,
            remote,
        }
    }
}

fn remote_config<F>(section: RemoteSection, lookup_env: &F) -> Option<RemoteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(secret) = lookup_env(&section.key_env).filter(|secret| !secret.is_empty()) else {
        warn!(
            key_env = %section.key_env,
            "remote storage disabled: secret environment variable is not set"
        );
        return None;
    };
    Some(RemoteConfig {
        base_url: section.base_url,
        bin_id: section.bin_id,
        auth_header: section.auth_header,
        secret,
        timeout: Duration::from_secs(section.timeout_secs),
    })
}
