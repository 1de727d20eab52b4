//! Locating and loading `ctd.toml`.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config <PATH>`
//! 2. `ctd.toml`, then `.ctd.toml`, in the scanned directory
//! 3. `config.toml` in the global directory (`$CTD_CONFIG_DIR`, else `~/.ctd/`)
//!
//! With no file at all, built-in defaults apply.

use anyhow::{Context, Result};
use ctd_core::Config;
use ctd_rules::{load_candidates, RuleCandidate};
use std::path::{Path, PathBuf};

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the scanned directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Path of the config file, if there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Parsed configuration together with its declared plugins.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    /// Parsed settings.
    pub config: Config,
    /// Declared `[[plugins]]` entries.
    pub plugins: Vec<RuleCandidate>,
    /// File the settings were read from.
    pub source: Option<PathBuf>,
}

const PROJECT_CONFIG_NAMES: &[&str] = &["ctd.toml", ".ctd.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Finds the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Using project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(candidate) if candidate.is_file() => {
            tracing::debug!("Using global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        _ => ConfigSource::Default,
    }
}

/// `$CTD_CONFIG_DIR`, else `~/.ctd`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("CTD_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".ctd"))
}

/// Resolves and reads the configuration, including `[[plugins]]`.
///
/// # Errors
///
/// Fails when the resolved file cannot be read or parsed. A missing
/// explicit file is an error; a missing project or global file is not.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<LoadedConfig> {
    load_from(resolve(project_dir, explicit))
}

fn load_from(source: ConfigSource) -> Result<LoadedConfig> {
    let Some(path) = source.path() else {
        return Ok(LoadedConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = Config::parse(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    let plugins = load_candidates(&content)
        .with_context(|| format!("Invalid plugin declarations in {}", path.display()))?;

    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }

    Ok(LoadedConfig {
        config,
        plugins,
        source: Some(path.to_path_buf()),
    })
}
