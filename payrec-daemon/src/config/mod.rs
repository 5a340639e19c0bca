//! Daemon configuration loading.

mod file;

pub use file::{ChainConfig, FileConfig, NotifierConfig, ReconcilerSection, TreasurySection};

use anyhow::Context;
use std::path::Path;

/// Load and parse the TOML configuration file at `path`.
pub fn load(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: FileConfig =
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(config)
}
