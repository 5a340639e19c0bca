//! TOML file configuration structures.
//!
//! These structs directly map to the `payrec-config.toml` file format.

use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    pub chain: ChainConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub reconciler: ReconcilerSection,
    #[serde(default)]
    pub treasury: TreasurySection,
}

/// Chain configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Fullnode base URL.
    pub node_url: Url,
    /// Address the marketplace module is published under.
    pub module_address: String,
    /// Name of the marketplace module.
    #[serde(default = "default_module_name")]
    pub module_name: String,
    /// Treasury account whose balance is monitored.
    pub treasury_address: String,
    /// Endpoint of the transaction signer service.
    pub signer_url: Url,
}

fn default_module_name() -> String {
    "influencer_mkt".to_string()
}

/// Notifier configuration section. Leaving either field out disables
/// notifications entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifierConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

/// Reconciler configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerSection {
    /// Polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum events fetched per tick.
    #[serde(default = "default_page_size")]
    pub page_size: u16,
    /// Where to persist the event cursor. Omit for a purely in-memory
    /// cursor that rescans from the beginning of the log on restart.
    pub cursor_path: Option<PathBuf>,
}

fn default_poll_interval_ms() -> u64 {
    4000
}

fn default_page_size() -> u16 {
    100
}

impl Default for ReconcilerSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            page_size: default_page_size(),
            cursor_path: None,
        }
    }
}

/// Treasury monitoring section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreasurySection {
    /// Minimum balance floor in octas. Zero (the default) disables the
    /// balance check.
    #[serde(default)]
    pub min_balance: u64,
}
