//! Chain access layer.
//!
//! The reconciler only ever talks to the chain through the three seam
//! traits in this module:
//!
//! - [`EventLog`]: paged, read-only access to the payout event log
//! - [`BalanceQuery`]: read-only account balance lookup
//! - [`PayoutExecutor`]: submits a payout transfer
//!
//! Production implementations are [`AptosClient`] (fullnode REST API)
//! and [`SignerClient`] (pass-through to the transaction signer service).

pub mod aptos;
pub mod signer;
pub mod types;

pub use aptos::{AptosClient, AptosConfig};
pub use signer::SignerClient;
pub use types::{ChainEvent, PayoutReleased, TxnHash};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from chain-facing calls.
#[derive(Debug, Error)]
pub enum ChainError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Node or signer returned a non-success status
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Account does not exist on chain
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Response or event payload could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

/// Read-only view of the append-only payout event log.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Fetch up to `limit` events starting at sequence number `start`,
    /// or from the beginning of the log when `start` is `None`.
    ///
    /// Events are returned in the order the log stores them
    /// (sequence-number ascending); callers must not re-sort.
    async fn fetch_events(
        &self,
        start: Option<u64>,
        limit: u16,
    ) -> Result<Vec<ChainEvent>, ChainError>;
}

/// Read-only balance lookup for an on-chain account.
#[async_trait]
pub trait BalanceQuery: Send + Sync {
    /// Current balance of `address` in the asset's smallest unit.
    async fn balance_of(&self, address: &str) -> Result<u64, ChainError>;
}

/// Executes a payout transfer on chain.
///
/// The build/sign/submit/wait machinery lives behind this seam; the
/// reconciler sees a single call that either confirms or fails. Failed
/// payouts are not retried.
#[async_trait]
pub trait PayoutExecutor: Send + Sync {
    async fn execute_payout(
        &self,
        recipient: &str,
        amount: u64,
        campaign_id: u64,
        reason: &str,
    ) -> Result<TxnHash, ChainError>;
}
