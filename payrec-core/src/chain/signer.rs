//! Payout transfer pass-through to the signer service.
//!
//! Transaction building, signing, submission and confirmation live in a
//! separate signer service that holds the treasury key. This client
//! forwards a transfer request and reports the committed transaction
//! hash; the request only returns once the transfer is confirmed (or
//! rejected), so the call is given a generous timeout.

use super::types::TxnHash;
use super::{ChainError, PayoutExecutor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Client for the treasury signer service.
pub struct SignerClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl SignerClient {
    /// Covers build + sign + submit + wait-for-confirmation.
    const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

    /// Create a new SignerClient for the given service endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::builder()
                .timeout(Self::REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn transfer_url(&self) -> String {
        format!("{}/transfer", self.endpoint.as_str().trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    recipient: &'a str,
    amount: u64,
    campaign_id: u64,
    reason: &'a str,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    hash: String,
}

#[async_trait]
impl PayoutExecutor for SignerClient {
    async fn execute_payout(
        &self,
        recipient: &str,
        amount: u64,
        campaign_id: u64,
        reason: &str,
    ) -> Result<TxnHash, ChainError> {
        debug!(
            recipient = recipient,
            amount = amount,
            campaign_id = campaign_id,
            "Submitting payout transfer"
        );

        let response = self
            .http
            .post(self.transfer_url())
            .json(&TransferRequest {
                recipient,
                amount,
                campaign_id,
                reason,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let transfer: TransferResponse = response.json().await?;
        Ok(TxnHash(transfer.hash))
    }
}
