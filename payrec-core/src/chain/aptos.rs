//! Aptos fullnode REST client.
//!
//! Implements the read-only chain traits ([`EventLog`], [`BalanceQuery`])
//! over the public fullnode API. Write operations go through the signer
//! service instead (see [`super::signer`]).

use super::types::ChainEvent;
use super::{BalanceQuery, ChainError, EventLog};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Field name of the payout event handle inside the marketplace module.
const PAYOUT_EVENT_FIELD: &str = "payout_evt";

/// Name of the struct holding the module's event handles.
const EVENT_HANDLES_STRUCT: &str = "EventHandles";

/// Coin type used for treasury balances and payouts.
const APTOS_COIN: &str = "0x1::aptos_coin::AptosCoin";

/// Configuration for the fullnode client.
#[derive(Debug, Clone)]
pub struct AptosConfig {
    /// Fullnode base URL, e.g. `https://fullnode.testnet.aptoslabs.com`.
    pub node_url: Url,
    /// Address the marketplace module is published under.
    pub module_address: String,
    /// Name of the marketplace module.
    pub module_name: String,
}

/// Client for the Aptos fullnode REST API.
pub struct AptosClient {
    config: AptosConfig,
    http: reqwest::Client,
}

impl AptosClient {
    const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

    /// Create a new AptosClient.
    pub fn new(config: AptosConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .timeout(Self::REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn base(&self) -> &str {
        self.config.node_url.as_str().trim_end_matches('/')
    }

    /// URL of the payout event handle endpoint.
    fn events_url(&self) -> String {
        format!(
            "{}/v1/accounts/{}/events/{}::{}::{}/{}",
            self.base(),
            self.config.module_address,
            self.config.module_address,
            self.config.module_name,
            EVENT_HANDLES_STRUCT,
            PAYOUT_EVENT_FIELD,
        )
    }

    /// URL of the CoinStore resource for `address`.
    fn coin_store_url(&self, address: &str) -> String {
        format!(
            "{}/v1/accounts/{}/resource/0x1::coin::CoinStore<{}>",
            self.base(),
            address,
            APTOS_COIN,
        )
    }
}

#[async_trait]
impl EventLog for AptosClient {
    async fn fetch_events(
        &self,
        start: Option<u64>,
        limit: u16,
    ) -> Result<Vec<ChainEvent>, ChainError> {
        let start = start.unwrap_or(0);
        debug!(start = start, limit = limit, "Fetching payout events");

        let response = self
            .http
            .get(self.events_url())
            .query(&[
                ("start", start.to_string().as_str()),
                ("limit", limit.to_string().as_str()),
            ])
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

        let events: Vec<ChainEvent> = response.json().await?;
        Ok(events)
    }
}

#[async_trait]
impl BalanceQuery for AptosClient {
    async fn balance_of(&self, address: &str) -> Result<u64, ChainError> {
        #[derive(Deserialize)]
        struct ResourceResponse {
            data: CoinStoreData,
        }
        #[derive(Deserialize)]
        struct CoinStoreData {
            coin: CoinValue,
        }
        #[derive(Deserialize)]
        struct CoinValue {
            value: String,
        }

        let response = self.http.get(self.coin_store_url(address)).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ChainError::AccountNotFound(address.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let resource: ResourceResponse = response.json().await?;
        resource.data.coin.value.parse().map_err(|e| {
            ChainError::Parse(format!(
                "invalid balance {:?}: {e}",
                resource.data.coin.value
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client() -> AptosClient {
        AptosClient::new(AptosConfig {
            node_url: "https://fullnode.testnet.aptoslabs.com/"
                .parse()
                .unwrap(),
            module_address: "0xcafe".to_string(),
            module_name: "influencer_mkt".to_string(),
        })
    }

    #[test]
    fn test_events_url() {
        assert_eq!(
            client().events_url(),
            "https://fullnode.testnet.aptoslabs.com/v1/accounts/0xcafe/events/0xcafe::influencer_mkt::EventHandles/payout_evt"
        );
    }

    #[test]
    fn test_coin_store_url() {
        assert_eq!(
            client().coin_store_url("0xbeef"),
            "https://fullnode.testnet.aptoslabs.com/v1/accounts/0xbeef/resource/0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>"
        );
    }
}
