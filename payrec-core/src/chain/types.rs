//! Wire types for the on-chain payout event log.

use super::ChainError;
use serde::Deserialize;

/// Hash of a committed transaction, as reported by the signer service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxnHash(pub String);

impl std::fmt::Display for TxnHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in the remote payout event log.
///
/// Numeric fields arrive string-encoded from the fullnode API. They are
/// parsed on demand rather than at deserialization time, so one
/// malformed event can be skipped without dropping the rest of its page.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainEvent {
    /// Monotonic position in the log, assigned by the chain.
    pub sequence_number: String,
    /// Fully qualified Move event type tag.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Type-specific payload.
    pub data: serde_json::Value,
}

impl ChainEvent {
    /// Parse the string-encoded sequence number.
    pub fn sequence(&self) -> Result<u64, ChainError> {
        self.sequence_number.parse().map_err(|e| {
            ChainError::Parse(format!(
                "invalid sequence number {:?}: {e}",
                self.sequence_number
            ))
        })
    }

    /// Whether this event is a payout-released event, regardless of the
    /// module address the type tag is qualified with.
    pub fn is_payout_released(&self) -> bool {
        self.type_tag.ends_with("::PayoutReleased")
    }
}

/// Structured payload of a payout-released event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutReleased {
    pub campaign_id: u64,
    pub recipient: String,
    pub amount: u64,
    pub reason: String,
}

impl PayoutReleased {
    /// Extract and parse the payload of a payout-released event.
    pub fn from_event(event: &ChainEvent) -> Result<Self, ChainError> {
        #[derive(Deserialize)]
        struct Wire {
            campaign_id: String,
            influencer: String,
            amount: String,
            reason: String,
        }

        let wire: Wire = serde_json::from_value(event.data.clone())
            .map_err(|e| ChainError::Parse(format!("invalid payout payload: {e}")))?;

        let campaign_id = wire.campaign_id.parse().map_err(|e| {
            ChainError::Parse(format!("invalid campaign_id {:?}: {e}", wire.campaign_id))
        })?;
        let amount = wire
            .amount
            .parse()
            .map_err(|e| ChainError::Parse(format!("invalid amount {:?}: {e}", wire.amount)))?;

        Ok(Self {
            campaign_id,
            recipient: wire.influencer,
            amount,
            reason: wire.reason,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn event(type_tag: &str, data: serde_json::Value) -> ChainEvent {
        ChainEvent {
            sequence_number: "7".to_string(),
            type_tag: type_tag.to_string(),
            data,
        }
    }

    #[test]
    fn test_payout_type_tag_matching() {
        let payout = event("0xabc::influencer_mkt::PayoutReleased", json!({}));
        assert!(payout.is_payout_released());

        let other = event("0xabc::influencer_mkt::CampaignCreated", json!({}));
        assert!(!other.is_payout_released());

        // Matching is by suffix, so the module address does not matter.
        let moved = event("0xdef::influencer_mkt::PayoutReleased", json!({}));
        assert!(moved.is_payout_released());
    }

    #[test]
    fn test_sequence_parsing() {
        let e = event("x::y::PayoutReleased", json!({}));
        assert_eq!(e.sequence().unwrap(), 7);

        let bad = ChainEvent {
            sequence_number: "not-a-number".to_string(),
            type_tag: "x::y::PayoutReleased".to_string(),
            data: json!({}),
        };
        assert!(bad.sequence().is_err());
    }

    #[test]
    fn test_payout_payload_parsing() {
        let e = event(
            "0xabc::influencer_mkt::PayoutReleased",
            json!({
                "campaign_id": "1",
                "influencer": "0xabc",
                "amount": "100",
                "reason": "threshold_breach",
            }),
        );
        let payout = PayoutReleased::from_event(&e).unwrap();
        assert_eq!(
            payout,
            PayoutReleased {
                campaign_id: 1,
                recipient: "0xabc".to_string(),
                amount: 100,
                reason: "threshold_breach".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let missing_field = event(
            "0xabc::influencer_mkt::PayoutReleased",
            json!({ "campaign_id": "1", "influencer": "0xabc" }),
        );
        assert!(PayoutReleased::from_event(&missing_field).is_err());

        let bad_amount = event(
            "0xabc::influencer_mkt::PayoutReleased",
            json!({
                "campaign_id": "1",
                "influencer": "0xabc",
                "amount": "lots",
                "reason": "threshold_breach",
            }),
        );
        assert!(PayoutReleased::from_event(&bad_amount).is_err());
    }
}
