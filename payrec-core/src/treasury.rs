//! Treasury balance monitoring.
//!
//! Once per reconciliation tick the monitor samples the treasury
//! balance and raises a low-balance alert through the notifier gateway.
//! A sustained low balance re-alerts every tick; there is no
//! cross-tick suppression.

use crate::chain::BalanceQuery;
use crate::notify::Notifier;
use crate::utils::forecast::predict_next;
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of balance samples retained for trend detection.
const SAMPLE_WINDOW: usize = 16;

/// Configuration for the balance monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Treasury account to watch.
    pub treasury_address: String,
    /// Minimum balance floor in the asset's smallest unit. Zero
    /// disables the monitor entirely.
    pub min_balance: u64,
}

/// Watches the treasury balance and alerts when it drops below the
/// configured floor, or when the sampled trend projects it will on the
/// next cycle.
pub struct BalanceMonitor<B, N> {
    chain: Arc<B>,
    notifier: Arc<N>,
    config: MonitorConfig,
    /// Recent balance samples, one per tick, oldest first.
    samples: Vec<f64>,
}

impl<B: BalanceQuery, N: Notifier> BalanceMonitor<B, N> {
    /// Create a new BalanceMonitor.
    pub fn new(chain: Arc<B>, notifier: Arc<N>, config: MonitorConfig) -> Self {
        Self {
            chain,
            notifier,
            config,
            samples: Vec::with_capacity(SAMPLE_WINDOW),
        }
    }

    /// Sample the treasury balance and emit at most one alert.
    ///
    /// A failed balance fetch is suppressed: it logs a warning and emits
    /// nothing, rather than false-alarming during a node outage.
    pub async fn check_and_alert(&mut self) {
        if self.config.min_balance == 0 {
            return;
        }

        let balance = match self.chain.balance_of(&self.config.treasury_address).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(
                    address = %self.config.treasury_address,
                    error = %e,
                    "Treasury balance fetch failed, skipping check"
                );
                return;
            }
        };

        self.push_sample(balance);
        debug!(balance = balance, floor = self.config.min_balance, "Treasury balance sampled");

        if balance < self.config.min_balance {
            let _ = self
                .notifier
                .notify(&format!(
                    "⚠️ Treasury low: balance={balance} octas (floor {}). Please top up.",
                    self.config.min_balance
                ))
                .await;
            return;
        }

        // Early warning: still above the floor, but the recent trend
        // projects the next sample below it.
        if let Some(projected) = self.projected_next() {
            if projected < self.config.min_balance as f64 {
                let _ = self
                    .notifier
                    .notify(&format!(
                        "📉 Treasury trending low: balance={balance} octas, projected {projected:.0} next cycle (floor {}).",
                        self.config.min_balance
                    ))
                    .await;
            }
        }
    }

    fn push_sample(&mut self, balance: u64) {
        self.samples.push(balance as f64);
        if self.samples.len() > SAMPLE_WINDOW {
            self.samples.remove(0);
        }
    }

    /// Projected next balance. Samples are taken once per tick, so the
    /// tick ordinal serves as a uniform time axis.
    fn projected_next(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let times: Vec<f64> = (0..self.samples.len()).map(|i| i as f64).collect();
        Some(predict_next(&times, &self.samples))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::chain::ChainError;
    use crate::notify::NotifyError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedBalance {
        responses: Mutex<VecDeque<Result<u64, ChainError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedBalance {
        fn new(responses: Vec<Result<u64, ChainError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl BalanceQuery for ScriptedBalance {
        async fn balance_of(&self, _address: &str) -> Result<u64, ChainError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(0))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, text: &str) -> Result<(), NotifyError> {
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn monitor(
        responses: Vec<Result<u64, ChainError>>,
        min_balance: u64,
    ) -> (
        BalanceMonitor<ScriptedBalance, RecordingNotifier>,
        Arc<ScriptedBalance>,
        Arc<RecordingNotifier>,
    ) {
        let chain = Arc::new(ScriptedBalance::new(responses));
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor = BalanceMonitor::new(
            chain.clone(),
            notifier.clone(),
            MonitorConfig {
                treasury_address: "0xtreasury".to_string(),
                min_balance,
            },
        );
        (monitor, chain, notifier)
    }

    #[tokio::test]
    async fn test_zero_floor_disables_check() {
        let (mut monitor, chain, notifier) = monitor(vec![Ok(1)], 0);
        monitor.check_and_alert().await;
        assert_eq!(chain.call_count(), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_below_floor_alerts_with_balance() {
        let (mut monitor, _, notifier) = monitor(vec![Ok(42)], 100);
        monitor.check_and_alert().await;

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("42"));
    }

    #[tokio::test]
    async fn test_sustained_low_balance_realerts_every_tick() {
        let (mut monitor, _, notifier) = monitor(vec![Ok(40), Ok(41)], 100);
        monitor.check_and_alert().await;
        monitor.check_and_alert().await;
        assert_eq!(notifier.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_suppressed() {
        let (mut monitor, _, notifier) = monitor(
            vec![Err(ChainError::AccountNotFound("0xtreasury".to_string()))],
            100,
        );
        monitor.check_and_alert().await;
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_downward_trend_warns_before_crossing_floor() {
        // 310 -> 200 projects 90 on the next cycle, below the floor of
        // 100, while the current balance is still above it.
        let (mut monitor, _, notifier) = monitor(vec![Ok(310), Ok(200)], 100);
        monitor.check_and_alert().await;
        monitor.check_and_alert().await;

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("trending low"));
    }

    #[tokio::test]
    async fn test_stable_balance_above_floor_stays_quiet() {
        let (mut monitor, _, notifier) = monitor(vec![Ok(500), Ok(500), Ok(500)], 100);
        for _ in 0..3 {
            monitor.check_and_alert().await;
        }
        assert!(notifier.messages().is_empty());
    }
}
