//! Payout event reconciler.
//!
//! The reconciler polls the on-chain payout event log on a fixed
//! interval and drives side effects for each payout-released event:
//! a best-effort notification followed by the payout transfer. The
//! cursor advances to the end of a fetched page before side effects
//! run, so a crash mid-page drops the remainder of that page rather
//! than replaying it on restart (at-most-once delivery).
//!
//! Ticks never overlap: each tick runs to completion (or failure)
//! before the next fetch begins. A failed tick is logged and the loop
//! continues on the next interval.

use crate::chain::{BalanceQuery, ChainError, EventLog, PayoutExecutor, PayoutReleased};
use crate::cursor::EventCursor;
use crate::notify::Notifier;
use crate::treasury::BalanceMonitor;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Errors that abort a reconciliation tick.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Event log fetch or page decoding failed; the cursor is untouched
    /// and the next tick retries from the same position.
    #[error("event fetch error: {0}")]
    Fetch(#[source] ChainError),
}

/// Configuration for the reconciler loop.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Polling interval between ticks.
    pub poll_interval: Duration,
    /// Maximum events fetched per tick.
    pub page_size: u16,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(4000),
            page_size: 100,
        }
    }
}

/// Outcome of a single reconciliation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Events returned by the log this tick.
    pub fetched: usize,
    /// Payout transfers successfully submitted.
    pub payouts_triggered: usize,
    /// Payout events abandoned (malformed payload or failed transfer).
    pub skipped: usize,
}

/// Polls the payout event log and triggers per-event side effects.
pub struct PayoutReconciler<L, P, B, N> {
    log: Arc<L>,
    payouts: P,
    notifier: Arc<N>,
    monitor: BalanceMonitor<B, N>,
    cursor: EventCursor,
    config: ReconcilerConfig,
}

impl<L, P, B, N> PayoutReconciler<L, P, B, N>
where
    L: EventLog,
    P: PayoutExecutor,
    B: BalanceQuery,
    N: Notifier,
{
    /// Create a new PayoutReconciler.
    pub fn new(
        log: Arc<L>,
        payouts: P,
        notifier: Arc<N>,
        monitor: BalanceMonitor<B, N>,
        cursor: EventCursor,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            log,
            payouts,
            notifier,
            monitor,
            cursor,
            config,
        }
    }

    /// The current cursor position.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor.current()
    }

    /// Run the reconciler until shutdown is signaled.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            page_size = self.config.page_size,
            "PayoutReconciler started"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        // A slow tick delays the next one instead of letting ticks
        // overlap or burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("PayoutReconciler received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    match self.run_tick().await {
                        Ok(report) if report.fetched > 0 => {
                            debug!(
                                fetched = report.fetched,
                                payouts_triggered = report.payouts_triggered,
                                skipped = report.skipped,
                                "Reconciliation tick completed"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            // A failed tick never terminates the loop.
                            error!(error = %e, "Reconciliation tick failed");
                        }
                    }
                }
            }
        }

        info!("PayoutReconciler shutdown complete");
    }

    /// Run one reconciliation tick.
    ///
    /// Fetches the next page of events after the cursor, advances the
    /// cursor, triggers side effects for payout-released events, then
    /// runs the balance monitor once. Per-event failures (malformed
    /// payload, failed transfer) are isolated so one bad event does not
    /// block its siblings in the page.
    pub async fn run_tick(&mut self) -> Result<TickReport, ReconcileError> {
        let start = self.cursor.current().map(|seq| seq + 1);
        let events = self
            .log
            .fetch_events(start, self.config.page_size)
            .await
            .map_err(ReconcileError::Fetch)?;

        let mut report = TickReport {
            fetched: events.len(),
            ..TickReport::default()
        };

        if let Some(last) = events.last() {
            // Advance before running side effects: a crash mid-page
            // drops the rest of the page instead of replaying it.
            let last_seq = last.sequence().map_err(ReconcileError::Fetch)?;
            self.cursor.advance(last_seq);
        }

        for event in &events {
            if !event.is_payout_released() {
                continue;
            }

            let payout = match PayoutReleased::from_event(event) {
                Ok(payout) => payout,
                Err(e) => {
                    warn!(
                        sequence = %event.sequence_number,
                        error = %e,
                        "Skipping malformed payout event"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            // Best effort; delivery failure must not block the payout.
            let _ = self
                .notifier
                .notify(&format!(
                    "✅ Payout event: Campaign #{} → {} amount={} reason={}",
                    payout.campaign_id, payout.recipient, payout.amount, payout.reason
                ))
                .await;

            match self
                .payouts
                .execute_payout(
                    &payout.recipient,
                    payout.amount,
                    payout.campaign_id,
                    &payout.reason,
                )
                .await
            {
                Ok(hash) => {
                    info!(
                        campaign_id = payout.campaign_id,
                        recipient = %payout.recipient,
                        amount = payout.amount,
                        txn = %hash,
                        "Payout transfer confirmed"
                    );
                    report.payouts_triggered += 1;
                }
                Err(e) => {
                    warn!(
                        campaign_id = payout.campaign_id,
                        recipient = %payout.recipient,
                        error = %e,
                        "Payout transfer failed, not retried"
                    );
                    report.skipped += 1;
                }
            }
        }

        self.monitor.check_and_alert().await;

        Ok(report)
    }
}
