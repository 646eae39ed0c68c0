//! Snapshot replay - evaluate an execution strategy against captured depth.
//!
//! Each snapshot replaces the whole book before the strategy's tick, so the
//! strategy only ever sees recorded liquidity. No matching pass runs and no
//! other strategy takes part.

use serde::Serialize;

use crate::error::Result;
use crate::market::Market;
use crate::order::{OrderRequest, Side};
use crate::order_book::SimulationSnapshot;
use crate::price_process::ReferenceProcess;
use crate::strategy::{ExecutionStrategy, Fills};
use crate::sweep::impact_bps;

/// Reference value of the replay market; snapshots carry their own prices.
const REPLAY_REFERENCE: f64 = 100.0;

/// Outcome of one replay.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub executed: f64,
    pub avg_price: Option<f64>,
    /// Slippage against the mid of the last replayed snapshot
    pub impact_bps: Option<f64>,
    pub remaining: f64,
    /// Snapshots replayed
    pub ticks: usize,
    /// Ticks on which the strategy's callback failed
    pub failures: usize,
}

/// An in-memory sequence of depth snapshots.
#[derive(Clone, Debug, Default)]
pub struct SnapshotReplay {
    snapshots: Vec<Vec<OrderRequest>>,
}

impl SnapshotReplay {
    pub fn new(snapshots: Vec<Vec<OrderRequest>>) -> Self {
        Self { snapshots }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Work `total_size` on `side` through the snapshots, one per tick.
    ///
    /// Stops when the order is complete, the snapshots run out, or
    /// `max_ticks` snapshots have been replayed. A strategy error is counted
    /// and the replay moves on to the next snapshot. A malformed snapshot
    /// aborts the replay.
    pub fn run<S>(
        &self,
        strategy: &mut S,
        side: Side,
        total_size: f64,
        max_ticks: Option<usize>,
    ) -> Result<ReplaySummary>
    where
        S: ExecutionStrategy + ?Sized,
    {
        let mut market = Market::new(ReferenceProcess::new(REPLAY_REFERENCE, 0.0, None)?);
        strategy.start_order(side, total_size);

        let limit = max_ticks.unwrap_or(usize::MAX);
        let mut fills = Fills::default();
        let mut remaining = total_size;
        let mut ticks = 0usize;
        let mut failures = 0;

        for snapshot in self.snapshots.iter().take(limit) {
            ticks += 1;
            market.snapshot_replace(snapshot)?;
            market.advance();

            if let Err(error) = strategy.on_tick(&mut market) {
                tracing::warn!(tick = ticks, strategy = strategy.name(), %error, "replay tick failed");
                failures += 1;
            }

            let executions = strategy.take_executions();
            fills.extend(&executions);
            let executed: f64 = executions.iter().map(|r| r.executed_size).sum();
            remaining = (remaining - executed).max(0.0);

            if remaining <= 0.0 {
                break;
            }
        }

        let avg_price = fills.avg_price();
        let last_mid = match ticks.checked_sub(1) {
            Some(last) => SimulationSnapshot::from_requests(&self.snapshots[last])?.mid(),
            None => None,
        };
        let impact = match (avg_price, last_mid) {
            (Some(avg), Some(mid)) => Some(impact_bps(side, avg, mid)),
            _ => None,
        };

        Ok(ReplaySummary {
            executed: fills.executed,
            avg_price,
            impact_bps: impact,
            remaining,
            ticks,
            failures,
        })
    }
}
