//! Greedy lookahead bot - multi-step simulated execution.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{candidate_grid, invalid, price_cost, require_positive, ParentOrder, DEFAULT_CANDIDATES, MAX_CANDIDATES};
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{OrderRequest, Side, SweepResult};
use crate::strategy::{ExecutionStrategy, Fills, Strategy};

/// Offset from mid at which replenished liquidity is assumed to rest.
const REFILL_OFFSET: f64 = 0.5;
/// Offset from the reference value used when the book has no mid.
const FALLBACK_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyLookaheadConfig {
    /// Number of slices simulated per candidate, including the immediate one
    pub horizon: usize,
    pub candidates: Vec<f64>,
    /// Passive size assumed to be replenished after each simulated slice
    pub mm_assume_size: f64,
}

impl Default for GreedyLookaheadConfig {
    fn default() -> Self {
        Self {
            horizon: 3,
            candidates: DEFAULT_CANDIDATES.to_vec(),
            mm_assume_size: 1.0,
        }
    }
}

/// Chooses the slice whose repeated execution over the horizon gives the
/// best average price on a simulated book.
///
/// Between simulated slices the book is topped up with `mm_assume_size` of
/// passive liquidity half a unit behind the mid, approximating market makers
/// refilling the touch.
#[derive(Debug, Clone)]
pub struct GreedyLookaheadBot {
    pub config: GreedyLookaheadConfig,
    grid: ArrayVec<f64, MAX_CANDIDATES>,
    parent: ParentOrder,
}

impl GreedyLookaheadBot {
    pub fn new(config: GreedyLookaheadConfig) -> Result<Self> {
        if config.horizon == 0 {
            return Err(invalid("lookahead horizon must be at least 1".to_string()));
        }
        let grid = candidate_grid(&config.candidates)?;
        require_positive(config.mm_assume_size, "assumed market maker size")?;
        Ok(Self { config, grid, parent: ParentOrder::default() })
    }

    /// Average price of taking `slice` on every step of the horizon;
    /// `None` when nothing would fill.
    pub fn simulate_candidate(&self, market: &Market, slice: f64) -> Result<Option<f64>> {
        let side = self.parent.side;
        let mut book = market.snapshot();
        let mut fills = Fills::default();

        for _ in 0..self.config.horizon {
            let simulation = book.simulate_market_sweep(side, slice)?;
            fills.extend(&[simulation.result]);
            book = simulation.book;

            let refill = match book.mid() {
                Some(mid) => match side {
                    Side::Buy => mid + REFILL_OFFSET,
                    Side::Sell => mid - REFILL_OFFSET,
                },
                None => match side {
                    Side::Buy => market.reference_value() + FALLBACK_OFFSET,
                    Side::Sell => market.reference_value() - FALLBACK_OFFSET,
                },
            };
            book.push(OrderRequest::new(side.opposite(), refill, self.config.mm_assume_size))?;
        }
        Ok(fills.avg_price())
    }

    /// Pick this tick's slice size.
    pub fn choose_slice(&self, market: &Market) -> Result<f64> {
        let mut best = self.grid[0];
        let mut best_cost = f64::INFINITY;
        for &candidate in &self.grid {
            let slice = candidate.min(self.parent.remaining).max(0.0);
            if slice <= 0.0 {
                continue;
            }
            let cost = match self.simulate_candidate(market, slice)? {
                Some(avg_price) => price_cost(self.parent.side, avg_price),
                None => f64::INFINITY,
            };
            if cost < best_cost {
                best_cost = cost;
                best = slice;
            }
        }
        Ok(best)
    }
}

impl Strategy for GreedyLookaheadBot {
    fn on_tick(&mut self, market: &mut Market) -> std::result::Result<(), StrategyError> {
        if !self.parent.working() {
            return Ok(());
        }
        let slice = self.choose_slice(market)?.min(self.parent.remaining);
        let result = market.execute_market_sweep(self.parent.side, slice)?;
        self.parent.record(result);
        Ok(())
    }

    fn name(&self) -> &str {
        "greedy_lookahead"
    }
}

impl ExecutionStrategy for GreedyLookaheadBot {
    fn start_order(&mut self, side: Side, total_size: f64) {
        self.parent.start(side, total_size);
    }

    fn is_active(&self) -> bool {
        self.parent.working()
    }

    fn remaining(&self) -> f64 {
        self.parent.remaining
    }

    fn executions(&self) -> &[SweepResult] {
        &self.parent.executions
    }

    fn take_executions(&mut self) -> Vec<SweepResult> {
        std::mem::take(&mut self.parent.executions)
    }
}
