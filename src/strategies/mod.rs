//! Reference strategies.
//!
//! Liquidity providers (`MarketMaker`, `NoiseTrader`) and takers
//! (`InformedTrader`) generate order flow. The execution strategies work a
//! parent order down over several ticks and implement
//! [`ExecutionStrategy`](crate::strategy::ExecutionStrategy):
//! - `SplittingBot` - fixed TWAP-style slices
//! - `AdaptiveSplittingBot` - slices sized from visible best-level depth
//! - `GreedyAdaptiveBot` - picks the candidate slice with the least estimated impact
//! - `GreedyLookaheadBot` - simulates several future slices per candidate

pub mod adaptive;
pub mod greedy;
pub mod informed_trader;
pub mod lookahead;
pub mod market_maker;
pub mod noise_trader;
pub mod splitting;

pub use adaptive::{AdaptiveSplittingBot, AdaptiveSplittingConfig};
pub use greedy::{GreedyAdaptiveBot, GreedyAdaptiveConfig};
pub use informed_trader::{InformedTrader, InformedTraderConfig};
pub use lookahead::{GreedyLookaheadBot, GreedyLookaheadConfig};
pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use noise_trader::{NoiseTrader, NoiseTraderConfig};
pub use splitting::{SplittingBot, SplittingConfig};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

use crate::error::{EngineError, Result};
use crate::order::{Side, SweepResult};

/// Default candidate slice sizes for the greedy strategies.
pub const DEFAULT_CANDIDATES: [f64; 7] = [0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0];

/// Upper bound on candidate grid length.
pub const MAX_CANDIDATES: usize = 16;

/// Seeded or entropy-seeded RNG.
pub(crate) fn rng_from(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Zero-mean normal noise; `None` when `std_dev` is zero.
pub(crate) fn noise(std_dev: f64, what: &str) -> Result<Option<Normal<f64>>> {
    if !(std_dev.is_finite() && std_dev >= 0.0) {
        return Err(invalid(format!("{what} must be finite and non-negative, got {std_dev}")));
    }
    if std_dev == 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, std_dev)
        .map(Some)
        .map_err(|e| invalid(format!("{what}: {e}")))
}

pub(crate) fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig(message)
}

pub(crate) fn require_positive(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{what} must be finite and positive, got {value}")))
    }
}

/// Bookkeeping shared by the execution strategies.
#[derive(Clone, Debug)]
pub(crate) struct ParentOrder {
    pub side: Side,
    pub total: f64,
    pub remaining: f64,
    pub active: bool,
    pub executions: Vec<SweepResult>,
}

impl Default for ParentOrder {
    fn default() -> Self {
        Self {
            side: Side::Buy,
            total: 0.0,
            remaining: 0.0,
            active: false,
            executions: Vec::new(),
        }
    }
}

impl ParentOrder {
    pub fn start(&mut self, side: Side, total: f64) {
        self.side = side;
        self.total = total;
        self.remaining = total;
        self.active = total > 0.0;
        self.executions.clear();
    }

    /// Armed and not yet done.
    pub fn working(&self) -> bool {
        self.active && self.remaining > 0.0
    }

    /// Log a sweep and reduce the remaining size; deactivates when done.
    pub fn record(&mut self, result: SweepResult) {
        self.remaining -= result.executed_size;
        self.executions.push(result);
        if self.remaining <= 0.0 {
            self.active = false;
        }
    }
}

/// Score for comparing candidate average prices: lower is better.
///
/// Buyers want a low price, sellers a high one.
pub(crate) fn price_cost(side: Side, avg_price: f64) -> f64 {
    match side {
        Side::Buy => avg_price,
        Side::Sell => -avg_price,
    }
}

/// Validate a candidate grid and copy it onto the stack.
pub(crate) fn candidate_grid(candidates: &[f64]) -> Result<arrayvec::ArrayVec<f64, MAX_CANDIDATES>> {
    if candidates.is_empty() {
        return Err(invalid("candidate list must not be empty".to_string()));
    }
    let mut grid = arrayvec::ArrayVec::new();
    for &c in candidates {
        require_positive(c, "candidate slice")?;
        grid.try_push(c)
            .map_err(|_| invalid(format!("at most {MAX_CANDIDATES} candidates are supported")))?;
    }
    Ok(grid)
}
