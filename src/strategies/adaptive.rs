//! Adaptive splitting - slice size follows visible liquidity at the touch.

use serde::{Deserialize, Serialize};

use super::{invalid, require_positive, ParentOrder};
use crate::depth::best_level;
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{Side, SweepResult};
use crate::strategy::{ExecutionStrategy, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveSplittingConfig {
    /// Fraction of best-level liquidity to take per tick, in (0, 1]
    pub aggressiveness: f64,
    pub min_slice: f64,
    pub max_slice: f64,
}

impl Default for AdaptiveSplittingConfig {
    fn default() -> Self {
        Self {
            aggressiveness: 0.5,
            min_slice: 0.1,
            max_slice: 10.0,
        }
    }
}

/// Takes a fixed fraction of the best passive level each tick.
///
/// Slices stay small while the touch is thin and grow as it deepens. A tick
/// with no visible liquidity still sweeps `min_slice` and leaves the order
/// working.
#[derive(Debug, Clone)]
pub struct AdaptiveSplittingBot {
    pub config: AdaptiveSplittingConfig,
    parent: ParentOrder,
}

impl AdaptiveSplittingBot {
    pub fn new(config: AdaptiveSplittingConfig) -> Result<Self> {
        if !(config.aggressiveness > 0.0 && config.aggressiveness <= 1.0) {
            return Err(invalid(format!(
                "aggressiveness must be within (0, 1], got {}",
                config.aggressiveness
            )));
        }
        require_positive(config.min_slice, "minimum slice")?;
        require_positive(config.max_slice, "maximum slice")?;
        if config.min_slice > config.max_slice {
            return Err(invalid(format!(
                "minimum slice {} exceeds maximum slice {}",
                config.min_slice, config.max_slice
            )));
        }
        Ok(Self { config, parent: ParentOrder::default() })
    }

    fn best_visible_liquidity(&self, market: &Market) -> f64 {
        let levels = market.cumulative_depth();
        best_level(&levels, self.parent.side.opposite())
            .map(|level| level.cumulative_size)
            .unwrap_or(0.0)
    }

    fn next_slice(&self, market: &Market) -> f64 {
        let visible = self.best_visible_liquidity(market);
        (self.config.aggressiveness * visible)
            .max(self.config.min_slice)
            .min(self.config.max_slice)
            .min(self.parent.remaining)
    }
}

impl Strategy for AdaptiveSplittingBot {
    fn on_tick(&mut self, market: &mut Market) -> std::result::Result<(), StrategyError> {
        if !self.parent.working() {
            return Ok(());
        }
        let slice = self.next_slice(market);
        let result = market.execute_market_sweep(self.parent.side, slice)?;
        self.parent.record(result);
        Ok(())
    }

    fn name(&self) -> &str {
        "adaptive_splitting"
    }
}

impl ExecutionStrategy for AdaptiveSplittingBot {
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
