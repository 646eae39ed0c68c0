//! Informed trader - occasional aggressive sweeps.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{invalid, require_positive, rng_from};
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{Side, SweepResult};
use crate::strategy::Strategy;

/// Configuration for the informed trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InformedTraderConfig {
    /// Probability of acting on a given tick
    pub activity_prob: f64,
    /// Size of each sweep
    pub size: f64,
    /// Forced direction; a fair coin decides when unset
    pub direction: Option<Side>,
}

impl Default for InformedTraderConfig {
    fn default() -> Self {
        Self {
            activity_prob: 0.05,
            size: 5.0,
            direction: None,
        }
    }
}

/// Takes liquidity at random ticks with a market sweep.
#[derive(Debug, Clone)]
pub struct InformedTrader {
    pub config: InformedTraderConfig,
    rng: ChaCha8Rng,
    /// Every sweep this trader has made
    pub executions: Vec<SweepResult>,
}

impl InformedTrader {
    pub fn new(config: InformedTraderConfig, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.activity_prob) {
            return Err(invalid(format!(
                "activity probability must be within [0, 1], got {}",
                config.activity_prob
            )));
        }
        require_positive(config.size, "sweep size")?;
        Ok(Self {
            config,
            rng: rng_from(seed),
            executions: Vec::new(),
        })
    }
}

impl Strategy for InformedTrader {
    fn on_tick(&mut self, market: &mut Market) -> std::result::Result<(), StrategyError> {
        if self.rng.gen::<f64>() > self.config.activity_prob {
            return Ok(());
        }
        let side = match self.config.direction {
            Some(side) => side,
            None if self.rng.gen::<f64>() < 0.5 => Side::Buy,
            None => Side::Sell,
        };

        let result = market.execute_market_sweep(side, self.config.size)?;
        tracing::debug!(
            tick = market.tick(),
            %side,
            executed = result.executed_size,
            vwap = ?result.vwap,
            "informed sweep"
        );
        self.executions.push(result);
        Ok(())
    }

    fn name(&self) -> &str {
        "informed_trader"
    }
}
