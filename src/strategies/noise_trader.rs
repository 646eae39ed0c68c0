//! Noise trader - random limit orders scattered around the reference value.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal, Poisson};
use serde::{Deserialize, Serialize};

use super::{invalid, noise, require_positive, rng_from};
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{OrderRequest, Side};
use crate::strategy::Strategy;

/// Smallest size a noise order is allowed to have.
const MIN_SIZE: f64 = 0.01;

/// Configuration for the noise trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTraderConfig {
    /// Mean number of orders per tick
    pub intensity: f64,
    /// Standard deviation of the price offset from the reference value
    pub spread: f64,
    /// Mean order size
    pub size_mean: f64,
}

impl Default for NoiseTraderConfig {
    fn default() -> Self {
        Self {
            intensity: 2.0,
            spread: 2.0,
            size_mean: 1.0,
        }
    }
}

/// Posts a Poisson-distributed number of random limit orders every tick.
#[derive(Debug, Clone)]
pub struct NoiseTrader {
    pub config: NoiseTraderConfig,
    arrivals: Option<Poisson<f64>>,
    offset: Option<Normal<f64>>,
    size: Exp<f64>,
    rng: ChaCha8Rng,
    pub orders_posted: usize,
}

impl NoiseTrader {
    pub fn new(config: NoiseTraderConfig, seed: Option<u64>) -> Result<Self> {
        if !(config.intensity.is_finite() && config.intensity >= 0.0) {
            return Err(invalid(format!(
                "intensity must be finite and non-negative, got {}",
                config.intensity
            )));
        }
        require_positive(config.size_mean, "mean order size")?;

        let arrivals = if config.intensity > 0.0 {
            Some(Poisson::new(config.intensity).map_err(|e| invalid(format!("intensity: {e}")))?)
        } else {
            None
        };
        let offset = noise(config.spread, "spread")?;
        let size = Exp::new(1.0 / config.size_mean).map_err(|e| invalid(format!("mean order size: {e}")))?;

        Ok(Self {
            config,
            arrivals,
            offset,
            size,
            rng: rng_from(seed),
            orders_posted: 0,
        })
    }

    fn next_request(&mut self, center: f64) -> OrderRequest {
        let side = if self.rng.gen::<f64>() < 0.5 { Side::Buy } else { Side::Sell };
        let offset = match &self.offset {
            Some(normal) => normal.sample(&mut self.rng),
            None => 0.0,
        };
        let size = self.size.sample(&mut self.rng).max(MIN_SIZE);
        OrderRequest::new(side, center + offset, size)
    }
}

impl Strategy for NoiseTrader {
    fn on_tick(&mut self, market: &mut Market) -> std::result::Result<(), StrategyError> {
        let count = match &self.arrivals {
            Some(arrivals) => arrivals.sample(&mut self.rng) as usize,
            None => return Ok(()),
        };
        let center = market.reference_value();

        for _ in 0..count {
            let request = self.next_request(center);
            market.place(request)?;
            self.orders_posted += 1;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "noise_trader"
    }
}
