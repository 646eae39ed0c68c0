//! Greedy adaptive bot - one-step impact minimisation.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{candidate_grid, invalid, require_positive, ParentOrder, DEFAULT_CANDIDATES, MAX_CANDIDATES};
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{Side, SweepResult};
use crate::strategy::{ExecutionStrategy, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyAdaptiveConfig {
    /// Slice sizes tried each tick
    pub candidates: Vec<f64>,
    pub min_slice: f64,
    pub max_slice: f64,
}

impl Default for GreedyAdaptiveConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.to_vec(),
            min_slice: 0.1,
            max_slice: 10.0,
        }
    }
}

/// Each tick, estimates the impact of every candidate slice against the live
/// book and sweeps the one with the least.
///
/// Impact is estimated for the candidate rounded to a whole size of at least
/// one unit. Without a mid price the bot falls back to `min_slice`.
#[derive(Debug, Clone)]
pub struct GreedyAdaptiveBot {
    pub config: GreedyAdaptiveConfig,
    grid: ArrayVec<f64, MAX_CANDIDATES>,
    parent: ParentOrder,
}

impl GreedyAdaptiveBot {
    pub fn new(config: GreedyAdaptiveConfig) -> Result<Self> {
        let grid = candidate_grid(&config.candidates)?;
        require_positive(config.min_slice, "minimum slice")?;
        require_positive(config.max_slice, "maximum slice")?;
        if config.min_slice > config.max_slice {
            return Err(invalid(format!(
                "minimum slice {} exceeds maximum slice {}",
                config.min_slice, config.max_slice
            )));
        }
        Ok(Self { config, grid, parent: ParentOrder::default() })
    }

    /// Pick this tick's slice size.
    pub fn choose_slice(&self, market: &Market) -> Result<f64> {
        if market.book().mid().is_none() {
            return Ok(self.config.min_slice);
        }

        let mut best = self.config.min_slice;
        let mut best_bps = f64::INFINITY;
        for &candidate in &self.grid {
            let slice = candidate
                .min(self.parent.remaining)
                .min(self.config.max_slice)
                .max(self.config.min_slice);
            let probe = slice.round_ties_even().max(1.0);
            // Lower bps is a cheaper buy and a richer sell alike.
            let bps = market.estimate_impact_bps(self.parent.side, probe)?;
            if bps < best_bps {
                best_bps = bps;
                best = slice;
            }
        }
        Ok(best)
    }
}

impl Strategy for GreedyAdaptiveBot {
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
        "greedy_adaptive"
    }
}

impl ExecutionStrategy for GreedyAdaptiveBot {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineConfig};
    use crate::order::OrderRequest;
    use crate::price_process::ReferenceProcess;

    fn market(orders: &[OrderRequest]) -> Market {
        let mut market = Market::new(ReferenceProcess::new(100.0, 0.0, None).unwrap());
        for order in orders {
            market.place(*order).unwrap();
        }
        market
    }

    fn started(config: GreedyAdaptiveConfig, side: Side, total: f64) -> GreedyAdaptiveBot {
        let mut bot = GreedyAdaptiveBot::new(config).unwrap();
        bot.start_order(side, total);
        bot
    }

    #[test]
    fn test_falls_back_without_mid() {
        let market = market(&[OrderRequest::sell(101.0, 5.0)]);
        let bot = started(GreedyAdaptiveConfig::default(), Side::Buy, 10.0);
        assert_eq!(bot.choose_slice(&market).unwrap(), 0.1);
    }

    #[test]
    fn test_prefers_slice_inside_touch() {
        // One unit at the touch, then a gap
        let market = market(&[
            OrderRequest::buy(99.0, 1.0),
            OrderRequest::sell(101.0, 1.0),
            OrderRequest::sell(110.0, 10.0),
        ]);
        let config = GreedyAdaptiveConfig { candidates: vec![5.0, 2.0, 1.0], ..GreedyAdaptiveConfig::default() };
        let bot = started(config, Side::Buy, 10.0);
        assert_eq!(bot.choose_slice(&market).unwrap(), 1.0);
    }

    #[test]
    fn test_sell_side_picks_least_impact() {
        let market = market(&[
            OrderRequest::buy(99.0, 2.0),
            OrderRequest::buy(90.0, 10.0),
            OrderRequest::sell(101.0, 1.0),
        ]);
        let config = GreedyAdaptiveConfig { candidates: vec![4.0, 2.0], ..GreedyAdaptiveConfig::default() };
        let bot = started(config, Side::Sell, 10.0);
        assert_eq!(bot.choose_slice(&market).unwrap(), 2.0);
    }

    #[test]
    fn test_candidates_are_clamped() {
        let market = market(&[OrderRequest::buy(99.0, 10.0), OrderRequest::sell(101.0, 10.0)]);
        let config = GreedyAdaptiveConfig {
            candidates: vec![50.0],
            min_slice: 0.5,
            max_slice: 3.0,
        };
        let bot = started(config, Side::Buy, 2.0);
        assert_eq!(bot.choose_slice(&market).unwrap(), 2.0);
    }

    #[test]
    fn test_works_order_to_completion() {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        engine.place(OrderRequest::buy(99.0, 1.0)).unwrap();
        engine.place(OrderRequest::sell(101.0, 20.0)).unwrap();

        let config = GreedyAdaptiveConfig { candidates: vec![1.0], ..GreedyAdaptiveConfig::default() };
        let bot = std::rc::Rc::new(std::cell::RefCell::new(started(config, Side::Buy, 3.0)));
        engine.register(bot.clone());
        engine.run(5);

        let bot = bot.borrow();
        assert!(!bot.is_active());
        assert_eq!(bot.executions().len(), 3);
        assert!(bot.executions().iter().all(|r| r.vwap == Some(101.0)));
    }
}
