//! Splitting bot - TWAP-style fixed slices.

use serde::{Deserialize, Serialize};

use super::{require_positive, ParentOrder};
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{Side, SweepResult};
use crate::strategy::{ExecutionStrategy, Strategy};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplittingConfig {
    /// Fixed slice size; overrides the slice count given at start
    pub slice_size: Option<f64>,
}

/// Executes a parent order as a series of equal market sweeps, one per tick.
#[derive(Debug, Clone)]
pub struct SplittingBot {
    pub config: SplittingConfig,
    parent: ParentOrder,
    slices: usize,
    slice: usize,
}

impl SplittingBot {
    pub fn new(config: SplittingConfig) -> Result<Self> {
        if let Some(size) = config.slice_size {
            require_positive(size, "slice size")?;
        }
        Ok(Self {
            config,
            parent: ParentOrder::default(),
            slices: 0,
            slice: 0,
        })
    }

    /// Start working `total_size` over `slices` ticks.
    ///
    /// With a fixed slice size the count is derived from it instead.
    pub fn start_order_in_slices(&mut self, side: Side, total_size: f64, slices: usize) {
        self.slices = match self.config.slice_size {
            Some(size) => (total_size / size).round_ties_even().max(1.0) as usize,
            None => slices.max(1),
        };
        self.slice = 0;
        self.parent.start(side, total_size);
    }

    /// Number of slices planned for the current parent order
    pub fn slices(&self) -> usize {
        self.slices
    }

    fn next_slice(&self) -> f64 {
        let slice = match self.config.slice_size {
            Some(size) => size,
            None => {
                let left = self.slices.saturating_sub(self.slice).max(1);
                self.parent.remaining / left as f64
            }
        };
        slice.min(self.parent.remaining)
    }
}

impl Strategy for SplittingBot {
    fn on_tick(&mut self, market: &mut Market) -> std::result::Result<(), StrategyError> {
        if !self.parent.working() {
            return Ok(());
        }
        let result = market.execute_market_sweep(self.parent.side, self.next_slice())?;
        self.parent.record(result);
        self.slice += 1;
        if self.slice >= self.slices {
            self.parent.active = false;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "splitting"
    }
}

impl ExecutionStrategy for SplittingBot {
    /// One slice per whole unit of size (at least one) unless a fixed slice
    /// size is configured.
    fn start_order(&mut self, side: Side, total_size: f64) {
        let slices = total_size.trunc().max(1.0) as usize;
        self.start_order_in_slices(side, total_size, slices);
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
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine_with_asks(asks: &[(f64, f64)]) -> Engine {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        for &(price, size) in asks {
            engine.place(OrderRequest::sell(price, size)).unwrap();
        }
        engine
    }

    #[test]
    fn test_equal_slices() {
        let mut engine = engine_with_asks(&[(101.0, 10.0)]);
        let bot = Rc::new(RefCell::new(SplittingBot::new(SplittingConfig::default()).unwrap()));
        bot.borrow_mut().start_order_in_slices(Side::Buy, 6.0, 3);
        engine.register(bot.clone());

        engine.run(5);

        let bot = bot.borrow();
        let sizes: Vec<f64> = bot.executions().iter().map(|r| r.executed_size).collect();
        assert_eq!(sizes, vec![2.0, 2.0, 2.0]);
        assert!(!bot.is_active());
        assert_eq!(bot.remaining(), 0.0);
    }

    #[test]
    fn test_fixed_slice_size() {
        let mut engine = engine_with_asks(&[(101.0, 10.0)]);
        let config = SplittingConfig { slice_size: Some(1.5) };
        let bot = Rc::new(RefCell::new(SplittingBot::new(config).unwrap()));
        bot.borrow_mut().start_order(Side::Buy, 4.0);
        assert_eq!(bot.borrow().slices(), 3);
        engine.register(bot.clone());

        engine.run(5);

        let sizes: Vec<f64> = bot.borrow().executions().iter().map(|r| r.executed_size).collect();
        assert_eq!(sizes, vec![1.5, 1.5, 1.0]);
    }

    #[test]
    fn test_stops_after_planned_slices_even_if_unfilled() {
        let mut engine = engine_with_asks(&[(101.0, 1.0)]);
        let bot = Rc::new(RefCell::new(SplittingBot::new(SplittingConfig::default()).unwrap()));
        bot.borrow_mut().start_order_in_slices(Side::Buy, 4.0, 2);
        engine.register(bot.clone());

        engine.run(4);

        let bot = bot.borrow();
        assert_eq!(bot.executions().len(), 2);
        assert!(!bot.is_active());
        assert_relative_eq!(bot.remaining(), 3.0);
    }

    #[test]
    fn test_default_slice_count() {
        let mut bot = SplittingBot::new(SplittingConfig::default()).unwrap();
        bot.start_order(Side::Sell, 5.7);
        assert_eq!(bot.slices(), 5);

        bot.start_order(Side::Sell, 0.4);
        assert_eq!(bot.slices(), 1);
    }

    #[test]
    fn test_take_executions_drains_log() {
        let mut engine = engine_with_asks(&[(101.0, 10.0)]);
        let bot = Rc::new(RefCell::new(SplittingBot::new(SplittingConfig::default()).unwrap()));
        bot.borrow_mut().start_order(Side::Buy, 2.0);
        engine.register(bot.clone());
        engine.step();

        assert_eq!(bot.borrow_mut().take_executions().len(), 1);
        assert!(bot.borrow().executions().is_empty());
        assert!(bot.borrow().is_active());
    }
}
