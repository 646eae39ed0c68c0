//! Execution runner - works one parent order through a live engine.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::engine::Engine;
use crate::order::Side;
use crate::strategy::{ExecutionStrategy, Fills, Strategy};
use crate::sweep::impact_bps;

/// Execution quality of one parent order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub strategy: String,
    pub side: Side,
    pub requested: f64,
    pub executed: f64,
    pub avg_price: Option<f64>,
    /// Mid of the live book after the last tick, or the reference value
    /// when the book has no mid
    pub benchmark: f64,
    pub impact_bps: Option<f64>,
    pub remaining: f64,
    pub ticks: usize,
    /// Ticks on which the strategy's callback failed
    pub failures: usize,
}

/// Arm `strategy` with a parent order and step `engine` until the strategy
/// goes inactive or `max_ticks` ticks have run.
///
/// The strategy is registered after any strategies already in the engine,
/// so liquidity providers registered earlier act first on every tick.
pub fn run_execution<S>(
    engine: &mut Engine,
    strategy: S,
    side: Side,
    total_size: f64,
    max_ticks: usize,
) -> ExecutionReport
where
    S: ExecutionStrategy + 'static,
{
    let name = Strategy::name(&strategy).to_string();
    let handle = Rc::new(RefCell::new(strategy));
    handle.borrow_mut().start_order(side, total_size);
    let index = engine.register(handle.clone());

    let mut ticks = 0;
    let mut failures = 0;
    while ticks < max_ticks && handle.borrow().is_active() {
        let report = engine.step();
        failures += report.failures.iter().filter(|f| f.index == index).count();
        ticks += 1;
    }

    let strategy = handle.borrow();
    let fills = Fills::from_executions(strategy.executions());
    let avg_price = fills.avg_price();
    let benchmark = engine.market.book().mid().unwrap_or_else(|| engine.reference_value());

    tracing::info!(
        strategy = %name,
        %side,
        executed = fills.executed,
        avg_price = ?avg_price,
        ticks,
        "execution finished"
    );

    ExecutionReport {
        strategy: name,
        side,
        requested: total_size,
        executed: fills.executed,
        avg_price,
        benchmark,
        impact_bps: avg_price.map(|avg| impact_bps(side, avg, benchmark)),
        remaining: strategy.remaining(),
        ticks,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::order::OrderRequest;
    use crate::strategies::{SplittingBot, SplittingConfig};
    use approx::assert_relative_eq;

    #[test]
    fn test_runs_until_done() {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        engine.place(OrderRequest::buy(99.0, 10.0)).unwrap();
        engine.place(OrderRequest::sell(101.0, 10.0)).unwrap();

        let bot = SplittingBot::new(SplittingConfig::default()).unwrap();
        let report = run_execution(&mut engine, bot, Side::Buy, 3.0, 10);

        assert_eq!(report.strategy, "splitting");
        assert_eq!(report.ticks, 3);
        assert_eq!(report.executed, 3.0);
        assert_eq!(report.remaining, 0.0);
        assert_eq!(report.avg_price, Some(101.0));
        assert_relative_eq!(report.benchmark, 100.0);
        assert_relative_eq!(report.impact_bps.unwrap(), 100.0, max_relative = 1e-9);
        assert_eq!(report.failures, 0);
    }

    #[test]
    fn test_respects_tick_limit() {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        let bot = SplittingBot::new(SplittingConfig::default()).unwrap();
        let report = run_execution(&mut engine, bot, Side::Sell, 10.0, 4);

        assert_eq!(report.ticks, 4);
        assert_eq!(report.executed, 0.0);
        assert_eq!(report.avg_price, None);
        assert_eq!(report.impact_bps, None);
        assert_eq!(report.benchmark, 100.0);
    }
}
