//! Strategy contract - the boundary between the engine and trading bots.
//!
//! A strategy is called once per tick with mutable access to the
//! [`Market`]. It may place orders, sweep, simulate, estimate impact and
//! read depth. It must not assume it is the only strategy, and it must keep
//! its state per engine: an engine owns whatever it is given.
//!
//! To inspect a strategy after a run, register an `Rc<RefCell<S>>` clone
//! and keep the other handle.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::StrategyError;
use crate::market::Market;
use crate::order::{Side, SweepResult};

/// Per-tick callback invoked by the driver.
pub trait Strategy {
    /// Act on the current tick.
    fn on_tick(&mut self, market: &mut Market) -> Result<(), StrategyError>;

    /// Label used when reporting failures.
    fn name(&self) -> &str {
        "strategy"
    }

    /// Owned label, captured by the engine at registration.
    fn label(&self) -> String {
        self.name().to_string()
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn on_tick(&mut self, market: &mut Market) -> Result<(), StrategyError> {
        (**self).on_tick(market)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

impl<S: Strategy> Strategy for Rc<RefCell<S>> {
    fn on_tick(&mut self, market: &mut Market) -> Result<(), StrategyError> {
        self.borrow_mut().on_tick(market)
    }

    // The name cannot borrow through the RefCell guard.
    fn name(&self) -> &str {
        "shared strategy"
    }

    fn label(&self) -> String {
        self.borrow().label()
    }
}

/// Strategies that work a parent order down over several ticks.
///
/// `start_order` arms the strategy; each tick it sweeps a slice and records
/// the sweep in its execution log.
pub trait ExecutionStrategy: Strategy {
    /// Begin working `total_size` on `side`, clearing any previous log.
    fn start_order(&mut self, side: Side, total_size: f64);

    /// Still has quantity to work.
    fn is_active(&self) -> bool;

    /// Size still to be executed.
    fn remaining(&self) -> f64;

    /// Sweeps recorded since the log was last drained.
    fn executions(&self) -> &[SweepResult];

    /// Drain the execution log.
    fn take_executions(&mut self) -> Vec<SweepResult>;
}

/// Aggregate view over an execution log.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Fills {
    pub executed: f64,
    pub notional: f64,
}

impl Fills {
    pub fn from_executions(executions: &[SweepResult]) -> Self {
        let mut fills = Self::default();
        fills.extend(executions);
        fills
    }

    pub fn extend(&mut self, executions: &[SweepResult]) {
        for result in executions {
            self.executed += result.executed_size;
            self.notional += result.notional();
        }
    }

    /// Volume-weighted price over all fills; `None` when nothing executed.
    pub fn avg_price(&self) -> Option<f64> {
        (self.executed > 0.0).then(|| self.notional / self.executed)
    }
}

/// A contained strategy failure, surfaced to the caller of `step()`.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyFailure {
    /// Registration index of the failing strategy
    pub index: usize,
    pub name: String,
    pub error: StrategyError,
}
