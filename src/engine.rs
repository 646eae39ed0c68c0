//! Engine - the tick driver.
//!
//! Wraps a [`Market`] with the registered strategies. One `step()`:
//! 1. advances the reference value
//! 2. calls every strategy once, in registration order
//! 3. runs the matching pass
//!
//! A failing strategy is recorded in the [`StepReport`] and the tick carries
//! on with the next strategy and the matching pass.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::market::Market;
use crate::order::{OrderRequest, Trade};
use crate::price_process::ReferenceProcess;
use crate::strategy::{Strategy, StrategyFailure};

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starting reference value
    pub initial_value: f64,
    /// Standard deviation of the per-tick reference increment
    pub volatility: f64,
    /// RNG seed for the reference walk; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_value: 100.0,
            volatility: 0.5,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// A flat reference value, useful for deterministic scenarios.
    pub fn frozen(initial_value: f64) -> Self {
        Self { initial_value, volatility: 0.0, seed: Some(0) }
    }
}

/// What happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    pub reference_value: f64,
    /// Trades produced by this tick's matching pass
    pub trades: Vec<Trade>,
    /// Strategies whose callback returned an error
    pub failures: Vec<StrategyFailure>,
}

impl StepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The simulation driver.
pub struct Engine {
    /// Market state handed to strategies
    pub market: Market,
    /// Registered strategies with the label captured at registration
    strategies: Vec<(String, Box<dyn Strategy>)>,
}

impl Engine {
    /// Create a new engine from a config.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let reference = ReferenceProcess::new(config.initial_value, config.volatility, config.seed)?;
        Ok(Self {
            market: Market::new(reference),
            strategies: Vec::new(),
        })
    }

    /// Register a strategy; it runs after every strategy registered before it.
    ///
    /// # Returns
    /// The strategy's registration index.
    pub fn register<S: Strategy + 'static>(&mut self, strategy: S) -> usize {
        self.strategies.push((strategy.label(), Box::new(strategy)));
        self.strategies.len() - 1
    }

    /// Number of registered strategies
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) -> StepReport {
        let reference_value = self.market.advance();
        let tick = self.market.tick();

        let mut failures = Vec::new();
        for (index, (name, strategy)) in self.strategies.iter_mut().enumerate() {
            if let Err(error) = strategy.on_tick(&mut self.market) {
                tracing::warn!(tick, index, strategy = name.as_str(), %error, "strategy failed");
                failures.push(StrategyFailure {
                    index,
                    name: name.clone(),
                    error,
                });
            }
        }

        let before = self.market.trades().len();
        self.market.match_orders();
        let trades = self.market.trades()[before..].to_vec();

        tracing::debug!(
            tick,
            reference_value,
            trades = trades.len(),
            resting = self.market.book().order_count(),
            "tick complete"
        );

        StepReport { tick, reference_value, trades, failures }
    }

    /// Run `ticks` steps, returning every report.
    pub fn run(&mut self, ticks: usize) -> Vec<StepReport> {
        (0..ticks).map(|_| self.step()).collect()
    }

    // ========================================================================
    // Convenience Pass-throughs
    // ========================================================================

    /// Rest a limit order in the live book.
    #[inline]
    pub fn place(&mut self, request: OrderRequest) -> Result<u64> {
        self.market.place(request)
    }

    /// Run a matching pass outside of `step()`.
    #[inline]
    pub fn match_orders(&mut self) -> usize {
        self.market.match_orders()
    }

    #[inline]
    pub fn trades(&self) -> &[Trade] {
        self.market.trades()
    }

    #[inline]
    pub fn reference_value(&self) -> f64 {
        self.market.reference_value()
    }

    #[inline]
    pub fn reference_history(&self) -> &[f64] {
        self.market.reference_history()
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.market.tick()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("market", &self.market)
            .field("strategies", &self.strategies.len())
            .finish()
    }
}
