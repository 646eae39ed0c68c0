//! Market - the per-run state strategies interact with.
//!
//! Bundles the live book, the trade log, the reference value and the tick
//! counter. Strategies receive `&mut Market` from the driver; the driver
//! itself ([`Engine`](crate::engine::Engine)) keeps the strategy list apart
//! so the two can be borrowed independently.

use crate::depth::DepthLevel;
use crate::error::Result;
use crate::order::{Order, OrderRequest, Side, SweepResult, Trade};
use crate::order_book::{OrderBook, SimulationSnapshot};
use crate::price_process::ReferenceProcess;
use crate::sweep::Simulation;

/// Live market state for one simulation run.
#[derive(Clone, Debug)]
pub struct Market {
    book: OrderBook,
    trades: Vec<Trade>,
    reference: ReferenceProcess,
    tick: u64,
}

impl Market {
    pub fn new(reference: ReferenceProcess) -> Self {
        Self {
            book: OrderBook::new(),
            trades: Vec::new(),
            reference,
            tick: 0,
        }
    }

    // ========================================================================
    // Order Entry
    // ========================================================================

    /// Rest a limit order. Matching happens at the end of the tick.
    pub fn place(&mut self, request: OrderRequest) -> Result<u64> {
        self.book.place(request)
    }

    /// Replace the book with an externally captured depth state.
    pub fn snapshot_replace(&mut self, requests: &[OrderRequest]) -> Result<()> {
        self.book.snapshot_replace(requests)
    }

    /// Sweep the opposite side immediately.
    pub fn execute_market_sweep(&mut self, side: Side, quantity: f64) -> Result<SweepResult> {
        self.book.execute_market_sweep(side, quantity)
    }

    /// Run the matching pass and append its trades to the log.
    ///
    /// # Returns
    /// Number of trades produced.
    pub fn match_orders(&mut self) -> usize {
        let trades = self.book.cross(self.tick);
        let count = trades.len();
        self.trades.extend(trades);
        count
    }

    // ========================================================================
    // Non-mutating Queries
    // ========================================================================

    pub fn simulate_market_sweep(
        &self,
        side: Side,
        quantity: f64,
        book: Option<SimulationSnapshot>,
    ) -> Result<Simulation> {
        self.book.simulate_market_sweep(side, quantity, book)
    }

    pub fn estimate_impact_bps(&self, side: Side, quantity: f64) -> Result<f64> {
        self.book.estimate_impact_bps(side, quantity)
    }

    pub fn cumulative_depth(&self) -> Vec<DepthLevel> {
        self.book.cumulative_depth()
    }

    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub fn orders(&self) -> &[Order] {
        self.book.orders()
    }

    /// Detached copy of the live book.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.book.snapshot()
    }

    // ========================================================================
    // Reference Value & History
    // ========================================================================

    #[inline]
    pub fn reference_value(&self) -> f64 {
        self.reference.value()
    }

    #[inline]
    pub fn reference_history(&self) -> &[f64] {
        self.reference.history()
    }

    #[inline]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Index of the current tick (0 before the first step).
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Start the next tick: bump the counter and move the reference value.
    pub(crate) fn advance(&mut self) -> f64 {
        self.tick += 1;
        self.reference.advance()
    }
}
