//! Market sweeps - immediate execution against resting liquidity.
//!
//! One sweep algorithm serves three entry points:
//! - [`OrderBook::execute_market_sweep`] mutates the live book
//! - [`OrderBook::simulate_market_sweep`] runs on a detached copy
//! - [`OrderBook::estimate_impact_bps`] reports slippage from mid
//!
//! The two non-mutating entry points take `&self`.

use crate::error::{EngineError, InvalidOrderReason, Result};
use crate::order::{priority, Order, Side, SweepResult};
use crate::order_book::{consume, purge, OrderBook, SimulationSnapshot, DUST_TOLERANCE};

/// Basis points per unit.
const BPS: f64 = 10_000.0;

/// Result of a simulated sweep, with the book it leaves behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    pub result: SweepResult,
    /// Hypothetical book after the sweep, ready for the next simulated step
    pub book: SimulationSnapshot,
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidOrder(InvalidOrderReason::InvalidQuantity))
    }
}

/// Consume passive liquidity for an aggressor on `side`.
///
/// Takes `min(remaining, order.remaining_size)` from each opposite-side order
/// in priority order until `quantity` is exhausted or the side is empty, then
/// purges emptied orders.
pub(crate) fn sweep(orders: &mut Vec<Order>, side: Side, quantity: f64) -> SweepResult {
    let passive = side.opposite();

    let mut queue: Vec<usize> = orders
        .iter()
        .enumerate()
        .filter(|(_, o)| o.side == passive)
        .map(|(i, _)| i)
        .collect();
    queue.sort_by(|&a, &b| priority(passive, &orders[a], &orders[b]));

    let mut remaining = quantity;
    let mut executed = 0.0;
    let mut notional = 0.0;

    for idx in queue {
        if remaining <= 0.0 {
            break;
        }
        let order = &mut orders[idx];
        let take = remaining.min(order.remaining_size);
        notional += take * order.price;
        executed += take;
        remaining -= take;
        if remaining <= DUST_TOLERANCE * quantity {
            remaining = 0.0;
        }
        consume(order, take);
    }

    purge(orders);

    SweepResult {
        side,
        requested_size: quantity,
        executed_size: executed,
        unfilled_size: (quantity - executed).max(0.0),
        vwap: (executed > 0.0).then(|| notional / executed),
    }
}

impl OrderBook {
    /// Execute a market sweep against the live book.
    ///
    /// Nothing is added to the book; unfilled quantity is simply reported.
    pub fn execute_market_sweep(&mut self, side: Side, quantity: f64) -> Result<SweepResult> {
        validate_quantity(quantity)?;
        let result = sweep(self.orders_mut(), side, quantity);
        tracing::debug!(
            side = %side,
            requested = quantity,
            executed = result.executed_size,
            vwap = ?result.vwap,
            "market sweep"
        );
        Ok(result)
    }

    /// Simulate a market sweep without touching the live book.
    ///
    /// Runs on `book` when supplied, otherwise on a fresh copy of the live
    /// orders. The returned snapshot can be fed back in to chain sweeps.
    pub fn simulate_market_sweep(
        &self,
        side: Side,
        quantity: f64,
        book: Option<SimulationSnapshot>,
    ) -> Result<Simulation> {
        validate_quantity(quantity)?;
        let mut book = book.unwrap_or_else(|| self.snapshot());
        let result = sweep(book.orders_mut(), side, quantity);
        Ok(Simulation { result, book })
    }

    /// Estimated slippage of a market sweep, in basis points from mid.
    ///
    /// Returns 0 when either side of the book is empty (no mid) or when the
    /// sweep would fill nothing. Positive values mean a worse price than mid
    /// for the aggressor.
    pub fn estimate_impact_bps(&self, side: Side, quantity: f64) -> Result<f64> {
        validate_quantity(quantity)?;
        let Some(mid) = self.mid() else {
            return Ok(0.0);
        };

        // The sweep only reads the passive side, so copy just that.
        let mut passive: Vec<Order> = self
            .orders()
            .iter()
            .filter(|o| o.side == side.opposite())
            .copied()
            .collect();
        let result = sweep(&mut passive, side, quantity);

        let Some(avg_price) = result.vwap else {
            return Ok(0.0);
        };
        Ok(impact_bps(side, avg_price, mid))
    }
}

/// Slippage of `avg_price` relative to `mid` for an aggressor on `side`.
pub fn impact_bps(side: Side, avg_price: f64, mid: f64) -> f64 {
    match side {
        Side::Buy => (avg_price / mid - 1.0) * BPS,
        Side::Sell => (1.0 - avg_price / mid) * BPS,
    }
}

impl SimulationSnapshot {
    /// Sweep this hypothetical book, consuming it.
    pub fn simulate_market_sweep(self, side: Side, quantity: f64) -> Result<Simulation> {
        validate_quantity(quantity)?;
        let mut book = self;
        let result = sweep(book.orders_mut(), side, quantity);
        Ok(Simulation { result, book })
    }
}
