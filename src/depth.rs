//! Depth Analytics - cumulative resting size per price level.
//!
//! Levels are derived on demand and never stored. Buy levels come first
//! (best to worst), then sell levels (best to worst).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::order::{price_priority, Order, Side};
use crate::order_book::OrderBook;

/// One aggregated price level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub side: Side,
    pub price: f64,
    /// Resting size at exactly this level
    pub size: f64,
    /// Resting size at this level or better
    pub cumulative_size: f64,
}

/// Aggregate `orders` by side and exact price.
pub fn cumulative_depth(orders: &[Order]) -> Vec<DepthLevel> {
    aggregate(orders, |_, price| price)
}

/// Aggregate `orders` onto a fixed price grid.
///
/// Buy prices round down to the grid and sell prices round up, so a
/// bucketed level never looks better than the orders in it. Prices that
/// differ only by floating-point noise land in the same level.
pub fn cumulative_depth_on_grid(orders: &[Order], tick_size: f64) -> Result<Vec<DepthLevel>> {
    if !(tick_size.is_finite() && tick_size > 0.0) {
        return Err(EngineError::InvalidConfig(format!(
            "depth tick size must be finite and positive, got {tick_size}"
        )));
    }
    // Absorbs representation error before rounding (e.g. 100.3 / 0.1).
    let eps = 1e-9;
    Ok(aggregate(orders, |side, price| {
        let steps = price / tick_size;
        let snapped = match side {
            Side::Buy => (steps + eps).floor(),
            Side::Sell => (steps - eps).ceil(),
        };
        snapped * tick_size
    }))
}

/// First (best) level of a side, if any.
pub fn best_level(levels: &[DepthLevel], side: Side) -> Option<&DepthLevel> {
    levels.iter().find(|l| l.side == side)
}

fn aggregate<F>(orders: &[Order], level_price: F) -> Vec<DepthLevel>
where
    F: Fn(Side, f64) -> f64,
{
    let mut out = Vec::new();

    for side in [Side::Buy, Side::Sell] {
        // Keyed on bit pattern: grouping is by exact equality.
        let mut sizes: FxHashMap<u64, f64> = FxHashMap::default();
        for order in orders.iter().filter(|o| o.side == side) {
            let price = level_price(side, order.price);
            *sizes.entry(price.to_bits()).or_insert(0.0) += order.remaining_size;
        }

        let mut levels: Vec<(f64, f64)> =
            sizes.into_iter().map(|(bits, size)| (f64::from_bits(bits), size)).collect();
        levels.sort_by(|a, b| price_priority(side, a.0, b.0));

        let mut cumulative = 0.0;
        for (price, size) in levels {
            cumulative += size;
            out.push(DepthLevel { side, price, size, cumulative_size: cumulative });
        }
    }

    out
}

impl OrderBook {
    /// Cumulative depth of the live book, grouped by exact price.
    pub fn cumulative_depth(&self) -> Vec<DepthLevel> {
        cumulative_depth(self.orders())
    }

    /// Cumulative depth of the live book on a `tick_size` grid.
    pub fn cumulative_depth_on_grid(&self, tick_size: f64) -> Result<Vec<DepthLevel>> {
        cumulative_depth_on_grid(self.orders(), tick_size)
    }
}
