//! Order Book - resting order storage and sequence assignment.
//!
//! The book is a flat, unordered collection of live orders. Priority is
//! never baked into the storage layout; every consumer ranks orders with
//! [`priority`](crate::order::priority) when it needs them.

use crate::error::Result;
use crate::order::{priority, Order, OrderRequest, Side};

/// Best order for a side under price-time priority.
pub(crate) fn best_order(orders: &[Order], side: Side) -> Option<&Order> {
    orders
        .iter()
        .filter(|o| o.side == side)
        .min_by(|a, b| priority(side, a, b))
}

/// Index of the best order for a side.
pub(crate) fn best_index(orders: &[Order], side: Side) -> Option<usize> {
    orders
        .iter()
        .enumerate()
        .filter(|(_, o)| o.side == side)
        .min_by(|(_, a), (_, b)| priority(side, a, b))
        .map(|(i, _)| i)
}

/// Midpoint of best bid and best ask, if both sides are populated.
pub(crate) fn mid_price(orders: &[Order]) -> Option<f64> {
    let bid = best_order(orders, Side::Buy)?.price;
    let ask = best_order(orders, Side::Sell)?.price;
    Some(0.5 * (bid + ask))
}

/// Residual size, relative to the size just taken, treated as rounding error.
pub(crate) const DUST_TOLERANCE: f64 = 1e-12;

/// Take `size` from `order`. A residual below [`DUST_TOLERANCE`] is zeroed so
/// the next purge drops the order.
#[inline]
pub(crate) fn consume(order: &mut Order, size: f64) {
    order.remaining_size -= size;
    if order.remaining_size <= DUST_TOLERANCE * size {
        order.remaining_size = 0.0;
    }
}

/// Drop every order whose remaining size reached zero.
#[inline]
pub(crate) fn purge(orders: &mut Vec<Order>) {
    orders.retain(Order::is_live);
}

/// The live limit order book.
#[derive(Clone, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
    /// Next sequence id to hand out; never reused
    next_sequence: u64,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new order book with pre-allocated capacity
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            orders: Vec::with_capacity(orders),
            next_sequence: 0,
        }
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Add a resting order without matching it.
    ///
    /// # Returns
    /// The sequence id assigned to the order.
    pub fn place(&mut self, request: OrderRequest) -> Result<u64> {
        request.validate()?;
        let sequence_id = self.allocate_sequence();
        self.orders.push(Order::from_request(&request, sequence_id));
        tracing::trace!(
            side = %request.side,
            price = request.price,
            size = request.size,
            sequence_id,
            "order placed"
        );
        Ok(sequence_id)
    }

    /// Replace the whole book with `requests`.
    ///
    /// Fresh sequence ids are assigned in input order, so the relative time
    /// priority of the supplied list is preserved. The batch is validated
    /// before anything is discarded.
    pub fn snapshot_replace(&mut self, requests: &[OrderRequest]) -> Result<()> {
        for request in requests {
            request.validate()?;
        }
        self.orders.clear();
        self.orders.reserve(requests.len());
        for request in requests {
            let sequence_id = self.allocate_sequence();
            self.orders.push(Order::from_request(request, sequence_id));
        }
        tracing::debug!(orders = requests.len(), "book replaced from snapshot");
        Ok(())
    }

    /// Remove every order. The sequence allocator keeps counting.
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    fn allocate_sequence(&mut self) -> u64 {
        let id = self.next_sequence;
        self.next_sequence += 1;
        id
    }

    /// Mutable access for the matching and sweep passes, which purge after
    /// every mutation.
    pub(crate) fn orders_mut(&mut self) -> &mut Vec<Order> {
        &mut self.orders
    }

    // ========================================================================
    // Read Access
    // ========================================================================

    /// Live orders in insertion order.
    #[inline]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Live orders of one side, best first.
    pub fn sorted(&self, side: Side) -> Vec<Order> {
        let mut out: Vec<Order> = self.orders.iter().filter(|o| o.side == side).copied().collect();
        out.sort_by(|a, b| priority(side, a, b));
        out
    }

    /// Look up an order by sequence id.
    pub fn get(&self, sequence_id: u64) -> Option<&Order> {
        self.orders.iter().find(|o| o.sequence_id == sequence_id)
    }

    /// Best order on a side
    #[inline]
    pub fn best(&self, side: Side) -> Option<&Order> {
        best_order(&self.orders, side)
    }

    /// Get the best bid price (highest buy price)
    #[inline]
    pub fn best_bid(&self) -> Option<f64> {
        self.best(Side::Buy).map(|o| o.price)
    }

    /// Get the best ask price (lowest sell price)
    #[inline]
    pub fn best_ask(&self) -> Option<f64> {
        self.best(Side::Sell).map(|o| o.price)
    }

    /// Midpoint of best bid and best ask
    #[inline]
    pub fn mid(&self) -> Option<f64> {
        mid_price(&self.orders)
    }

    /// Calculate spread (best_ask - best_bid); `None` unless both sides exist
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Get the total number of orders in the book
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Total resting size on one side
    pub fn total_size(&self, side: Side) -> f64 {
        self.orders.iter().filter(|o| o.side == side).map(|o| o.remaining_size).sum()
    }

    /// Check if the book is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Detached copy for hypothetical simulation.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            orders: self.orders.clone(),
            next_sequence: self.next_sequence,
        }
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("order_count", &self.orders.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

/// A value copy of a set of orders, used only for hypothetical sweeps.
///
/// Sequence ids need not match the live book. Orders pushed onto a snapshot
/// get ids from the snapshot's own allocator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationSnapshot {
    orders: Vec<Order>,
    next_sequence: u64,
}

impl SimulationSnapshot {
    /// Build a snapshot from ingestion records, ids assigned in input order.
    pub fn from_requests(requests: &[OrderRequest]) -> Result<Self> {
        let mut snapshot = Self::default();
        for request in requests {
            snapshot.push(*request)?;
        }
        Ok(snapshot)
    }

    /// Append a hypothetical order behind everything already present.
    pub fn push(&mut self, request: OrderRequest) -> Result<u64> {
        request.validate()?;
        let sequence_id = self.next_sequence;
        self.next_sequence += 1;
        self.orders.push(Order::from_request(&request, sequence_id));
        Ok(sequence_id)
    }

    #[inline]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub(crate) fn orders_mut(&mut self) -> &mut Vec<Order> {
        &mut self.orders
    }

    pub fn best_bid(&self) -> Option<f64> {
        best_order(&self.orders, Side::Buy).map(|o| o.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        best_order(&self.orders, Side::Sell).map(|o| o.price)
    }

    pub fn mid(&self) -> Option<f64> {
        mid_price(&self.orders)
    }

    pub fn total_size(&self, side: Side) -> f64 {
        self.orders.iter().filter(|o| o.side == side).map(|o| o.remaining_size).sum()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
