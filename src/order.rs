//! Order, trade and sweep record types.
//!
//! `OrderRequest` is what callers submit; `Order` is what rests in the book
//! once a sequence id has been assigned.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, InvalidOrderReason, Result};

/// Order side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side (bids)
    #[serde(alias = "bid")]
    Buy,
    /// Sell side (asks)
    #[serde(alias = "ask")]
    Sell,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Lowercase label, matching the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(Side::Buy),
            "sell" | "ask" => Ok(Side::Sell),
            _ => Err(EngineError::InvalidOrder(InvalidOrderReason::UnknownSide(
                s.to_string(),
            ))),
        }
    }
}

/// Opaque tag identifying who placed an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

/// An order as submitted, before it has a place in the queue.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRequest {
    pub side: Side,
    pub price: f64,
    pub size: f64,
    #[serde(default)]
    pub owner: Option<OwnerId>,
}

impl OrderRequest {
    /// Anonymous request.
    pub fn new(side: Side, price: f64, size: f64) -> Self {
        Self { side, price, size, owner: None }
    }

    /// Shorthand for a buy request.
    pub fn buy(price: f64, size: f64) -> Self {
        Self::new(Side::Buy, price, size)
    }

    /// Shorthand for a sell request.
    pub fn sell(price: f64, size: f64) -> Self {
        Self::new(Side::Sell, price, size)
    }

    /// Tag the request with an owner.
    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Check price and size are finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let reason = if !self.price.is_finite() {
            InvalidOrderReason::NonFinitePrice
        } else if self.price <= 0.0 {
            InvalidOrderReason::NonPositivePrice
        } else if !self.size.is_finite() {
            InvalidOrderReason::NonFiniteSize
        } else if self.size <= 0.0 {
            InvalidOrderReason::NonPositiveSize
        } else {
            return Ok(());
        };
        Err(EngineError::InvalidOrder(reason))
    }
}

/// A resting order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub side: Side,
    pub price: f64,
    /// Unfilled size; always > 0 while the order is visible
    pub remaining_size: f64,
    /// Insertion sequence, the time-priority tie-breaker
    pub sequence_id: u64,
    pub owner: Option<OwnerId>,
}

impl Order {
    /// Build a resting order from a validated request.
    pub(crate) fn from_request(request: &OrderRequest, sequence_id: u64) -> Self {
        Self {
            side: request.side,
            price: request.price,
            remaining_size: request.size,
            sequence_id,
            owner: request.owner,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.remaining_size > 0.0
    }
}

/// Price-time priority shared by matching, sweeps and depth.
///
/// Buy: highest price first. Sell: lowest price first. Ties go to the
/// lower sequence id.
#[inline]
pub fn priority(side: Side, a: &Order, b: &Order) -> Ordering {
    price_priority(side, a.price, b.price).then(a.sequence_id.cmp(&b.sequence_id))
}

/// Price step of [`priority`]: `Less` when `a` is the better price for `side`.
#[inline]
pub fn price_priority(side: Side, a: f64, b: f64) -> Ordering {
    match side {
        Side::Buy => b.total_cmp(&a),
        Side::Sell => a.total_cmp(&b),
    }
}

/// A trade produced by crossing a resting buy with a resting sell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Midpoint of the two crossing order prices
    pub price: f64,
    pub size: f64,
    /// Tick during which the cross happened
    pub tick: u64,
    pub buy_sequence: u64,
    pub sell_sequence: u64,
}

/// Outcome of a market sweep, real or simulated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Aggressor side
    pub side: Side,
    pub requested_size: f64,
    pub executed_size: f64,
    pub unfilled_size: f64,
    /// Volume-weighted price; `None` when nothing executed
    pub vwap: Option<f64>,
}

impl SweepResult {
    /// Notional value of the executed part.
    pub fn notional(&self) -> f64 {
        self.vwap.map_or(0.0, |vwap| vwap * self.executed_size)
    }

    pub fn is_filled(&self) -> bool {
        self.unfilled_size <= 0.0
    }
}
