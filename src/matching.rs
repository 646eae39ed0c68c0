//! Matching - crosses resting buys against resting sells.
//!
//! Implements the settle loop:
//! 1. Find the best buy and the best sell under price-time priority
//! 2. While they cross, trade the smaller remaining size at the midpoint
//!
//! Orders are only ever matched here, never on placement.

use crate::order::{Side, Trade};
use crate::order_book::{best_index, consume, purge, OrderBook};

/// A buy at `buy_price` crosses a sell at `sell_price`.
#[inline]
fn prices_cross(buy_price: f64, sell_price: f64) -> bool {
    buy_price >= sell_price
}

impl OrderBook {
    /// Cross the book until the best bid is below the best ask.
    ///
    /// Each trade takes `min(buy.remaining, sell.remaining)` at
    /// `(buy.price + sell.price) / 2`, so at least one of the two orders is
    /// purged per iteration and the loop ends after at most `order_count()`
    /// iterations.
    ///
    /// # Returns
    /// The trades produced by this pass, stamped with `tick`.
    pub fn cross(&mut self, tick: u64) -> Vec<Trade> {
        let mut trades = Vec::new();
        let orders = self.orders_mut();

        loop {
            let (buy_idx, sell_idx) =
                match (best_index(orders, Side::Buy), best_index(orders, Side::Sell)) {
                    (Some(b), Some(s)) => (b, s),
                    _ => break,
                };

            let buy = orders[buy_idx];
            let sell = orders[sell_idx];
            if !prices_cross(buy.price, sell.price) {
                break;
            }

            let size = buy.remaining_size.min(sell.remaining_size);
            let trade = Trade {
                price: 0.5 * (buy.price + sell.price),
                size,
                tick,
                buy_sequence: buy.sequence_id,
                sell_sequence: sell.sequence_id,
            };
            tracing::debug!(
                price = trade.price,
                size,
                tick,
                buy = buy.sequence_id,
                sell = sell.sequence_id,
                "trade"
            );
            trades.push(trade);

            consume(&mut orders[buy_idx], size);
            consume(&mut orders[sell_idx], size);
            purge(orders);
        }

        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderRequest;

    #[test]
    fn test_no_cross_when_spread_positive() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::buy(99.0, 1.0)).unwrap();
        book.place(OrderRequest::sell(101.0, 1.0)).unwrap();

        assert!(book.cross(1).is_empty());
        assert_eq!(book.order_count(), 2);
    }

    #[test]
    fn test_one_sided_book_does_not_cross() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::sell(101.0, 1.0)).unwrap();
        book.place(OrderRequest::sell(100.0, 1.0)).unwrap();

        assert!(book.cross(0).is_empty());
        assert_eq!(book.order_count(), 2);
    }

    #[test]
    fn test_full_match_at_midpoint() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::sell(100.0, 2.0)).unwrap();
        book.place(OrderRequest::buy(102.0, 2.0)).unwrap();

        let trades = book.cross(7);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 101.0);
        assert_eq!(trades[0].size, 2.0);
        assert_eq!(trades[0].tick, 7);
        assert_eq!(trades[0].buy_sequence, 1);
        assert_eq!(trades[0].sell_sequence, 0);
        assert!(book.is_empty());
    }

    #[test]
    fn test_equal_prices_cross() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::sell(105.0, 5.0)).unwrap();
        book.place(OrderRequest::buy(105.0, 2.0)).unwrap();

        let trades = book.cross(0);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].size, 2.0);
        assert_eq!(book.order_count(), 1);
        let rest = book.orders()[0];
        assert_eq!(rest.side, Side::Sell);
        assert_eq!(rest.remaining_size, 3.0);
    }

    #[test]
    fn test_sweep_multiple_levels() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::sell(105.0, 1.0)).unwrap();
        book.place(OrderRequest::sell(106.0, 2.0)).unwrap();
        book.place(OrderRequest::sell(107.0, 3.0)).unwrap();
        book.place(OrderRequest::buy(110.0, 6.0)).unwrap();

        let trades = book.cross(0);

        let prices: Vec<f64> = trades.iter().map(|t| t.price).collect();
        let sizes: Vec<f64> = trades.iter().map(|t| t.size).collect();
        assert_eq!(prices, vec![107.5, 108.0, 108.5]);
        assert_eq!(sizes, vec![1.0, 2.0, 3.0]);
        assert!(book.is_empty());
    }

    #[test]
    fn test_price_time_priority() {
        let mut book = OrderBook::new();
        let a = book.place(OrderRequest::sell(105.0, 3.0)).unwrap();
        let b = book.place(OrderRequest::sell(105.0, 3.0)).unwrap();
        book.place(OrderRequest::buy(105.0, 4.0)).unwrap();

        let trades = book.cross(0);

        let sizes: Vec<f64> = trades.iter().map(|t| t.size).collect();
        assert_eq!(sizes, vec![3.0, 1.0]);
        assert_eq!(trades[0].sell_sequence, a);
        assert_eq!(trades[1].sell_sequence, b);

        assert_eq!(book.order_count(), 1);
        let rest = book.orders()[0];
        assert_eq!(rest.sequence_id, b);
        assert_eq!(rest.remaining_size, 2.0);
    }

    #[test]
    fn test_better_price_beats_earlier_time() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::buy(101.0, 1.0)).unwrap();
        let better = book.place(OrderRequest::buy(102.0, 1.0)).unwrap();
        book.place(OrderRequest::sell(100.0, 1.0)).unwrap();

        let trades = book.cross(0);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].buy_sequence, better);
        assert_eq!(trades[0].price, 101.0);
        assert_eq!(book.best_bid(), Some(101.0));
    }

    #[test]
    fn test_many_small_buys_against_one_sell() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::sell(100.0, 10.0)).unwrap();
        for _ in 0..4 {
            book.place(OrderRequest::buy(100.0, 2.0)).unwrap();
        }

        let trades = book.cross(3);

        assert_eq!(trades.len(), 4);
        assert!(trades.iter().all(|t| t.size == 2.0 && t.tick == 3));
        assert_eq!(book.order_count(), 1);
        assert_eq!(book.total_size(Side::Sell), 2.0);
    }

    #[test]
    fn test_cross_leaves_no_rounding_dust() {
        let mut book = OrderBook::new();
        book.place(OrderRequest::sell(100.0, 0.3)).unwrap();
        book.place(OrderRequest::buy(101.0, 0.1)).unwrap();
        book.place(OrderRequest::buy(101.0, 0.2)).unwrap();

        let trades = book.cross(1);

        assert_eq!(trades.len(), 2);
        assert!(book.is_empty());
    }
}
