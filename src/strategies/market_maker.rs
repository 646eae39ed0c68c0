//! Market maker - quotes both sides around the reference value.
//!
//! Every tick posts one bid at `reference - spread/2` and one ask at
//! `reference + spread/2`, each nudged by independent Gaussian jitter so the
//! quotes are not perfectly symmetric.

use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{noise, require_positive, rng_from};
use crate::error::{Result, StrategyError};
use crate::market::Market;
use crate::order::{OrderRequest, OwnerId};
use crate::strategy::Strategy;

/// Configuration for the market maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMakerConfig {
    /// Distance between posted ask and bid
    pub spread: f64,
    /// Size of each quote
    pub size: f64,
    /// Standard deviation of the price noise on each quote
    pub jitter: f64,
    pub owner: Option<OwnerId>,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread: 1.0,
            size: 1.0,
            jitter: 0.05,
            owner: None,
        }
    }
}

/// Liquidity provider posting a bid and an ask every tick.
#[derive(Debug, Clone)]
pub struct MarketMaker {
    pub config: MarketMakerConfig,
    jitter: Option<Normal<f64>>,
    rng: ChaCha8Rng,
    /// Quotes posted so far
    pub quotes_posted: usize,
}

impl MarketMaker {
    /// Create a market maker; `seed = None` seeds from entropy.
    pub fn new(config: MarketMakerConfig, seed: Option<u64>) -> Result<Self> {
        if !(config.spread.is_finite() && config.spread >= 0.0) {
            return Err(super::invalid(format!(
                "spread must be finite and non-negative, got {}",
                config.spread
            )));
        }
        require_positive(config.size, "quote size")?;
        let jitter = noise(config.jitter, "jitter")?;
        Ok(Self {
            config,
            jitter,
            rng: rng_from(seed),
            quotes_posted: 0,
        })
    }

    fn draw_jitter(&mut self) -> f64 {
        match &self.jitter {
            Some(normal) => normal.sample(&mut self.rng),
            None => 0.0,
        }
    }

    fn quote(&self, request: OrderRequest) -> OrderRequest {
        match self.config.owner {
            Some(owner) => request.with_owner(owner),
            None => request,
        }
    }
}

impl Strategy for MarketMaker {
    fn on_tick(&mut self, market: &mut Market) -> std::result::Result<(), StrategyError> {
        let center = market.reference_value();
        let half = self.config.spread / 2.0;
        let bid = center - half + self.draw_jitter();
        let ask = center + half + self.draw_jitter();

        // Each side is placed on its own; a rejected bid still leaves the ask.
        let mut first_error = None;
        for request in [OrderRequest::buy(bid, self.config.size), OrderRequest::sell(ask, self.config.size)] {
            match market.place(self.quote(request)) {
                Ok(_) => self.quotes_posted += 1,
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "market_maker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineConfig};
    use crate::order::Side;
    use approx::assert_relative_eq;

    #[test]
    fn test_posts_both_sides() {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        let config = MarketMakerConfig { jitter: 0.0, ..MarketMakerConfig::default() };
        engine.register(MarketMaker::new(config, None).unwrap());

        assert!(engine.market.orders().is_empty());
        engine.step();

        let book = engine.market.book();
        assert_eq!(book.order_count(), 2);
        assert_eq!(book.best_bid(), Some(99.5));
        assert_eq!(book.best_ask(), Some(100.5));
    }

    #[test]
    fn test_rejected_bid_still_quotes_ask() {
        let mut engine = Engine::new(&EngineConfig::frozen(0.4)).unwrap();
        let config = MarketMakerConfig { jitter: 0.0, ..MarketMakerConfig::default() };
        let maker = std::rc::Rc::new(std::cell::RefCell::new(MarketMaker::new(config, None).unwrap()));
        engine.register(maker.clone());

        let report = engine.step();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "market_maker");
        let book = engine.market.book();
        assert_eq!(book.order_count(), 1);
        assert!(book.best_bid().is_none());
        assert_relative_eq!(book.best_ask().unwrap(), 0.9);
        assert_eq!(maker.borrow().quotes_posted, 1);
    }

    #[test]
    fn test_owner_tag() {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        let config = MarketMakerConfig {
            jitter: 0.0,
            owner: Some(OwnerId(7)),
            ..MarketMakerConfig::default()
        };
        engine.register(MarketMaker::new(config, None).unwrap());
        engine.step();

        assert!(engine.market.orders().iter().all(|o| o.owner == Some(OwnerId(7))));
    }

    #[test]
    fn test_jitter_is_seeded() {
        let run = |seed| {
            let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
            engine.register(MarketMaker::new(MarketMakerConfig::default(), Some(seed)).unwrap());
            engine.run(5);
            engine.market.orders().to_vec()
        };

        assert_eq!(run(11), run(11));
        assert_ne!(run(11), run(12));
    }

    #[test]
    fn test_quotes_stay_near_reference() {
        let mut engine = Engine::new(&EngineConfig::frozen(100.0)).unwrap();
        engine.register(MarketMaker::new(MarketMakerConfig::default(), Some(3)).unwrap());
        engine.run(20);

        for order in engine.market.orders() {
            let offset = match order.side {
                Side::Buy => 100.0 - order.price,
                Side::Sell => order.price - 100.0,
            };
            assert!((offset - 0.5).abs() < 0.5, "quote {order:?} too far from reference");
        }
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad_size = MarketMakerConfig { size: 0.0, ..MarketMakerConfig::default() };
        assert!(MarketMaker::new(bad_size, None).is_err());

        let bad_spread = MarketMakerConfig { spread: -1.0, ..MarketMakerConfig::default() };
        assert!(MarketMaker::new(bad_spread, None).is_err());
    }
}
