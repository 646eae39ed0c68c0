//! Determinism Test - Golden Master verification.
//!
//! Verifies that a seeded engine produces identical trades, reference path
//! and resting book across runs.

use lob_harness::strategies::{
    InformedTrader, InformedTraderConfig, MarketMaker, MarketMakerConfig, NoiseTrader, NoiseTraderConfig,
};
use lob_harness::{Engine, EngineConfig, Order, Trade};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeded engine with the full set of order-flow strategies
fn build_engine(seed: u64) -> Engine {
    let config = EngineConfig { seed: Some(seed), ..EngineConfig::default() };
    let mut engine = Engine::new(&config).unwrap();
    engine.register(MarketMaker::new(MarketMakerConfig::default(), Some(seed + 1)).unwrap());
    engine.register(MarketMaker::new(MarketMakerConfig { spread: 1.2, ..MarketMakerConfig::default() }, Some(seed + 2)).unwrap());
    engine.register(NoiseTrader::new(NoiseTraderConfig::default(), Some(seed + 3)).unwrap());
    engine.register(
        InformedTrader::new(InformedTraderConfig { activity_prob: 0.2, ..InformedTraderConfig::default() }, Some(seed + 4))
            .unwrap(),
    );
    engine
}

/// Compute a hash of all trades
fn hash_trades(trades: &[Trade]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for t in trades {
        t.price.to_bits().hash(&mut hasher);
        t.size.to_bits().hash(&mut hasher);
        t.tick.hash(&mut hasher);
        t.buy_sequence.hash(&mut hasher);
        t.sell_sequence.hash(&mut hasher);
    }
    hasher.finish()
}

/// Compute a hash of the reference path and resting book
fn hash_state(history: &[f64], orders: &[Order]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for value in history {
        value.to_bits().hash(&mut hasher);
    }
    for o in orders {
        o.side.hash(&mut hasher);
        o.price.to_bits().hash(&mut hasher);
        o.remaining_size.to_bits().hash(&mut hasher);
        o.sequence_id.hash(&mut hasher);
    }
    hasher.finish()
}

fn run_engine(seed: u64, ticks: usize) -> (u64, u64, usize) {
    let mut engine = build_engine(seed);
    engine.run(ticks);
    (
        hash_trades(engine.trades()),
        hash_state(engine.reference_history(), engine.market.orders()),
        engine.trades().len(),
    )
}

#[test]
fn test_determinism_small() {
    let (first_trades, first_state, count) = run_engine(42, 100);
    assert!(count > 0, "scenario should produce trades");

    for run in 0..10 {
        let (trades, state, _) = run_engine(42, 100);
        assert_eq!(trades, first_trades, "Trade hash mismatch on run {}", run);
        assert_eq!(state, first_state, "State hash mismatch on run {}", run);
    }
}

#[test]
fn test_determinism_large() {
    let (first_trades, first_state, _) = run_engine(12345, 2_000);

    for run in 0..3 {
        let (trades, state, _) = run_engine(12345, 2_000);
        assert_eq!(trades, first_trades, "Trade hash mismatch on run {}", run);
        assert_eq!(state, first_state, "State hash mismatch on run {}", run);
    }
}

#[test]
fn test_different_seeds_produce_different_results() {
    let (trades1, state1, _) = run_engine(1, 200);
    let (trades2, state2, _) = run_engine(2, 200);

    assert_ne!((trades1, state1), (trades2, state2), "Different seeds should produce different results");
}

#[test]
fn test_frozen_reference_is_flat() {
    let mut engine = Engine::new(&EngineConfig::frozen(50.0)).unwrap();
    engine.run(25);
    assert!(engine.reference_history().iter().all(|&v| v == 50.0));
    assert_eq!(engine.reference_history().len(), 26);
}
