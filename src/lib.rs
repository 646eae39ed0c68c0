//! # LOB Harness
//!
//! A single-instrument limit order book for evaluating execution strategies.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One engine owns its book, trade log and strategies
//! - **Price-Time Priority**: Best price first, then lowest sequence id
//! - **Midpoint Crossing**: Crossed resting orders trade at the midpoint of their prices
//! - **Non-mutating What-ifs**: Simulation and impact estimation work on detached copies
//!
//! ## Architecture
//!
//! ```text
//! [ReferenceProcess] --> [Engine::step] --> [Strategies (registration order)]
//!                                                     |
//!                                                     v
//!                              [Market: OrderBook + sweeps + depth]
//!                                                     |
//!                                              [Matching pass] --> [Trades]
//! ```

pub mod depth;
pub mod engine;
pub mod error;
pub mod execution;
pub mod market;
pub mod matching;
pub mod order;
pub mod order_book;
pub mod price_process;
pub mod replay;
pub mod strategies;
pub mod strategy;
pub mod sweep;

// Re-exports for convenience
pub use depth::{best_level, cumulative_depth, cumulative_depth_on_grid, DepthLevel};
pub use engine::{Engine, EngineConfig, StepReport};
pub use error::{EngineError, InvalidOrderReason, StrategyError};
pub use execution::{run_execution, ExecutionReport};
pub use market::Market;
pub use order::{Order, OrderRequest, OwnerId, Side, SweepResult, Trade};
pub use order_book::{OrderBook, SimulationSnapshot};
pub use price_process::ReferenceProcess;
pub use replay::{ReplaySummary, SnapshotReplay};
pub use strategy::{ExecutionStrategy, Fills, Strategy, StrategyFailure};
pub use sweep::{impact_bps, Simulation};
