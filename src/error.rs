//! Error types for the order book and the strategy callback channel.

use thiserror::Error;

/// Why an order (or a sweep quantity) was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidOrderReason {
    /// Side label was not one of buy/bid/sell/ask
    #[error("unknown side label {0:?}")]
    UnknownSide(String),
    /// Price was NaN or infinite
    #[error("price is not finite")]
    NonFinitePrice,
    /// Price was zero or negative
    #[error("price must be positive")]
    NonPositivePrice,
    /// Size was NaN or infinite
    #[error("size is not finite")]
    NonFiniteSize,
    /// Size was zero or negative
    #[error("size must be positive")]
    NonPositiveSize,
    /// Sweep quantity was NaN, infinite or negative
    #[error("quantity must be finite and non-negative")]
    InvalidQuantity,
}

/// Errors returned by engine operations.
///
/// A rejected operation never leaves the book partially modified.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Order or sweep request failed validation
    #[error("invalid order: {0}")]
    InvalidOrder(InvalidOrderReason),

    /// Engine, depth or strategy parameters are unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure reported by a strategy callback.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    /// An engine call made by the strategy was rejected
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Strategy-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_order_display() {
        let err = EngineError::InvalidOrder(InvalidOrderReason::UnknownSide("hold".into()));
        assert_eq!(err.to_string(), "invalid order: unknown side label \"hold\"");

        let err = EngineError::InvalidOrder(InvalidOrderReason::NonPositiveSize);
        assert_eq!(err.to_string(), "invalid order: size must be positive");
    }

    #[test]
    fn test_reason_messages() {
        let cases = [
            (InvalidOrderReason::NonFinitePrice, "price is not finite"),
            (InvalidOrderReason::NonPositivePrice, "price must be positive"),
            (InvalidOrderReason::NonFiniteSize, "size is not finite"),
            (InvalidOrderReason::InvalidQuantity, "quantity must be finite and non-negative"),
        ];
        for (reason, message) in cases {
            assert_eq!(reason.to_string(), message);
        }
    }

    #[test]
    fn test_strategy_error_wraps_engine_error() {
        let err: StrategyError = EngineError::InvalidOrder(InvalidOrderReason::NonFinitePrice).into();
        assert!(matches!(err, StrategyError::Engine(_)));
        assert_eq!(err.to_string(), "invalid order: price is not finite");
    }
}
