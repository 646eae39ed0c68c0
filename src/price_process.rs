//! Latent reference value - a Gaussian random walk.
//!
//! Each call to [`ReferenceProcess::advance`] adds one N(0, volatility²)
//! increment and records the new value.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{EngineError, Result};

/// The evolving "true" value that strategies quote around.
#[derive(Clone, Debug)]
pub struct ReferenceProcess {
    value: f64,
    /// `None` when volatility is zero and the walk is frozen
    increment: Option<Normal<f64>>,
    history: Vec<f64>,
    rng: ChaCha8Rng,
}

impl ReferenceProcess {
    /// Create a walk starting at `initial_value`.
    ///
    /// `seed = None` draws the seed from OS entropy.
    pub fn new(initial_value: f64, volatility: f64, seed: Option<u64>) -> Result<Self> {
        if !initial_value.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "initial value must be finite, got {initial_value}"
            )));
        }
        if !(volatility.is_finite() && volatility >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "volatility must be finite and non-negative, got {volatility}"
            )));
        }
        let increment = if volatility > 0.0 {
            Some(Normal::new(0.0, volatility).map_err(|e| EngineError::InvalidConfig(e.to_string()))?)
        } else {
            None
        };
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            value: initial_value,
            increment,
            history: vec![initial_value],
            rng,
        })
    }

    /// Apply one increment and return the new value.
    pub fn advance(&mut self) -> f64 {
        if let Some(normal) = &self.increment {
            self.value += normal.sample(&mut self.rng);
        }
        self.history.push(self.value);
        self.value
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Every value so far, starting with the initial one.
    #[inline]
    pub fn history(&self) -> &[f64] {
        &self.history
    }
}
