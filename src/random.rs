//! The linear-congruential stream every replication draws from.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest modulus whose states all convert to `f64` exactly, which keeps every draw strictly below 1.
pub const MAX_EXACT_MODULUS: u64 = 1 << 53;

/// Multiplier, increment and modulus of a linear-congruential generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcgParameters {
    pub multiplier: u64,
    pub increment: u64,
    pub modulus: u64,
}

impl LcgParameters {
    /// Reject parameters that would break the `[0, modulus)` state invariant or make every draw identical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modulus < 2 || self.modulus > MAX_EXACT_MODULUS {
            return Err(ConfigError::InvalidGenerator("modulus must lie in [2, 2^53]"));
        }
        if self.multiplier == 0 || self.multiplier >= self.modulus {
            return Err(ConfigError::InvalidGenerator("multiplier must lie in [1, modulus)"));
        }
        if self.increment >= self.modulus {
            return Err(ConfigError::InvalidGenerator("increment must lie in [0, modulus)"));
        }
        Ok(())
    }
}

impl Default for LcgParameters {
    fn default() -> Self {
        Self {
            multiplier: 29,
            increment: 3,
            modulus: 1289,
        }
    }
}

/// A deterministic stream of uniform draws on `[0, 1)`.
///
/// The update rule is `state = (a * state + c) mod m`, and each draw is `state / m`. The stream never consults an
/// external entropy source, so two streams built from the same seed and parameters yield identical sequences.
///
/// Samplers in [`variates`] take the stream as `&mut RandomStream`, which keeps the order of draws visible at every
/// call site.
///
/// [`variates`]: crate::variates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    parameters: LcgParameters,
    seed: u64,
    state: u64,
    draws: u64,
}

impl RandomStream {
    /// A stream over the default parameters (`a = 29, c = 3, m = 1289`).
    pub fn new(seed: u64) -> Self {
        Self::from_parts(LcgParameters::default(), seed)
    }

    /// A stream over custom parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGenerator`] when the parameters fail [`LcgParameters::validate()`].
    pub fn with_parameters(parameters: LcgParameters, seed: u64) -> Result<Self, ConfigError> {
        parameters.validate()?;
        Ok(Self::from_parts(parameters, seed))
    }

    fn from_parts(parameters: LcgParameters, seed: u64) -> Self {
        Self {
            parameters,
            seed,
            state: seed % parameters.modulus,
            draws: 0,
        }
    }

    /// Advance the generator and return the new state scaled onto `[0, 1)`.
    pub fn next_uniform(&mut self) -> f64 {
        let LcgParameters {
            multiplier,
            increment,
            modulus,
        } = self.parameters;
        let next = (u128::from(multiplier) * u128::from(self.state) + u128::from(increment)) % u128::from(modulus);
        // next < modulus, which came from a u64
        self.state = next as u64;
        self.draws += 1;
        self.state as f64 / modulus as f64
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    /// How many times [`next_uniform()`] has been called.
    ///
    /// [`next_uniform()`]: RandomStream::next_uniform
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stream_follows_update_rule() {
        let mut stream = RandomStream::new(541);
        assert_eq!(224.0 / 1289.0, stream.next_uniform());
        assert_eq!(54.0 / 1289.0, stream.next_uniform());
        assert_eq!(280.0 / 1289.0, stream.next_uniform());

        let mut state = stream.state();
        for _ in 0..1000 {
            state = (29 * state + 3) % 1289;
            assert_eq!(state as f64 / 1289.0, stream.next_uniform(), "draw diverged from the update rule");
        }
        assert_eq!(1003, stream.draws());
    }

    #[test]
    fn seed_is_reduced_into_state_range() {
        let stream = RandomStream::new(1289 + 5);
        assert_eq!(5, stream.state());
        assert_eq!(1294, stream.seed());
    }

    #[test]
    fn zero_state_still_draws_below_one() {
        let mut stream = RandomStream::new(0);
        let draw = stream.next_uniform();
        assert_eq!(3.0 / 1289.0, draw);
        assert!((0.0..1.0).contains(&draw));
    }

    #[test]
    fn large_parameters_do_not_overflow() {
        let parameters = LcgParameters {
            multiplier: MAX_EXACT_MODULUS - 3,
            increment: MAX_EXACT_MODULUS - 7,
            modulus: MAX_EXACT_MODULUS,
        };
        let mut stream = RandomStream::with_parameters(parameters, u64::MAX).unwrap();
        for _ in 0..100 {
            let draw = stream.next_uniform();
            assert!((0.0..1.0).contains(&draw), "draw {draw} escaped [0, 1)");
        }
    }

    #[test]
    fn degenerate_parameters_are_rejected() {
        let cases = [
            LcgParameters { multiplier: 29, increment: 3, modulus: 1 },
            LcgParameters { multiplier: 29, increment: 3, modulus: u64::MAX },
            LcgParameters { multiplier: 0, increment: 3, modulus: 1289 },
            LcgParameters { multiplier: 29, increment: 1289, modulus: 1289 },
        ];
        for parameters in cases {
            assert!(
                matches!(
                    RandomStream::with_parameters(parameters, 1),
                    Err(ConfigError::InvalidGenerator(_))
                ),
                "{parameters:?} should be rejected"
            );
        }
    }
}
