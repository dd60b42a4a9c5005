//! Samplers layered over a [`RandomStream`].
//!
//! Each sampler is a small value type with a [`Variate::sample()`] method, in the spirit of `rand_distr`'s
//! `Distribution`, except that the stream is always our own deterministic [`RandomStream`]. Continuous outputs are
//! rounded to hundredths of a minute as they are drawn, so a replay from the same seed is bit-for-bit identical.

use crate::error::ConfigError;
use crate::random::RandomStream;

/// Smallest nonzero span of time a generated value can carry, in minutes.
pub const TIME_RESOLUTION: f64 = 0.01;

/// Round to two decimal places, the precision every generated time carries.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Something that can be drawn from a [`RandomStream`].
pub trait Variate {
    type Output;

    /// Draw one value, consuming one or more uniforms from `stream`.
    fn sample(&self, stream: &mut RandomStream) -> Self::Output;
}

/// Exponential distribution parameterized by its mean: `-ln(1 - u) * mean`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    mean: f64,
}

impl Exponential {
    /// # Errors
    ///
    /// The mean must be positive and finite.
    pub fn new(mean: f64) -> Result<Self, ConfigError> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(ConfigError::NonPositiveMean(mean));
        }
        Ok(Self { mean })
    }
}

impl Variate for Exponential {
    type Output = f64;

    fn sample(&self, stream: &mut RandomStream) -> f64 {
        // the stream never yields 1.0, so the logarithm stays finite
        let u = stream.next_uniform();
        round_to_hundredths(-(1.0 - u).ln() * self.mean)
    }
}

/// Continuous uniform distribution on `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl Variate for Uniform {
    type Output = f64;

    fn sample(&self, stream: &mut RandomStream) -> f64 {
        round_to_hundredths(self.low + (self.high - self.low) * stream.next_uniform())
    }
}

/// A finite distribution walked in declared order against a single uniform draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical<T> {
    outcomes: Vec<T>,
    cumulative: Vec<f64>,
}

impl<T: Clone> Categorical<T> {
    /// Build from `(outcome, probability)` pairs. The cumulative bounds are accumulated in the given order.
    ///
    /// # Errors
    ///
    /// Rejects an empty table, a probability outside `[0, 1]`, or probabilities that do not sum to 1.
    pub fn from_probabilities(what: &'static str, table: &[(T, f64)]) -> Result<Self, ConfigError> {
        if table.is_empty() {
            return Err(ConfigError::EmptyTable(what));
        }

        let mut outcomes = Vec::with_capacity(table.len());
        let mut cumulative = Vec::with_capacity(table.len());
        let mut total = 0.0;
        for (outcome, probability) in table {
            if !(0.0..=1.0).contains(probability) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    what,
                    value: *probability,
                });
            }
            total += probability;
            outcomes.push(outcome.clone());
            cumulative.push(total);
        }

        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ConfigError::ProbabilitiesDoNotSumToOne { what, total });
        }
        Ok(Self { outcomes, cumulative })
    }
}

/// How far a probability table may stray from summing to exactly 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

impl<T: Clone> Variate for Categorical<T> {
    type Output = T;

    fn sample(&self, stream: &mut RandomStream) -> T {
        let u = stream.next_uniform();
        let index = self
            .cumulative
            .iter()
            .position(|bound| u <= *bound)
            .unwrap_or(self.outcomes.len() - 1);
        self.outcomes[index].clone()
    }
}

/// Poisson-distributed counts via Knuth's product of uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poisson {
    rate: f64,
}

impl Poisson {
    /// # Errors
    ///
    /// The rate must be finite and non-negative.
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(ConfigError::InvalidRate(rate));
        }
        Ok(Self { rate })
    }
}

impl Variate for Poisson {
    type Output = u32;

    /// A rate of zero makes the threshold 1, which no draw exceeds, so exactly one uniform is consumed.
    fn sample(&self, stream: &mut RandomStream) -> u32 {
        let limit = (-self.rate).exp();
        let mut product = stream.next_uniform();
        let mut count = 0;
        while product > limit {
            product *= stream.next_uniform();
            count += 1;
        }
        count
    }
}
