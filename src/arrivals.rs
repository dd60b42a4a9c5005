//! Arrival processes that lay out one day's customer arrival times.
//!
//! Both strategies implement [`ArrivalProcess`] and draw from the replication's single [`RandomStream`], so switching
//! strategy never introduces a second source of randomness.

use crate::error::ConfigError;
use crate::random::RandomStream;
use crate::variates::{round_to_hundredths, Exponential, Poisson, Uniform, Variate, TIME_RESOLUTION};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::warn;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Arrival times for one day, in minutes from opening, along with how many arrivals fell in each hour.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalPlan {
    times: Vec<f64>,
    hourly_counts: Vec<u32>,
}

impl ArrivalPlan {
    /// Build a plan from absolute arrival times, bucketing them by hour of the horizon.
    pub fn from_times(times: Vec<f64>, horizon_minutes: f64) -> Self {
        let mut hourly_counts = vec![0; bucket_count(horizon_minutes)];
        let last = hourly_counts.len().saturating_sub(1);
        for time in &times {
            // times are non-negative, so truncation is the hour index
            let bucket = ((time / MINUTES_PER_HOUR) as usize).min(last);
            if let Some(count) = hourly_counts.get_mut(bucket) {
                *count += 1;
            }
        }
        Self { times, hourly_counts }
    }

    /// Arrival time of each customer, customer 1 first. Never decreasing.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Arrivals per hour of the horizon, counted from opening.
    pub fn hourly_counts(&self) -> &[u32] {
        &self.hourly_counts
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Inter-arrival gaps, the first measured from opening.
    pub fn gaps(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.times
            .iter()
            .map(|&time| {
                let gap = round_to_hundredths(time - previous);
                previous = time;
                gap
            })
            .collect()
    }
}

/// Produces a day's arrival times covering a fixed horizon.
pub trait ArrivalProcess: Debug + Send + Sync {
    fn generate(&self, stream: &mut RandomStream) -> ArrivalPlan;
}

/// When the first customer of a renewal day shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstArrival {
    /// Customer 1 is waiting at the door when the booth opens; no gap is drawn for them.
    AtOpening,
    /// Customer 1 arrives after the first drawn gap.
    #[default]
    AfterFirstGap,
}

/// Homogeneous renewal process with exponential inter-arrival gaps.
///
/// Gaps are accumulated until the running total reaches the horizon. The gap that gets there has already consumed its
/// draw, but it is not an arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalArrivals {
    gap: Exponential,
    horizon_minutes: f64,
    first_arrival: FirstArrival,
}

impl RenewalArrivals {
    /// # Errors
    ///
    /// Rejects a non-positive horizon, and a mean gap below the hundredth-of-a-minute resolution of arrival times.
    pub fn new(mean_interarrival: f64, horizon_minutes: f64, first_arrival: FirstArrival) -> Result<Self, ConfigError> {
        check_horizon(horizon_minutes)?;
        // smaller means round every gap to zero and the clock never reaches the horizon
        if mean_interarrival.is_finite() && mean_interarrival > 0.0 && mean_interarrival < TIME_RESOLUTION {
            return Err(ConfigError::InterarrivalBelowResolution(mean_interarrival));
        }
        Ok(Self {
            gap: Exponential::new(mean_interarrival)?,
            horizon_minutes,
            first_arrival,
        })
    }
}

impl ArrivalProcess for RenewalArrivals {
    fn generate(&self, stream: &mut RandomStream) -> ArrivalPlan {
        let mut times = Vec::new();
        let mut clock = 0.0;
        if self.first_arrival == FirstArrival::AtOpening {
            times.push(clock);
        }

        let mut stall = StallDetector::default();
        loop {
            let next = round_to_hundredths(clock + self.gap.sample(stream));
            if next >= self.horizon_minutes {
                break;
            }
            if next > clock {
                stall = StallDetector::default();
            } else if stall.has_cycled(stream.state()) {
                warn!(clock, seed = stream.seed(), "arrival clock stopped advancing; ending the day's arrivals early");
                break;
            }
            times.push(next);
            clock = next;
        }

        ArrivalPlan::from_times(times, self.horizon_minutes)
    }
}

/// Brent-style cycle check over the stream state while the arrival clock is standing still.
///
/// A renewal gap depends only on the stream state, so once the state repeats without the clock moving, it never will.
#[derive(Debug)]
struct StallDetector {
    mark: Option<u64>,
    steps: u64,
    power: u64,
}

impl Default for StallDetector {
    fn default() -> Self {
        Self {
            mark: None,
            steps: 0,
            power: 1,
        }
    }
}

impl StallDetector {
    fn has_cycled(&mut self, state: u64) -> bool {
        if self.mark == Some(state) {
            return true;
        }
        self.steps += 1;
        if self.steps == self.power {
            self.mark = Some(state);
            self.power = self.power.saturating_mul(2);
            self.steps = 0;
        }
        false
    }
}

/// Arrival rate, in customers per hour, over the clock hours `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub rate: f64,
}

impl RateWindow {
    pub const fn new(start_hour: u32, end_hour: u32, rate: f64) -> Self {
        Self {
            start_hour,
            end_hour,
            rate,
        }
    }

    fn covers(&self, hour: u32) -> bool {
        (self.start_hour..self.end_hour).contains(&hour)
    }
}

/// Piecewise-constant hourly arrival rates. Hours outside every window have rate 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRateTable {
    windows: Vec<RateWindow>,
}

impl HourlyRateTable {
    /// # Errors
    ///
    /// Rejects an empty table, windows that are empty or run past midnight, overlapping windows, and rates that are
    /// negative or not finite.
    pub fn new(windows: Vec<RateWindow>) -> Result<Self, ConfigError> {
        if windows.is_empty() {
            return Err(ConfigError::EmptyTable("arrival rate"));
        }
        for window in &windows {
            if window.start_hour >= window.end_hour || window.end_hour > 24 {
                return Err(ConfigError::InvalidRateWindow {
                    start: window.start_hour,
                    end: window.end_hour,
                });
            }
            if !(window.rate.is_finite() && window.rate >= 0.0) {
                return Err(ConfigError::InvalidRate(window.rate));
            }
        }
        for hour in 0..24 {
            if windows.iter().filter(|window| window.covers(hour)).count() > 1 {
                return Err(ConfigError::OverlappingRateWindows(hour));
            }
        }
        Ok(Self { windows })
    }

    /// The cinema's weekday profile: a lunchtime bump and an evening peak.
    pub fn cinema() -> Vec<RateWindow> {
        vec![
            RateWindow::new(10, 12, 19.0),
            RateWindow::new(12, 14, 25.0),
            RateWindow::new(14, 16, 27.0),
            RateWindow::new(16, 20, 42.0),
            RateWindow::new(20, 22, 25.0),
        ]
    }

    /// Customers per hour during the given clock hour.
    pub fn rate_at(&self, hour: u32) -> f64 {
        self.windows
            .iter()
            .find(|window| window.covers(hour % 24))
            .map_or(0.0, |window| window.rate)
    }
}

/// One hour of the horizon and the sampler for its arrival count.
#[derive(Debug, Clone, PartialEq)]
struct HourBucket {
    start_minute: f64,
    length: f64,
    count: Poisson,
}

/// Non-stationary Poisson process with one Poisson count per hour of the horizon.
///
/// Each bucket draws its count first and then spreads that many arrivals uniformly over the bucket. A final bucket
/// shorter than an hour scales its rate by the fraction of the hour it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPoissonArrivals {
    buckets: Vec<HourBucket>,
}

impl HourlyPoissonArrivals {
    /// # Errors
    ///
    /// Rejects a non-positive horizon or an opening hour past 23.
    pub fn new(table: &HourlyRateTable, opening_hour: u32, horizon_minutes: f64) -> Result<Self, ConfigError> {
        check_horizon(horizon_minutes)?;
        if opening_hour > 23 {
            return Err(ConfigError::InvalidOpeningHour(opening_hour));
        }

        let buckets = (0..bucket_count(horizon_minutes))
            .map(|index| -> Result<HourBucket, ConfigError> {
                let start_minute = index as f64 * MINUTES_PER_HOUR;
                let length = (horizon_minutes - start_minute).min(MINUTES_PER_HOUR);
                let hour = opening_hour + index as u32;
                let rate = table.rate_at(hour) * length / MINUTES_PER_HOUR;
                Ok(HourBucket {
                    start_minute,
                    length,
                    count: Poisson::new(rate)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { buckets })
    }
}

impl ArrivalProcess for HourlyPoissonArrivals {
    fn generate(&self, stream: &mut RandomStream) -> ArrivalPlan {
        let mut times = Vec::new();
        let mut hourly_counts = Vec::with_capacity(self.buckets.len());

        for bucket in &self.buckets {
            let count = bucket.count.sample(stream);
            let offset = Uniform::new(0.0, bucket.length);
            let mut bucket_times: Vec<f64> = (0..count)
                .map(|_| round_to_hundredths(bucket.start_minute + offset.sample(stream)))
                .collect();
            bucket_times.sort_by(f64::total_cmp);

            times.extend(bucket_times);
            hourly_counts.push(count);
        }

        ArrivalPlan { times, hourly_counts }
    }
}

fn check_horizon(horizon_minutes: f64) -> Result<(), ConfigError> {
    if horizon_minutes.is_finite() && horizon_minutes > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveHorizon(horizon_minutes))
    }
}

fn bucket_count(horizon_minutes: f64) -> usize {
    (horizon_minutes / MINUTES_PER_HOUR).ceil().max(0.0) as usize
}
