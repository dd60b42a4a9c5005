use crate::booth::{CustomerId, EventKind};
use thiserror::Error;

/// Errors that may be encountered while configuring or executing a booth simulation.
///
/// The [`BackInTime`] variant originates from the safe interface of the [`EventQueue`] to indicate that an event's
/// scheduled execution time is prior to the queue's current time. This error likely corresponds to a logical bug in
/// the scheduler, e.g. forgetting to add a service duration to the current time when scheduling a departure.
///
/// The [`Config`] variant is produced before any simulation runs, when a [`BoothConfig`] fails validation or cannot be
/// read. The [`Invariant`] variant reports a scheduler defect found while executing events or while reconstructing
/// customer timelines from an event log. Neither is ever repaired silently.
///
/// [`EventQueue`]: crate::serial::EventQueue
/// [`BoothConfig`]: crate::config::BoothConfig
/// [`BackInTime`]: Error::BackInTime
/// [`Config`]: Error::Config
/// [`Invariant`]: Error::Invariant
#[derive(Debug, Error)]
pub enum Error {
    /// The event queue rejected an event that would have been scheduled for a time that has already passed.
    #[error("event execution time is less than current simulation time")]
    BackInTime,
    /// The configuration was rejected before any simulation ran.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A scheduler invariant did not hold. Call [`source()`] to inspect the violation.
    ///
    /// [`source()`]: std::error::Error::source
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Reasons a [`BoothConfig`] is rejected.
///
/// [`BoothConfig`]: crate::config::BoothConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{what} probabilities sum to {total}, expected 1")]
    ProbabilitiesDoNotSumToOne { what: &'static str, total: f64 },
    #[error("{what} probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange { what: &'static str, value: f64 },
    #[error("{0} table is empty")]
    EmptyTable(&'static str),
    #[error("horizon must be positive, got {0} minutes")]
    NonPositiveHorizon(f64),
    #[error("closing cutoff must be a non-negative number of minutes, got {0}")]
    InvalidCutoff(f64),
    #[error("mean inter-arrival time must be positive, got {0}")]
    NonPositiveMean(f64),
    #[error("mean inter-arrival time {0} is below the 0.01 minute resolution of arrival times")]
    InterarrivalBelowResolution(f64),
    #[error("ticket count must be at least 1")]
    ZeroTickets,
    #[error("service bounds [{low}, {high}] are invalid; need 0 < low <= high")]
    InvalidServiceBounds { low: f64, high: f64 },
    #[error("rate window {start}:00-{end}:00 is invalid")]
    InvalidRateWindow { start: u32, end: u32 },
    #[error("arrival rate {0} is not a finite non-negative number")]
    InvalidRate(f64),
    #[error("rate windows overlap at hour {0}")]
    OverlappingRateWindows(u32),
    #[error("opening hour {0} is not a clock hour")]
    InvalidOpeningHour(u32),
    #[error("generator parameters are invalid: {0}")]
    InvalidGenerator(&'static str),
    #[error("at least one seed is required")]
    NoSeeds,
    #[error("seed {0} is used by more than one replication")]
    DuplicateSeed(u64),
    #[error("days per replication must be at least 1")]
    ZeroDays,
    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Scheduler defects detected while running a day or reading back its event log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("customer {customer} waited a negative time (arrival {arrival}, service start {start})")]
    NegativeWait { customer: CustomerId, arrival: f64, start: f64 },
    #[error("customer {customer} departed at {departure} before service started at {start}")]
    DepartureBeforeService { customer: CustomerId, start: f64, departure: f64 },
    #[error("{kind} recorded for customer {customer} with no prior arrival")]
    MissingArrival { customer: CustomerId, kind: EventKind },
    #[error("customer {0} never departed")]
    MissingDeparture(CustomerId),
    #[error("{kind} recorded twice for customer {customer}")]
    DuplicateRecord { customer: CustomerId, kind: EventKind },
    #[error("event log names unknown customer {0}")]
    UnknownCustomer(CustomerId),
    #[error("event log holds {logged} customers but {expected} were generated")]
    CountMismatch { logged: usize, expected: usize },
    #[error("{kind} for customer {customer} while the server holds {holder:?}")]
    ServerConflict { customer: CustomerId, kind: EventKind, holder: Option<CustomerId> },
}

/// [`std::result::Result`]`<T, `[`boothsim::Error`]`>`, defaulting to `()`.
///
/// A type alias that simplifies the signatures of various functions in boothsim.
///
/// [`boothsim::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violation_is_its_own_source() {
        let error = Error::from(InvariantViolation::MissingDeparture(CustomerId(3)));
        let source = std::error::Error::source(&error).expect("invariant errors should expose a source");
        assert_eq!("customer #3 never departed", source.to_string());
    }

    #[test]
    fn back_in_time_has_no_source() {
        assert!(std::error::Error::source(&Error::BackInTime).is_none());
    }
}
