//! # Overview
//!
//! boothsim is a discrete-event simulation of a single-server cinema ticket booth. Customers arrive at random, queue in
//! FIFO order for the one counter, buy one to four tickets, pay by cash or card, and leave. A customer served before the
//! show starts is lucky; everyone else is unlucky. Repeating the day under several independent seeds yields waiting
//! times, server utilization and queue length with a sense of their variance.
//!
//! The crate is layered leaf-first:
//!
//! * [`random`] and [`variates`]: a deterministic linear-congruential stream and the samplers drawn from it. Every
//!   replication draws all of its randomness from one [`RandomStream`], in a fixed order, so a seed replays exactly.
//! * [`arrivals`]: a renewal process of exponential gaps, or hourly Poisson counts from a rate table.
//! * [`service`]: each customer's ticket count, payment method and service duration.
//! * [`booth`]: the arrival, service start and departure events, run on the generic event engine in [`serial`].
//! * [`stats`] and [`replication`]: per-customer timelines read back from the event log, day metrics, and the
//!   averaged report of each seed.
//!
//! The engine in [`serial`] expects each event to be capable of failing, gracefully halting execution if an event
//! returns an error. Event order is determined entirely by the [`SimTime`] implementation: the booth's
//! [`EventTime`] sorts by minute and then by event kind, with insertion order breaking any remaining tie.
//!
//! Configuration comes from [`BoothConfig`], usually parsed from JSON. Logging goes through `tracing`; see [`logging`]
//! for installing a subscriber.
//!
//! [`RandomStream`]: random::RandomStream
//! [`EventTime`]: booth::EventTime
//! [`BoothConfig`]: config::BoothConfig

pub mod arrivals;
pub mod booth;
pub mod config;
mod error;
mod generic_parameters;
pub mod logging;
pub mod random;
pub mod replication;
pub mod serial;
pub mod service;
pub mod stats;
pub mod variates;

pub use error::{ConfigError, Error, InvariantViolation, Result};
pub use generic_parameters::{SimState, SimTime};
