//! The single-server booth: arrivals, the FIFO line, service and departures.
//!
//! A day is driven by [`run_day()`], which feeds a precomputed [`ArrivalPlan`] and the matching
//! [`ServiceProfile`]s through the event engine in [`serial`] and returns the day's [`EventLog`].
//!
//! [`serial`]: crate::serial

use crate::arrivals::ArrivalPlan;
use crate::error::InvariantViolation;
use crate::serial::{Event, EventQueue, Simulation};
use crate::service::ServiceProfile;
use crate::variates::round_to_hundredths;
use crate::{SimState, SimTime};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use tracing::trace;

/// A customer's position in the day's arrival order, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerId(pub u32);

impl CustomerId {
    /// Zero-based index into the day's plan and profiles.
    pub fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }

    fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kinds of event a booth day produces, declared in tie-break order.
///
/// At equal timestamps a departure runs first so the server is released before new demand is considered, then
/// arrivals, then service starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Departure,
    Arrival,
    ServiceStart,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Departure => "departure",
            Self::Arrival => "arrival",
            Self::ServiceStart => "service start",
        };
        write!(f, "{name}")
    }
}

/// Clock for the booth: minutes from opening, then [`EventKind`] to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventTime {
    minutes: OrderedFloat<f64>,
    kind: EventKind,
}

impl EventTime {
    pub fn new(minutes: f64, kind: EventKind) -> Self {
        Self {
            minutes: OrderedFloat(minutes),
            kind,
        }
    }

    /// The booth's opening instant, ordered before anything that can happen at minute 0.
    pub fn opening() -> Self {
        Self::new(0.0, EventKind::Departure)
    }

    pub fn minutes(&self) -> f64 {
        self.minutes.into_inner()
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl SimTime for EventTime {}

/// How queue release is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerVariant {
    /// Service starts inside the arrival or departure that frees the customer; only those two kinds are queued.
    TwoEvent,
    /// Service starts are events of their own, queued at the instant the server is handed over.
    #[default]
    ThreeEvent,
}

/// One entry of the event log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub customer: CustomerId,
    pub time: f64,
    pub kind: EventKind,
}

/// Append-only record of every state transition of one day, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, customer: CustomerId, time: f64, kind: EventKind) {
        self.records.push(EventRecord { customer, time, kind });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<EventRecord> for EventLog {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Busy(CustomerId),
}

impl ServerState {
    fn holder(self) -> Option<CustomerId> {
        match self {
            Self::Idle => None,
            Self::Busy(customer) => Some(customer),
        }
    }
}

/// Everything a booth day mutates while its events run.
#[derive(Debug)]
pub struct BoothState {
    arrival_times: Vec<f64>,
    durations: Vec<f64>,
    variant: SchedulerVariant,
    server: ServerState,
    line: VecDeque<CustomerId>,
    peak_line: usize,
    log: EventLog,
}

impl BoothState {
    fn new(plan: &ArrivalPlan, profiles: &[ServiceProfile], variant: SchedulerVariant) -> Self {
        Self {
            arrival_times: plan.times().to_vec(),
            durations: profiles.iter().map(|profile| profile.duration).collect(),
            variant,
            server: ServerState::Idle,
            line: VecDeque::new(),
            peak_line: 0,
            log: EventLog::new(),
        }
    }

    fn record(&mut self, customer: CustomerId, time: f64, kind: EventKind) {
        trace!(%customer, time, %kind, line = self.line.len(), "booth event");
        self.log.push(customer, time, kind);
    }

    fn duration_of(&self, customer: CustomerId) -> Result<f64, InvariantViolation> {
        self.durations
            .get(customer.index())
            .copied()
            .ok_or(InvariantViolation::UnknownCustomer(customer))
    }

    /// Hand the server to `customer` right now. The server is marked busy before anything else at this instant runs.
    fn begin_service(
        &mut self,
        customer: CustomerId,
        event_queue: &mut EventQueue<BoothState, EventTime>,
    ) -> crate::Result {
        let now = event_queue.current_time().minutes();
        self.server = ServerState::Busy(customer);
        match self.variant {
            SchedulerVariant::TwoEvent => {
                self.record(customer, now, EventKind::ServiceStart);
                DepartureEvent::schedule(customer, self, event_queue)
            },
            SchedulerVariant::ThreeEvent => {
                event_queue.schedule(ServiceStartEvent { customer }, EventTime::new(now, EventKind::ServiceStart))
            },
        }
    }

    fn check_holder(&self, customer: CustomerId, kind: EventKind) -> Result<(), InvariantViolation> {
        if self.server == ServerState::Busy(customer) {
            Ok(())
        } else {
            Err(InvariantViolation::ServerConflict {
                customer,
                kind,
                holder: self.server.holder(),
            })
        }
    }
}

impl SimState<EventTime> for BoothState {}

/// A customer walks up to the booth.
#[derive(Debug)]
struct ArrivalEvent {
    customer: CustomerId,
}

impl ArrivalEvent {
    /// Queue the arrival of `customer` at its planned time, if the plan has such a customer.
    fn schedule(
        customer: CustomerId,
        booth: &BoothState,
        event_queue: &mut EventQueue<BoothState, EventTime>,
    ) -> crate::Result {
        match booth.arrival_times.get(customer.index()) {
            Some(&time) => event_queue.schedule(Self { customer }, EventTime::new(time, EventKind::Arrival)),
            None => Ok(()),
        }
    }
}

impl Event<BoothState, EventTime> for ArrivalEvent {
    fn execute(&mut self, booth: &mut BoothState, event_queue: &mut EventQueue<BoothState, EventTime>) -> crate::Result {
        let now = event_queue.current_time().minutes();
        booth.record(self.customer, now, EventKind::Arrival);
        ArrivalEvent::schedule(self.customer.next(), booth, event_queue)?;

        match booth.server {
            ServerState::Idle => booth.begin_service(self.customer, event_queue),
            ServerState::Busy(_) => {
                booth.line.push_back(self.customer);
                booth.peak_line = booth.peak_line.max(booth.line.len());
                Ok(())
            },
        }
    }
}

/// The server, already reserved for this customer, starts serving them.
#[derive(Debug)]
struct ServiceStartEvent {
    customer: CustomerId,
}

impl Event<BoothState, EventTime> for ServiceStartEvent {
    fn execute(&mut self, booth: &mut BoothState, event_queue: &mut EventQueue<BoothState, EventTime>) -> crate::Result {
        booth.check_holder(self.customer, EventKind::ServiceStart)?;
        let now = event_queue.current_time().minutes();
        booth.record(self.customer, now, EventKind::ServiceStart);
        DepartureEvent::schedule(self.customer, booth, event_queue)
    }
}

/// Service completes; the next customer in line, if any, takes the counter.
#[derive(Debug)]
struct DepartureEvent {
    customer: CustomerId,
}

impl DepartureEvent {
    fn schedule(
        customer: CustomerId,
        booth: &BoothState,
        event_queue: &mut EventQueue<BoothState, EventTime>,
    ) -> crate::Result {
        let duration = booth.duration_of(customer)?;
        let departure = round_to_hundredths(event_queue.current_time().minutes() + duration);
        event_queue.schedule(Self { customer }, EventTime::new(departure, EventKind::Departure))
    }
}

impl Event<BoothState, EventTime> for DepartureEvent {
    fn execute(&mut self, booth: &mut BoothState, event_queue: &mut EventQueue<BoothState, EventTime>) -> crate::Result {
        booth.check_holder(self.customer, EventKind::Departure)?;
        let now = event_queue.current_time().minutes();
        booth.record(self.customer, now, EventKind::Departure);
        booth.server = ServerState::Idle;

        match booth.line.pop_front() {
            Some(next) => booth.begin_service(next, event_queue),
            None => Ok(()),
        }
    }
}

/// What one simulated day of the booth leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRun {
    pub log: EventLog,
    /// Longest the line got at any instant.
    pub peak_line: usize,
}

/// Run one day: every planned customer arrives, waits their turn, is served and leaves.
///
/// The run ends when the event queue drains, which it always does because arrivals are bounded by `plan`.
///
/// # Errors
///
/// [`Error::Invariant`] if the plan and profiles disagree on the number of customers or the server state is ever
/// contradicted, and [`Error::BackInTime`] if a departure would land before the current clock.
///
/// [`Error::Invariant`]: crate::Error::Invariant
/// [`Error::BackInTime`]: crate::Error::BackInTime
pub fn run_day(plan: &ArrivalPlan, profiles: &[ServiceProfile], variant: SchedulerVariant) -> crate::Result<DayRun> {
    if plan.len() != profiles.len() {
        return Err(InvariantViolation::CountMismatch {
            logged: plan.len(),
            expected: profiles.len(),
        }
        .into());
    }

    let mut sim = Simulation::new(BoothState::new(plan, profiles, variant), EventTime::opening());
    if let Some(&first) = plan.times().first() {
        let customer = CustomerId::from_index(0);
        sim.schedule(ArrivalEvent { customer }, EventTime::new(first, EventKind::Arrival))?;
    }
    sim.run()?;

    let booth = sim.into_state();
    if let Some(&stranded) = booth.line.front() {
        return Err(InvariantViolation::MissingDeparture(stranded).into());
    }
    Ok(DayRun {
        log: booth.log,
        peak_line: booth.peak_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::PaymentMethod;

    fn profile(tickets: u32, duration: f64) -> ServiceProfile {
        ServiceProfile {
            tickets,
            payment: PaymentMethod::Card,
            duration,
        }
    }

    fn kinds(log: &EventLog) -> Vec<(u32, f64, EventKind)> {
        log.records()
            .iter()
            .map(|record| (record.customer.0, record.time, record.kind))
            .collect()
    }

    #[test]
    fn lone_customer_at_opening() {
        let plan = ArrivalPlan::from_times(vec![0.0], 30.0);
        let day = run_day(&plan, &[profile(2, 3.5)], SchedulerVariant::ThreeEvent).unwrap();

        assert_eq!(
            vec![
                (1, 0.0, EventKind::Arrival),
                (1, 0.0, EventKind::ServiceStart),
                (1, 3.5, EventKind::Departure),
            ],
            kinds(&day.log)
        );
        assert_eq!(0, day.peak_line);
    }

    #[test]
    fn departure_precedes_simultaneous_arrival() {
        // customer 1 leaves at 4.0, exactly when customer 2 walks up
        let plan = ArrivalPlan::from_times(vec![1.0, 4.0], 30.0);
        let profiles = [profile(1, 3.0), profile(1, 2.0)];

        for variant in [SchedulerVariant::TwoEvent, SchedulerVariant::ThreeEvent] {
            let day = run_day(&plan, &profiles, variant).unwrap();
            assert_eq!(
                vec![
                    (1, 1.0, EventKind::Arrival),
                    (1, 1.0, EventKind::ServiceStart),
                    (1, 4.0, EventKind::Departure),
                    (2, 4.0, EventKind::Arrival),
                    (2, 4.0, EventKind::ServiceStart),
                    (2, 6.0, EventKind::Departure),
                ],
                kinds(&day.log),
                "{variant:?} did not free the server first"
            );
            assert_eq!(0, day.peak_line, "{variant:?} queued a customer behind a departing one");
        }
    }

    #[test]
    fn released_customer_beats_simultaneous_arrival() {
        // customer 2 is in line when customer 1 leaves at 5.0; customer 3 arrives at 5.0 and must queue
        let plan = ArrivalPlan::from_times(vec![0.0, 1.0, 5.0], 30.0);
        let profiles = [profile(1, 5.0), profile(1, 2.0), profile(1, 2.0)];

        let day = run_day(&plan, &profiles, SchedulerVariant::ThreeEvent).unwrap();
        assert_eq!(
            vec![
                (1, 0.0, EventKind::Arrival),
                (1, 0.0, EventKind::ServiceStart),
                (2, 1.0, EventKind::Arrival),
                (1, 5.0, EventKind::Departure),
                (3, 5.0, EventKind::Arrival),
                (2, 5.0, EventKind::ServiceStart),
                (2, 7.0, EventKind::Departure),
                (3, 7.0, EventKind::ServiceStart),
                (3, 9.0, EventKind::Departure),
            ],
            kinds(&day.log)
        );
        assert_eq!(1, day.peak_line);
    }

    #[test]
    fn both_variants_agree_on_timelines() {
        let plan = ArrivalPlan::from_times(vec![0.5, 0.7, 0.9, 8.0, 8.0], 30.0);
        let profiles = [
            profile(1, 2.5),
            profile(2, 3.25),
            profile(1, 2.0),
            profile(4, 6.0),
            profile(1, 2.0),
        ];

        let mut two = kinds(&run_day(&plan, &profiles, SchedulerVariant::TwoEvent).unwrap().log);
        let mut three = kinds(&run_day(&plan, &profiles, SchedulerVariant::ThreeEvent).unwrap().log);
        two.sort_by(|a, b| (a.0, a.2).cmp(&(b.0, b.2)));
        three.sort_by(|a, b| (a.0, a.2).cmp(&(b.0, b.2)));
        assert_eq!(two, three);
    }

    #[test]
    fn empty_day_produces_empty_log() {
        let plan = ArrivalPlan::from_times(vec![], 30.0);
        let day = run_day(&plan, &[], SchedulerVariant::ThreeEvent).unwrap();
        assert!(day.log.is_empty());
    }

    #[test]
    fn mismatched_profiles_are_an_invariant_failure() {
        let plan = ArrivalPlan::from_times(vec![1.0, 2.0], 30.0);
        let result = run_day(&plan, &[profile(1, 2.0)], SchedulerVariant::ThreeEvent);
        assert!(matches!(
            result,
            Err(crate::Error::Invariant(InvariantViolation::CountMismatch { logged: 2, expected: 1 }))
        ));
    }

    #[test]
    fn event_time_orders_kinds_at_equal_minutes() {
        let departure = EventTime::new(5.0, EventKind::Departure);
        let arrival = EventTime::new(5.0, EventKind::Arrival);
        let start = EventTime::new(5.0, EventKind::ServiceStart);
        assert!(departure < arrival && arrival < start);
        assert!(start < EventTime::new(5.01, EventKind::Departure));
        assert!(EventTime::opening() <= EventTime::new(0.0, EventKind::Arrival));
    }
}
