//! Reduces a day's event log to per-customer timelines, day metrics, and multi-day averages.
//!
//! Everything here is a pure function of its inputs. Reading the same log twice yields the same metrics.

use crate::booth::{CustomerId, EventKind, EventLog};
use crate::error::InvariantViolation;
use crate::service::ServiceProfile;

use std::fmt::{Display, Formatter};

/// When a day closes and how many seats the show has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowRules {
    /// Minutes from opening. A customer whose service ends strictly before this is lucky.
    pub closing_cutoff: f64,
    /// Seats available. `None` means the show never sells out.
    pub show_capacity: Option<u32>,
}

/// One customer's passage through the booth, read back from the event log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerTimeline {
    pub customer: CustomerId,
    pub arrival: f64,
    pub service_start: f64,
    pub departure: f64,
    pub tickets: u32,
    /// Minutes at the counter, as drawn for the customer's profile.
    pub service_time: f64,
}

impl CustomerTimeline {
    pub fn waiting_time(&self) -> f64 {
        self.service_start - self.arrival
    }

    pub fn is_lucky(&self, closing_cutoff: f64) -> bool {
        self.departure < closing_cutoff
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Sightings {
    arrival: Option<f64>,
    service_start: Option<f64>,
    departure: Option<f64>,
}

impl Sightings {
    fn slot(&mut self, kind: EventKind) -> &mut Option<f64> {
        match kind {
            EventKind::Arrival => &mut self.arrival,
            EventKind::ServiceStart => &mut self.service_start,
            EventKind::Departure => &mut self.departure,
        }
    }
}

/// Rebuild every customer's timeline from a day's log and the profiles the day was run with.
///
/// Each customer must appear with exactly one arrival and one departure, and at most one service start. A customer
/// with no logged service start began service when they arrived or when the previous customer left, whichever came
/// later.
///
/// # Errors
///
/// Any inconsistency between the log and the profiles is returned as an [`InvariantViolation`]. Nothing is clamped.
pub fn reconstruct_timelines(
    log: &EventLog,
    profiles: &[ServiceProfile],
) -> Result<Vec<CustomerTimeline>, InvariantViolation> {
    let mut sightings = vec![Sightings::default(); profiles.len()];

    for record in log.records() {
        let customer = record.customer;
        let seen = sightings
            .get_mut(customer.index())
            .ok_or(InvariantViolation::UnknownCustomer(customer))?;
        if record.kind != EventKind::Arrival && seen.arrival.is_none() {
            return Err(InvariantViolation::MissingArrival {
                customer,
                kind: record.kind,
            });
        }
        let slot = seen.slot(record.kind);
        if slot.is_some() {
            return Err(InvariantViolation::DuplicateRecord {
                customer,
                kind: record.kind,
            });
        }
        *slot = Some(record.time);
    }

    let logged = sightings.iter().filter(|seen| seen.arrival.is_some()).count();
    if logged != profiles.len() {
        return Err(InvariantViolation::CountMismatch {
            logged,
            expected: profiles.len(),
        });
    }

    let mut timelines = Vec::with_capacity(profiles.len());
    let mut previous_departure = 0.0_f64;
    for (index, (seen, profile)) in sightings.iter().zip(profiles).enumerate() {
        let customer = CustomerId(index as u32 + 1);
        let (Some(arrival), Some(departure)) = (seen.arrival, seen.departure) else {
            return Err(InvariantViolation::MissingDeparture(customer));
        };
        let service_start = seen.service_start.unwrap_or_else(|| arrival.max(previous_departure));

        if service_start < arrival {
            return Err(InvariantViolation::NegativeWait {
                customer,
                arrival,
                start: service_start,
            });
        }
        if departure < service_start {
            return Err(InvariantViolation::DepartureBeforeService {
                customer,
                start: service_start,
                departure,
            });
        }

        timelines.push(CustomerTimeline {
            customer,
            arrival,
            service_start,
            departure,
            tickets: profile.tickets,
            service_time: profile.duration,
        });
        previous_departure = departure;
    }
    Ok(timelines)
}

/// Longest the line got, swept from arrival and service-start instants.
///
/// A service start sorts before an arrival at the same instant, matching the scheduler releasing the head of the line
/// on a departure before the next arrival is seen. Customers served on arrival never join the line.
pub fn peak_queue_length(timelines: &[CustomerTimeline]) -> usize {
    let mut changes: Vec<(f64, i32)> = timelines
        .iter()
        .filter(|timeline| timeline.service_start > timeline.arrival)
        .flat_map(|timeline| [(timeline.arrival, 1), (timeline.service_start, -1)])
        .collect();
    changes.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut line = 0_i32;
    let mut peak = 0_i32;
    for (_, change) in changes {
        line += change;
        peak = peak.max(line);
    }
    peak as usize
}

/// What one day of the booth amounted to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayMetrics {
    pub arrivals: usize,
    pub hourly_counts: Vec<u32>,
    pub lucky_customers: usize,
    pub unlucky_customers: usize,
    /// Tickets bought by customers served before the cutoff.
    pub lucky_tickets: u32,
    pub unlucky_tickets: u32,
    pub lucky_wait_total: f64,
    pub unlucky_wait_total: f64,
    /// Minutes the server spent on lucky customers.
    pub lucky_service_time: f64,
    /// Sum of waiting time times tickets, over every customer.
    pub ticket_wait_total: f64,
    pub open_minutes: f64,
    /// Lucky tickets, capped at the show's capacity.
    pub tickets_sold: u32,
    pub sold_out: bool,
    pub peak_queue_length: usize,
}

impl DayMetrics {
    pub fn aggregate(timelines: &[CustomerTimeline], hourly_counts: &[u32], rules: ShowRules) -> Self {
        let mut metrics = Self {
            arrivals: timelines.len(),
            hourly_counts: hourly_counts.to_vec(),
            open_minutes: rules.closing_cutoff,
            peak_queue_length: peak_queue_length(timelines),
            ..Self::default()
        };

        for timeline in timelines {
            let wait = timeline.waiting_time();
            metrics.ticket_wait_total += wait * f64::from(timeline.tickets);
            if timeline.is_lucky(rules.closing_cutoff) {
                metrics.lucky_customers += 1;
                metrics.lucky_tickets += timeline.tickets;
                metrics.lucky_wait_total += wait;
                metrics.lucky_service_time += timeline.service_time;
            } else {
                metrics.unlucky_customers += 1;
                metrics.unlucky_tickets += timeline.tickets;
                metrics.unlucky_wait_total += wait;
            }
        }

        (metrics.tickets_sold, metrics.sold_out) = match rules.show_capacity {
            Some(capacity) => (metrics.lucky_tickets.min(capacity), metrics.lucky_tickets >= capacity),
            None => (metrics.lucky_tickets, false),
        };
        metrics
    }

    pub fn average_lucky_wait(&self) -> f64 {
        ratio(self.lucky_wait_total, self.lucky_customers as f64)
    }

    pub fn average_unlucky_wait(&self) -> f64 {
        ratio(self.unlucky_wait_total, self.unlucky_customers as f64)
    }

    /// Share of the open period the server spent on lucky customers.
    pub fn utilization(&self) -> f64 {
        ratio(self.lucky_service_time, self.open_minutes)
    }

    /// Time-average number of tickets waiting in line over the open period.
    pub fn average_queue_length(&self) -> f64 {
        ratio(self.ticket_wait_total, self.open_minutes)
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Day metrics averaged across the days of one replication.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AveragedMetrics {
    pub days: usize,
    /// Average lucky tickets per day.
    pub lucky_count: f64,
    pub unlucky_count: f64,
    pub lucky_customers: f64,
    pub unlucky_customers: f64,
    pub average_lucky_wait: f64,
    pub average_unlucky_wait: f64,
    pub utilization: f64,
    pub average_queue_length: f64,
    pub average_arrivals: f64,
    pub sold_out_days: usize,
    /// Longest line seen on any day.
    pub peak_queue_length: usize,
}

impl AveragedMetrics {
    /// Each day's derived metrics are computed first and then averaged with equal weight per day.
    pub fn from_days<'a>(days: impl IntoIterator<Item = &'a DayMetrics>) -> Self {
        let mut averaged = Self::default();
        for day in days {
            averaged.days += 1;
            averaged.lucky_count += f64::from(day.lucky_tickets);
            averaged.unlucky_count += f64::from(day.unlucky_tickets);
            averaged.lucky_customers += day.lucky_customers as f64;
            averaged.unlucky_customers += day.unlucky_customers as f64;
            averaged.average_lucky_wait += day.average_lucky_wait();
            averaged.average_unlucky_wait += day.average_unlucky_wait();
            averaged.utilization += day.utilization();
            averaged.average_queue_length += day.average_queue_length();
            averaged.average_arrivals += day.arrivals as f64;
            averaged.sold_out_days += usize::from(day.sold_out);
            averaged.peak_queue_length = averaged.peak_queue_length.max(day.peak_queue_length);
        }

        let days = averaged.days as f64;
        for total in [
            &mut averaged.lucky_count,
            &mut averaged.unlucky_count,
            &mut averaged.lucky_customers,
            &mut averaged.unlucky_customers,
            &mut averaged.average_lucky_wait,
            &mut averaged.average_unlucky_wait,
            &mut averaged.utilization,
            &mut averaged.average_queue_length,
            &mut averaged.average_arrivals,
        ] {
            *total = ratio(*total, days);
        }
        averaged
    }
}

impl Display for AveragedMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "days simulated:          {}", self.days)?;
        writeln!(f, "lucky tickets / day:     {:.2}", self.lucky_count)?;
        writeln!(f, "unlucky tickets / day:   {:.2}", self.unlucky_count)?;
        writeln!(f, "avg wait (lucky):        {:.2} min", self.average_lucky_wait)?;
        writeln!(f, "avg wait (unlucky):      {:.2} min", self.average_unlucky_wait)?;
        writeln!(f, "server utilization:      {:.2}%", self.utilization * 100.0)?;
        writeln!(f, "avg queue length:        {:.3} tickets", self.average_queue_length)?;
        writeln!(f, "arrivals / day:          {:.2}", self.average_arrivals)?;
        writeln!(f, "peak line:               {}", self.peak_queue_length)?;
        write!(f, "sold-out days:           {}", self.sold_out_days)
    }
}
