//! What each customer asks of the booth: how many tickets, how they pay, and how long that takes.

use crate::error::ConfigError;
use crate::random::RandomStream;
use crate::variates::{round_to_hundredths, Categorical, Uniform, Variate, PROBABILITY_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Card => write!(f, "card"),
        }
    }
}

/// A payment method, how often customers pick it, and the service-time range it implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentClass {
    pub method: PaymentMethod,
    pub probability: f64,
    pub min_minutes: f64,
    pub max_minutes: f64,
}

impl PaymentClass {
    pub const fn new(method: PaymentMethod, probability: f64, min_minutes: f64, max_minutes: f64) -> Self {
        Self {
            method,
            probability,
            min_minutes,
            max_minutes,
        }
    }

    /// Cash takes 2-7 minutes for a quarter of customers; card takes 2-4 minutes for the rest.
    pub fn cinema() -> Vec<PaymentClass> {
        vec![
            PaymentClass::new(PaymentMethod::Cash, 0.25, 2.0, 7.0),
            PaymentClass::new(PaymentMethod::Card, 0.75, 2.0, 4.0),
        ]
    }
}

/// Ticket count and the probability a customer asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TicketOption {
    pub count: u32,
    pub probability: f64,
}

impl TicketOption {
    pub const fn new(count: u32, probability: f64) -> Self {
        Self { count, probability }
    }

    pub fn cinema() -> Vec<TicketOption> {
        vec![
            TicketOption::new(1, 0.30),
            TicketOption::new(2, 0.40),
            TicketOption::new(3, 0.20),
            TicketOption::new(4, 0.10),
        ]
    }
}

/// The service request of one customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceProfile {
    pub tickets: u32,
    pub payment: PaymentMethod,
    /// Minutes at the counter.
    pub duration: f64,
}

/// Draws a [`ServiceProfile`] per customer.
///
/// The per-customer order of draws is fixed: ticket count, then payment method, then duration. Every other sampler
/// shares the same stream, so changing that order changes every result downstream.
#[derive(Debug, Clone)]
pub struct ServiceProfileGenerator {
    tickets: Categorical<u32>,
    payments: Vec<(PaymentClass, f64)>,
    fallback: PaymentClass,
}

impl ServiceProfileGenerator {
    /// # Errors
    ///
    /// Rejects empty tables, probabilities that do not sum to 1, ticket counts of 0, and service bounds that are not
    /// `0 < min <= max`.
    pub fn new(tickets: &[TicketOption], payments: &[PaymentClass]) -> Result<Self, ConfigError> {
        if tickets.iter().any(|option| option.count == 0) {
            return Err(ConfigError::ZeroTickets);
        }
        let table: Vec<(u32, f64)> = tickets.iter().map(|option| (option.count, option.probability)).collect();
        let tickets = Categorical::from_probabilities("ticket", &table)?;

        let Some(&fallback) = payments.last() else {
            return Err(ConfigError::EmptyTable("payment"));
        };
        let mut cumulative = 0.0;
        let mut classes = Vec::with_capacity(payments.len());
        for class in payments {
            if !(0.0..=1.0).contains(&class.probability) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    what: "payment",
                    value: class.probability,
                });
            }
            let (low, high) = (class.min_minutes, class.max_minutes);
            // a duration that rounds to zero would put a departure on top of its own service start
            if !(low.is_finite() && high.is_finite() && round_to_hundredths(low) > 0.0 && low <= high) {
                return Err(ConfigError::InvalidServiceBounds { low, high });
            }
            cumulative += class.probability;
            classes.push((*class, cumulative));
        }
        if (cumulative - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ConfigError::ProbabilitiesDoNotSumToOne {
                what: "payment",
                total: cumulative,
            });
        }

        Ok(Self {
            tickets,
            payments: classes,
            fallback,
        })
    }

    /// Draw one customer's profile.
    pub fn next_profile(&self, stream: &mut RandomStream) -> ServiceProfile {
        let tickets = self.tickets.sample(stream);

        // a draw strictly below a class's cumulative bound selects it; with the cinema table that is `u < 0.25` for cash
        let u = stream.next_uniform();
        let class = self
            .payments
            .iter()
            .find(|(_, bound)| u < *bound)
            .map_or(self.fallback, |(class, _)| *class);
        let duration = Uniform::new(class.min_minutes, class.max_minutes).sample(stream);

        ServiceProfile {
            tickets,
            payment: class.method,
            duration,
        }
    }

    /// Profiles for customers 1 through `customers`, in order.
    pub fn profiles_for(&self, customers: usize, stream: &mut RandomStream) -> Vec<ServiceProfile> {
        (0..customers).map(|_| self.next_profile(stream)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cinema() -> ServiceProfileGenerator {
        ServiceProfileGenerator::new(&TicketOption::cinema(), &PaymentClass::cinema()).unwrap()
    }

    #[test]
    fn each_profile_draws_three_uniforms_in_order() {
        let generator = cinema();
        let mut stream = RandomStream::new(541);
        let profile = generator.next_profile(&mut stream);

        // 0.1738 -> 1 ticket, 0.0419 -> cash, 0.2172 -> 2 + 5 * 0.2172
        assert_eq!(
            ServiceProfile {
                tickets: 1,
                payment: PaymentMethod::Cash,
                duration: 3.09
            },
            profile
        );
        assert_eq!(3, stream.draws());
    }

    #[test]
    fn durations_respect_payment_bounds() {
        let generator = cinema();
        let mut stream = RandomStream::new(99);
        for profile in generator.profiles_for(500, &mut stream) {
            assert!((1..=4).contains(&profile.tickets));
            match profile.payment {
                PaymentMethod::Cash => assert!((2.0..=7.0).contains(&profile.duration)),
                PaymentMethod::Card => assert!((2.0..=4.0).contains(&profile.duration)),
            }
        }
        assert_eq!(1500, stream.draws());
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(matches!(
            ServiceProfileGenerator::new(&[TicketOption::new(0, 1.0)], &PaymentClass::cinema()),
            Err(ConfigError::ZeroTickets)
        ));
        assert!(matches!(
            ServiceProfileGenerator::new(&TicketOption::cinema(), &[]),
            Err(ConfigError::EmptyTable("payment"))
        ));
        assert!(matches!(
            ServiceProfileGenerator::new(
                &TicketOption::cinema(),
                &[PaymentClass::new(PaymentMethod::Cash, 1.0, 0.0, 7.0)]
            ),
            Err(ConfigError::InvalidServiceBounds { .. })
        ));
        assert!(matches!(
            ServiceProfileGenerator::new(
                &TicketOption::cinema(),
                &[PaymentClass::new(PaymentMethod::Cash, 0.5, 2.0, 7.0)]
            ),
            Err(ConfigError::ProbabilitiesDoNotSumToOne { what: "payment", .. })
        ));
    }
}
