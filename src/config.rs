//! Run configuration, read from JSON and validated before anything is simulated.

use crate::arrivals::{
    ArrivalProcess, FirstArrival, HourlyPoissonArrivals, HourlyRateTable, RateWindow, RenewalArrivals,
};
use crate::booth::SchedulerVariant;
use crate::error::ConfigError;
use crate::random::LcgParameters;
use crate::service::{PaymentClass, ServiceProfileGenerator, TicketOption};
use crate::stats::ShowRules;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How arrival times are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ArrivalModel {
    /// Exponential gaps with the given mean, in minutes.
    Renewal { mean_interarrival: f64 },
    /// Poisson counts per hour from a table of hourly rates.
    HourlyPoisson {
        #[serde(default = "HourlyRateTable::cinema")]
        rates: Vec<RateWindow>,
    },
}

impl Default for ArrivalModel {
    fn default() -> Self {
        Self::Renewal {
            mean_interarrival: 8.0,
        }
    }
}

/// Which seeds to run, one replication each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SeedPlan {
    Explicit { seeds: Vec<u64> },
    /// `count` seeds starting at `first`, each one greater than the last.
    Consecutive { first: u64, count: u32 },
}

impl SeedPlan {
    pub fn seeds(&self) -> Vec<u64> {
        match self {
            Self::Explicit { seeds } => seeds.clone(),
            Self::Consecutive { first, count } => {
                (0..u64::from(*count)).map(|offset| first.wrapping_add(offset)).collect()
            },
        }
    }
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self::Consecutive { first: 541, count: 4 }
    }
}

/// Everything needed to run a set of replications.
///
/// Missing fields take the cinema defaults, so `{}` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    pub generator: LcgParameters,
    pub arrivals: ArrivalModel,
    pub first_arrival: FirstArrival,
    /// Clock hour the booth opens, used to look up hourly rates.
    pub opening_hour: u32,
    pub horizon_minutes: f64,
    /// Show time in minutes from opening. Customers still at the booth then are unlucky.
    pub closing_cutoff: f64,
    pub tickets: Vec<TicketOption>,
    pub payments: Vec<PaymentClass>,
    pub scheduler: SchedulerVariant,
    pub show_capacity: Option<u32>,
    pub days_per_replication: u32,
    pub seeds: SeedPlan,
    pub parallel: bool,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            generator: LcgParameters::default(),
            arrivals: ArrivalModel::default(),
            first_arrival: FirstArrival::default(),
            opening_hour: 10,
            horizon_minutes: 510.0,
            closing_cutoff: 510.0,
            tickets: TicketOption::cinema(),
            payments: PaymentClass::cinema(),
            scheduler: SchedulerVariant::default(),
            show_capacity: Some(250),
            days_per_replication: 7,
            seeds: SeedPlan::default(),
            parallel: true,
        }
    }
}

impl BoothConfig {
    /// Parse a JSON document and validate it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, otherwise whatever [`validate()`] reports.
    ///
    /// [`validate()`]: BoothConfig::validate
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every parameter by building the samplers it feeds, plus the replication-level settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.arrival_process()?;
        self.profile_generator()?;

        if !(self.closing_cutoff.is_finite() && self.closing_cutoff >= 0.0) {
            return Err(ConfigError::InvalidCutoff(self.closing_cutoff));
        }
        if self.days_per_replication == 0 {
            return Err(ConfigError::ZeroDays);
        }

        let seeds = self.seeds.seeds();
        if seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        // seeds are reduced modulo the generator's modulus, so two seeds congruent mod m replay the same stream
        let mut seen = HashSet::with_capacity(seeds.len());
        for seed in seeds {
            if !seen.insert(seed % self.generator.modulus) {
                return Err(ConfigError::DuplicateSeed(seed));
            }
        }
        Ok(())
    }

    /// Build the configured arrival process.
    pub fn arrival_process(&self) -> Result<Box<dyn ArrivalProcess>, ConfigError> {
        Ok(match &self.arrivals {
            ArrivalModel::Renewal { mean_interarrival } => Box::new(RenewalArrivals::new(
                *mean_interarrival,
                self.horizon_minutes,
                self.first_arrival,
            )?),
            ArrivalModel::HourlyPoisson { rates } => {
                let table = HourlyRateTable::new(rates.clone())?;
                Box::new(HourlyPoissonArrivals::new(&table, self.opening_hour, self.horizon_minutes)?)
            },
        })
    }

    pub fn profile_generator(&self) -> Result<ServiceProfileGenerator, ConfigError> {
        ServiceProfileGenerator::new(&self.tickets, &self.payments)
    }

    pub fn show_rules(&self) -> ShowRules {
        ShowRules {
            closing_cutoff: self.closing_cutoff,
            show_capacity: self.show_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BoothConfig::default();
        config.validate().unwrap();
        assert_eq!(vec![541, 542, 543, 544], config.seeds.seeds());
    }

    #[test]
    fn seeds_congruent_modulo_the_generator_collide() {
        let config = BoothConfig {
            seeds: SeedPlan::Explicit { seeds: vec![541, 541 + 1289] },
            ..BoothConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateSeed(1830))));
    }

    #[test]
    fn poisson_model_defaults_to_cinema_rates() {
        let config = BoothConfig::from_json_str(r#"{"arrivals": {"model": "hourly_poisson"}}"#).unwrap();
        assert_eq!(
            ArrivalModel::HourlyPoisson {
                rates: HourlyRateTable::cinema()
            },
            config.arrivals
        );
    }
}
