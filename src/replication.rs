//! Runs days and replications end to end: arrivals, profiles, the booth, then statistics.

use crate::arrivals::{ArrivalPlan, ArrivalProcess};
use crate::booth::{run_day, EventLog, SchedulerVariant};
use crate::config::BoothConfig;
use crate::random::RandomStream;
use crate::service::{ServiceProfile, ServiceProfileGenerator};
use crate::stats::{reconstruct_timelines, AveragedMetrics, CustomerTimeline, DayMetrics, ShowRules};

use std::fmt::{Display, Formatter};
use tracing::{debug, info, warn};

/// Everything one simulated day produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOutcome {
    pub plan: ArrivalPlan,
    pub profiles: Vec<ServiceProfile>,
    pub log: EventLog,
    pub timelines: Vec<CustomerTimeline>,
    pub metrics: DayMetrics,
}

/// Result of one replication: the metrics of each day and their average.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationReport {
    pub seed: u64,
    pub days: Vec<DayMetrics>,
    pub averaged: AveragedMetrics,
}

impl Display for ReplicationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "seed {}", self.seed)?;
        write!(f, "{}", self.averaged)
    }
}

/// Runs replications of a validated [`BoothConfig`].
///
/// The driver owns only read-only state, so replications can borrow it from several threads at once.
#[derive(Debug)]
pub struct ReplicationDriver {
    config: BoothConfig,
    arrivals: Box<dyn ArrivalProcess>,
    profiles: ServiceProfileGenerator,
}

impl ReplicationDriver {
    /// # Errors
    ///
    /// [`Error::Config`] if the configuration does not validate.
    ///
    /// [`Error::Config`]: crate::Error::Config
    pub fn new(config: BoothConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            arrivals: config.arrival_process()?,
            profiles: config.profile_generator()?,
            config,
        })
    }

    pub fn config(&self) -> &BoothConfig {
        &self.config
    }

    /// Simulate one day on `stream`: draw the arrival plan, then every customer's profile, then run the booth.
    ///
    /// # Errors
    ///
    /// Any scheduler or reconstruction failure. These are defects, never data conditions.
    pub fn simulate_day(&self, stream: &mut RandomStream) -> crate::Result<DayOutcome> {
        simulate_day(
            self.arrivals.as_ref(),
            &self.profiles,
            self.config.scheduler,
            self.config.show_rules(),
            stream,
        )
    }

    /// Run `days_per_replication` days back to back on one stream seeded with `seed`.
    pub fn run_replication(&self, seed: u64) -> crate::Result<ReplicationReport> {
        let mut stream = RandomStream::with_parameters(self.config.generator, seed)?;
        info!(seed, days = self.config.days_per_replication, "replication started");

        let mut days = Vec::with_capacity(self.config.days_per_replication as usize);
        for day in 1..=self.config.days_per_replication {
            let outcome = self.simulate_day(&mut stream)?;
            debug!(
                seed,
                day,
                arrivals = outcome.metrics.arrivals,
                lucky = outcome.metrics.lucky_tickets,
                unlucky = outcome.metrics.unlucky_tickets,
                utilization = outcome.metrics.utilization(),
                "day simulated"
            );
            if outcome.metrics.sold_out {
                warn!(seed, day, tickets = outcome.metrics.tickets_sold, "show sold out");
            }
            days.push(outcome.metrics);
        }

        let averaged = AveragedMetrics::from_days(&days);
        info!(seed, utilization = averaged.utilization, draws = stream.draws(), "replication finished");
        Ok(ReplicationReport { seed, days, averaged })
    }

    /// Run every configured seed. Results come back in seed order whether or not they ran in parallel.
    ///
    /// Each seed owns its stream and shares nothing mutable with the others, so an error in one replication is
    /// reported in that seed's slot and never touches the rest. A validated configuration does not normally fail;
    /// an `Err` here means a scheduler defect surfaced for that seed.
    pub fn run(&self) -> Vec<(u64, crate::Result<ReplicationReport>)> {
        self.run_each(|seed| self.run_replication(seed))
    }

    fn run_each<F>(&self, replicate: F) -> Vec<(u64, crate::Result<ReplicationReport>)>
    where
        F: Fn(u64) -> crate::Result<ReplicationReport> + Sync,
    {
        let seeds = self.config.seeds.seeds();
        let replicate = &replicate;
        let results: Vec<_> = if self.config.parallel {
            std::thread::scope(|scope| {
                let handles: Vec<_> = seeds
                    .iter()
                    .map(|&seed| scope.spawn(move || replicate(seed)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            })
        } else {
            seeds.iter().map(|&seed| replicate(seed)).collect()
        };

        seeds
            .into_iter()
            .zip(results)
            .inspect(|(seed, result)| {
                if let Err(error) = result {
                    warn!(seed, %error, "replication failed");
                }
            })
            .collect()
    }
}

/// One day with explicitly provided parts, for callers that do not go through a [`ReplicationDriver`].
pub fn simulate_day(
    arrivals: &dyn ArrivalProcess,
    profiles: &ServiceProfileGenerator,
    variant: SchedulerVariant,
    rules: ShowRules,
    stream: &mut RandomStream,
) -> crate::Result<DayOutcome> {
    let plan = arrivals.generate(stream);
    let profiles = profiles.profiles_for(plan.len(), stream);
    let day = run_day(&plan, &profiles, variant)?;
    let timelines = reconstruct_timelines(&day.log, &profiles)?;
    let metrics = DayMetrics::aggregate(&timelines, plan.hourly_counts(), rules);
    debug_assert_eq!(day.peak_line, metrics.peak_queue_length, "line length read back from the log disagrees");

    Ok(DayOutcome {
        plan,
        profiles,
        log: day.log,
        timelines,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedPlan;

    fn small_config() -> BoothConfig {
        BoothConfig {
            horizon_minutes: 120.0,
            closing_cutoff: 120.0,
            days_per_replication: 3,
            seeds: SeedPlan::Explicit { seeds: vec![7, 541, 12] },
            ..BoothConfig::default()
        }
    }

    #[test]
    fn results_come_back_in_seed_order() {
        let driver = ReplicationDriver::new(small_config()).unwrap();
        let seeds: Vec<u64> = driver.run().into_iter().map(|(seed, _)| seed).collect();
        assert_eq!(vec![7, 541, 12], seeds);
    }

    #[test]
    fn replication_reports_every_day() {
        let driver = ReplicationDriver::new(small_config()).unwrap();
        let report = driver.run_replication(541).unwrap();
        assert_eq!(3, report.days.len());
        assert_eq!(3, report.averaged.days);
        assert!(report.to_string().starts_with("seed 541\n"));
    }

    #[test]
    fn failing_seed_is_reported_alone() {
        for parallel in [true, false] {
            let driver = ReplicationDriver::new(BoothConfig {
                parallel,
                ..small_config()
            })
            .unwrap();
            let results = driver.run_each(|seed| {
                if seed == 541 {
                    Err(crate::InvariantViolation::MissingDeparture(crate::booth::CustomerId(1)).into())
                } else {
                    driver.run_replication(seed)
                }
            });

            let seeds: Vec<u64> = results.iter().map(|(seed, _)| *seed).collect();
            assert_eq!(vec![7, 541, 12], seeds);
            assert!(matches!(results[1].1, Err(crate::Error::Invariant(_))));
            for (seed, result) in [&results[0], &results[2]] {
                assert_eq!(&driver.run_replication(*seed).unwrap(), result.as_ref().unwrap());
            }
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = BoothConfig {
            days_per_replication: 0,
            ..small_config()
        };
        assert!(matches!(
            ReplicationDriver::new(config),
            Err(crate::Error::Config(crate::ConfigError::ZeroDays))
        ));
    }
}
