use super::Event;
use crate::{SimState, SimTime};
use std::cmp::Ordering;

/// An event waiting in the queue, paired with its sort key.
///
/// Ordering compares the execution time first and the insertion sequence second, so the [`SimTime`] implementation
/// keeps full control of sequencing and the queue only steps in to break exact ties.
#[derive(Debug)]
pub(super) struct ScheduledEvent<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    pub execution_time: Time,
    pub event: Box<dyn Event<State, Time>>,
    pub insertion_sequence: usize,
}

impl<State, Time> ScheduledEvent<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn sort_key(&self) -> (&Time, usize) {
        (&self.execution_time, self.insertion_sequence)
    }
}

impl<State, Time> PartialEq for ScheduledEvent<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl<State, Time> Eq for ScheduledEvent<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
}

impl<State, Time> PartialOrd for ScheduledEvent<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<State, Time> Ord for ScheduledEvent<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
