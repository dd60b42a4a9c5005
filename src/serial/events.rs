mod scheduled;
pub(super) mod event_traits;

use crate::{SimState, SimTime};
use scheduled::ScheduledEvent;
use event_traits::Event;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Priority queue of scheduled events.
///
/// Events will execute in ascending order of execution time, with ties broken by the order in which they were pushed
/// onto the queue. This tiebreaker is in addition to any built-in to the implementation of [`SimTime`] used for the
/// clock as a way to stabilize the observed order of execution.
///
/// An [`EventQueue`] supports scheduling new events, but does not publicly support popping; popping events from the
/// queue only occurs during [`Simulation::run()`].
///
/// Scheduling compares the desired execution time against the current clock time. Attempting to schedule an event for
/// a time that is already past results in an [`Error::BackInTime`] without modifying the queue.
///
/// [`Simulation::run()`]: crate::serial::Simulation::run
/// [`Error::BackInTime`]: crate::Error::BackInTime
#[derive(Debug)]
pub struct EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    events: BinaryHeap<Reverse<ScheduledEvent<State, Time>>>,
    last_execution_time: Time,
    events_added: usize,
}

impl<State, Time> EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Construct a new [`EventQueue`] with no scheduled events and a clock initialized to the provided time.
    pub(crate) fn new(start_time: Time) -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: start_time,
            events_added: 0,
        }
    }

    /// Schedule the provided event at the specified time.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::BackInTime`] to indicate the likely
    /// presence of a logical bug at the call site, with no modifications to the queue.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule<EventType>(&mut self, event: EventType, time: Time) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        self.schedule_from_boxed(Box::new(event), time)
    }

    /// Schedule the provided event at the specified time.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::BackInTime`] to indicate the likely
    /// presence of a logical bug at the call site, with no modifications to the queue.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule_from_boxed(&mut self, event: Box<dyn Event<State, Time>>, time: Time) -> crate::Result {
        if time < self.last_execution_time {
            return Err(crate::Error::BackInTime);
        }

        let count = self.increment_event_count();
        self.events.push(Reverse(ScheduledEvent {
            execution_time: time,
            event,
            insertion_sequence: count,
        }));
        Ok(())
    }

    /// Helper function to make sure incrementing the internal count of added events occurs the same way across all
    /// scheduling methods.
    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Crate-internal function to pop an event from the queue. Updates the current clock time to match the execution
    /// time of the popped event.
    pub(crate) fn next(&mut self) -> Option<Box<dyn Event<State, Time>>> {
        let Reverse(scheduled) = self.events.pop()?;
        self.last_execution_time = scheduled.execution_time;
        Some(scheduled.event)
    }

    /// Get a shared reference to the simulation's current clock time.
    pub fn current_time(&self) -> &Time {
        &self.last_execution_time
    }

    /// Number of events still waiting to execute.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<State, Time> std::fmt::Display for EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} scheduled events at current time {:?}",
            self.events.len(),
            self.last_execution_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl SimTime for u32 {}

    #[derive(Debug, Default)]
    struct Order(Vec<&'static str>);

    impl SimState<u32> for Order {}

    #[derive(Debug)]
    struct Tag(&'static str);

    impl Event<Order, u32> for Tag {
        fn execute(&mut self, state: &mut Order, _: &mut EventQueue<Order, u32>) -> crate::Result {
            state.0.push(self.0);
            Ok(())
        }
    }

    #[test]
    fn equal_times_pop_in_insertion_order() {
        let mut queue = EventQueue::new(0);
        queue.schedule(Tag("first"), 5).unwrap();
        queue.schedule(Tag("early"), 1).unwrap();
        queue.schedule(Tag("second"), 5).unwrap();

        let mut order = Order::default();
        while let Some(mut event) = queue.next() {
            event.execute(&mut order, &mut queue).unwrap();
        }

        assert_eq!(vec!["early", "first", "second"], order.0, "ties were not broken by insertion order");
        assert_eq!(5, *queue.current_time(), "clock should rest on the last executed event");
    }

    #[test]
    fn scheduling_in_the_past_is_rejected() {
        let mut queue: EventQueue<Order, u32> = EventQueue::new(10);
        let result = queue.schedule(Tag("late"), 9);
        assert!(matches!(result, Err(crate::Error::BackInTime)));
        assert!(queue.is_empty(), "rejected event should not be queued");

        queue.schedule(Tag("now"), 10).unwrap();
        assert_eq!(1, queue.len());
    }
}
