use super::{Event, EventQueue};
use crate::{SimState, SimTime};

use std::fmt::Formatter;

/// Contains the event queue and other state belonging to a simulation.
///
/// A [`Simulation`] owns both its state and its event queue. Callers schedule the opening events through it and take
/// the state back with [`into_state()`] once the run is over, for example to move the finished event log out.
///
/// The expected workflow for a Simulation is:
///
/// 1. Initialize a struct that implements [`SimState`].
/// 2. Pass this struct and the start time to [`new()`].
/// 3. Schedule at least one initial event.
/// 4. Call [`run()`]. Handle any error it might return.
/// 5. Use [`into_state()`] to finish processing the results.
///
/// [`new()`]: Simulation::new
/// [`run()`]: Simulation::run
/// [`into_state()`]: Simulation::into_state
#[derive(Debug)]
pub struct Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// A priority queue of events that have been scheduled to execute, ordered ascending by execution time.
    event_queue: EventQueue<State, Time>,
    /// The current shared state of the Simulation. Exclusive access will be granted to each event that executes.
    state: State,
}

impl<State, Time> Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Initialize a Simulation instance with the provided starting state and an event queue with clock set to the
    /// provided starting time.
    pub fn new(initial_state: State, start_time: Time) -> Self {
        Self {
            event_queue: EventQueue::new(start_time),
            state: initial_state,
        }
    }

    /// Execute events from the priority queue, one at a time, in ascending order by execution time.
    ///
    /// Follows this loop:
    ///
    /// 1. Does [`state.is_complete()`] return true? If so, return `Ok(())`.
    /// 2. Attempt to pop the next event from the queue. If there isn't one, return `Ok(())`.
    /// 3. Pass exclusive references to the state and event queue to [`event.execute()`].
    ///     1. If an error is returned, forward it as-is to the caller.
    ///     2. Otherwise, go back to step 1.
    ///
    /// # Errors
    ///
    /// [`Error::BackInTime`] means an event tried to schedule another at some point in the simulation's past, and
    /// [`Error::Invariant`] means an event found the state inconsistent with itself. Both indicate a logical bug rather
    /// than a data condition.
    ///
    /// [`state.is_complete()`]: SimState::is_complete
    /// [`event.execute()`]: Event::execute
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    /// [`Error::Invariant`]: crate::Error::Invariant
    pub fn run(&mut self) -> crate::Result {
        while !self.state.is_complete(self.event_queue.current_time()) {
            let Some(mut next_event) = self.event_queue.next() else {
                break;
            };
            next_event.execute(&mut self.state, &mut self.event_queue)?;
        }
        Ok(())
    }

    /// Schedule the provided event at the specified time.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::BackInTime`] with no modifications
    /// to the queue.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule<EventType>(&mut self, event: EventType, time: Time) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        self.event_queue.schedule(event, time)
    }

    /// Get a shared reference to the event queue.
    pub fn event_queue(&self) -> &EventQueue<State, Time> {
        &self.event_queue
    }

    /// Consume the simulation, keeping only its state.
    pub fn into_state(self) -> State {
        self.state
    }
}

impl<State, Time> std::fmt::Display for Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {:?}", self.event_queue.current_time())
    }
}
