use super::{EventQueue, SimState, SimTime};
use std::fmt::Debug;

/// A behavior or state change that occurs within a simulation.
///
/// This trait has one required method that describes what happens when the implementing type executes. It is generic
/// over the types used to represent simulation state and clock time so the same engine can drive the booth scheduler
/// and the small fixtures used in tests.
///
/// Requiring implementors to be [`Debug`] enables printing the full contents of an [`EventQueue`] when necessary.
pub trait Event<State, Time>: Debug
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Update the simulation according to the specific type of event. The simulation invokes this method during
    /// [`Simulation::run()`] for each scheduled event in sequence, with exclusive access to both the simulation's
    /// current state and the event queue.
    ///
    /// The simulation's clock time, accessible on the `event_queue` parameter, is updated before this method runs.
    ///
    /// # Errors
    ///
    /// Any error returned here stops [`Simulation::run()`] and is handed back to its caller unchanged. Booth events use
    /// this to surface [`Error::Invariant`] when the server state contradicts the event being processed.
    ///
    /// [`Simulation::run()`]: crate::serial::Simulation::run
    /// [`Error::Invariant`]: crate::Error::Invariant
    fn execute(&mut self, simulation_state: &mut State, event_queue: &mut EventQueue<State, Time>) -> crate::Result;
}
