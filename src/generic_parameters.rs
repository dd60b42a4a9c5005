use std::fmt::Debug;

/// The generic type used for a simulation's clock.
///
/// This trait is a superset of [`Ord`] and [`Debug`] with no additional requirements or functionality.
///
/// Your implementation of this trait should use the [`Ord`] trait to account for not only the overall sequencing of
/// events, but also any tie breaking that may be necessary in your use case. Events execute in ascending order of
/// execution time, i.e. if `A.cmp(&B) == std::cmp::Ordering::Less` then event A will execute before event B. Ties that
/// you don't specify how to break will be resolved by the order in which events are enqueued.
///
/// The booth scheduler uses [`EventTime`], which orders first by clock minutes and then by event kind so that a
/// departure frees the server before an arrival at the same instant is considered.
///
/// [`EventTime`]: crate::booth::EventTime
pub trait SimTime: Ord + Debug {}

/// The generic type used for a simulation's overall state.
///
/// This trait has only one method, which provides a way for [`serial::Simulation::run()`] to ask whether it should
/// wrap up event execution. The default implementation always answers "no," and so a simulation running with the
/// default will continue until the event queue becomes empty. The booth relies on exactly that: every day is bounded
/// by its precomputed arrival plan, so draining the queue is the natural end of the day.
///
/// [`serial::Simulation::run()`]: crate::serial::Simulation::run
pub trait SimState<Time>
where
    Time: SimTime,
{
    /// Reports whether the simulation has run to completion. Invoked before popping each event off the queue: `true`
    /// stops [`run()`], `false` continues with the next scheduled event.
    ///
    /// [`run()`]: crate::serial::Simulation::run
    // expect that other implementations will make use of the
    // argument even though this one doesn't
    #[allow(unused_variables)]
    fn is_complete(&self, current_time: &Time) -> bool {
        false
    }
}
