mod events;
mod simulation;

pub use events::event_traits::Event;
pub use events::EventQueue;
pub use simulation::Simulation;
