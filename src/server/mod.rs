//! The event loop and the state it owns.

pub mod channel;
pub mod linger;
pub mod listener;
pub mod scheduler;

pub use listener::Server;
pub use scheduler::DeferredScheduler;
