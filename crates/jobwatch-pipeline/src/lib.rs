//! The polling pipeline: filter, dedup-and-publish, rotation and the
//! scheduler loop that ties them together. Everything here talks to the
//! outside world through the port traits in `jobwatch_core::ports`.

pub mod filter;
pub mod gigs;
pub mod publish;
pub mod rotation;
pub mod scheduler;

pub use filter::{evaluate, filter, Rejection};
pub use gigs::publish_gigs;
pub use publish::{publish, PublishOutcome};
pub use rotation::RotationState;
pub use scheduler::{CategoryReport, RotationReport, Scheduler, Slot};
