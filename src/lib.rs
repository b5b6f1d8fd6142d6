//! Docker Housekeeping Library
//!
//! Retagging images on Docker Hub without moving layers, and pruning expired
//! preview tags across an organization's repositories.

pub mod cli;
pub mod config;
pub mod error;
pub mod housekeeping;
pub mod logging;
pub mod registry;

pub use config::{Credentials, Endpoints, HousekeepingConfig};
pub use error::{Cause, HousekeepingError, Operation, Result};
pub use housekeeping::{Housekeeper, PruneReport, RetagOutcome};
pub use logging::Logger;
