//! Housekeeping workflows
//!
//! [`Housekeeper`] composes the registry and hub operations into the two
//! user-facing workflows: retagging an image and pruning expired preview
//! tags. Every remote call is awaited before the next one is issued and none
//! is retried.

pub mod prune;
pub mod retag;

pub use prune::{MAX_PREVIEW_AGE_HOURS, PruneReport, SkippedRepository, age_in_hours, is_expired};
pub use retag::{RetagOutcome, image_reference, reference_separator};

use crate::config::HousekeepingConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::registry::RegistryClient;

pub struct Housekeeper {
    client: RegistryClient,
    config: HousekeepingConfig,
    output: Logger,
}

impl Housekeeper {
    pub fn new(config: HousekeepingConfig, output: Logger) -> Result<Self> {
        config.validate()?;
        let client = RegistryClient::from_config(&config, output.clone())?;
        Ok(Self::with_client(client, config, output))
    }

    pub fn with_client(client: RegistryClient, config: HousekeepingConfig, output: Logger) -> Self {
        Self {
            client,
            config,
            output,
        }
    }

    pub fn config(&self) -> &HousekeepingConfig {
        &self.config
    }
}
