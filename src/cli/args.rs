//! Command-line argument parsing

use crate::config::{
    DEFAULT_AUTH_URL, DEFAULT_HUB_URL, DEFAULT_ORGANIZATION, DEFAULT_REGISTRY_URL,
    DEFAULT_TIMEOUT_SECS, Endpoints, HousekeepingConfig,
};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "docker-housekeeping")]
#[command(about = "A tool for various docker housekeeping tasks for the NRE Labs platform")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Quiet mode
    #[arg(
        long = "quiet",
        short = 'q',
        global = true,
        conflicts_with = "verbose",
        help = "Only print errors and the final result"
    )]
    pub quiet: bool,

    /// Timeout in seconds for each HTTP request
    #[arg(
        long = "timeout",
        short = 't',
        global = true,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout for each HTTP request in seconds"
    )]
    pub timeout: u64,

    #[arg(
        long = "organization",
        global = true,
        default_value = DEFAULT_ORGANIZATION,
        help = "Organization whose repositories are pruned"
    )]
    pub organization: String,

    #[arg(
        long = "auth-url",
        global = true,
        env = "DOCKERHUB_AUTH_URL",
        default_value = DEFAULT_AUTH_URL,
        help = "Base URL of the registry token service"
    )]
    pub auth_url: String,

    #[arg(
        long = "registry-url",
        global = true,
        env = "DOCKERHUB_REGISTRY_URL",
        default_value = DEFAULT_REGISTRY_URL,
        help = "Base URL of the registry API"
    )]
    pub registry_url: String,

    #[arg(
        long = "hub-url",
        global = true,
        env = "DOCKERHUB_HUB_URL",
        default_value = DEFAULT_HUB_URL,
        help = "Base URL of the hub API"
    )]
    pub hub_url: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Copy an existing tag to a new tag (useful for re-tagging images for preview purposes)
    Retag {
        #[arg(long = "repository")]
        repository: String,

        #[arg(long = "oldTag")]
        old_tag: String,

        #[arg(long = "newTag")]
        new_tag: String,
    },

    /// Prune preview tags from docker hub
    #[command(name = "prune-preview-tags")]
    PrunePreviewTags {
        #[arg(long = "dry-run", short = 'n', help = "Report expired tags without deleting them")]
        dry_run: bool,
    },
}

impl Args {
    /// Build the run configuration from the parsed flags
    pub fn to_config(&self) -> Result<HousekeepingConfig> {
        let endpoints = Endpoints::new(&self.auth_url, &self.registry_url, &self.hub_url)?;
        let dry_run = matches!(self.command, Command::PrunePreviewTags { dry_run: true });

        let config = HousekeepingConfig::default()
            .with_endpoints(endpoints)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_organization(self.organization.clone())
            .with_dry_run(dry_run);
        config.validate()?;

        Ok(config)
    }
}
