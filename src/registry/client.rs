// RegistryClient bundles the operation groups used by the housekeeping
// workflows behind a single reqwest client, so every call shares one
// connection pool and one timeout.

use crate::config::{Endpoints, HousekeepingConfig};
use crate::error::{HousekeepingError, Result};
use crate::logging::Logger;
use crate::registry::auth::Auth;
use crate::registry::operations::{HubOperations, ManifestOperations, RepositoryOperations};
use reqwest::Client;
use std::time::Duration;

pub struct RegistryClientBuilder {
    endpoints: Endpoints,
    timeout: Duration,
    output: Logger,
}

impl RegistryClientBuilder {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
            output: Logger::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("docker-housekeeping/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HousekeepingError::Config(format!("failed to create HTTP client: {}", e)))?;

        self.output.detail(&format!(
            "HTTP client ready (timeout: {})",
            self.output.format_duration(self.timeout)
        ));

        Ok(RegistryClient::from_parts(client, self.endpoints, self.output))
    }
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    auth: Auth,
    manifests: ManifestOperations,
    repositories: RepositoryOperations,
    hub: HubOperations,
}

impl RegistryClient {
    pub fn builder(endpoints: Endpoints) -> RegistryClientBuilder {
        RegistryClientBuilder::new(endpoints)
    }

    pub fn from_config(config: &HousekeepingConfig, output: Logger) -> Result<Self> {
        Self::builder(config.endpoints.clone())
            .with_timeout(config.timeout)
            .with_output(output)
            .build()
    }

    fn from_parts(client: Client, endpoints: Endpoints, output: Logger) -> Self {
        let Endpoints {
            auth,
            registry,
            hub,
        } = endpoints;

        Self {
            auth: Auth::new(client.clone(), auth, hub.clone(), output.clone()),
            manifests: ManifestOperations::new(client.clone(), registry.clone(), output.clone()),
            repositories: RepositoryOperations::new(client.clone(), registry, output.clone()),
            hub: HubOperations::new(client, hub, output),
        }
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn manifests(&self) -> &ManifestOperations {
        &self.manifests
    }

    pub fn repositories(&self) -> &RepositoryOperations {
        &self.repositories
    }

    pub fn hub(&self) -> &HubOperations {
        &self.hub
    }
}
