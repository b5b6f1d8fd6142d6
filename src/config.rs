//! Configuration for credentials, remote endpoints and run options

use crate::error::{HousekeepingError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const USERNAME_ENV: &str = "DOCKERHUB_USERNAME";
pub const PASSWORD_ENV: &str = "DOCKERHUB_PASSWORD";

pub const DEFAULT_AUTH_URL: &str = "https://auth.docker.io";
pub const DEFAULT_REGISTRY_URL: &str = "https://index.docker.io";
pub const DEFAULT_HUB_URL: &str = "https://hub.docker.com";
pub const DEFAULT_ORGANIZATION: &str = "antidotelabs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Username/password pair used for both the registry and the hub.
///
/// Built once at startup and passed by reference to every call that needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read credentials from `DOCKERHUB_USERNAME` and `DOCKERHUB_PASSWORD`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_ENV).ok_or_else(|| {
            HousekeepingError::Config(format!("{} not found in environment", USERNAME_ENV))
        })?;
        let password = lookup(PASSWORD_ENV).ok_or_else(|| {
            HousekeepingError::Config(format!("{} not found in environment", PASSWORD_ENV))
        })?;

        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Base addresses of the token service, the registry API and the hub API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: String,
    pub registry: String,
    pub hub: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: DEFAULT_AUTH_URL.to_string(),
            registry: DEFAULT_REGISTRY_URL.to_string(),
            hub: DEFAULT_HUB_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn new(auth: &str, registry: &str, hub: &str) -> Result<Self> {
        Ok(Self {
            auth: normalize_base_url(auth)?,
            registry: normalize_base_url(registry)?,
            hub: normalize_base_url(hub)?,
        })
    }

    /// Point all three services at one address, as the mock server in tests does
    pub fn single(base: &str) -> Result<Self> {
        Self::new(base, base, base)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HousekeepingError::Config(format!(
            "unsupported scheme in endpoint URL: {}",
            raw
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Options shared by both workflows
#[derive(Debug, Clone)]
pub struct HousekeepingConfig {
    pub endpoints: Endpoints,
    pub timeout: Duration,
    pub organization: String,
    pub dry_run: bool,
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            organization: DEFAULT_ORGANIZATION.to_string(),
            dry_run: false,
        }
    }
}

impl HousekeepingConfig {
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(HousekeepingError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.organization.is_empty() || self.organization.contains('/') {
            return Err(HousekeepingError::Config(format!(
                "invalid organization name: '{}'",
                self.organization
            )));
        }
        Ok(())
    }
}
