//! Authentication against the registry token service and the hub login endpoint
//!
//! The registry hands out short-lived bearer tokens scoped to a single
//! repository, the hub hands out an account-wide session token. The two are
//! separate types and are not interchangeable.

use crate::config::Credentials;
use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler, ParseErrorHandler};
use crate::error::{Cause, HousekeepingError, Operation, Result};
use crate::logging::Logger;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const REGISTRY_SERVICE: &str = "registry.docker.io";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Bearer token valid for pull and push on exactly one repository
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryToken {
    repository: String,
    token: String,
}

impl RegistryToken {
    pub fn new(repository: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            token: token.into(),
        }
    }

    /// Repository the token was issued for
    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn secret(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for RegistryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryToken")
            .field("repository", &self.repository)
            .field("token", &format_args!("<{} chars>", self.token.len()))
            .finish()
    }
}

/// Account-wide hub session token, sent as `Authorization: JWT <token>`
#[derive(Clone, PartialEq, Eq)]
pub struct HubToken(String);

impl HubToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HubToken(<{} chars>)", self.0.len())
    }
}

#[derive(Debug, Clone)]
pub struct Auth {
    client: Client,
    auth_address: String,
    hub_address: String,
    output: Logger,
}

impl Auth {
    pub fn new(client: Client, auth_address: String, hub_address: String, output: Logger) -> Self {
        Self {
            client,
            auth_address,
            hub_address,
            output,
        }
    }

    /// Obtain a `pull,push` bearer token for one repository.
    ///
    /// Exactly one request is made; there is no retry.
    pub async fn authenticate_registry(
        &self,
        repository: &str,
        credentials: &Credentials,
    ) -> Result<RegistryToken> {
        let url = format!(
            "{}/token?service={}&scope=repository:{}:pull,push",
            self.auth_address, REGISTRY_SERVICE, repository
        );
        let fail = |cause| HousekeepingError::auth(Operation::RegistryLogin, repository, cause);

        self.output
            .verbose(&format!("Requesting registry token for repository: {}", repository));
        self.output.detail(&format!("Token endpoint: {}", url));

        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "registry login")))?;

        let token = self
            .read_token(response, "registry login")
            .await
            .map_err(fail)?;

        self.output.detail(&format!(
            "Registry token obtained for {} (length: {} chars)",
            repository,
            token.len()
        ));

        Ok(RegistryToken::new(repository, token))
    }

    /// Log in to the hub and obtain an account-wide session token
    pub async fn authenticate_hub(&self, credentials: &Credentials) -> Result<HubToken> {
        let url = format!("{}/v2/users/login", self.hub_address);
        let fail =
            |cause| HousekeepingError::auth(Operation::HubLogin, credentials.username.as_str(), cause);

        self.output
            .verbose(&format!("Logging in to hub as: {}", credentials.username));

        let body = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "hub login")))?;

        let token = self
            .read_token(response, "hub login")
            .await
            .map_err(fail)?;

        self.output.detail(&format!(
            "Hub session token obtained (length: {} chars)",
            token.len()
        ));

        Ok(HubToken::new(token))
    }

    /// Shared success contract of both login endpoints: 200 and a non-empty `token`
    async fn read_token(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> std::result::Result<String, Cause> {
        HttpErrorHandler::expect_status(response.status(), StatusCode::OK)?;

        let body = response
            .text()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, context))?;

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ParseErrorHandler::handle_json_error(&e, context))?;

        match parsed.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => {
                if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
                    self.output
                        .warning(&format!("{} returned no token: {}", context, details));
                }
                Err(Cause::EmptyToken)
            }
        }
    }
}
