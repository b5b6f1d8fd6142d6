//! Registry and hub module
//!
//! This module provides authentication and client logic for the Docker
//! Registry HTTP API v2 and the Docker Hub API: token acquisition, manifest
//! transfer, tag listing and hub-side tag lifecycle calls.

pub mod auth;
pub mod client;
pub mod operations;

pub use auth::{Auth, HubToken, RegistryToken};
pub use client::{RegistryClient, RegistryClientBuilder};
pub use operations::{HubOperations, Manifest, ManifestOperations, RepositoryOperations};
