//! Manifest operations for the registry API
//!
//! Implements the two halves of a zero-copy retag:
//! - Manifest download (GET /v2/{name}/manifests/{reference})
//! - Manifest upload (PUT /v2/{name}/manifests/{reference})
//!
//! The manifest is carried as opaque bytes. Layers are referenced by digest
//! inside it, so pushing the same bytes under another tag is all a retag
//! needs; the registry verifies digests on push.

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler};
use crate::error::{HousekeepingError, Operation, Result};
use crate::logging::Logger;
use crate::registry::auth::RegistryToken;
use reqwest::{Client, StatusCode};

/// Docker Distribution Manifest v2, used both as `Accept` and `Content-Type`
pub const MANIFEST_V2_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Raw manifest bytes exactly as the registry returned them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    bytes: Vec<u8>,
}

impl Manifest {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct ManifestOperations {
    client: Client,
    address: String,
    output: Logger,
}

impl ManifestOperations {
    pub fn new(client: Client, address: String, output: Logger) -> Self {
        Self {
            client,
            address,
            output,
        }
    }

    /// Fetch the manifest a tag or digest points at
    pub async fn pull_manifest(
        &self,
        token: &RegistryToken,
        repository: &str,
        reference: &str,
    ) -> Result<Manifest> {
        debug_assert_eq!(token.repository(), repository);

        let url = format!("{}/v2/{}/manifests/{}", self.address, repository, reference);
        let fail = |cause| {
            HousekeepingError::transfer(Operation::PullManifest, repository, reference, cause)
        };

        self.output
            .verbose(&format!("Pulling manifest {}/{}", repository, reference));

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.secret())
            .header("Accept", MANIFEST_V2_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "manifest pull")))?;

        HttpErrorHandler::expect_status(response.status(), StatusCode::OK).map_err(fail)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "manifest pull")))?;

        self.output.detail(&format!(
            "Manifest for {}/{} is {} bytes",
            repository,
            reference,
            bytes.len()
        ));

        Ok(Manifest::from_bytes(bytes.to_vec()))
    }

    /// Store a manifest under a tag, byte for byte
    pub async fn push_manifest(
        &self,
        token: &RegistryToken,
        repository: &str,
        tag: &str,
        manifest: &Manifest,
    ) -> Result<()> {
        debug_assert_eq!(token.repository(), repository);

        let url = format!("{}/v2/{}/manifests/{}", self.address, repository, tag);
        let fail =
            |cause| HousekeepingError::transfer(Operation::PushManifest, repository, tag, cause);

        self.output.verbose(&format!(
            "Pushing manifest to {}/{} with content-type: {}",
            repository, tag, MANIFEST_V2_MEDIA_TYPE
        ));

        let response = self
            .client
            .put(&url)
            .bearer_auth(token.secret())
            .header("Content-Type", MANIFEST_V2_MEDIA_TYPE)
            .body(manifest.as_bytes().to_vec())
            .send()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "manifest push")))?;

        HttpErrorHandler::expect_status(response.status(), StatusCode::CREATED).map_err(fail)?;

        self.output
            .detail(&format!("Manifest stored as {}/{}", repository, tag));
        Ok(())
    }
}
