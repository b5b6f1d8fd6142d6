//! Repository operations for the registry API
//!
//! Implements Docker Registry v2 tag listing (GET /v2/{name}/tags/list) and
//! the preview-tag naming convention used by the pruner.

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler, ParseErrorHandler};
use crate::error::{HousekeepingError, Operation, Result};
use crate::logging::Logger;
use crate::registry::auth::RegistryToken;
use crate::registry::operations::manifest_operations::MANIFEST_V2_MEDIA_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Tags carrying this prefix are short-lived preview builds
pub const PREVIEW_TAG_PREFIX: &str = "preview-";

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

pub fn is_preview_tag(tag: &str) -> bool {
    tag.starts_with(PREVIEW_TAG_PREFIX)
}

/// Keep preview tags, preserving their relative order
pub fn filter_preview_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter().filter(|tag| is_preview_tag(tag)).collect()
}

#[derive(Debug, Clone)]
pub struct RepositoryOperations {
    client: Client,
    address: String,
    output: Logger,
}

impl RepositoryOperations {
    pub fn new(client: Client, address: String, output: Logger) -> Self {
        Self {
            client,
            address,
            output,
        }
    }

    /// List every tag in a repository, in the order the registry returns them
    pub async fn list_tags(&self, token: &RegistryToken, repository: &str) -> Result<Vec<String>> {
        debug_assert_eq!(token.repository(), repository);

        let url = format!("{}/v2/{}/tags/list", self.address, repository);
        let fail = |cause| HousekeepingError::discovery(Operation::ListTags, repository, cause);

        self.output
            .verbose(&format!("Listing tags for repository: {}", repository));

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.secret())
            .header("Accept", MANIFEST_V2_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "tag listing")))?;

        HttpErrorHandler::expect_status(response.status(), StatusCode::OK).map_err(fail)?;

        let body = response
            .text()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "tag listing")))?;

        let tag_list: TagList = serde_json::from_str(&body)
            .map_err(|e| fail(ParseErrorHandler::handle_json_error(&e, "tag listing")))?;

        Ok(tag_list.tags.unwrap_or_default())
    }

    /// List only the `preview-` tags of a repository
    pub async fn list_preview_tags(
        &self,
        token: &RegistryToken,
        repository: &str,
    ) -> Result<Vec<String>> {
        let tags = filter_preview_tags(self.list_tags(token, repository).await?);

        self.output.info(&format!(
            "Found {} preview tags for repository {}: {:?}",
            tags.len(),
            repository,
            tags
        ));

        Ok(tags)
    }
}
