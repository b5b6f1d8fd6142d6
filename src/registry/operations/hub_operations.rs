//! Hub API operations
//!
//! Implements the hub-side calls used by the pruner:
//! - Organization repository listing (GET /v2/repositories/{org}/?page_size=100)
//! - Tag metadata (GET /v2/repositories/{name}/tags/{tag})
//! - Tag deletion (DELETE /v2/repositories/{name}/tags/{tag}/)
//!
//! Listing and metadata are public; only deletion needs the hub session token.

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler, ParseErrorHandler};
use crate::error::{Cause, HousekeepingError, Operation, Result};
use crate::logging::Logger;
use crate::registry::auth::HubToken;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Only the first page of the organization listing is read
pub const ORGANIZATION_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct RepositoryPage {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Vec<RepositorySummary>,
}

#[derive(Debug, Deserialize)]
struct RepositorySummary {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TagDetails {
    #[serde(default)]
    last_updated: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HubOperations {
    client: Client,
    address: String,
    output: Logger,
}

impl HubOperations {
    pub fn new(client: Client, address: String, output: Logger) -> Self {
        Self {
            client,
            address,
            output,
        }
    }

    /// Image names of an organization, in listing order.
    ///
    /// A single page of up to [`ORGANIZATION_PAGE_SIZE`] entries is fetched.
    pub async fn list_organization_images(&self, organization: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/v2/repositories/{}/?page_size={}",
            self.address, organization, ORGANIZATION_PAGE_SIZE
        );
        let fail = |cause| {
            HousekeepingError::discovery(Operation::ListOrganizationImages, organization, cause)
        };

        self.output
            .verbose(&format!("Listing images for organization: {}", organization));

        let response = self.client.get(&url).send().await.map_err(|e| {
            fail(NetworkErrorHandler::handle_network_error(&e, "organization image listing"))
        })?;

        HttpErrorHandler::expect_status(response.status(), StatusCode::OK).map_err(fail)?;

        let body = response.text().await.map_err(|e| {
            fail(NetworkErrorHandler::handle_network_error(&e, "organization image listing"))
        })?;

        let page: RepositoryPage = serde_json::from_str(&body).map_err(|e| {
            fail(ParseErrorHandler::handle_json_error(&e, "organization image listing"))
        })?;

        let images: Vec<String> = page.results.into_iter().map(|r| r.name).collect();

        if let Some(count) = page.count {
            if count > images.len() as u64 {
                self.output.warning(&format!(
                    "Organization {} has {} repositories but only the first {} are listed",
                    organization,
                    count,
                    images.len()
                ));
            }
        }

        self.output.verbose(&format!(
            "Found {} images in organization {}",
            images.len(),
            organization
        ));

        Ok(images)
    }

    /// When a tag was last updated, according to the hub
    pub async fn get_tag_last_updated(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<DateTime<Utc>> {
        let url = format!("{}/v2/repositories/{}/tags/{}", self.address, repository, tag);
        let target = format!("{}:{}", repository, tag);
        let fail =
            |cause| HousekeepingError::discovery(Operation::TagMetadata, target.as_str(), cause);

        self.output
            .detail(&format!("Fetching metadata for tag {}", target));

        let response = self.client.get(&url).send().await.map_err(|e| {
            fail(NetworkErrorHandler::handle_network_error(&e, "tag metadata lookup"))
        })?;

        HttpErrorHandler::expect_status(response.status(), StatusCode::OK).map_err(fail)?;

        let body = response.text().await.map_err(|e| {
            fail(NetworkErrorHandler::handle_network_error(&e, "tag metadata lookup"))
        })?;

        let details: TagDetails = serde_json::from_str(&body)
            .map_err(|e| fail(ParseErrorHandler::handle_json_error(&e, "tag metadata lookup")))?;

        let raw = details
            .last_updated
            .ok_or_else(|| fail(Cause::Malformed("missing last_updated".to_string())))?;

        parse_timestamp(&raw).map_err(fail)
    }

    /// Delete a tag. Requires `204 No Content`; anything else, including a
    /// 404 for a tag that is already gone, is an error.
    pub async fn delete_tag(&self, token: &HubToken, repository: &str, tag: &str) -> Result<()> {
        let url = format!("{}/v2/repositories/{}/tags/{}/", self.address, repository, tag);
        let fail = |cause| HousekeepingError::delete(repository, tag, cause);

        self.output.warning(&format!("Sending DELETE to {}", url));

        let response = self
            .client
            .delete(&url)
            .header("Authorization", format!("JWT {}", token.secret()))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| fail(NetworkErrorHandler::handle_network_error(&e, "tag deletion")))?;

        HttpErrorHandler::expect_status(response.status(), StatusCode::NO_CONTENT).map_err(fail)?;

        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, Cause> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Cause::Malformed(format!("invalid last_updated '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ops_for(server: &MockServer) -> HubOperations {
        HubOperations::new(Client::new(), server.uri(), Logger::new_quiet())
    }

    #[test]
    fn parses_fractional_rfc3339() {
        let parsed = parse_timestamp("2021-03-23T14:28:48.584886Z").unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 3, 23, 14, 28, 48).unwrap()
            + chrono::Duration::microseconds(584886);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_non_rfc3339() {
        assert!(matches!(
            parse_timestamp("23/03/2021"),
            Err(Cause::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn lists_organization_images_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/repositories/antidotelabs/"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "results": [
                    { "user": "antidotelabs", "name": "vqfx" },
                    { "user": "antidotelabs", "name": "utility" },
                    { "user": "antidotelabs", "name": "cumulus" },
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let images = ops_for(&server)
            .list_organization_images("antidotelabs")
            .await
            .unwrap();
        assert_eq!(images, vec!["vqfx", "utility", "cumulus"]);
    }

    #[tokio::test]
    async fn organization_listing_failure_is_discovery_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = ops_for(&server)
            .list_organization_images("antidotelabs")
            .await
            .unwrap_err();
        assert_eq!(err.operation(), Some(Operation::ListOrganizationImages));
        assert!(!err.is_tag_listing_failure());
    }

    #[tokio::test]
    async fn reads_last_updated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/repositories/antidotelabs/vqfx/tags/preview-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "preview-abc",
                "last_updated": "2021-03-23T14:28:48Z",
                "tag_last_pushed": "2021-03-23T14:28:48Z",
            })))
            .mount(&server)
            .await;

        let updated = ops_for(&server)
            .get_tag_last_updated("antidotelabs/vqfx", "preview-abc")
            .await
            .unwrap();
        assert_eq!(updated, Utc.with_ymd_and_hms(2021, 3, 23, 14, 28, 48).unwrap());
    }

    #[tokio::test]
    async fn missing_last_updated_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "preview-abc" })))
            .mount(&server)
            .await;

        let err = ops_for(&server)
            .get_tag_last_updated("antidotelabs/vqfx", "preview-abc")
            .await
            .unwrap_err();
        match err {
            HousekeepingError::Discovery {
                operation, target, ..
            } => {
                assert_eq!(operation, Operation::TagMetadata);
                assert_eq!(target, "antidotelabs/vqfx:preview-abc");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_uses_jwt_scheme_and_trailing_slash() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v2/repositories/antidotelabs/vqfx/tags/preview-abc/"))
            .and(header("authorization", "JWT hub-token"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        ops_for(&server)
            .delete_tag(&HubToken::new("hub-token"), "antidotelabs/vqfx", "preview-abc")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_an_already_deleted_tag_fails() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = ops_for(&server)
            .delete_tag(&HubToken::new("hub-token"), "antidotelabs/vqfx", "preview-abc")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HousekeepingError::Delete { ref tag, .. } if tag == "preview-abc"
        ));
    }
}
