#![allow(dead_code)]

use chrono::{DateTime, SecondsFormat, Utc};
use docker_housekeeping::{Credentials, Endpoints, Housekeeper, HousekeepingConfig, Logger};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ORG: &str = "antidotelabs";

pub fn credentials() -> Credentials {
    Credentials::new("nrelabs", "hunter2")
}

pub fn config_for(server: &MockServer) -> HousekeepingConfig {
    HousekeepingConfig::default().with_endpoints(Endpoints::single(&server.uri()).unwrap())
}

pub fn housekeeper(server: &MockServer) -> Housekeeper {
    Housekeeper::new(config_for(server), Logger::new_quiet()).unwrap()
}

pub fn dry_run_housekeeper(server: &MockServer) -> Housekeeper {
    Housekeeper::new(config_for(server).with_dry_run(true), Logger::new_quiet()).unwrap()
}

pub fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub async fn mount_registry_token(server: &MockServer, repository: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("scope", format!("repository:{}:pull,push", repository)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": format!("token-{}", repository) })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_hub_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "hub-jwt" })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_org_listing(server: &MockServer, images: &[&str]) {
    let results: Vec<_> = images
        .iter()
        .map(|name| json!({ "user": ORG, "name": name }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/v2/repositories/{}/", ORG)))
        .and(query_param("page_size", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "count": images.len(), "results": results })),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_tag_list(server: &MockServer, repository: &str, tags: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/tags/list", repository)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": repository, "tags": tags })),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_tag_list_failure(server: &MockServer, repository: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/tags/list", repository)))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_tag_metadata(
    server: &MockServer,
    repository: &str,
    tag: &str,
    last_updated: DateTime<Utc>,
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/repositories/{}/tags/{}", repository, tag)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": tag,
            "last_updated": rfc3339(last_updated),
            "tag_status": "active",
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_delete(
    server: &MockServer,
    repository: &str,
    tag: &str,
    status: u16,
    expected_calls: u64,
) {
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/repositories/{}/tags/{}/", repository, tag)))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}
