use clap::Parser;
use docker_housekeeping::HousekeepingError;
use docker_housekeeping::cli::{Args, Runner};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn args_for(server: &MockServer, command: &[&str]) -> Args {
    let uri = server.uri();
    let mut argv = vec![
        "docker-housekeeping",
        "--auth-url",
        uri.as_str(),
        "--registry-url",
        uri.as_str(),
        "--hub-url",
        uri.as_str(),
        "--quiet",
    ];
    argv.extend_from_slice(command);
    Args::try_parse_from(argv).unwrap()
}

async fn no_requests_allowed() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn retag_without_credentials_sends_nothing() {
    let server = no_requests_allowed().await;
    let runner = Runner::new(args_for(
        &server,
        &["retag", "--repository", "antidotelabs/vqfx", "--oldTag", "v1", "--newTag", "v2"],
    ));

    let err = runner.run_with_env(|_| None).await.unwrap_err();
    assert!(matches!(err, HousekeepingError::Config(ref msg) if msg.contains("DOCKERHUB_USERNAME")));
}

#[tokio::test]
async fn prune_without_credentials_sends_nothing() {
    let server = no_requests_allowed().await;
    let runner = Runner::new(args_for(&server, &["prune-preview-tags"]));

    let err = runner.run_with_env(|_| None).await.unwrap_err();
    assert!(matches!(err, HousekeepingError::Config(_)));
}

#[tokio::test]
async fn prune_without_password_sends_nothing() {
    let server = no_requests_allowed().await;
    let runner = Runner::new(args_for(&server, &["prune-preview-tags"]));

    let err = runner
        .run_with_env(|key| (key == "DOCKERHUB_USERNAME").then(|| "nrelabs".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, HousekeepingError::Config(ref msg) if msg.contains("DOCKERHUB_PASSWORD")));
}
