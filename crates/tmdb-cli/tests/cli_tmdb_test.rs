#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::{PredicateBooleanExt, predicate};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_search_movie_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tmdb");
    cmd.args(["search-movie", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--query"));
}

#[test]
fn test_tv_season_missing_season() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tmdb");
    cmd.args(["tv-season", "--id", "120089"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--season"));
}

#[test]
fn test_invalid_auth_scheme() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tmdb");
    cmd.args(["--auth-scheme", "basic", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bearer"));
}

#[test]
fn test_missing_token_is_reported() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tmdb");
    cmd.env_remove("TMDB_API_TOKEN")
        .arg("--dir")
        .arg(dir.path())
        .args(["search-movie", "--query", "Suzume"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TMDB API token is not configured"));
}

#[test]
fn test_malformed_base_url_is_reported() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tmdb");
    cmd.env("TMDB_API_TOKEN", "test-token")
        .arg("--dir")
        .arg(dir.path())
        .args(["--base-url", "not a url", "movie-details", "--id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid base URL"));
}

#[test]
fn test_config_set_then_show_masks_token() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act
    cargo_bin_cmd!("tmdb")
        .arg("--dir")
        .arg(dir.path())
        .args([
            "--auth-scheme",
            "api-key",
            "config",
            "set",
            "--api-token",
            "abcdef123456",
            "--language",
            "ja-JP",
        ])
        .assert()
        .success();

    // Assert
    let saved = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(saved.contains("auth_scheme = \"api-key\""));
    assert!(saved.contains("language = \"ja-JP\""));

    cargo_bin_cmd!("tmdb")
        .arg("--dir")
        .arg(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****3456"))
        .stdout(predicate::str::contains("auth_scheme: api-key"))
        .stdout(predicate::str::contains("abcdef").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_movie_sends_bearer_token() {
    // Arrange
    let mock_server = MockServer::start().await;
    let json_body = include_str!("../../../fixtures/tmdb/search_movie_suzume.json");

    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "Suzume"))
        .and(header("Authorization", "Bearer cli-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cargo_bin_cmd!("tmdb")
        .env("TMDB_API_TOKEN", "cli-token")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .arg("--dir")
        .arg(dir.path())
        .args(["--base-url", mock_server.uri().as_str()])
        .args(["search-movie", "--query", "Suzume"])
        .assert()
        .success()
        .stdout(predicate::str::contains("916224"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tv_details_sends_raw_api_key() {
    // Arrange
    let mock_server = MockServer::start().await;
    let json_body = include_str!("../../../fixtures/tmdb/tv_details_120089.json");

    Mock::given(method("GET"))
        .and(path("/3/tv/120089"))
        .and(header("Authorization", "cli-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cargo_bin_cmd!("tmdb")
        .env("TMDB_API_TOKEN", "cli-api-key")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .arg("--dir")
        .arg(dir.path())
        .args(["--base-url", mock_server.uri().as_str(), "--auth-scheme", "api-key"])
        .args(["tv-details", "--id", "120089"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SPY×FAMILY"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_is_reported() {
    // Arrange
    let mock_server = MockServer::start().await;
    let error_body = r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string(error_body))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cargo_bin_cmd!("tmdb")
        .env("TMDB_API_TOKEN", "cli-token")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .arg("--dir")
        .arg(dir.path())
        .args(["--base-url", mock_server.uri().as_str()])
        .args(["movie-details", "--id", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be found"));
}
