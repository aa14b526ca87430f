//! Contract tests for `HttpRegionLookup` against a mock backend.

use std::time::Duration;

use regform_core::config::LookupConfig;
use regform_core::lookup::{HttpRegionLookup, LookupError, RegionLookup};
use regform_core::model::{CountryId, Region};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lookup_for(server: &MockServer) -> HttpRegionLookup {
    let config = LookupConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
        ..LookupConfig::default()
    };
    HttpRegionLookup::new(&config).unwrap()
}

fn country(id: &str) -> CountryId {
    CountryId::parse(Some(id)).unwrap()
}

#[tokio::test]
async fn test_regions_sent_with_country_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/api/regions"))
        .and(query_param("country_id", "UA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 7, "name": "North"},
            {"id": "12", "name": "South"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let regions = lookup_for(&server).regions(&country("UA")).await.unwrap();
    assert_eq!(
        regions,
        vec![Region::new("7", "North"), Region::new("12", "South")]
    );
}

#[tokio::test]
async fn test_custom_api_url_and_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/regions"))
        .and(query_param("country", "PL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let config = LookupConfig {
        base_url: server.uri(),
        api_url: Some("/geo/regions".to_string()),
        query_param: "country".to_string(),
        ..LookupConfig::default()
    };
    let lookup = HttpRegionLookup::new(&config).unwrap();

    let regions = lookup.regions(&country("PL")).await.unwrap();
    assert!(regions.is_empty());
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/api/regions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = lookup_for(&server)
        .regions(&country("UA"))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Status { status: 500, .. }));
    assert!(err.endpoint().ends_with("/users/api/regions"));
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/api/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = lookup_for(&server)
        .regions(&country("UA"))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_transport() {
    let config = LookupConfig {
        base_url: "http://127.0.0.1:9/".to_string(),
        timeout: Duration::from_secs(2),
        ..LookupConfig::default()
    };
    let lookup = HttpRegionLookup::new(&config).unwrap();

    let err = lookup.regions(&country("UA")).await.unwrap_err();
    assert!(matches!(err, LookupError::Transport { .. }));
}
