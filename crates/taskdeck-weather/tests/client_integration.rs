//! Integration tests for WeatherClient using wiremock.

use std::time::Duration;

use taskdeck_weather::{WeatherClient, WeatherError, WeatherOptions};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn paris_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Paris",
        "main": { "temp": 18.2, "humidity": 60 },
        "weather": [{ "main": "Clear", "icon": "01d" }],
        "wind": { "speed": 4.6, "deg": 225 },
        "dt": 1760788800
    })
}

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::with_base_url(&server.uri(), "test-key", WeatherOptions::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_builds_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let snapshot = client.fetch("Paris").await.unwrap();

    assert_eq!(snapshot.temp, 18);
    assert_eq!(snapshot.condition, "Clear");
    assert_eq!(snapshot.icon, "https://openweathermap.org/img/wn/01d@2x.png");
    assert_eq!(snapshot.humidity, Some(60));
    assert_eq!(snapshot.wind.as_ref().map(|w| w.direction.as_str()), Some("SW"));
    assert_eq!(client.cached_locations(), 1);
}

#[tokio::test]
async fn test_same_location_within_ttl_hits_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let first = client.fetch("Paris").await.unwrap();
    let second = client.fetch("  paris ").await.unwrap();
    let third = client.fetch("PARIS").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&third).unwrap()
    );
    // MockServer verifies the single call on drop
}

#[tokio::test]
async fn test_stale_entry_is_refetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let options = WeatherOptions {
        cache_ttl: Duration::from_millis(50),
        ..WeatherOptions::default()
    };
    let client = WeatherClient::with_base_url(&mock_server.uri(), "test-key", options).unwrap();

    client.fetch("Paris").await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    client.fetch("Paris").await.unwrap();
    assert_eq!(client.cached_locations(), 1);
}

#[tokio::test]
async fn test_stale_entries_for_other_locations_are_dropped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let options = WeatherOptions {
        cache_ttl: Duration::from_millis(50),
        ..WeatherOptions::default()
    };
    let client = WeatherClient::with_base_url(&mock_server.uri(), "test-key", options).unwrap();

    client.fetch("Paris").await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    client.fetch("Oslo").await.unwrap();
    assert_eq!(client.cached_locations(), 1);
}

#[tokio::test]
async fn test_unknown_location_is_not_found_and_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::LocationNotFound(ref l) if l == "Atlantis"));
    assert_eq!(client.cached_locations(), 0);

    // Not cached, so a second attempt goes back to the provider
    let err = client.fetch("Atlantis").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_is_generic_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch("Paris").await.unwrap_err();

    assert!(
        matches!(
            err,
            WeatherError::Api { status: 401, ref message } if message == "Invalid API key"
        ),
        "unexpected error: {:?}",
        err
    );
    assert_eq!(client.cached_locations(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch("Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));
    assert_eq!(err.user_message(), "Failed to fetch weather data");
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Port 1 is never served locally; the connection is refused
    let uri = "http://127.0.0.1:1";

    let client = WeatherClient::with_base_url(uri, "test-key", WeatherOptions::default()).unwrap();
    let err = client.fetch("Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::Network(_)));
}
