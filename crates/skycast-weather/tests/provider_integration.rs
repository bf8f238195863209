//! Integration tests for WeatherProvider using wiremock.
//!
//! These tests run the provider against a mock OpenWeatherMap server.

use chrono::{Days, NaiveDate};
use skycast_core::WeatherConfig;
use skycast_weather::{Units, WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> WeatherProvider {
    let config = WeatherConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        ..WeatherConfig::default()
    };
    WeatherProvider::new(&config).unwrap()
}

fn current_body(name: &str, country: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": { "temp": 17.3, "feels_like": 16.9, "temp_min": 15.0, "temp_max": 18.8, "humidity": 58 },
        "wind": { "speed": 3.1, "deg": 220 },
        "sys": { "country": country },
        "name": name,
        "cod": 200
    })
}

fn entry(day: NaiveDate, hour: u32, description: &str) -> serde_json::Value {
    let dt = day.and_hms_opt(hour, 0, 0).unwrap().and_utc().timestamp();
    serde_json::json!({
        "dt": dt,
        "main": { "temp": 14.0, "feels_like": 13.0, "temp_min": 10.2, "temp_max": 16.7, "humidity": 60 },
        "weather": [{ "id": 803, "main": "Clouds", "description": description, "icon": "04d" }]
    })
}

/// Four sparse days, all after any real "today"
fn forecast_body() -> serde_json::Value {
    let first = NaiveDate::from_ymd_opt(2099, 3, 1).unwrap();
    let day = |n: u64| first + Days::new(n);

    serde_json::json!({
        "cod": "200",
        "cnt": 7,
        "list": [
            entry(day(0), 9, "d0 morning"),
            entry(day(0), 12, "d0 noon"),
            entry(day(0), 15, "d0 afternoon"),
            entry(day(1), 21, "d1 night"),
            entry(day(2), 6, "d2 early"),
            entry(day(2), 18, "d2 evening"),
            entry(day(3), 12, "d3 noon"),
        ]
    })
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", "FR")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

fn descriptions(report: &skycast_weather::WeatherReport) -> Vec<String> {
    report
        .forecast
        .iter()
        .filter_map(|s| s.condition().map(|c| c.description.clone()))
        .collect()
}

#[tokio::test]
async fn test_fetch_by_city_success() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server).await;

    let report = provider(&mock_server)
        .fetch_by_city("Paris", Units::Metric)
        .await
        .unwrap();

    assert_eq!(report.current.name, "Paris");
    assert_eq!(report.current.main.humidity, 58);
    assert_eq!(report.units, Units::Metric);
    assert_eq!(
        descriptions(&report),
        vec!["d0 noon", "d1 night", "d2 early"]
    );
}

#[tokio::test]
async fn test_city_query_parameters() {
    let mock_server = MockServer::start().await;

    for endpoint in ["/weather", "/forecast"] {
        let body = if endpoint == "/weather" {
            current_body("São Paulo", "BR")
        } else {
            forecast_body()
        };
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("q", "São Paulo"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let report = provider(&mock_server)
        .fetch_by_city("  São Paulo ", Units::Imperial)
        .await
        .unwrap();

    assert_eq!(report.units, Units::Imperial);
}

#[tokio::test]
async fn test_fetch_by_coords_query_parameters() {
    let mock_server = MockServer::start().await;

    for endpoint in ["/weather", "/forecast"] {
        let body = if endpoint == "/weather" {
            current_body("Paris", "FR")
        } else {
            forecast_body()
        };
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("lat", "48.85"))
            .and(query_param("lon", "2.35"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let report = provider(&mock_server)
        .fetch_by_coords(48.85, 2.35, Units::Metric)
        .await
        .unwrap();

    assert_eq!(report.forecast.len(), 3);
}

#[tokio::test]
async fn test_forecast_failure_fails_whole_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", "FR")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_city("Paris", Units::Metric)
        .await;

    assert!(matches!(result, Err(WeatherError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_unknown_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_city("Atlantis", Units::Metric)
        .await;

    match result {
        Err(WeatherError::CityNotFound(city)) => assert_eq!(city, "Atlantis"),
        other => panic!("expected CityNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_city("Paris", Units::Metric)
        .await;

    assert!(matches!(result, Err(WeatherError::InvalidApiKey)));
}

#[tokio::test]
async fn test_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_coords(0.0, 0.0, Units::Metric)
        .await;

    assert!(matches!(result, Err(WeatherError::RateLimited)));
}

#[tokio::test]
async fn test_other_client_error_keeps_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("wrong latitude"))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_city("Paris", Units::Metric)
        .await;

    match result {
        Err(WeatherError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("wrong latitude"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_city("Paris", Units::Metric)
        .await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
}

#[tokio::test]
async fn test_empty_forecast_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Reykjavik", "IS")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": "200" })))
        .mount(&mock_server)
        .await;

    let report = provider(&mock_server)
        .fetch_by_city("Reykjavik", Units::Metric)
        .await
        .unwrap();

    assert!(report.forecast.is_empty());
}
