//! HTTP contract tests for the Open-Meteo clients against a mock server.

use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};
use wxsearch_core::{
    Config, ForecastSource, Geocoder, LookupError, OpenMeteoForecast, OpenMeteoGeocoder, Phase,
    SearchOrchestrator,
};

fn config_for(server: &MockServer) -> Config {
    Config {
        geocoding_url: server.uri(),
        forecast_url: server.uri(),
        timeout_secs: 5,
        ..Config::default()
    }
}

fn geocoding_body() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "id": 2988507,
                "name": "Paris",
                "latitude": 48.85,
                "longitude": 2.35,
                "country": "France",
                "admin1": "Île-de-France"
            },
            {
                "id": 4717560,
                "name": "Paris",
                "latitude": 33.66,
                "longitude": -95.55,
                "country": "United States",
                "admin1": "Texas"
            },
            {
                "id": 2988506,
                "name": "Paris",
                "latitude": 48.86,
                "longitude": 2.34,
                "country": "France",
                "admin1": "Île-de-France"
            }
        ],
        "generationtime_ms": 0.8
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 48.86,
        "longitude": 2.35,
        "timezone": "Europe/Paris",
        "current": {
            "time": "2024-06-01T14:00",
            "interval": 900,
            "temperature_2m": 22.4,
            "relative_humidity_2m": 48,
            "apparent_temperature": 21.7,
            "weather_code": 0,
            "wind_speed_10m": 11.2,
            "wind_direction_10m": 230
        },
        "daily": {
            "time": [
                "2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04",
                "2024-06-05", "2024-06-06", "2024-06-07", "2024-06-08"
            ],
            "weather_code": [0, 1, 2, 3, 61, 80, 95, 71],
            "temperature_2m_max": [24.0, 25.0, 23.5, 21.0, 18.2, 19.0, 22.0, 10.0],
            "temperature_2m_min": [14.0, 15.0, 13.5, 12.0, 11.0, 10.5, 12.0, 2.0],
            "precipitation_probability_max": [0, 5, 10, 20, 80, 65, 90, null],
            "wind_speed_10m_max": [12.0, 14.5, 9.0, 20.0, 31.0, 28.0, 45.0, 18.0]
        }
    })
}

#[tokio::test]
async fn resolve_one_sends_expected_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Paris"))
        .and(query_param("count", "1"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .expect(1)
        .mount(&server)
        .await;

    let geocoder = OpenMeteoGeocoder::new(&config_for(&server)).unwrap();
    let location = geocoder.resolve_one("Paris").await.unwrap();

    assert_eq!(location.name, "Paris");
    assert_eq!(location.country, "France");
    assert_eq!(location.region.as_deref(), Some("Île-de-France"));
    assert!((location.latitude - 48.85).abs() < 1e-9);
}

#[tokio::test]
async fn missing_results_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"generationtime_ms": 0.3})),
        )
        .mount(&server)
        .await;

    let geocoder = OpenMeteoGeocoder::new(&config_for(&server)).unwrap();
    let err = geocoder.resolve_one("Xyzzyqq").await.unwrap_err();

    assert_eq!(err, LookupError::NotFound("Xyzzyqq".into()));
}

#[tokio::test]
async fn server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let geocoder = OpenMeteoGeocoder::new(&config_for(&server)).unwrap();
    let err = geocoder.resolve_one("Paris").await.unwrap_err();

    match err {
        LookupError::Network(msg) => {
            assert!(msg.contains("503"), "unexpected message: {msg}");
            assert!(msg.contains("upstream overloaded"));
        }
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn suggest_dedups_and_swallows_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Par"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let geocoder = OpenMeteoGeocoder::new(&config_for(&server)).unwrap();

    let suggestions = geocoder.suggest("Par", 5).await;
    let keys: Vec<_> = suggestions.iter().map(|l| l.key()).collect();
    assert_eq!(keys, vec![("Paris", "France"), ("Paris", "United States")]);

    assert!(geocoder.suggest("Broken", 5).await.is_empty());
}

#[tokio::test]
async fn forecast_requests_both_sections_and_drops_today() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "48.85"))
        .and(query_param("longitude", "2.35"))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "8"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_direction_10m",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenMeteoForecast::new(&config_for(&server)).unwrap();
    let forecast = client.fetch(48.85, 2.35).await.unwrap();

    assert_eq!(forecast.current.temperature_c, Some(22.4));
    assert_eq!(forecast.current.relative_humidity_pct, Some(48.0));
    assert_eq!(forecast.current.weather_code, Some(0));
    assert_eq!(forecast.current.wind_direction_deg, Some(230.0));

    assert_eq!(forecast.daily.len(), 7);
    assert_eq!(forecast.daily[0].date.to_string(), "2024-06-02");
    assert_eq!(forecast.daily[0].weather_code, Some(1));
    assert_eq!(forecast.daily[6].weather_code, Some(71));
    assert_eq!(forecast.daily[6].precipitation_probability_pct, None);
    assert_eq!(forecast.daily[3].max_wind_speed_kmh, Some(31.0));
}

#[tokio::test]
async fn malformed_forecast_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"current\": 1"))
        .mount(&server)
        .await;

    let client = OpenMeteoForecast::new(&config_for(&server)).unwrap();
    let err = client.fetch(0.0, 0.0).await.unwrap_err();

    assert!(matches!(err, LookupError::Network(_)));
}

#[tokio::test]
async fn orchestrator_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let mut orch = SearchOrchestrator::from_config(&config_for(&server)).unwrap();
    orch.input("Paris");
    orch.submit().await;

    let state = orch.state();
    assert_eq!(state.phase(), Phase::Displaying);
    let report = state.report().unwrap();
    assert_eq!(report.location.to_string(), "Paris, Île-de-France, France");
    assert_eq!(report.current.description(), "Clear sky");
    assert_eq!(report.daily.len(), 7);
}
