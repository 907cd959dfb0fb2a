//! Integration tests for ForecastClient and the full pipeline using wiremock.

mod fixtures;

use chrono::Duration;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::{io::AsyncReadExt, net::TcpListener};
use weather_core::{
    Config, ForecastClient, Location, WeatherError, WeatherService,
    cache::{NoopCache, TtlCache},
    codes::describe_value,
    model::CURRENT_VARIABLES,
    presenter,
    retry::RetryConfig,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn amritsar() -> Location {
    Location {
        latitude: 31.62234,
        longitude: 74.87534,
        display_name: "Amritsar, Punjab, India".into(),
        timezone: "Asia/Kolkata".into(),
    }
}

fn client(server: &MockServer, retry: RetryConfig) -> ForecastClient {
    ForecastClient::new(
        reqwest::Client::new(),
        format!("{}/v1/forecast", server.uri()),
        retry,
        Arc::new(NoopCache),
    )
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new(max_retries, 1, 5)
}

#[tokio::test]
async fn test_fetch_sends_fixed_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("timezone", "auto"))
        .and(query_param("timeformat", "unixtime"))
        .and(query_param("current", CURRENT_VARIABLES.join(",")))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(24, 7)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server, fast_retry(0)).fetch(&amritsar()).await.unwrap();
    let projection = resp.project().unwrap();

    assert_eq!(projection.hourly.len(), 24);
    assert_eq!(projection.daily.len(), 7);
    assert_eq!(projection.location.timezone, "Asia/Kolkata");
}

#[tokio::test]
async fn test_current_snapshot_is_fully_populated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(24, 7)))
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server, fast_retry(0)).fetch(&amritsar()).await.unwrap();
    let projection = resp.project().unwrap();

    assert_eq!(projection.current.values.len(), 10);
    for (name, value) in &projection.current.values {
        assert!(!value.is_nan(), "{name} missing");
    }
    let code = projection.current.get("weather_code").unwrap();
    assert!(describe_value(code).is_known());
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(24, 7)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server, fast_retry(5)).fetch(&amritsar()).await;
    assert!(resp.is_ok(), "{resp:?}");
}

#[tokio::test]
async fn test_retry_exhaustion_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, fast_retry(2))
        .fetch(&amritsar())
        .await
        .unwrap_err();

    match err {
        WeatherError::Fetch(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("expected FetchError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dropped_connections_are_retried() {
    // Accepts each connection, reads the request and hangs up without a reply.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepts = Arc::new(AtomicUsize::new(0));

    let counter = accepts.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
        }
    });

    let client = ForecastClient::new(
        reqwest::Client::new(),
        format!("http://{addr}/v1/forecast"),
        fast_retry(3),
        Arc::new(NoopCache),
    );
    let err = client.fetch(&amritsar()).await.unwrap_err();

    assert!(matches!(err, WeatherError::Fetch(_)), "{err:?}");
    assert_eq!(accepts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Cannot initialize WeatherVariable from invalid String value"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, fast_retry(5))
        .fetch(&amritsar())
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Fetch(_)));
}

#[tokio::test]
async fn test_cached_response_skips_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(24, 7)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ForecastClient::new(
        reqwest::Client::new(),
        format!("{}/v1/forecast", mock_server.uri()),
        fast_retry(0),
        Arc::new(TtlCache::<String>::with_system_clock(Duration::hours(1))),
    );

    let first = client.fetch(&amritsar()).await.unwrap();
    let second = client.fetch(&amritsar()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unparseable_body_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(24, 7)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ForecastClient::new(
        reqwest::Client::new(),
        format!("{}/v1/forecast", mock_server.uri()),
        fast_retry(0),
        Arc::new(TtlCache::<String>::with_system_clock(Duration::hours(1))),
    );

    let err = client.fetch(&amritsar()).await.unwrap_err();
    assert!(matches!(err, WeatherError::Projection(_)), "{err:?}");

    let resp = client.fetch(&amritsar()).await.unwrap();
    assert_eq!(resp.project().unwrap().daily.len(), 7);
}

#[tokio::test]
async fn test_missing_variable_is_projection_error() {
    let mock_server = MockServer::start().await;

    let mut body = fixtures::forecast_body(24, 7);
    body["hourly"]
        .as_object_mut()
        .unwrap()
        .remove("visibility");

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server, fast_retry(0)).fetch(&amritsar()).await.unwrap();
    let err = resp.project().unwrap_err();

    assert!(matches!(err, WeatherError::Projection(_)), "{err:?}");
}

#[tokio::test]
async fn test_service_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Amritsar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::amritsar_search()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(48, 16)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.api.geocoding_url = format!("{}/v1/search", mock_server.uri());
    config.api.forecast_url = format!("{}/v1/forecast", mock_server.uri());
    config.retry.max_retries = 0;

    let service = WeatherService::from_config(&config).unwrap();
    let dash = service.load("Amritsar").await.unwrap();
    let tz = dash.tz().unwrap();

    assert_eq!(dash.location.display_name, "Amritsar, Punjab, India");
    assert_eq!(dash.daily.len(), 16);

    let outlook = presenter::seven_day_outlook(&dash.daily, tz);
    assert_eq!(outlook.len(), 7);
    assert_eq!(outlook[0].day_name, "Sunday");
    assert_eq!(outlook[0].weather.description, "Slight rain showers");
    assert_eq!(
        outlook[0].sunrise_local.unwrap().format("%H:%M").to_string(),
        "05:37"
    );

    let now = dash.hourly.dates[44].with_timezone(&tz);
    assert_eq!(presenter::next_hours(&dash.hourly, now, 8).len(), 4);

    let current = presenter::current_conditions(&dash.current, &dash.daily, tz);
    assert_eq!(current.local_time, "Sunday, June 01, 02:00 PM");
    assert_eq!(current.weather.description, "Partly cloudy");
    assert_eq!(current.uv_index, Some(9.85));
}

#[tokio::test]
async fn test_service_not_found_does_not_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::empty_search()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::forecast_body(1, 1)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.api.geocoding_url = format!("{}/v1/search", mock_server.uri());
    config.api.forecast_url = format!("{}/v1/forecast", mock_server.uri());

    let service = WeatherService::from_config(&config).unwrap();
    let err = service.load("zzzqqqxxx123").await.unwrap_err();

    assert!(matches!(err, WeatherError::NotFound(_)));
}

#[tokio::test]
#[ignore] // Run with: cargo test -p weather-core -- --ignored
async fn test_live_amritsar_dashboard() {
    let service = WeatherService::from_config(&Config::default()).unwrap();
    let dash = service.load("Amritsar").await.unwrap();

    assert_eq!(dash.location.timezone, "Asia/Kolkata");
    assert_eq!(dash.current.values.len(), 10);
    let code = dash.current.get("weather_code").unwrap();
    assert!(describe_value(code).is_known());
}
