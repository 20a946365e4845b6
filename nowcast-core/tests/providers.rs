//! HTTP behaviour of the location and forecast providers, against wiremock.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use nowcast_core::{
    FetchError, FetchOptions, ForecastFetcher, Location, LocationError, LocationResolver,
    OpenMeteoFetcher, PipelineError,
    location::ipapi::IpLookupResolver,
    pipeline,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/Berlin",
        "current_weather": {
            "temperature": 5.1,
            "windspeed": 14.76,
            "winddirection": 240,
            "weathercode": 61,
            "is_day": 1,
            "time": "2024-02-05T11:00"
        },
        "hourly": {
            "time": ["2024-02-05T10:00", "2024-02-05T11:00", "2024-02-05T12:00"],
            "temperature_2m": [4.6, 5.1, 5.8],
            "relativehumidity_2m": [88, 84, 79],
            "precipitation_probability": [40, 55, 30],
            "is_day": [1, 1, 1]
        },
        "daily": {
            "time": ["2024-02-05", "2024-02-06", "2024-02-07"],
            "weathercode": [61, 3, 71],
            "temperature_2m_max": [7.2, 6.0, 1.1],
            "temperature_2m_min": [2.3, 0.0, -2.5]
        }
    })
}

async fn mount_forecast(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn ip_lookup_extracts_city_and_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Berlin",
            "region": "Land Berlin",
            "country_name": "Germany",
            "latitude": 52.5,
            "longitude": 13.4
        })))
        .mount(&server)
        .await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();
    let location = resolver.resolve().await.unwrap();

    assert_eq!(location, Location::new("Berlin", 52.5, 13.4));
}

#[tokio::test]
async fn ip_lookup_non_success_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();
    let err = resolver.resolve().await.unwrap_err();

    match err {
        LocationError::Provider(msg) => {
            assert!(msg.contains("500"), "{msg}");
            assert!(msg.contains("upstream down"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn ip_lookup_malformed_body_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
        .mount(&server)
        .await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();

    assert!(matches!(resolver.resolve().await, Err(LocationError::Provider(_))));
}

#[tokio::test]
async fn ip_lookup_without_coordinates_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "city": "Berlin" })))
        .mount(&server)
        .await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();

    assert!(matches!(resolver.resolve().await, Err(LocationError::Provider(_))));
}

#[tokio::test]
async fn ip_lookup_error_flag_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": true,
            "reason": "RateLimited",
            "message": "Visit https://ipapi.co/ratelimited/ for details"
        })))
        .mount(&server)
        .await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();
    let err = resolver.resolve().await.unwrap_err();

    assert_eq!(err, LocationError::Provider("IP lookup refused: RateLimited".into()));
}

#[tokio::test]
async fn forecast_request_carries_expected_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.5"))
        .and(query_param("longitude", "13.4"))
        .and(query_param("current_weather", "true"))
        .and(query_param(
            "hourly",
            "temperature_2m,relativehumidity_2m,precipitation_probability,is_day",
        ))
        .and(query_param("daily", "weathercode,temperature_2m_max,temperature_2m_min"))
        .and(query_param("timezone", "auto"))
        .and(query_param("models", "best_match"))
        .and(header("cache-control", "no-store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();
    let payload = fetcher.fetch(52.5, 13.4, &FetchOptions::no_store()).await.unwrap();

    assert_eq!(payload.daily.time.len(), 3);
    assert_eq!(payload.current_weather.weathercode, 61);
}

#[tokio::test]
async fn forecast_max_age_is_sent_as_cache_control() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("cache-control", "max-age=600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();
    let options = FetchOptions::max_age(Duration::from_secs(600));

    assert!(fetcher.fetch(52.5, 13.4, &options).await.is_ok());
}

#[tokio::test]
async fn forecast_server_error_is_provider_error() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Internal error"
        })),
    )
    .await;

    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();
    let err = fetcher.fetch(52.5, 13.4, &FetchOptions::default()).await.unwrap_err();

    let FetchError::Provider(msg) = err;
    assert!(msg.contains("500"), "{msg}");
}

#[tokio::test]
async fn forecast_unexpected_shape_is_provider_error() {
    let server = MockServer::start().await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(serde_json::json!({ "hourly": {} })))
        .await;

    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();
    let err = fetcher.fetch(52.5, 13.4, &FetchOptions::default()).await.unwrap_err();

    let FetchError::Provider(msg) = err;
    assert!(msg.contains("Failed to parse Open-Meteo JSON"), "{msg}");
}

#[tokio::test]
async fn pipeline_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Berlin",
            "latitude": 52.5,
            "longitude": 13.4
        })))
        .mount(&server)
        .await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();
    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();
    // 10:30 UTC is 11:30 in Berlin in February.
    let now = Utc.with_ymd_and_hms(2024, 2, 5, 10, 30, 0).unwrap();

    let report = pipeline::run(&resolver, &fetcher, &FetchOptions::default(), now).await;

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.location, Some(Location::new("Berlin", 52.5, 13.4)));

    let forecast = report.forecast.as_ref().unwrap();
    assert_eq!(forecast.current.temperature_c, 6);
    assert_eq!(forecast.current.min_temperature_today_c, 3);
    assert_eq!(forecast.current.humidity_pct, Some(84));
    assert_eq!(forecast.current.precipitation_pct, Some(55));
    assert_eq!(forecast.current.wind_kmh, 14.8);
    assert_eq!(forecast.daily.len(), 3);

    assert_eq!(report.current_category().unwrap().label, "Partial Rain");
    let labels: Vec<&str> = report.upcoming_days().iter().map(|d| d.entry.weekday_label()).collect();
    assert_eq!(labels, ["Tue", "Wed"]);
}

#[tokio::test]
async fn pipeline_forecast_500_produces_no_forecast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Berlin",
            "latitude": 52.5,
            "longitude": 13.4
        })))
        .mount(&server)
        .await;
    mount_forecast(&server, ResponseTemplate::new(500)).await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();
    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();

    let report = pipeline::run(&resolver, &fetcher, &FetchOptions::default(), Utc::now()).await;

    assert!(report.location.is_some());
    assert!(report.forecast.is_none());
    assert!(matches!(report.errors[..], [PipelineError::Fetch(FetchError::Provider(_))]));
}

#[tokio::test]
async fn pipeline_does_not_fetch_without_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = IpLookupResolver::with_url(&format!("{}/json/", server.uri())).unwrap();
    let fetcher = OpenMeteoFetcher::with_base_url(&server.uri()).unwrap();

    let report = pipeline::run(&resolver, &fetcher, &FetchOptions::default(), Utc::now()).await;

    assert!(!report.is_complete());
    assert!(matches!(report.errors[..], [PipelineError::Location(LocationError::Provider(_))]));
}
