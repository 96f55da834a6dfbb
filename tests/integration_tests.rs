//! Integration tests for the proxy router against mocked upstream services

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taiwan_weather_proxy::{AddressOrder, AppState, ProxyConfig, web};

const KAOHSIUNG_QUERY: &str = "%E9%AB%98%E9%9B%84%E5%B8%82";

fn test_config(weather_url: &str, geocoding_url: &str, api_key: Option<&str>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.weather.base_url = weather_url.to_string();
    config.weather.api_key = api_key.map(str::to_string);
    config.geocoding.base_url = geocoding_url.to_string();
    config
}

fn test_app(config: &ProxyConfig) -> Router {
    let state = AppState::from_config(config).unwrap();
    web::app(&config.server, state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn element(name: &str, values: &[&str]) -> Value {
    let time: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            json!({
                "startTime": format!("2026-10-18 {:02}:00:00", 6 + i * 12),
                "endTime": format!("2026-10-{} {:02}:00:00", 18 + (i + 1) / 2, (18 + i * 12) % 24),
                "parameter": { "parameterName": value }
            })
        })
        .collect();
    json!({ "elementName": name, "time": time })
}

fn kaohsiung_payload() -> Value {
    json!({
        "success": "true",
        "records": {
            "datasetDescription": "三十六小時天氣預報",
            "location": [{
                "locationName": "高雄市",
                "weatherElement": [
                    element("Wx", &["多雲", "晴時多雲"]),
                    element("PoP", &["20", "10"]),
                    element("MinT", &["26", "25"]),
                    element("CI", &["舒適至悶熱", "舒適"]),
                    element("MaxT", &["31", "30"]),
                    element("WS", &["<= 1", "2"]),
                ]
            }]
        }
    })
}

#[tokio::test]
async fn test_weather_success() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .and(query_param("Authorization", "test-key"))
        .and(query_param("locationName", "高雄市"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_payload()))
        .expect(1)
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), &format!("/api/weather?city={KAOHSIUNG_QUERY}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["city"], "高雄市");
    assert_eq!(body["data"]["updateTime"], "三十六小時天氣預報");

    let forecasts = body["data"]["forecasts"].as_array().unwrap();
    assert_eq!(forecasts.len(), 2);
    for window in forecasts {
        assert!(window["rain"].as_str().unwrap().ends_with('%'));
        assert!(window["minTemp"].as_str().unwrap().ends_with("°C"));
        assert!(window["maxTemp"].as_str().unwrap().ends_with("°C"));
        for field in ["weather", "comfort", "windSpeed", "startTime", "endTime"] {
            assert!(window[field].is_string(), "{field} should be a string");
        }
    }
    assert_eq!(forecasts[0]["weather"], "多雲");
    assert_eq!(forecasts[0]["startTime"], "2026-10-18 06:00:00");
    assert_eq!(forecasts[1]["rain"], "10%");
}

#[tokio::test]
async fn test_kaohsiung_convenience_route() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .and(query_param("locationName", "高雄市"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_payload()))
        .expect(1)
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), "/api/weather/kaohsiung").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "高雄市");
}

#[tokio::test]
async fn test_weather_partial_elements_default_to_empty() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": {
                "datasetDescription": "三十六小時天氣預報",
                "location": [{
                    "locationName": "臺北市",
                    "weatherElement": [element("Wx", &["陰", "雨"]), element("UVI", &["3", "1"])]
                }]
            }
        })))
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), "/api/weather?city=%E8%87%BA%E5%8C%97%E5%B8%82").await;

    assert_eq!(status, StatusCode::OK);
    let forecasts = body["data"]["forecasts"].as_array().unwrap();
    assert_eq!(forecasts.len(), 2);
    assert_eq!(forecasts[1]["weather"], "雨");
    assert_eq!(forecasts[1]["rain"], "");
    assert_eq!(forecasts[1]["minTemp"], "");
    assert_eq!(forecasts[1]["comfort"], "");
}

#[tokio::test]
async fn test_weather_missing_city_makes_no_call() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_payload()))
        .expect(0)
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));

    for uri in ["/api/weather", "/api/weather?city=", "/api/weather?city=%20%20"] {
        let (status, body) = get(test_app(&config), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "MissingParameter");
        assert!(body["message"].as_str().unwrap().contains("city"));
    }

    assert!(weather.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_weather_missing_api_key_makes_no_call() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_payload()))
        .expect(0)
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", None);
    let (status, body) = get(test_app(&config), &format!("/api/weather?city={KAOHSIUNG_QUERY}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "ServerMisconfiguration");
    assert_eq!(weather.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_weather_no_matching_location() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": { "datasetDescription": "三十六小時天氣預報", "location": [] }
        })))
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), "/api/weather?city=Kaohsiung").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_weather_absent_records() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": "true" })))
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), "/api/weather?city=Kaohsiung").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_weather_upstream_rejection_keeps_status_and_message() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid key" })))
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("wrong-key"));
    let (status, body) = get(test_app(&config), &format!("/api/weather?city={KAOHSIUNG_QUERY}")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UpstreamError");
    assert_eq!(body["message"], "invalid key");
}

#[tokio::test]
async fn test_weather_unreachable_upstream_is_internal_error() {
    let config = test_config("http://127.0.0.1:1", "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), &format!("/api/weather?city={KAOHSIUNG_QUERY}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "InternalError");
    assert!(!body["message"].as_str().unwrap().contains("127.0.0.1"));
}

#[tokio::test]
async fn test_weather_undecodable_body_is_internal_error() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    let (status, body) = get(test_app(&config), &format!("/api/weather?city={KAOHSIUNG_QUERY}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "InternalError");
}

#[tokio::test]
async fn test_slow_upstream_hits_request_timeout_as_json() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(kaohsiung_payload())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&weather)
        .await;

    let mut config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));
    config.server.request_timeout_seconds = 1;
    let (status, body) = get(test_app(&config), &format!("/api/weather?city={KAOHSIUNG_QUERY}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "InternalError");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_reverse_geocode_success() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "jsonv2"))
        .and(query_param("lat", "25.0478"))
        .and(query_param("lon", "121.5319"))
        .and(query_param("accept-language", "zh-TW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "county": "新北市", "country": "臺灣" }
        })))
        .expect(1)
        .mount(&geocoding)
        .await;

    let config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);
    let (status, body) = get(test_app(&config), "/api/reverse-geocode?lat=25.0478&lng=121.5319").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "city": "新北市" }));
}

#[tokio::test]
async fn test_reverse_geocode_normalizes_legacy_glyph() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "city": "台北市", "city_district": "中正區" }
        })))
        .mount(&geocoding)
        .await;

    let config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);
    let (status, body) = get(test_app(&config), "/api/reverse-geocode?lat=25.04&lng=121.51").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "臺北市");
}

#[tokio::test]
async fn test_reverse_geocode_state_only() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "state": "臺灣省", "country": "臺灣" }
        })))
        .mount(&geocoding)
        .await;

    for order in [AddressOrder::Detailed, AddressOrder::Simple] {
        let mut config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);
        config.geocoding.address_order = order;
        let (status, body) = get(test_app(&config), "/api/reverse-geocode?lat=23.9&lng=121.6").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], "臺灣省");
    }
}

#[tokio::test]
async fn test_reverse_geocode_simple_order_prefers_city() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "county": "新北市", "city": "台南市" }
        })))
        .mount(&geocoding)
        .await;

    let mut config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);
    config.geocoding.address_order = AddressOrder::Simple;
    let (_, body) = get(test_app(&config), "/api/reverse-geocode?lat=23.0&lng=120.2").await;

    assert_eq!(body["city"], "臺南市");
}

#[tokio::test]
async fn test_reverse_geocode_no_match() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "country": "臺灣", "country_code": "tw" }
        })))
        .mount(&geocoding)
        .await;

    let config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);
    let (status, body) = get(test_app(&config), "/api/reverse-geocode?lat=0&lng=0").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_reverse_geocode_missing_coordinates_makes_no_call() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "address": {} })))
        .expect(0)
        .mount(&geocoding)
        .await;

    let config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);

    for uri in [
        "/api/reverse-geocode",
        "/api/reverse-geocode?lat=25.0478",
        "/api/reverse-geocode?lng=121.5319",
        "/api/reverse-geocode?lat=&lng=121.5319",
    ] {
        let (status, body) = get(test_app(&config), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "MissingParameter");
    }
}

#[tokio::test]
async fn test_reverse_geocode_upstream_failure() {
    let geocoding = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service temporarily unavailable"))
        .mount(&geocoding)
        .await;

    let config = test_config("http://127.0.0.1:1", &geocoding.uri(), None);
    let (status, body) = get(test_app(&config), "/api/reverse-geocode?lat=25.0&lng=121.5").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "UpstreamError");
    assert_eq!(body["message"], "Service temporarily unavailable");
}

#[tokio::test]
async fn test_health_and_welcome() {
    let config = ProxyConfig::default();

    let (status, body) = get(test_app(&config), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());

    let (status, body) = get(test_app(&config), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_wrong_method_is_json_method_not_allowed() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_payload()))
        .expect(0)
        .mount(&weather)
        .await;

    let config = test_config(&weather.uri(), "http://127.0.0.1:1", Some("test-key"));

    for (verb, uri) in [
        (Method::POST, "/api/weather?city=x"),
        (Method::DELETE, "/api/reverse-geocode?lat=25.0&lng=121.5"),
        (Method::POST, "/health"),
    ] {
        let (status, body) = send(test_app(&config), verb.clone(), uri).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{verb} {uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "MethodNotAllowed");
        assert!(body["message"].as_str().unwrap().contains(verb.as_str()));
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let config = ProxyConfig::default();
    let (status, body) = get(test_app(&config), "/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "NotFound");
}
