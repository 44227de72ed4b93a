//! End-to-end: WeatherAPI mock -> provider -> views -> rendered text.

use serde_json::json;
use skyview_core::{
    CurrentView, ForecastView, Geolocator, Location, LocationError, Navigator, Route,
    provider::weatherapi::WeatherApiProvider, render,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug)]
struct Denied;

#[async_trait::async_trait]
impl Geolocator for Denied {
    async fn locate(&self) -> Result<Location, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

fn forecast_day(date: &str, avg: f64) -> serde_json::Value {
    json!({
        "date": date,
        "day": { "avgtemp_c": avg, "daily_chance_of_rain": 50 },
        "hour": [
            { "time": format!("{date} 08:00"), "temp_c": avg - 1.2, "condition": { "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png" } }
        ]
    })
}

async fn hanoi_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", "Hanoi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": "Hanoi", "country": "Vietnam" },
            "current": {
                "temp_c": 28.4,
                "wind_kph": 9.0,
                "precip_mm": 0.0,
                "cloud": 50,
                "condition": { "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png" }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Hanoi"))
        .and(query_param("days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": "Hanoi" },
            "forecast": { "forecastday": [forecast_day("2024-05-01", 30.0)] }
        })))
        .mount(&server)
        .await;

    let week: Vec<_> = [30.0, 31.0, 29.0, 27.0, 26.0, 25.0, 24.0]
        .iter()
        .enumerate()
        .map(|(i, avg)| forecast_day(&format!("2024-05-{:02}", i + 1), *avg))
        .collect();

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Hanoi"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": "Hanoi" },
            "forecast": { "forecastday": week }
        })))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn search_then_forecast_for_hanoi() {
    let server = hanoi_server().await;
    let provider = WeatherApiProvider::with_base_url("TEST_KEY".into(), &server.uri());
    let mut nav = Navigator::new(Route::Current);

    let mut current = CurrentView::new(nav.view_token());
    current.mount(&Denied, &provider).await;
    assert_eq!(render::current_view(&current), "Enter a city name");

    current.search("Hanoi", &provider).await;
    let screen = render::current_view(&current);
    assert!(screen.contains("28°C"), "{screen}");
    assert!(screen.contains("Hanoi"), "{screen}");
    assert!(screen.contains("https://cdn.weatherapi.com/weather/64x64/day/116.png"), "{screen}");
    assert!(screen.contains("08:00"), "{screen}");

    let handoff = current.handoff_city().map(str::to_owned);
    let token = nav.navigate(Route::Forecast, handoff);
    drop(current);

    let mut forecast = ForecastView::new(token);
    forecast.mount(nav.active().city.as_deref(), &Denied, &provider).await;

    let screen = render::forecast_view(&forecast);
    let temps: Vec<&str> = screen
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();
    assert_eq!(temps, vec!["31°C", "29°C", "27°C", "26°C"]);
}

#[tokio::test]
async fn unknown_city_renders_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .mount(&server)
        .await;

    let provider = WeatherApiProvider::with_base_url("TEST_KEY".into(), &server.uri());
    let nav = Navigator::new(Route::Current);
    let mut current = CurrentView::new(nav.view_token());

    current.search("Atlantis", &provider).await;

    assert_eq!(render::current_view(&current), "City not found. Please try again.");
    assert!(current.current().is_none());
}
