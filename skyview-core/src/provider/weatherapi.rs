use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::DEFAULT_BASE_URL,
    error::WeatherError,
    model::{CurrentConditions, DailyPoint, HourlyPoint, Location},
};

use super::WeatherProvider;

const HOUR_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, ?params, "Requesting WeatherAPI");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<WaErrorBody>(&body) {
                Ok(WaErrorBody { error }) => {
                    (error.code, error.message.unwrap_or_else(|| truncate_body(&body)))
                }
                Err(_) => (None, truncate_body(&body)),
            };
            return Err(WeatherError::Remote { status: status.as_u16(), code, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Malformed(format!("{endpoint}: {e} in {}", truncate_body(&body)))
        })
    }

    async fn forecast_days(
        &self,
        location: &Location,
        days: u8,
    ) -> Result<Vec<WaForecastDay>, WeatherError> {
        let q = location.query();
        let days = days.max(1).to_string();

        let parsed: WaForecastResponse = self
            .get_json(
                "forecast.json",
                &[("q", q.as_str()), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")],
            )
            .await?;

        parsed
            .forecast
            .map(|f| f.forecastday)
            .ok_or_else(|| WeatherError::Malformed("forecast.json: missing `forecast`".into()))
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Option<f64>,
    wind_kph: Option<f64>,
    precip_mm: Option<f64>,
    cloud: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: Option<WaLocation>,
    current: Option<WaCurrent>,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time: Option<String>,
    temp_c: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: Option<f64>,
    daily_chance_of_rain: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: Option<String>,
    day: Option<WaDay>,
    #[serde(default)]
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: Option<WaForecast>,
}

impl TryFrom<WaCurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(parsed: WaCurrentResponse) -> Result<Self, Self::Error> {
        let location_name = parsed
            .location
            .and_then(|l| l.name)
            .ok_or_else(|| missing("current.json", "location.name"))?;
        let current = parsed.current.ok_or_else(|| missing("current.json", "current"))?;
        let temperature_c =
            current.temp_c.ok_or_else(|| missing("current.json", "current.temp_c"))?;

        Ok(CurrentConditions {
            location_name,
            temperature_c,
            wind_kph: current.wind_kph,
            precip_mm: current.precip_mm,
            cloud_pct: current.cloud.map(to_percent),
            icon: current.condition.and_then(|c| c.icon),
        })
    }
}

impl TryFrom<WaHour> for HourlyPoint {
    type Error = WeatherError;

    fn try_from(hour: WaHour) -> Result<Self, Self::Error> {
        let raw = hour.time.ok_or_else(|| missing("forecast.json", "hour.time"))?;
        let time = NaiveDateTime::parse_from_str(&raw, HOUR_FORMAT).map_err(|e| {
            WeatherError::Malformed(format!("forecast.json: bad hour time '{raw}': {e}"))
        })?;
        let temperature_c = hour.temp_c.ok_or_else(|| missing("forecast.json", "hour.temp_c"))?;

        Ok(HourlyPoint { time, temperature_c, icon: hour.condition.and_then(|c| c.icon) })
    }
}

impl TryFrom<WaForecastDay> for DailyPoint {
    type Error = WeatherError;

    fn try_from(day: WaForecastDay) -> Result<Self, Self::Error> {
        let raw = day.date.ok_or_else(|| missing("forecast.json", "forecastday.date"))?;
        let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
            WeatherError::Malformed(format!("forecast.json: bad date '{raw}': {e}"))
        })?;
        let summary = day.day.ok_or_else(|| missing("forecast.json", "forecastday.day"))?;
        let avg_temperature_c =
            summary.avgtemp_c.ok_or_else(|| missing("forecast.json", "day.avgtemp_c"))?;

        Ok(DailyPoint {
            date,
            avg_temperature_c,
            chance_of_rain_pct: summary.daily_chance_of_rain.map(to_percent).unwrap_or(0),
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, location: &Location) -> Result<CurrentConditions, WeatherError> {
        let q = location.query();
        let parsed: WaCurrentResponse =
            self.get_json("current.json", &[("q", q.as_str()), ("aqi", "no")]).await?;

        parsed.try_into()
    }

    async fn hourly(&self, location: &Location) -> Result<Vec<HourlyPoint>, WeatherError> {
        let today = self
            .forecast_days(location, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Malformed("forecast.json: no forecast days".into()))?;

        today.hour.into_iter().map(HourlyPoint::try_from).collect()
    }

    async fn daily(&self, location: &Location, days: u8) -> Result<Vec<DailyPoint>, WeatherError> {
        self.forecast_days(location, days).await?.into_iter().map(DailyPoint::try_from).collect()
    }
}

fn missing(endpoint: &str, field: &str) -> WeatherError {
    WeatherError::Malformed(format!("{endpoint}: missing `{field}`"))
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
