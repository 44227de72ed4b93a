use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WeatherError;

/// What to fetch weather for: a free-text city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl Location {
    /// Build a city location. Surrounding whitespace is dropped; blank input is rejected.
    pub fn city(name: &str) -> Result<Self, WeatherError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::InvalidLocation("city name is empty".into()));
        }
        Ok(Location::City(trimmed.to_string()))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(WeatherError::InvalidLocation(format!(
                "coordinates must be finite, got {latitude},{longitude}"
            )));
        }
        Ok(Location::Coordinates { latitude, longitude })
    }

    /// Value for the API's `q` query parameter.
    pub fn query(&self) -> String {
        match self {
            Location::City(name) => name.clone(),
            Location::Coordinates { latitude, longitude } => format!("{latitude},{longitude}"),
        }
    }

    pub fn city_name(&self) -> Option<&str> {
        match self {
            Location::City(name) => Some(name),
            Location::Coordinates { .. } => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates { latitude, longitude } => write!(f, "({latitude}, {longitude})"),
        }
    }
}

/// Snapshot of the weather "now" at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature_c: f64,
    pub wind_kph: Option<f64>,
    pub precip_mm: Option<f64>,
    pub cloud_pct: Option<u8>,
    /// Icon reference as the API returns it, usually a scheme-less `//cdn...` fragment.
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub avg_temperature_c: f64,
    pub chance_of_rain_pct: u8,
}
