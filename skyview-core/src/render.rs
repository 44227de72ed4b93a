//! Plain-text rendering of view state. Every function here is pure.

use std::fmt;

use crate::{
    model::{CurrentConditions, DailyPoint, HourlyPoint},
    view::{CurrentPhase, CurrentView, ForecastView},
};

pub const LOADING: &str = "Loading weather data...";
pub const LOCATING: &str = "Locating...";
pub const NO_FORECAST: &str = "No forecast data available.";
pub const FORECAST_HEADING: &str = "Forecast for the next days";
pub const HOURLY_HEADING: &str = "Hourly forecast";

const ICON_SCHEME: &str = "https:";
const MISSING: &str = "--";

/// Absolute URL for an API icon reference (`//cdn...` fragments get a scheme).
pub fn icon_url(fragment: &str) -> String {
    if fragment.starts_with("http://") || fragment.starts_with("https://") {
        fragment.to_string()
    } else {
        format!("{ICON_SCHEME}{fragment}")
    }
}

/// Nearest integer, halves rounded up (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_temperature(celsius: f64) -> i64 {
    (celsius + 0.5).floor() as i64
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{}°C", round_temperature(celsius))
}

fn or_missing<T: fmt::Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v}{unit}"))
}

pub fn current_panel(current: &CurrentConditions) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);
    if let Some(icon) = &current.icon {
        lines.push(icon_url(icon));
    }
    lines.push(format_temperature(current.temperature_c));
    lines.push(current.location_name.clone());
    lines.push(format!("Cloud cover    {}", or_missing(current.cloud_pct, "%")));
    lines.push(format!("Precipitation  {}", or_missing(current.precip_mm, " mm")));
    lines.push(format!("Wind           {}", or_missing(current.wind_kph, " km/h")));
    lines
}

pub fn hourly_line(point: &HourlyPoint) -> String {
    let mut line = format!(
        "{}  {:>5}",
        point.time.format("%H:00"),
        format_temperature(point.temperature_c)
    );
    if let Some(icon) = &point.icon {
        line.push_str(&format!("  {}", icon_url(icon)));
    }
    line
}

pub fn daily_line(day: &DailyPoint) -> String {
    format!(
        "{:<10} {}°C  {}%",
        day.date.format("%A").to_string(),
        day.avg_temperature_c,
        day.chance_of_rain_pct
    )
}

/// The current-conditions screen.
pub fn current_view(view: &CurrentView) -> String {
    if let Some(error) = view.error() {
        return error.to_string();
    }

    let Some(current) = view.current() else {
        return match view.phase() {
            CurrentPhase::Locating => LOCATING.to_string(),
            CurrentPhase::Loading => LOADING.to_string(),
            _ => String::new(),
        };
    };

    let mut lines = current_panel(current);
    if !view.hourly().is_empty() {
        lines.push(String::new());
        lines.push(HOURLY_HEADING.to_string());
        lines.extend(view.hourly().iter().map(hourly_line));
    }
    lines.join("\n")
}

/// The forecast screen.
pub fn forecast_view(view: &ForecastView) -> String {
    if view.is_loading() {
        return LOADING.to_string();
    }
    if let Some(error) = view.error() {
        return error.to_string();
    }

    let days = view.days_to_show();
    if days.is_empty() {
        return NO_FORECAST.to_string();
    }

    let mut lines = vec![FORECAST_HEADING.to_string()];
    lines.extend(days.iter().map(daily_line));
    lines.join("\n")
}
