use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, DailyPoint, HourlyPoint, Location},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Number of days the forecast screen asks for.
pub const WEEK_DAYS: u8 = 7;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Conditions right now.
    async fn current(&self, location: &Location) -> Result<CurrentConditions, WeatherError>;

    /// Today's hour-by-hour breakdown.
    async fn hourly(&self, location: &Location) -> Result<Vec<HourlyPoint>, WeatherError>;

    /// Per-day summaries starting today, at most `days` of them.
    async fn daily(&self, location: &Location, days: u8) -> Result<Vec<DailyPoint>, WeatherError>;
}

/// Construct the WeatherAPI provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?.to_owned();

    let provider = match config.base_url.as_deref() {
        Some(base_url) => WeatherApiProvider::with_base_url(api_key, base_url),
        None => WeatherApiProvider::new(api_key),
    };
    Ok(Box::new(provider))
}
