//! One-shot "where am I" lookups.
//!
//! A [`Geolocator`] answers once with a coordinate pair or a [`LocationError`];
//! there is no continuous tracking and no automatic retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{
    config::{Config, DEFAULT_IP_ENDPOINT, GeolocationConfig},
    error::LocationError,
    model::Location,
};

const LOOKUP_TIMEOUT_SECS: u64 = 10;

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Location, LocationError>;
}

/// Approximate position of this host from an IP geolocation service
/// (response shape of `ip-api.com/json`).
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    endpoint: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, Duration::from_secs(LOOKUP_TIMEOUT_SECS))
    }

    /// Lookups slower than `timeout` fail with [`LocationError::Timeout`].
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { endpoint: endpoint.into(), http })
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Location, LocationError> {
        tracing::debug!(endpoint = %self.endpoint, "Looking up position by IP");

        let res = self.http.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Unavailable(e.to_string())
            }
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!(
                "geolocation service returned status {status}"
            )));
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Other(format!("unreadable geolocation response: {e}"))
            }
        })?;

        if body.status != "success" {
            return Err(LocationError::Other(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(LocationError::Other("response carried no coordinates".into()));
        };
        Location::coordinates(lat, lon).map_err(|e| LocationError::Other(e.to_string()))
    }
}

/// A position the user pinned in the configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    latitude: f64,
    longitude: f64,
}

impl FixedGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Location, LocationError> {
        Location::coordinates(self.latitude, self.longitude)
            .map_err(|e| LocationError::Other(e.to_string()))
    }
}

/// Geolocation switched off: every lookup fails as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeolocator;

#[async_trait]
impl Geolocator for DisabledGeolocator {
    async fn locate(&self) -> Result<Location, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Construct the geolocator selected in config.
pub fn geolocator_from_config(config: &Config) -> anyhow::Result<Box<dyn Geolocator>> {
    let boxed: Box<dyn Geolocator> = match &config.geolocation {
        GeolocationConfig::Ip { endpoint } => Box::new(IpGeolocator::new(
            endpoint.as_deref().unwrap_or(DEFAULT_IP_ENDPOINT),
        )?),
        GeolocationConfig::Fixed { latitude, longitude } => {
            Box::new(FixedGeolocator::new(*latitude, *longitude))
        }
        GeolocationConfig::Off => Box::new(DisabledGeolocator),
    };

    Ok(boxed)
}
