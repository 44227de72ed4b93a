//! Core library for the `skyview` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location resolution (geolocation with manual city fallback)
//! - The WeatherAPI.com client behind the [`WeatherProvider`] trait
//! - State machines for the current-conditions and forecast screens
//! - Plain-text rendering and the two-route navigation shell
//!
//! It is used by `skyview-cli`, but a GUI front end can drive the same views.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod router;
pub mod view;

pub use config::{Config, GeolocationConfig};
pub use error::{LocationError, WeatherError};
pub use geolocation::{Geolocator, geolocator_from_config};
pub use model::{CurrentConditions, DailyPoint, HourlyPoint, Location};
pub use provider::{WeatherProvider, provider_from_config};
pub use router::{Navigation, Navigator, Route};
pub use view::{CurrentView, ForecastView};
