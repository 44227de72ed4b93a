use crate::{
    error::{LocationError, WeatherError},
    geolocation::Geolocator,
    model::{CurrentConditions, HourlyPoint, Location},
    provider::WeatherProvider,
};
use tokio_util::sync::CancellationToken;

use super::{LoadGuard, LoadTicket, PROMPT_CITY, ViewScope, display_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentPhase {
    /// Not mounted yet.
    Idle,
    Locating,
    Loading,
    Ready,
    /// Geolocation failed; waiting for a typed city.
    Prompt,
    Failed,
}

/// Result of the two sequential requests behind the current-conditions screen.
#[derive(Debug)]
pub enum CurrentFetch {
    Failed(WeatherError),
    /// Current conditions arrived but the hourly request failed.
    Partial { current: CurrentConditions, error: WeatherError },
    Complete { current: CurrentConditions, hourly: Vec<HourlyPoint> },
}

/// Current conditions first, then today's hours.
pub async fn fetch_current(provider: &dyn WeatherProvider, location: &Location) -> CurrentFetch {
    let current = match provider.current(location).await {
        Ok(current) => current,
        Err(error) => return CurrentFetch::Failed(error),
    };

    match provider.hourly(location).await {
        Ok(hourly) => CurrentFetch::Complete { current, hourly },
        Err(error) => CurrentFetch::Partial { current, error },
    }
}

#[derive(Debug)]
pub struct CurrentView {
    scope: ViewScope,
    guard: LoadGuard,
    phase: CurrentPhase,
    current: Option<CurrentConditions>,
    hourly: Vec<HourlyPoint>,
    error: Option<String>,
    resolved_city: Option<String>,
}

impl CurrentView {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            scope: ViewScope::new(token),
            guard: LoadGuard::default(),
            phase: CurrentPhase::Idle,
            current: None,
            hourly: Vec::new(),
            error: None,
            resolved_city: None,
        }
    }

    /// Initial load: geolocate, then fetch for the coordinates.
    pub async fn mount(&mut self, geolocator: &dyn Geolocator, provider: &dyn WeatherProvider) {
        self.phase = CurrentPhase::Locating;

        let Some(located) = self.scope.run(geolocator.locate()).await else {
            tracing::debug!("Current view unmounted while locating");
            return;
        };

        match located {
            Ok(location) => self.load(location, provider).await,
            Err(err) => self.location_failed(err),
        }
    }

    pub fn location_failed(&mut self, err: LocationError) {
        tracing::warn!(error = %err, "Could not determine location");
        self.error = Some(PROMPT_CITY.to_string());
        self.phase = CurrentPhase::Prompt;
    }

    /// Fetch for a typed city. Blank input is ignored.
    pub async fn search(&mut self, city: &str, provider: &dyn WeatherProvider) {
        match Location::city(city) {
            Ok(location) => self.load(location, provider).await,
            Err(_) => tracing::debug!("Ignoring blank city search"),
        }
    }

    pub async fn load(&mut self, location: Location, provider: &dyn WeatherProvider) {
        let ticket = self.begin_load();

        let Some(outcome) = self.scope.run(fetch_current(provider, &location)).await else {
            tracing::debug!(%location, "Current view unmounted during fetch");
            return;
        };

        self.finish_load(ticket, &location, outcome);
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.phase = CurrentPhase::Loading;
        self.guard.issue()
    }

    /// Apply a fetch outcome. Returns `false` when a newer load superseded `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        location: &Location,
        outcome: CurrentFetch,
    ) -> bool {
        if !self.guard.is_current(ticket) {
            tracing::debug!(%location, "Dropping superseded current-weather result");
            return false;
        }

        match outcome {
            CurrentFetch::Complete { current, hourly } => {
                self.current = Some(current);
                self.hourly = hourly;
                self.error = None;
                self.resolved_city = location.city_name().map(str::to_owned);
                self.phase = CurrentPhase::Ready;
            }
            CurrentFetch::Partial { current, error } => {
                self.current = Some(current);
                self.resolved_city = location.city_name().map(str::to_owned);
                self.fail(location, error);
            }
            CurrentFetch::Failed(error) => self.fail(location, error),
        }

        true
    }

    fn fail(&mut self, location: &Location, error: WeatherError) {
        tracing::warn!(%location, error = %error, "Weather fetch failed");
        self.error = Some(display_message(&error).to_string());
        self.phase = CurrentPhase::Failed;
    }

    pub fn phase(&self) -> CurrentPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn hourly(&self) -> &[HourlyPoint] {
        &self.hourly
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// City to hand over to the forecast screen, if the data came from a name search.
    pub fn handoff_city(&self) -> Option<&str> {
        self.resolved_city.as_deref()
    }

    pub fn token(&self) -> CancellationToken {
        self.scope.token()
    }
}
