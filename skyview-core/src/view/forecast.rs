use crate::{
    error::{LocationError, WeatherError},
    geolocation::Geolocator,
    model::{DailyPoint, Location},
    provider::{WEEK_DAYS, WeatherProvider},
};
use tokio_util::sync::CancellationToken;

use super::{LoadGuard, LoadTicket, PROMPT_CITY, ViewScope, display_message};

/// Index range of the series shown on screen: skip today, show the next four days.
const FIRST_SHOWN: usize = 1;
const SHOWN_DAYS: usize = 4;

#[derive(Debug)]
pub struct ForecastView {
    scope: ViewScope,
    guard: LoadGuard,
    loading: bool,
    days: Vec<DailyPoint>,
    error: Option<String>,
}

impl ForecastView {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            scope: ViewScope::new(token),
            guard: LoadGuard::default(),
            loading: true,
            days: Vec::new(),
            error: None,
        }
    }

    /// Load the week for the handed-over city, or for the geolocated position when
    /// no (non-blank) city was handed over.
    pub async fn mount(
        &mut self,
        handoff_city: Option<&str>,
        geolocator: &dyn Geolocator,
        provider: &dyn WeatherProvider,
    ) {
        if let Some(Ok(location)) = handoff_city.map(Location::city) {
            return self.load(location, provider).await;
        }

        let Some(located) = self.scope.run(geolocator.locate()).await else {
            tracing::debug!("Forecast view unmounted while locating");
            return;
        };

        match located {
            Ok(location) => self.load(location, provider).await,
            Err(err) => self.location_failed(err),
        }
    }

    pub fn location_failed(&mut self, err: LocationError) {
        tracing::warn!(error = %err, "Could not determine location for forecast");
        self.error = Some(PROMPT_CITY.to_string());
        self.loading = false;
    }

    pub async fn load(&mut self, location: Location, provider: &dyn WeatherProvider) {
        let ticket = self.begin_load();

        let Some(result) = self.scope.run(provider.daily(&location, WEEK_DAYS)).await else {
            tracing::debug!(%location, "Forecast view unmounted during fetch");
            return;
        };

        self.finish_load(ticket, &location, result);
    }

    /// Apply a fetch result. Returns `false` when a newer load superseded `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        location: &Location,
        result: Result<Vec<DailyPoint>, WeatherError>,
    ) -> bool {
        if !self.guard.is_current(ticket) {
            tracing::debug!(%location, "Dropping superseded forecast result");
            return false;
        }

        match result {
            Ok(days) => {
                self.days = days;
                self.error = None;
            }
            Err(error) => {
                tracing::warn!(%location, error = %error, "Forecast fetch failed");
                self.error = Some(display_message(&error).to_string());
            }
        }
        self.loading = false;

        true
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.guard.issue()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Days 2 to 5 of the series; empty when fewer than two days came back.
    pub fn days_to_show(&self) -> &[DailyPoint] {
        if self.days.len() <= FIRST_SHOWN {
            return &[];
        }
        let end = self.days.len().min(FIRST_SHOWN + SHOWN_DAYS);
        &self.days[FIRST_SHOWN..end]
    }

    pub fn token(&self) -> CancellationToken {
        self.scope.token()
    }
}
