//! State machines behind the two screens.
//!
//! Each view owns its state and a [`ViewScope`]. Fetches race the scope's
//! cancellation token, and results are applied only when they carry the latest
//! [`LoadTicket`], so a view never changes after it is unmounted and an old
//! response never overwrites a newer one.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::WeatherError;

pub mod current;
pub mod forecast;

pub use current::{CurrentFetch, CurrentPhase, CurrentView};
pub use forecast::ForecastView;

/// Shown when no location could be resolved automatically.
pub const PROMPT_CITY: &str = "Enter a city name";
/// Shown when a request never got an answer.
pub const FETCH_FAILED: &str = "Unable to fetch weather data.";
/// Shown when the API rejected the location or answered with something unusable.
pub const CITY_NOT_FOUND: &str = "City not found. Please try again.";

/// User-facing text for a fetch failure.
pub fn display_message(err: &WeatherError) -> &'static str {
    match err {
        WeatherError::Network(_) => FETCH_FAILED,
        WeatherError::Location(_) => PROMPT_CITY,
        WeatherError::InvalidLocation(_)
        | WeatherError::Remote { .. }
        | WeatherError::Malformed(_) => CITY_NOT_FOUND,
    }
}

/// Identifies one load; only the most recently issued ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub(crate) struct LoadGuard {
    latest: u64,
}

impl LoadGuard {
    pub(crate) fn issue(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub(crate) fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }
}

/// Lifetime of a mounted view. Dropping the scope cancels its token.
#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Drive `fut` unless the view goes away first; `None` means cancelled.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tracing::{Event, Level, Subscriber, subscriber::DefaultGuard};
    use tracing_subscriber::{
        Layer,
        layer::{Context, SubscriberExt},
    };

    use crate::{
        error::{LocationError, WeatherError},
        geolocation::Geolocator,
        model::{CurrentConditions, DailyPoint, HourlyPoint, Location},
        provider::WeatherProvider,
    };

    #[derive(Debug, Clone)]
    pub enum Reply<T> {
        Data(T),
        NotFound,
        Offline,
        Hang,
    }

    #[derive(Debug)]
    pub struct FakeProvider {
        pub current: Reply<CurrentConditions>,
        pub hourly: Reply<Vec<HourlyPoint>>,
        pub daily: Reply<Vec<DailyPoint>>,
        pub calls: AtomicUsize,
        pub last_query: std::sync::Mutex<Option<String>>,
    }

    impl FakeProvider {
        pub fn new() -> Self {
            Self {
                current: Reply::Data(conditions("Hanoi", 28.4)),
                hourly: Reply::Data(vec![hour("2024-05-01 13:00", 29.6)]),
                daily: Reply::Data(week(&[30.0, 31.0, 29.0, 27.0, 26.0, 25.0, 24.0])),
                calls: AtomicUsize::new(0),
                last_query: std::sync::Mutex::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_query(&self) -> Option<String> {
            self.last_query.lock().expect("lock").clone()
        }

        async fn answer<T: Clone>(
            &self,
            location: &Location,
            reply: &Reply<T>,
        ) -> Result<T, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().expect("lock") = Some(location.query());

            match reply {
                Reply::Data(data) => Ok(data.clone()),
                Reply::NotFound => Err(WeatherError::Remote {
                    status: 400,
                    code: Some(1006),
                    message: "No matching location found.".into(),
                }),
                Reply::Offline => Err(offline_error().await),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(&self, location: &Location) -> Result<CurrentConditions, WeatherError> {
            self.answer(location, &self.current).await
        }

        async fn hourly(&self, location: &Location) -> Result<Vec<HourlyPoint>, WeatherError> {
            self.answer(location, &self.hourly).await
        }

        async fn daily(
            &self,
            location: &Location,
            _days: u8,
        ) -> Result<Vec<DailyPoint>, WeatherError> {
            self.answer(location, &self.daily).await
        }
    }

    #[derive(Debug)]
    pub struct FakeGeolocator(pub Result<Location, LocationError>);

    #[async_trait]
    impl Geolocator for FakeGeolocator {
        async fn locate(&self) -> Result<Location, LocationError> {
            self.0.clone()
        }
    }

    pub fn located() -> FakeGeolocator {
        FakeGeolocator(Ok(Location::Coordinates { latitude: 21.03, longitude: 105.85 }))
    }

    pub fn denied() -> FakeGeolocator {
        FakeGeolocator(Err(LocationError::PermissionDenied))
    }

    /// A real transport error: nothing listens on port 1.
    pub async fn offline_error() -> WeatherError {
        reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .expect_err("port 1 must refuse connections")
            .into()
    }

    pub fn conditions(name: &str, temp: f64) -> CurrentConditions {
        CurrentConditions {
            location_name: name.to_string(),
            temperature_c: temp,
            wind_kph: Some(11.2),
            precip_mm: Some(0.3),
            cloud_pct: Some(75),
            icon: Some("//cdn.weatherapi.com/weather/64x64/day/116.png".to_string()),
        }
    }

    pub fn hour(time: &str, temp: f64) -> HourlyPoint {
        HourlyPoint {
            time: NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M").expect("valid time"),
            temperature_c: temp,
            icon: Some("//cdn.weatherapi.com/weather/64x64/day/113.png".to_string()),
        }
    }

    /// WARN events emitted on this thread while the value is alive.
    pub struct Warnings {
        count: Arc<AtomicUsize>,
        _guard: DefaultGuard,
    }

    impl Warnings {
        pub fn capture() -> Self {
            let count = Arc::new(AtomicUsize::new(0));
            let subscriber = tracing_subscriber::registry().with(WarnCounter(count.clone()));
            Self { count, _guard: tracing::subscriber::set_default(subscriber) }
        }

        pub fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Consecutive days starting 2024-05-01 (a Wednesday).
    pub fn week(avg_temps: &[f64]) -> Vec<DailyPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        start
            .iter_days()
            .zip(avg_temps)
            .map(|(date, temp)| DailyPoint {
                date,
                avg_temperature_c: *temp,
                chance_of_rain_pct: 20,
            })
            .collect()
    }
}
