//! Interactive two-screen client: current conditions at `/`, forecast at `/forecast`.

use anyhow::Context;
use inquire::{InquireError, Select, Text};
use skyview_core::{
    CurrentView, ForecastView, Geolocator, Navigator, Route, WeatherProvider, render,
};
use std::{fmt, future::Future};
use tokio_util::sync::CancellationToken;

/// Await `fut`, cancelling `token` if Ctrl-C arrives first.
pub async fn interruptible<F: Future>(token: CancellationToken, fut: F) -> F::Output {
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let out = fut.await;
    watcher.abort();
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentAction {
    Search,
    Forecast,
    Quit,
}

impl fmt::Display for CurrentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurrentAction::Search => "Search a city",
            CurrentAction::Forecast => "Next days forecast",
            CurrentAction::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForecastAction {
    Back,
    Quit,
}

impl fmt::Display for ForecastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForecastAction::Back => "Back to current weather",
            ForecastAction::Quit => "Quit",
        })
    }
}

pub const INTERRUPTED: &str = "Interrupted.";

/// The rendered screen, or a short notice when Ctrl-C cancelled the view.
pub fn unless_interrupted(token: &CancellationToken, screen: impl FnOnce() -> String) -> String {
    if token.is_cancelled() { INTERRUPTED.to_string() } else { screen() }
}

type Next = Option<(Route, Option<String>)>;

pub async fn run(
    start: Route,
    city: Option<String>,
    geolocator: &dyn Geolocator,
    provider: &dyn WeatherProvider,
) -> anyhow::Result<()> {
    let mut nav = Navigator::new(start);
    nav.navigate(start, city);

    loop {
        let next = match nav.active().route {
            Route::Current => current_screen(&nav, geolocator, provider).await?,
            Route::Forecast => forecast_screen(&nav, geolocator, provider).await?,
        };

        match next {
            Some((route, city)) => {
                nav.navigate(route, city);
            }
            None => {
                nav.shutdown();
                return Ok(());
            }
        }
    }
}

async fn current_screen(
    nav: &Navigator,
    geolocator: &dyn Geolocator,
    provider: &dyn WeatherProvider,
) -> anyhow::Result<Next> {
    let mut view = CurrentView::new(nav.view_token());
    let token = view.token();

    match nav.active().city.as_deref() {
        Some(city) => interruptible(token.clone(), view.search(city, provider)).await,
        None => interruptible(token.clone(), view.mount(geolocator, provider)).await,
    }

    loop {
        if token.is_cancelled() {
            println!("{INTERRUPTED}");
            return Ok(None);
        }
        println!("\n{}\n", render::current_view(&view));

        let actions = vec![CurrentAction::Search, CurrentAction::Forecast, CurrentAction::Quit];
        let Some(action) = ask(Select::new("What next?", actions).prompt())? else {
            return Ok(None);
        };

        match action {
            CurrentAction::Search => {
                let Some(city) = ask(Text::new("City:").prompt())? else {
                    continue;
                };
                interruptible(token.clone(), view.search(&city, provider)).await;
            }
            CurrentAction::Forecast => {
                return Ok(Some((Route::Forecast, view.handoff_city().map(str::to_owned))));
            }
            CurrentAction::Quit => return Ok(None),
        }
    }
}

async fn forecast_screen(
    nav: &Navigator,
    geolocator: &dyn Geolocator,
    provider: &dyn WeatherProvider,
) -> anyhow::Result<Next> {
    let mut view = ForecastView::new(nav.view_token());
    let token = view.token();

    println!("\n{}", render::LOADING);
    interruptible(token.clone(), view.mount(nav.active().city.as_deref(), geolocator, provider))
        .await;

    if token.is_cancelled() {
        println!("{INTERRUPTED}");
        return Ok(None);
    }
    println!("\n{}\n", render::forecast_view(&view));

    let actions = vec![ForecastAction::Back, ForecastAction::Quit];
    match ask(Select::new("What next?", actions).prompt())? {
        Some(ForecastAction::Back) => Ok(Some((Route::Current, None))),
        Some(ForecastAction::Quit) | None => Ok(None),
    }
}

/// Esc / Ctrl-C at a prompt means "leave", not an error.
fn ask<T>(answer: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read from the terminal"),
    }
}
