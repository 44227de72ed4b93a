use std::{convert::TryFrom, fmt};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: current conditions plus today's hours.
    Current,
    /// `/forecast`: the next days.
    Forecast,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Current => "/",
            Route::Forecast => "/forecast",
        }
    }

    pub const fn all() -> &'static [Route] {
        &[Route::Current, Route::Forecast]
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            other => other,
        };

        Route::all().iter().copied().find(|r| r.path() == normalized)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl TryFrom<&str> for Route {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Route::from_path(value).ok_or_else(|| {
            anyhow::anyhow!("Unknown route '{value}'. Known routes: /, /forecast.")
        })
    }
}

/// Where the shell is, plus the state handed over by the previous screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub city: Option<String>,
}

/// Tracks the active route and owns the cancellation token of the mounted view.
#[derive(Debug)]
pub struct Navigator {
    root: CancellationToken,
    view_token: CancellationToken,
    active: Navigation,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        let root = CancellationToken::new();
        let view_token = root.child_token();

        Self { root, view_token, active: Navigation { route: start, city: None } }
    }

    /// Unmount the current view and switch to `route`; returns the token for the next view.
    pub fn navigate(&mut self, route: Route, city: Option<String>) -> CancellationToken {
        self.view_token.cancel();
        self.view_token = self.root.child_token();

        let city = city.filter(|c| !c.trim().is_empty());
        tracing::debug!(from = %self.active.route, to = %route, ?city, "Navigating");
        self.active = Navigation { route, city };

        self.view_token.clone()
    }

    pub fn active(&self) -> &Navigation {
        &self.active
    }

    pub fn view_token(&self) -> CancellationToken {
        self.view_token.clone()
    }

    /// Cancel whatever view is mounted and refuse to mount new ones.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}
