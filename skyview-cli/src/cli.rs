use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Select};
use skyview_core::{
    Config, CurrentView, ForecastView, GeolocationConfig, Navigator, Route, geolocator_from_config,
    provider_from_config, render,
};

use crate::shell;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Current weather and the next days' forecast")]
pub struct Cli {
    /// Log diagnostics at debug level (stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the WeatherAPI key and how the current position is found.
    Configure,

    /// Show current conditions and today's hours.
    Now {
        /// City to look up; without it the current position is used.
        #[arg(long)]
        city: Option<String>,
    },

    /// Show the forecast for the next days.
    Forecast {
        /// City to look up; without it the current position is used.
        #[arg(long)]
        city: Option<String>,
    },

    /// Interactive two-screen client.
    App {
        /// Screen to open first: "/" or "/forecast".
        #[arg(long, default_value = "/")]
        path: String,

        /// City handed to the first screen.
        #[arg(long)]
        city: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Now { city } => {
                let config = load_config()?;
                let provider = provider_from_config(&config)?;
                let geolocator = geolocator_from_config(&config)?;
                let nav = Navigator::new(Route::Current);

                let mut view = CurrentView::new(nav.view_token());
                let token = view.token();
                match city {
                    Some(city) => {
                        shell::interruptible(token.clone(), view.search(&city, provider.as_ref()))
                            .await
                    }
                    None => {
                        let mount = view.mount(geolocator.as_ref(), provider.as_ref());
                        shell::interruptible(token.clone(), mount).await
                    }
                }

                println!("{}", shell::unless_interrupted(&token, || render::current_view(&view)));
                Ok(())
            }
            Command::Forecast { city } => {
                let config = load_config()?;
                let provider = provider_from_config(&config)?;
                let geolocator = geolocator_from_config(&config)?;
                let nav = Navigator::new(Route::Forecast);

                let mut view = ForecastView::new(nav.view_token());
                let token = view.token();
                let mount = view.mount(city.as_deref(), geolocator.as_ref(), provider.as_ref());
                shell::interruptible(token.clone(), mount).await;

                println!("{}", shell::unless_interrupted(&token, || render::forecast_view(&view)));
                Ok(())
            }
            Command::App { path, city } => {
                let route = Route::try_from(path.as_str())?;
                let config = load_config()?;
                let provider = provider_from_config(&config)?;
                let geolocator = geolocator_from_config(&config)?;

                shell::run(route, city, geolocator.as_ref(), provider.as_ref()).await
            }
        }
    }
}

/// Config file values with `SKYVIEW_*` environment overrides applied.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?.with_env_overrides(|name| std::env::var(name).ok());
    tracing::debug!(
        base_url = config.base_url(),
        geolocation = ?config.geolocation,
        "Loaded configuration"
    );
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI key:")
        .without_confirmation()
        .with_help_message("Get one at https://www.weatherapi.com/")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    let modes = vec!["ip", "fixed", "off"];
    let mode = Select::new("How should your position be found?", modes)
        .with_help_message(
            "ip: approximate lookup, fixed: coordinates you enter, off: always ask for a city",
        )
        .prompt()
        .context("Failed to read geolocation mode")?;

    config.geolocation = match mode {
        "fixed" => {
            let latitude = CustomType::<f64>::new("Latitude:")
                .with_error_message("Please type a number, e.g. 21.03")
                .prompt()
                .context("Failed to read latitude")?;
            let longitude = CustomType::<f64>::new("Longitude:")
                .with_error_message("Please type a number, e.g. 105.85")
                .prompt()
                .context("Failed to read longitude")?;
            GeolocationConfig::Fixed { latitude, longitude }
        }
        "off" => GeolocationConfig::Off,
        _ => GeolocationConfig::Ip { endpoint: None },
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_now_with_city() {
        let cli = Cli::parse_from(["skyview", "now", "--city", "Hanoi"]);
        assert!(matches!(cli.command, Command::Now { city: Some(ref c) } if c == "Hanoi"));
    }

    #[test]
    fn app_defaults_to_root_path() {
        let cli = Cli::parse_from(["skyview", "-v", "app"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::App { ref path, city: None } if path == "/"));
    }
}
