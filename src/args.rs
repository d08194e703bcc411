use clap::Parser;
use std::time::Duration;

use crate::model::{RouteParams, Season, current_season};

pub const DEFAULT_ERROR_MESSAGE: &str = "Could not fetch data";
pub const DEFAULT_RECOVERY_DELAY_MS: u64 = 1000;

#[must_use]
pub fn args_checks() -> Args {
    Args::parse()
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server hosting `data/{season}.json` draw documents and `flags/*.svg`.
    #[arg(
        short = 'b',
        long,
        value_name = "BASE_URL",
        default_value = "http://127.0.0.1:8080",
        value_parser = check_base_url
    )]
    pub base_url: String,
    /// Route to open, e.g. /cl/gs/2020. Without a season the default season is shown.
    #[arg(
        short = 'p',
        long,
        value_name = "ROUTE",
        default_value = "/cl/gs",
        value_parser = check_route_path
    )]
    pub path: RouteParams,
    /// Season shown when the route has none. Defaults to the season of today's date.
    #[arg(short = 's', long, value_name = "SEASON")]
    pub default_season: Option<Season>,
    /// Pause after a failed fetch before rolling back to the last good season.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = DEFAULT_RECOVERY_DELAY_MS)]
    pub recovery_delay_ms: u64,
    /// Report the network as unreachable.
    #[arg(long)]
    pub offline: bool,
    /// Print the published snapshot as json instead of markup.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    #[must_use]
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            default_season: self.default_season.unwrap_or_else(current_season),
            recovery_delay: Duration::from_millis(self.recovery_delay_ms),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Settings injected into a `SeasonDataController` at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub default_season: Season,
    pub recovery_delay: Duration,
    /// Shown instead of the underlying error when a fetch fails.
    pub error_message: String,
}

impl ControllerConfig {
    #[must_use]
    pub fn new(default_season: Season) -> Self {
        Self {
            default_season,
            recovery_delay: Duration::from_millis(DEFAULT_RECOVERY_DELAY_MS),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(current_season())
    }
}

/// # Errors
///
/// Will return `Err` if the value is not an http(s) url
pub fn check_base_url(value: &str) -> Result<String, String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(format!("The base url '{value}' must start with http:// or https://."))
    }
}

/// # Errors
///
/// Will return `Err` if the value is not a `/{tournament}/{stage}[/{season}]` path
pub fn check_route_path(value: &str) -> Result<RouteParams, String> {
    RouteParams::parse(value)
        .ok_or_else(|| format!("The route '{value}' is not of the form /tournament/stage[/season]."))
}
