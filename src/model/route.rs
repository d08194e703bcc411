use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use super::draw::Season;

/// First season offered by the season selector.
pub const FIRST_SEASON: Season = 2003;

fn route_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/(?P<tournament>[A-Za-z0-9_]+)/(?P<stage>[A-Za-z0-9_]+)(?:/(?P<season>[^/]+))?/?$")
            .unwrap_or_else(|e| unreachable!("route pattern is a literal: {e}"))
    })
}

/// Parameters matched from a `/{tournament}/{stage}[/{season}]` path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteParams {
    pub tournament: String,
    pub stage: String,
    pub season: Option<Season>,
}

impl RouteParams {
    #[must_use]
    pub fn new(tournament: impl Into<String>, stage: impl Into<String>, season: Option<Season>) -> Self {
        Self {
            tournament: tournament.into(),
            stage: stage.into(),
            season,
        }
    }

    /// Returns `None` if the path does not name a tournament and stage. A
    /// season segment that is not a number is treated as absent.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let caps = route_regex().captures(path)?;
        Some(Self {
            tournament: caps["tournament"].to_string(),
            stage: caps["stage"].to_string(),
            season: caps
                .name("season")
                .and_then(|m| m.as_str().parse::<Season>().ok()),
        })
    }

    #[must_use]
    pub fn season_or(&self, default_season: Season) -> Season {
        self.season.unwrap_or(default_season)
    }

    #[must_use]
    pub fn view(&self) -> Option<DrawView> {
        DrawView::from_stage(&self.stage)
    }

    #[must_use]
    pub fn to_path(&self) -> String {
        match self.season {
            Some(season) => format!("/{}/{}/{season}", self.tournament, self.stage),
            None => format!("/{}/{}", self.tournament, self.stage),
        }
    }

    /// The route this change navigates to.
    #[must_use]
    pub fn with_change(change: &SeasonChange) -> Self {
        Self::new(change.tournament.clone(), change.stage.clone(), change.season)
    }
}

/// Request to point the route at another (tournament, stage, season).
/// `season: None` lets the route fall back to its default season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonChange {
    pub tournament: String,
    pub stage: String,
    pub season: Option<Season>,
}

impl SeasonChange {
    /// Parses a season selector value of the form `cl-gs-2020`.
    #[must_use]
    pub fn from_selector_value(value: &str) -> Option<Self> {
        let mut parts = value.splitn(3, '-');
        let tournament = parts.next().filter(|s| !s.is_empty())?;
        let stage = parts.next().filter(|s| !s.is_empty())?;
        let season = parts.next()?.parse::<Season>().ok()?;
        Some(Self {
            tournament: tournament.to_string(),
            stage: stage.to_string(),
            season: Some(season),
        })
    }
}

/// Draw view selected by the matched sub-route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrawView {
    GroupStage,
    Last16,
}

impl DrawView {
    #[must_use]
    pub fn from_stage(stage: &str) -> Option<Self> {
        match stage {
            "gs" => Some(Self::GroupStage),
            "last16" => Some(Self::Last16),
            _ => None,
        }
    }
}

impl fmt::Display for DrawView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawView::GroupStage => write!(f, "gs"),
            DrawView::Last16 => write!(f, "last16"),
        }
    }
}

/// One entry of the season selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonOption {
    pub value: String,
    pub label: String,
    pub season: Season,
}

/// Selector entries from the default season back to `FIRST_SEASON`.
#[must_use]
pub fn season_options(tournament: &str, stage: &str, default_season: Season) -> Vec<SeasonOption> {
    (FIRST_SEASON..=default_season)
        .rev()
        .map(|season| SeasonOption {
            value: format!("{tournament}-{stage}-{season}"),
            label: format!("{}/{:02}", season, (season + 1) % 100),
            season,
        })
        .collect()
}
