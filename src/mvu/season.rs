use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use super::error::FetchError;
use crate::args::ControllerConfig;
use crate::controller::assets::{AssetLoader, AssetPrefetcher};
use crate::controller::draw::{DrawCache, DrawDataSource};
use crate::controller::router::SeasonRouter;
use crate::model::{DrawData, FlagUrls, RouteParams, Season, SeasonChange};

/// Token handed to the draw view; a new value discards any view-local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RenderKey(u64);

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draw-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Nothing in flight and nothing failing.
    Idle,
    /// A fetch and prefetch sequence is running.
    Waiting,
    /// The latest sequence published its draw.
    Ready,
    /// The latest sequence failed; carries the user-facing message.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SeasonModel {
    pub config: ControllerConfig,
    pub route: RouteParams,
    pub reset_token: Option<String>,
    /// Season of the most recent request, published or not.
    pub requested_season: Option<Season>,
    /// Sequence number of the most recent request.
    pub seq: u64,
    pub render_key: RenderKey,
    pub data: Option<Arc<DrawData>>,
    pub status: Status,
    /// Season of the published `data`; rollback target after a failure.
    pub current_season: Season,
    pub online: bool,
    next_key: u64,
}

impl SeasonModel {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let current_season = config.default_season;
        Self {
            route: RouteParams::new("cl", "gs", None),
            config,
            reset_token: None,
            requested_season: None,
            seq: 0,
            render_key: RenderKey(0),
            data: None,
            status: Status::Idle,
            current_season,
            online: true,
            next_key: 1,
        }
    }

    fn regenerate_key(&mut self) {
        self.render_key = RenderKey(self.next_key);
        self.next_key += 1;
    }

    fn is_latest(&self, seq: u64) -> bool {
        seq == self.seq
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            render_key: self.render_key,
            data: self.data.clone(),
            status: self.status.clone(),
            current_season: self.current_season,
            requested_season: self.requested_season,
            route: self.route.clone(),
            online: self.online,
        }
    }
}

/// What the controller publishes to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub render_key: RenderKey,
    pub data: Option<Arc<DrawData>>,
    pub status: Status,
    pub current_season: Season,
    pub requested_season: Option<Season>,
    pub route: RouteParams,
    pub online: bool,
}

#[derive(Debug, Clone)]
pub enum Msg {
    /// Route entered or changed: mount, navigation, or "restart".
    Navigate { route: RouteParams, reset_token: String },
    SeasonRequested(Season),
    /// Re-request the latest requested season.
    Retry,
    ResetRequested(String),
    DrawFetched { seq: u64, season: Season, draw: Arc<DrawData> },
    FetchFailed { seq: u64, season: Season, error: FetchError },
    AssetsWarmed { seq: u64, season: Season, draw: Arc<DrawData> },
    /// Rollback timer fired. The target is the published season unless it is
    /// the default; with nothing published `current_season` is the default anyway.
    RecoveryElapsed { seq: u64 },
    ReachabilityChanged(bool),
}

#[derive(Debug, Clone)]
pub enum Effect {
    CancelRecovery,
    FetchDraw { seq: u64, season: Season },
    WarmAssets { seq: u64, season: Season, draw: Arc<DrawData> },
    LogFailure { season: Season, error: FetchError },
    ScheduleRecovery { seq: u64, delay: Duration },
    ChangeSeason(SeasonChange),
}

pub fn update(model: &mut SeasonModel, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::Navigate { route, reset_token } => {
            let season = route.season_or(model.config.default_season);
            let season_changed = model.requested_season != Some(season);
            let token_changed = model.reset_token.as_deref() != Some(reset_token.as_str());
            model.route = route;
            model.reset_token = Some(reset_token);
            if season_changed {
                request(model, season)
            } else {
                if token_changed {
                    model.regenerate_key();
                }
                vec![]
            }
        }
        Msg::SeasonRequested(season) => request(model, season),
        Msg::Retry => {
            let season = model
                .requested_season
                .unwrap_or(model.config.default_season);
            request(model, season)
        }
        Msg::ResetRequested(token) => {
            if model.reset_token.as_deref() != Some(token.as_str()) {
                model.reset_token = Some(token);
                model.regenerate_key();
            }
            vec![]
        }
        Msg::DrawFetched { seq, season, draw } => {
            if !model.is_latest(seq) {
                return vec![];
            }
            vec![Effect::WarmAssets { seq, season, draw }]
        }
        Msg::AssetsWarmed { seq, season, draw } => {
            if !model.is_latest(seq) {
                return vec![];
            }
            model.data = Some(draw);
            model.current_season = season;
            model.status = Status::Ready;
            model.regenerate_key();
            vec![]
        }
        Msg::FetchFailed { seq, season, error } => {
            if !model.is_latest(seq) {
                return vec![];
            }
            model.status = Status::Failed(model.config.error_message.clone());
            vec![
                Effect::LogFailure { season, error },
                Effect::ScheduleRecovery {
                    seq,
                    delay: model.config.recovery_delay,
                },
            ]
        }
        Msg::RecoveryElapsed { seq } => {
            if !model.is_latest(seq) || !matches!(model.status, Status::Failed(_)) {
                return vec![];
            }
            let season = match model.data {
                Some(_) if model.current_season != model.config.default_season => {
                    Some(model.current_season)
                }
                _ => None,
            };
            model.status = if model.data.is_some() {
                Status::Ready
            } else {
                Status::Idle
            };
            vec![Effect::ChangeSeason(SeasonChange {
                tournament: model.route.tournament.clone(),
                stage: model.route.stage.clone(),
                season,
            })]
        }
        Msg::ReachabilityChanged(online) => {
            model.online = online;
            vec![]
        }
    }
}

// A newer request supersedes whatever is in flight, including a pending rollback.
fn request(model: &mut SeasonModel, season: Season) -> Vec<Effect> {
    model.seq += 1;
    model.requested_season = Some(season);
    model.status = Status::Waiting;
    vec![
        Effect::CancelRecovery,
        Effect::FetchDraw {
            seq: model.seq,
            season,
        },
    ]
}

/// Collaborators the effects run against.
#[derive(Clone)]
pub struct Deps {
    pub cache: Arc<DrawCache>,
    pub prefetcher: AssetPrefetcher,
    pub flags: FlagUrls,
    pub router: Arc<dyn SeasonRouter>,
}

impl Deps {
    #[must_use]
    pub fn new(
        source: Arc<dyn DrawDataSource>,
        loader: Arc<dyn AssetLoader>,
        flags: FlagUrls,
        router: Arc<dyn SeasonRouter>,
    ) -> Self {
        Self {
            cache: Arc::new(DrawCache::new(source)),
            prefetcher: AssetPrefetcher::new(loader),
            flags,
            router,
        }
    }
}

/// Runs one effect. `CancelRecovery` belongs to the runtime and is a no-op here.
pub async fn run_effect(effect: Effect, deps: &Deps) -> Option<Msg> {
    match effect {
        Effect::FetchDraw { seq, season } => Some(match deps.cache.get(season).await {
            Ok(draw) => Msg::DrawFetched { seq, season, draw },
            Err(error) => Msg::FetchFailed { seq, season, error },
        }),
        Effect::WarmAssets { seq, season, draw } => {
            let assets = draw.asset_ids(&deps.flags);
            let report = deps.prefetcher.warm(&assets).await;
            debug!(season, loaded = report.loaded, failed = report.failed, "assets warmed");
            Some(Msg::AssetsWarmed { seq, season, draw })
        }
        Effect::LogFailure { season, error } => {
            error!(season, error = %error, "could not fetch draw");
            None
        }
        Effect::ScheduleRecovery { seq, delay } => {
            tokio::time::sleep(delay).await;
            Some(Msg::RecoveryElapsed { seq })
        }
        Effect::ChangeSeason(change) => {
            deps.router.change_season(change);
            None
        }
        Effect::CancelRecovery => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Team;

    fn model() -> SeasonModel {
        SeasonModel::new(ControllerConfig::new(2024))
    }

    fn draw() -> Arc<DrawData> {
        Arc::new(DrawData {
            pots: vec![vec![Team {
                name: "Ajax".into(),
                country: "Netherlands".into(),
                short_name: None,
                group: None,
            }]],
        })
    }

    fn publish(model: &mut SeasonModel, season: Season) {
        update(model, Msg::SeasonRequested(season));
        let seq = model.seq;
        update(
            model,
            Msg::AssetsWarmed {
                seq,
                season,
                draw: draw(),
            },
        );
    }

    fn fail_latest(model: &mut SeasonModel, season: Season) -> Vec<Effect> {
        let seq = model.seq;
        update(
            model,
            Msg::FetchFailed {
                seq,
                season,
                error: FetchError::Network("boom".into()),
            },
        );
        update(model, Msg::RecoveryElapsed { seq })
    }

    fn rollback_season(effects: &[Effect]) -> Option<Option<Season>> {
        effects.iter().find_map(|e| match e {
            Effect::ChangeSeason(change) => Some(change.season),
            _ => None,
        })
    }

    #[test]
    fn navigate_without_season_requests_default() {
        let mut m = model();
        let effects = update(
            &mut m,
            Msg::Navigate {
                route: RouteParams::new("cl", "gs", None),
                reset_token: "a".into(),
            },
        );
        assert_eq!(m.status, Status::Waiting);
        assert!(matches!(
            effects.as_slice(),
            [Effect::CancelRecovery, Effect::FetchDraw { seq: 1, season: 2024 }]
        ));
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut m = model();
        update(&mut m, Msg::SeasonRequested(2019));
        update(&mut m, Msg::SeasonRequested(2020));
        let effects = update(
            &mut m,
            Msg::DrawFetched {
                seq: 1,
                season: 2019,
                draw: draw(),
            },
        );
        assert!(effects.is_empty());
        update(
            &mut m,
            Msg::AssetsWarmed {
                seq: 1,
                season: 2019,
                draw: draw(),
            },
        );
        assert!(m.data.is_none());
        assert_eq!(m.status, Status::Waiting);
    }

    #[test]
    fn failure_keeps_published_draw_and_season() {
        let mut m = model();
        publish(&mut m, 2023);
        let key = m.render_key;
        update(&mut m, Msg::SeasonRequested(2020));
        let seq = m.seq;
        let effects = update(
            &mut m,
            Msg::FetchFailed {
                seq,
                season: 2020,
                error: FetchError::Parse("bad".into()),
            },
        );
        assert_eq!(m.status, Status::Failed("Could not fetch data".into()));
        assert_eq!(m.current_season, 2023);
        assert_eq!(m.render_key, key);
        assert!(m.data.is_some());
        assert!(matches!(
            effects.as_slice(),
            [Effect::LogFailure { season: 2020, .. }, Effect::ScheduleRecovery { .. }]
        ));
    }

    #[test]
    fn rollback_targets_last_good_season() {
        let mut m = model();
        publish(&mut m, 2023);
        update(&mut m, Msg::SeasonRequested(2020));
        let effects = fail_latest(&mut m, 2020);
        assert_eq!(rollback_season(&effects), Some(Some(2023)));
        assert_eq!(m.status, Status::Ready);
    }

    #[test]
    fn rollback_is_unset_from_default_season_or_without_data() {
        let mut m = model();
        update(&mut m, Msg::SeasonRequested(2020));
        let effects = fail_latest(&mut m, 2020);
        assert_eq!(rollback_season(&effects), Some(None));
        assert_eq!(m.status, Status::Idle);

        let mut m = model();
        publish(&mut m, 2024);
        update(&mut m, Msg::SeasonRequested(2020));
        let effects = fail_latest(&mut m, 2020);
        assert_eq!(rollback_season(&effects), Some(None));
    }

    #[test]
    fn newer_request_preempts_rollback() {
        let mut m = model();
        update(&mut m, Msg::SeasonRequested(2020));
        let seq = m.seq;
        update(
            &mut m,
            Msg::FetchFailed {
                seq,
                season: 2020,
                error: FetchError::Network("down".into()),
            },
        );
        update(&mut m, Msg::SeasonRequested(2021));
        assert!(update(&mut m, Msg::RecoveryElapsed { seq }).is_empty());
        assert_eq!(m.status, Status::Waiting);
    }

    #[test]
    fn reset_token_regenerates_key_without_fetch() {
        let mut m = model();
        let route = RouteParams::new("cl", "gs", Some(2022));
        update(
            &mut m,
            Msg::Navigate {
                route: route.clone(),
                reset_token: "a".into(),
            },
        );
        let key = m.render_key;
        let effects = update(
            &mut m,
            Msg::Navigate {
                route,
                reset_token: "b".into(),
            },
        );
        assert!(effects.is_empty());
        assert_ne!(m.render_key, key);
    }
}
