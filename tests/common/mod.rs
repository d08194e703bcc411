#![allow(dead_code)]

use async_trait::async_trait;
use cl_draw::controller::assets::AssetLoader;
use cl_draw::controller::draw::DrawDataSource;
use cl_draw::controller::router::SeasonRouter;
use cl_draw::model::{AssetId, DrawData, FlagUrls, Season, SeasonChange, Team};
use cl_draw::mvu::season::Deps;
use cl_draw::{AssetError, ControllerConfig, FetchError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_SEASON: Season = 2024;
pub const FLAG_BASE: &str = "http://flags.test";

pub fn team(name: &str, country: &str) -> Team {
    Team {
        name: name.to_string(),
        country: country.to_string(),
        short_name: None,
        group: None,
    }
}

/// Two pots; `Spain` appears twice so asset extraction has a duplicate.
pub fn sample_draw() -> DrawData {
    DrawData {
        pots: vec![
            vec![team("Real Madrid", "Spain"), team("Bayern", "Germany")],
            vec![team("Barcelona", "Spain"), team("Porto", "Portugal")],
        ],
    }
}

pub fn config() -> ControllerConfig {
    ControllerConfig::new(DEFAULT_SEASON)
}

#[derive(Clone)]
struct Scripted {
    delay: Duration,
    outcome: Result<DrawData, FetchError>,
}

/// Draw source answering from a script, after a per-season delay.
#[derive(Default)]
pub struct FakeDrawSource {
    script: Mutex<HashMap<Season, Scripted>>,
    calls: Mutex<HashMap<Season, usize>>,
}

impl FakeDrawSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ok(self: &Arc<Self>, season: Season, delay_ms: u64) -> Arc<Self> {
        self.script(season, delay_ms, Ok(sample_draw()))
    }

    pub fn fail(self: &Arc<Self>, season: Season, delay_ms: u64) -> Arc<Self> {
        self.script(
            season,
            delay_ms,
            Err(FetchError::Network(format!("connection reset fetching {season}"))),
        )
    }

    pub fn script(
        self: &Arc<Self>,
        season: Season,
        delay_ms: u64,
        outcome: Result<DrawData, FetchError>,
    ) -> Arc<Self> {
        self.script.lock().unwrap().insert(
            season,
            Scripted {
                delay: Duration::from_millis(delay_ms),
                outcome,
            },
        );
        Arc::clone(self)
    }

    pub fn calls(&self, season: Season) -> usize {
        self.calls.lock().unwrap().get(&season).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DrawDataSource for FakeDrawSource {
    async fn fetch_draw(&self, season: Season) -> Result<DrawData, FetchError> {
        *self.calls.lock().unwrap().entry(season).or_insert(0) += 1;
        let scripted = self.script.lock().unwrap().get(&season).cloned();
        match scripted {
            Some(Scripted { delay, outcome }) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Err(FetchError::Status {
                status: 404,
                url: format!("/data/{season}.json"),
            }),
        }
    }
}

/// Asset loader that fails the listed assets (or all of them) after a delay.
#[derive(Default)]
pub struct FakeAssetLoader {
    delay: Duration,
    fail_all: bool,
    failing: HashSet<AssetId>,
    loads: Mutex<Vec<AssetId>>,
}

impl FakeAssetLoader {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail_all: true,
            ..Self::default()
        })
    }

    pub fn with(delay_ms: u64, failing: &[AssetId]) -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::from_millis(delay_ms),
            failing: failing.iter().cloned().collect(),
            ..Self::default()
        })
    }

    pub fn loads(&self) -> Vec<AssetId> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetLoader for FakeAssetLoader {
    async fn load(&self, asset: &AssetId) -> Result<(), AssetError> {
        self.loads.lock().unwrap().push(asset.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail_all || self.failing.contains(asset) {
            Err(AssetError::Status {
                status: 404,
                url: asset.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RecordingRouter {
    changes: Mutex<Vec<SeasonChange>>,
}

impl RecordingRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn changes(&self) -> Vec<SeasonChange> {
        self.changes.lock().unwrap().clone()
    }
}

impl SeasonRouter for RecordingRouter {
    fn change_season(&self, change: SeasonChange) {
        self.changes.lock().unwrap().push(change);
    }
}

pub fn deps(
    source: &Arc<FakeDrawSource>,
    loader: &Arc<FakeAssetLoader>,
    router: &Arc<RecordingRouter>,
) -> Deps {
    Deps::new(
        Arc::clone(source) as Arc<dyn DrawDataSource>,
        Arc::clone(loader) as Arc<dyn AssetLoader>,
        FlagUrls::new(FLAG_BASE),
        Arc::clone(router) as Arc<dyn SeasonRouter>,
    )
}
