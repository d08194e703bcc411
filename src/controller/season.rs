use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::warn;

use crate::args::ControllerConfig;
use crate::controller::draw::DrawCache;
use crate::model::{RouteParams, Season};
use crate::mvu::runtime::SeasonRuntime;
use crate::mvu::season::{Deps, Msg, SeasonModel, Snapshot};
use crate::view::status::Presentation;

/// Keeps the draw for the requested season current.
///
/// Every request runs fetch then asset prefetch and publishes only when both
/// are done and no newer request has been made in the meantime. A failed
/// fetch shows the configured error, then asks the router to go back to the
/// last season that loaded.
///
/// Dropping the controller stops its runtime, pending rollback included.
pub struct SeasonDataController {
    tx: mpsc::UnboundedSender<Msg>,
    snapshots: watch::Receiver<Snapshot>,
    cache: Arc<DrawCache>,
    _shutdown: DropGuard,
}

impl SeasonDataController {
    /// Starts the controller's runtime on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(config: ControllerConfig, deps: Deps) -> Self {
        let model = SeasonModel::new(config);
        let (snapshot_tx, snapshots) = watch::channel(model.snapshot());
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let cache = Arc::clone(&deps.cache);
        let runtime =
            SeasonRuntime::new(model, deps, tx.clone(), rx, snapshot_tx, shutdown.clone());
        tokio::spawn(runtime.run());
        Self {
            tx,
            snapshots,
            cache,
            _shutdown: shutdown.drop_guard(),
        }
    }

    /// Starts a controller and enters `route` as if the view had just mounted.
    #[must_use]
    pub fn mount(
        config: ControllerConfig,
        deps: Deps,
        route: RouteParams,
        reset_token: impl Into<String>,
    ) -> Self {
        let controller = Self::new(config, deps);
        controller.navigate(route, reset_token);
        controller
    }

    /// Route entered or changed. Fetches when the season differs from the last
    /// request; otherwise a new `reset_token` only refreshes the render key.
    pub fn navigate(&self, route: RouteParams, reset_token: impl Into<String>) {
        self.send(Msg::Navigate {
            route,
            reset_token: reset_token.into(),
        });
    }

    pub fn request_season(&self, season: Season) {
        self.send(Msg::SeasonRequested(season));
    }

    pub fn retry(&self) {
        self.send(Msg::Retry);
    }

    pub fn reset(&self, reset_token: impl Into<String>) {
        self.send(Msg::ResetRequested(reset_token.into()));
    }

    /// Network reachability; affects what is shown, never what is fetched.
    pub fn set_online(&self, online: bool) {
        self.send(Msg::ReachabilityChanged(online));
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn presentation(&self) -> Presentation {
        Presentation::from_snapshot(&self.snapshots.borrow())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the runtime has stopped.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Result<Snapshot, watch::error::RecvError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(predicate).await?;
        Ok(snapshot.clone())
    }

    #[must_use]
    pub fn cached_seasons(&self) -> Vec<Season> {
        self.cache.cached_seasons()
    }

    fn send(&self, msg: Msg) {
        if self.tx.send(msg).is_err() {
            warn!("season runtime has stopped; message dropped");
        }
    }
}
