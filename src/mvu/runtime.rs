use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::season::{Deps, Effect, Msg, SeasonModel, Snapshot, run_effect, update};

/// Message loop for one controller: owns the model, applies every message in
/// arrival order and publishes a snapshot after each one.
///
/// Effects run as separate tasks and report back through the loop's own
/// sender, so a slow fetch never blocks later messages. Whether a finished
/// effect still matters is decided by `update`, not here.
pub struct SeasonRuntime {
    model: SeasonModel,
    deps: Deps,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    snapshots: watch::Sender<Snapshot>,
    shutdown: CancellationToken,
    recovery: Option<CancellationToken>,
}

impl SeasonRuntime {
    #[must_use]
    pub fn new(
        model: SeasonModel,
        deps: Deps,
        tx: mpsc::UnboundedSender<Msg>,
        rx: mpsc::UnboundedReceiver<Msg>,
        snapshots: watch::Sender<Snapshot>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            model,
            deps,
            tx,
            rx,
            snapshots,
            shutdown,
            recovery: None,
        }
    }

    pub async fn run(mut self) {
        loop {
            let msg = tokio::select! {
                () = self.shutdown.cancelled() => break,
                msg = self.rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };
            self.dispatch(msg);
        }
        self.cancel_recovery();
        debug!(seq = self.model.seq, "season runtime stopped");
    }

    fn dispatch(&mut self, msg: Msg) {
        debug!(msg = ?MsgName(&msg), "mvu update");
        let effects = update(&mut self.model, msg);
        for effect in effects {
            match effect {
                Effect::CancelRecovery => self.cancel_recovery(),
                Effect::ScheduleRecovery { .. } => {
                    self.cancel_recovery();
                    let token = self.shutdown.child_token();
                    self.recovery = Some(token.clone());
                    self.spawn_effect(effect, token);
                }
                other => self.spawn_effect(other, self.shutdown.clone()),
            }
        }
        self.snapshots.send_replace(self.model.snapshot());
    }

    fn spawn_effect(&self, effect: Effect, token: CancellationToken) {
        let deps = self.deps.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            debug!(effect = ?EffectName(&effect), "mvu effect start");
            let msg = tokio::select! {
                () = token.cancelled() => return,
                msg = run_effect(effect, &deps) => msg,
            };
            if let Some(msg) = msg {
                // The loop is gone once the controller is dropped.
                let _ = tx.send(msg);
            }
        });
    }

    fn cancel_recovery(&mut self) {
        if let Some(token) = self.recovery.take() {
            token.cancel();
        }
    }
}

// Log lines carry variant names only; draws are too large to dump per message.
struct MsgName<'a>(&'a Msg);

impl std::fmt::Debug for MsgName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            Msg::Navigate { .. } => "Navigate",
            Msg::SeasonRequested(_) => "SeasonRequested",
            Msg::Retry => "Retry",
            Msg::ResetRequested(_) => "ResetRequested",
            Msg::DrawFetched { .. } => "DrawFetched",
            Msg::FetchFailed { .. } => "FetchFailed",
            Msg::AssetsWarmed { .. } => "AssetsWarmed",
            Msg::RecoveryElapsed { .. } => "RecoveryElapsed",
            Msg::ReachabilityChanged(_) => "ReachabilityChanged",
        };
        f.write_str(name)
    }
}

struct EffectName<'a>(&'a Effect);

impl std::fmt::Debug for EffectName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            Effect::CancelRecovery => "CancelRecovery",
            Effect::FetchDraw { .. } => "FetchDraw",
            Effect::WarmAssets { .. } => "WarmAssets",
            Effect::LogFailure { .. } => "LogFailure",
            Effect::ScheduleRecovery { .. } => "ScheduleRecovery",
            Effect::ChangeSeason(_) => "ChangeSeason",
        };
        f.write_str(name)
    }
}
