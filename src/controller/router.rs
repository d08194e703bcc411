use tokio::sync::mpsc;
use tracing::warn;

use crate::model::SeasonChange;

/// Routing layer's entry point for season changes requested by the controller.
pub trait SeasonRouter: Send + Sync {
    fn change_season(&self, change: SeasonChange);
}

/// Forwards season changes to whoever owns the route.
#[derive(Clone)]
pub struct ChannelRouter {
    tx: mpsc::UnboundedSender<SeasonChange>,
}

impl ChannelRouter {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SeasonChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SeasonRouter for ChannelRouter {
    fn change_season(&self, change: SeasonChange) {
        if let Err(e) = self.tx.send(change) {
            warn!(change = ?e.0, "route receiver dropped; season change lost");
        }
    }
}
