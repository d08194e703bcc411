use maud::{Markup, html};
use std::sync::Arc;

use crate::model::{DrawData, DrawView};
use crate::mvu::season::{RenderKey, Snapshot, Status};

pub const OFFLINE_MESSAGE: &str = "you're offline";
pub const WAITING_MESSAGE: &str = "wait...";

/// The one thing the page shows for a snapshot.
///
/// Offline beats a failure, a failure beats loading, and loading beats the
/// draw. Overlays animate only once a draw has been shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Offline { animated: bool },
    Error { message: String, animated: bool },
    Waiting { animated: bool },
    Draw {
        key: RenderKey,
        view: Option<DrawView>,
        data: Arc<DrawData>,
    },
    Blank,
}

impl Presentation {
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let animated = snapshot.data.is_some();
        if !snapshot.online {
            return Self::Offline { animated };
        }
        match (&snapshot.status, &snapshot.data) {
            (Status::Failed(message), _) => Self::Error {
                message: message.clone(),
                animated,
            },
            (Status::Waiting, _) => Self::Waiting { animated },
            (Status::Ready | Status::Idle, Some(data)) => Self::Draw {
                key: snapshot.render_key,
                view: snapshot.route.view(),
                data: Arc::clone(data),
            },
            (Status::Ready | Status::Idle, None) => Self::Blank,
        }
    }

    #[must_use]
    pub fn overlay_message(&self) -> Option<&str> {
        match self {
            Self::Offline { .. } => Some(OFFLINE_MESSAGE),
            Self::Error { message, .. } => Some(message),
            Self::Waiting { .. } => Some(WAITING_MESSAGE),
            Self::Draw { .. } | Self::Blank => None,
        }
    }
}

#[must_use]
pub fn render_presentation(presentation: &Presentation) -> Markup {
    match presentation {
        Presentation::Offline { animated }
        | Presentation::Error { animated, .. }
        | Presentation::Waiting { animated } => {
            render_overlay(presentation.overlay_message().unwrap_or_default(), *animated)
        }
        Presentation::Draw { key, view, data } => match view {
            Some(view) => render_draw(*key, *view, data),
            None => html! {},
        },
        Presentation::Blank => html! {},
    }
}

fn render_overlay(message: &str, animated: bool) -> Markup {
    html! {
        div class=(if animated { "overlay" } else { "overlay no-animation" }) {
            div class="overlay-message" { (message) }
        }
    }
}

// Placeholder for the draw views; carries the render key so a new key
// replaces the whole subtree.
fn render_draw(key: RenderKey, view: DrawView, data: &DrawData) -> Markup {
    html! {
        div class="draw" data-key=(key) data-view=(view) {
            @for (idx, pot) in data.pots.iter().enumerate() {
                div class="pot" {
                    h3 { "Pot " (idx + 1) }
                    ul {
                        @for team in pot {
                            li data-country=(team.country) { (team.name) }
                        }
                    }
                }
            }
        }
    }
}
