use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mvu::error::FetchError;

/// A tournament edition, identified by the year its draw took place.
pub type Season = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

pub type Pot = Vec<Team>;

/// Parsed draw for one season: pots in draw order, teams in pot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawData {
    pub pots: Vec<Pot>,
}

impl DrawData {
    /// Decodes a draw document.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Parse` if the body is not a draw document or has
    /// nothing to draw (no pots, or an empty pot).
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let draw: DrawData = serde_json::from_slice(body)?;
        if draw.pots.is_empty() {
            return Err(FetchError::Parse("draw has no pots".into()));
        }
        if let Some(idx) = draw.pots.iter().position(Vec::is_empty) {
            return Err(FetchError::Parse(format!("pot {} is empty", idx + 1)));
        }
        Ok(draw)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.pots.iter().flatten()
    }

    /// Flag assets referenced by the draw, first occurrence order.
    #[must_use]
    pub fn asset_ids(&self, flags: &FlagUrls) -> Vec<AssetId> {
        let mut seen = AHashSet::new();
        self.teams()
            .map(|team| flags.for_country(&team.country))
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

/// URL of one image asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FlagUrls {
    base: String,
}

impl FlagUrls {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/flags/{country}.svg`, country lower-cased with spaces as `-`.
    #[must_use]
    pub fn for_country(&self, country: &str) -> AssetId {
        let slug = country.trim().to_lowercase().replace(' ', "-");
        AssetId(format!("{}/flags/{slug}.svg", self.base))
    }
}
