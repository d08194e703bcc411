use ahash::AHashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::client::DrawDataSource;
use crate::model::{DrawData, Season};
use crate::mvu::error::FetchError;

type SharedDraw = Shared<BoxFuture<'static, Result<Arc<DrawData>, FetchError>>>;

/// Single-flight memo over a `DrawDataSource`.
///
/// The first request for a season starts the retrieval; every later or
/// concurrent request for that season awaits the same outcome. Settled
/// entries are kept for the life of the cache, failures included.
pub struct DrawCache {
    source: Arc<dyn DrawDataSource>,
    entries: Mutex<AHashMap<Season, SharedDraw>>,
}

impl DrawCache {
    #[must_use]
    pub fn new(source: Arc<dyn DrawDataSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    /// # Errors
    ///
    /// Returns the `FetchError` of the season's single retrieval.
    pub async fn get(&self, season: Season) -> Result<Arc<DrawData>, FetchError> {
        self.entry(season).await
    }

    /// Seasons whose draw has been retrieved successfully.
    #[must_use]
    pub fn cached_seasons(&self) -> Vec<Season> {
        let entries = self.lock();
        let mut seasons: Vec<Season> = entries
            .iter()
            .filter(|(_, draw)| matches!(draw.peek(), Some(Ok(_))))
            .map(|(season, _)| *season)
            .collect();
        seasons.sort_unstable();
        seasons
    }

    fn entry(&self, season: Season) -> SharedDraw {
        let mut entries = self.lock();
        entries
            .entry(season)
            .or_insert_with(|| {
                let source = Arc::clone(&self.source);
                async move { source.fetch_draw(season).await.map(Arc::new) }
                    .boxed()
                    .shared()
            })
            .clone()
    }

    fn lock(&self) -> MutexGuard<'_, AHashMap<Season, SharedDraw>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
