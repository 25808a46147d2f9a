use crate::error::RepositoryError;
use crate::notify::FavoriteSubscription;
use crate::repository::MovieRepository;
use movie_cache_models::{FavoriteChange, MovieDetail, MovieId};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;
use tracing::debug;

/// One movie's detail as held by a detail consumer.
///
/// The favorite flag shown here tracks changes made anywhere else (a list,
/// another detail view) through `follow_detail_favorites`.
pub struct DetailView {
    repository: Arc<MovieRepository>,
    id: MovieId,
    detail: Mutex<Option<MovieDetail>>,
}

impl DetailView {
    pub fn new(repository: Arc<MovieRepository>, id: MovieId) -> Self {
        Self {
            repository,
            id,
            detail: Mutex::new(None),
        }
    }

    fn detail_slot(&self) -> MutexGuard<'_, Option<MovieDetail>> {
        self.detail.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn id(&self) -> MovieId {
        self.id
    }

    pub fn detail(&self) -> Option<MovieDetail> {
        self.detail_slot().clone()
    }

    /// Favorite flag as last known; falls back to the repository before the
    /// first load.
    pub fn is_favorite(&self) -> Result<bool, RepositoryError> {
        match self.detail_slot().as_ref() {
            Some(detail) => Ok(detail.is_favorite),
            None => self.repository.is_favorite(self.id),
        }
    }

    /// Fetch (and merge) the detail, replacing whatever was shown.
    pub async fn load(&self) -> Result<MovieDetail, RepositoryError> {
        let detail = self.repository.fetch_detail(self.id).await?;
        *self.detail_slot() = Some(detail.clone());
        Ok(detail)
    }

    /// Apply a live change. Changes for other movies are ignored.
    pub fn apply_favorite_change(&self, change: FavoriteChange) -> bool {
        if change.id != self.id {
            return false;
        }
        match self.detail_slot().as_mut() {
            Some(detail) => {
                detail.is_favorite = change.is_favorite;
                true
            }
            None => false,
        }
    }

    pub async fn toggle_favorite(&self) -> Result<bool, RepositoryError> {
        let value = self.repository.toggle_favorite(self.id).await?;
        self.apply_favorite_change(FavoriteChange::new(self.id, value));
        Ok(value)
    }
}

/// Keep `view` in sync with favorite changes for its movie. Holds a weak
/// reference, so the task ends once the view is dropped.
pub fn follow_detail_favorites(view: &Arc<DetailView>, mut subscription: FavoriteSubscription) -> JoinHandle<()> {
    let id = view.id();
    let view: Weak<DetailView> = Arc::downgrade(view);
    tokio::spawn(async move {
        while let Some(change) = subscription.recv().await {
            if change.id != id {
                continue;
            }
            let Some(current) = view.upgrade() else {
                break;
            };
            current.apply_favorite_change(change);
            debug!("Detail view of movie {} now favorite={}", id, change.is_favorite);
        }
    })
}
