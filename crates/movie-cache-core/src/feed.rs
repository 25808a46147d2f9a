use crate::error::RepositoryError;
use crate::notify::FavoriteSubscription;
use crate::repository::MovieRepository;
use movie_cache_models::{FavoriteChange, Movie};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Rows from the end of the list at which the next page is worth requesting.
pub const PREFETCH_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    Loaded { page: u32, added: usize },
    /// Another load was in flight, or there are no pages left.
    Skipped,
}

#[derive(Default)]
struct FeedState {
    movies: Vec<Movie>,
    current_page: u32,
    total_pages: u32,
}

/// Paged listing held by a list consumer.
///
/// A single in-flight flag guards all page loads (not one per page), so at
/// most one page request is outstanding at a time.
pub struct MovieFeed {
    repository: Arc<MovieRepository>,
    state: Mutex<FeedState>,
    loading: AtomicBool,
}

/// Clears the in-flight flag on drop, including when the load is cancelled.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl MovieFeed {
    pub fn new(repository: Arc<MovieRepository>) -> Self {
        Self {
            repository,
            state: Mutex::new(FeedState::default()),
            loading: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        // State is plain data, a panic elsewhere cannot leave it half-updated
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.state().movies.clone()
    }

    pub fn len(&self) -> usize {
        self.state().movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().movies.is_empty()
    }

    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.state().total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn has_more(&self) -> bool {
        let state = self.state();
        state.current_page < state.total_pages
    }

    /// Reset and load page 1, replacing whatever was listed.
    pub async fn load_first_page(&self) -> Result<PageLoad, RepositoryError> {
        let Some(_guard) = LoadingGuard::acquire(&self.loading) else {
            trace!("First page load skipped: a load is in flight");
            return Ok(PageLoad::Skipped);
        };
        *self.state() = FeedState::default();

        let page = self.repository.fetch_page(1).await?;
        let added = page.movies.len();
        let mut state = self.state();
        state.movies = page.movies;
        state.current_page = 1;
        state.total_pages = page.total_pages;
        debug!("Feed loaded page 1 of {}", state.total_pages);
        Ok(PageLoad::Loaded { page: 1, added })
    }

    /// Append the next page when one exists and nothing else is loading.
    pub async fn load_next_page(&self) -> Result<PageLoad, RepositoryError> {
        let Some(_guard) = LoadingGuard::acquire(&self.loading) else {
            trace!("Next page load skipped: a load is in flight");
            return Ok(PageLoad::Skipped);
        };
        let next = {
            let state = self.state();
            if state.current_page >= state.total_pages {
                return Ok(PageLoad::Skipped);
            }
            state.current_page + 1
        };

        let page = self.repository.fetch_page(next).await?;
        let added = page.movies.len();
        let mut state = self.state();
        state.movies.extend(page.movies);
        state.current_page = next;
        state.total_pages = page.total_pages;
        debug!("Feed loaded page {} of {} ({} movies listed)", next, state.total_pages, state.movies.len());
        Ok(PageLoad::Loaded { page: next, added })
    }

    /// True when `row` is within `PREFETCH_THRESHOLD` of the end, more pages
    /// exist, and no load is running.
    pub fn should_prefetch(&self, row: usize) -> bool {
        let state = self.state();
        let threshold = state.movies.len().saturating_sub(PREFETCH_THRESHOLD);
        row >= threshold && state.current_page < state.total_pages && !self.is_loading()
    }

    /// Apply a live favorite change. Returns whether a listed movie changed.
    pub fn apply_favorite_change(&self, change: FavoriteChange) -> bool {
        let mut state = self.state();
        match state.movies.iter_mut().find(|m| m.id == change.id) {
            Some(movie) => {
                movie.is_favorite = change.is_favorite;
                true
            }
            None => false,
        }
    }

    /// Optimistically flip the movie at `index`, then ask the repository.
    /// The flip is rolled back if the repository refuses. `Ok(None)` means
    /// `index` is out of range.
    pub async fn toggle_favorite(&self, index: usize) -> Result<Option<bool>, RepositoryError> {
        let (id, previous) = {
            let mut state = self.state();
            let Some(movie) = state.movies.get_mut(index) else {
                return Ok(None);
            };
            let previous = movie.is_favorite;
            movie.is_favorite = !previous;
            (movie.id, previous)
        };

        match self.repository.toggle_favorite(id).await {
            Ok(value) => {
                self.apply_favorite_change(FavoriteChange::new(id, value));
                Ok(Some(value))
            }
            Err(e) => {
                self.apply_favorite_change(FavoriteChange::new(id, previous));
                Err(e)
            }
        }
    }
}

/// Keep `feed` in sync with the repository's favorite channel.
///
/// Only a weak reference is held: once the feed is dropped the task ends at
/// the next event instead of keeping the feed alive.
pub fn follow_favorites(feed: &Arc<MovieFeed>, mut subscription: FavoriteSubscription) -> JoinHandle<()> {
    let feed: Weak<MovieFeed> = Arc::downgrade(feed);
    tokio::spawn(async move {
        while let Some(change) = subscription.recv().await {
            let Some(listing) = feed.upgrade() else {
                break;
            };
            listing.apply_favorite_change(change);
        }
    })
}
