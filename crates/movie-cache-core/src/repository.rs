use crate::error::RepositoryError;
use crate::notify::{FavoriteNotifier, FavoriteSubscription};
use crate::store::LocalStore;
use movie_cache_models::{FavoriteChange, Movie, MovieDetail, MovieId, MoviePage, MovieUpdate};
use movie_cache_sources::{RemoteSource, Url};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// The only mutation path into the local store.
///
/// Every fetch goes remote first, merges into the store, then reads back
/// from the store, so callers always see the locally-owned favorite flag.
/// Remote failures are returned as-is; there is no stale-cache fallback.
pub struct MovieRepository {
    source: Arc<dyn RemoteSource>,
    store: Arc<LocalStore>,
    notifier: FavoriteNotifier,
    // Keeps read-flip-commit-publish in one step so events leave in completion order
    toggle_gate: Mutex<()>,
}

impl MovieRepository {
    pub fn new(source: Arc<dyn RemoteSource>, store: Arc<LocalStore>) -> Self {
        Self {
            source,
            store,
            notifier: FavoriteNotifier::new(),
            toggle_gate: Mutex::new(()),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    /// Fetch one listing page, merge it, and return it in remote order.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, page: u32) -> Result<MoviePage, RepositoryError> {
        if page == 0 {
            return Err(RepositoryError::InvalidPage(page));
        }

        let response = self.source.fetch_page(page).await?;
        let updates: Vec<MovieUpdate> = response.results.iter().map(MovieUpdate::from).collect();
        let report = self.store.upsert_many(&updates)?;
        if !report.skipped.is_empty() {
            warn!("Page {}: {} record(s) could not be merged", page, report.skipped.len());
        }

        // Batch lookup is unordered; restore the remote order explicitly
        let ids: Vec<MovieId> = response.results.iter().map(|s| s.id).collect();
        let records = self.store.get_by_ids(ids.iter().copied())?;
        let movies: Vec<Movie> = ids
            .iter()
            .filter_map(|id| records.get(id).map(Movie::from))
            .collect();

        info!(
            "Fetched page {}/{} from {} ({} movies)",
            response.page,
            response.total_pages,
            self.source.source_name(),
            movies.len()
        );

        Ok(MoviePage {
            page: response.page,
            movies,
            total_pages: response.total_pages,
            total_results: response.total_results,
        })
    }

    /// Fetch one movie's detail, merge it, and attach the live backdrop path.
    #[instrument(skip(self))]
    pub async fn fetch_detail(&self, id: MovieId) -> Result<MovieDetail, RepositoryError> {
        let dto = self.source.fetch_detail(id).await?;
        if dto.id != id {
            warn!("Requested movie {} but the source answered with {}", id, dto.id);
        }

        self.store.upsert(&MovieUpdate::from(&dto))?;
        let record = self
            .store
            .get(dto.id)?
            .ok_or(RepositoryError::NotFound(dto.id))?;

        debug!("Fetched detail for movie {}", dto.id);
        Ok(MovieDetail::from_record(&record, dto.backdrop_path))
    }

    /// Flip the stored favorite flag and announce it.
    ///
    /// Unknown ids fail with `NotFound`; nothing is fetched, stored or published.
    #[instrument(skip(self))]
    pub async fn toggle_favorite(&self, id: MovieId) -> Result<bool, RepositoryError> {
        let _gate = self.toggle_gate.lock().await;

        let record = self.store.get(id)?.ok_or(RepositoryError::NotFound(id))?;
        let new_value = !record.is_favorite;
        self.store.set_favorite(id, new_value)?;

        let receivers = self.notifier.publish(FavoriteChange::new(id, new_value));
        info!("Movie {} favorite -> {} ({} subscriber(s) notified)", id, new_value, receivers);
        Ok(new_value)
    }

    /// Local-only read; unknown ids are not favorites.
    pub fn is_favorite(&self, id: MovieId) -> Result<bool, RepositoryError> {
        Ok(self.store.get(id)?.map(|r| r.is_favorite).unwrap_or(false))
    }

    /// Drop every cached movie, favorites included. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, RepositoryError> {
        let removed = self.store.clear()?;
        info!("Cleared {} movie(s) from the local store", removed);
        Ok(removed)
    }

    pub fn subscribe(&self) -> FavoriteSubscription {
        self.notifier.subscribe()
    }

    pub fn image_url(&self, path: Option<&str>, size: Option<&str>) -> Option<Url> {
        self.source.image_url(path, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::fake_source::{detail, summary, FakeSource};
    use movie_cache_config::TmdbConfig;
    use movie_cache_sources::{OfflineSource, SourceError};

    fn repository() -> (Arc<FakeSource>, Arc<LocalStore>, MovieRepository) {
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(LocalStore::in_memory());
        let repo = MovieRepository::new(source.clone(), store.clone());
        (source, store, repo)
    }

    #[tokio::test]
    async fn test_fetch_page_returns_movies_and_stores_them() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0)), summary(2, "B", Some(7.5))], 5);

        let page = repo.fetch_page(1).await.unwrap();

        assert_eq!(page.total_pages, 5);
        assert_eq!(page.movies.len(), 2);
        assert_eq!(page.movies[0].id, 1);
        assert_eq!(page.movies[0].title.as_deref(), Some("A"));
        assert!(!page.movies[0].is_favorite);
        assert_eq!(page.movies[1].id, 2);
        assert_eq!(page.movies[1].vote_average, Some(7.5));
        assert!(store.get(1).unwrap().is_some());
        assert!(store.get(2).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fetch_page_preserves_remote_order() {
        let (source, _store, repo) = repository();
        let ids: Vec<MovieId> = vec![907, 3, 512, 44, 1001, 12, 600, 7];
        source.set_page(2, ids.iter().map(|id| summary(*id, "M", Some(6.0))).collect(), 3);

        let page = repo.fetch_page(2).await.unwrap();
        let returned: Vec<MovieId> = page.movies.iter().map(|m| m.id).collect();
        assert_eq!(returned, ids);
    }

    #[tokio::test]
    async fn test_fetch_page_reflects_favorite_set_between_fetches() {
        let (source, _store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0)), summary(2, "B", Some(7.5))], 1);
        repo.fetch_page(1).await.unwrap();
        repo.toggle_favorite(2).await.unwrap();

        source.set_page(1, vec![summary(1, "A", Some(8.1)), summary(2, "B2", None)], 1);
        let page = repo.fetch_page(1).await.unwrap();

        assert!(!page.movies[0].is_favorite);
        assert!(page.movies[1].is_favorite);
        assert_eq!(page.movies[1].title.as_deref(), Some("B2"));
        // Missing remote vote keeps the stored one
        assert_eq!(page.movies[1].vote_average, Some(7.5));
    }

    #[tokio::test]
    async fn test_fetch_page_http_error_leaves_store_unchanged() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0))], 2);
        repo.fetch_page(1).await.unwrap();
        source.fail_page(2, SourceError::Http { status: 500 });

        let err = repo.fetch_page(2).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Remote(SourceError::Http { status: 500 })));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(1).unwrap().unwrap().title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_fetch_page_decode_error_leaves_store_unchanged() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0))], 1);
        repo.fetch_page(1).await.unwrap();
        repo.toggle_favorite(1).await.unwrap();

        source.fail_page(1, SourceError::Decode("missing field `results`".to_string()));
        let err = repo.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Remote(SourceError::Decode(_))));

        assert_eq!(store.len().unwrap(), 1);
        let record = store.get(1).unwrap().unwrap();
        assert_eq!(record.title.as_deref(), Some("A"));
        assert_eq!(record.vote_average, Some(8.0));
        assert!(record.is_favorite);
    }

    #[tokio::test]
    async fn test_network_error_does_not_fall_back_to_cache() {
        let (source, _store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0))], 1);
        repo.fetch_page(1).await.unwrap();

        source.fail_page(1, SourceError::Network("offline".to_string()));
        let err = repo.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Remote(SourceError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_skips_bad_records_but_keeps_siblings() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0)), summary(2, "Bad", Some(42.0)), summary(3, "C", None)], 1);

        let page = repo.fetch_page(1).await.unwrap();
        let returned: Vec<MovieId> = page.movies.iter().map(|m| m.id).collect();
        assert_eq!(returned, vec![1, 3]);
        assert!(store.get(2).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_zero_is_rejected_without_network() {
        let (source, _store, repo) = repository();
        let err = repo.fetch_page(0).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPage(0)));
        assert_eq!(source.page_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_detail_creates_then_updates_preserving_favorite() {
        let (source, store, repo) = repository();
        source.set_detail(detail(11, "First cut", Some("/backdrop.jpg")));

        let first = repo.fetch_detail(11).await.unwrap();
        assert_eq!(first.title.as_deref(), Some("First cut"));
        assert_eq!(first.backdrop_path.as_deref(), Some("/backdrop.jpg"));
        assert!(!first.is_favorite);
        assert!(store.get(11).unwrap().is_some());

        assert!(repo.toggle_favorite(11).await.unwrap());

        source.set_detail(detail(11, "Final cut", None));
        let second = repo.fetch_detail(11).await.unwrap();
        assert_eq!(second.title.as_deref(), Some("Final cut"));
        assert_eq!(second.backdrop_path, None);
        assert!(second.is_favorite);
    }

    #[tokio::test]
    async fn test_fetch_detail_error_propagates() {
        let (source, store, repo) = repository();
        source.fail_detail(5, SourceError::Decode("expected value".to_string()));

        let err = repo.fetch_detail(5).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Remote(SourceError::Decode(_))));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_toggle_favorite_flips_and_notifies() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0)), summary(2, "B", Some(7.5))], 5);
        repo.fetch_page(1).await.unwrap();
        let mut sub = repo.subscribe();

        assert!(repo.toggle_favorite(1).await.unwrap());
        assert_eq!(sub.try_recv(), Some(FavoriteChange::new(1, true)));
        assert_eq!(sub.try_recv(), None);
        assert!(repo.is_favorite(1).unwrap());

        assert!(!repo.toggle_favorite(1).await.unwrap());
        assert_eq!(sub.try_recv(), Some(FavoriteChange::new(1, false)));
        assert!(!store.get(1).unwrap().unwrap().is_favorite);
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_not_found() {
        let (source, store, repo) = repository();
        let mut sub = repo.subscribe();

        let err = repo.toggle_favorite(77).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(77)));
        assert_eq!(sub.try_recv(), None);
        assert!(store.is_empty().unwrap());
        assert_eq!(source.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_is_favorite_defaults_false() {
        let (_source, _store, repo) = repository();
        assert!(!repo.is_favorite(12345).unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_notify_in_completion_order() {
        let (source, _store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0))], 1);
        repo.fetch_page(1).await.unwrap();
        let repo = Arc::new(repo);
        let mut sub = repo.subscribe();

        let toggles = (0..10).map(|_| {
            let repo = Arc::clone(&repo);
            async move { repo.toggle_favorite(1).await.unwrap() }
        });
        let results = futures::future::join_all(toggles).await;

        // Ten flips from false alternate strictly, and so do the events
        let mut events = Vec::new();
        while let Some(change) = sub.try_recv() {
            events.push(change.is_favorite);
        }
        assert_eq!(events.len(), 10);
        for (i, value) in events.iter().enumerate() {
            assert_eq!(*value, i % 2 == 0);
        }
        assert_eq!(results.iter().filter(|v| **v).count(), 5);
        assert!(!repo.is_favorite(1).unwrap());
    }

    #[tokio::test]
    async fn test_overlapping_page_fetches_are_safe() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0)), summary(2, "B", Some(7.5))], 1);

        let (a, b) = tokio::join!(repo.fetch_page(1), repo.fetch_page(1));
        assert_eq!(a.unwrap().movies, b.unwrap().movies);
        assert_eq!(source.page_calls(), 2);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.bin");
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(LocalStore::open(&path).unwrap());
        let repo = MovieRepository::new(source.clone(), store.clone());
        source.set_page(1, vec![summary(1, "A", Some(8.0))], 1);

        // A directory in place of the snapshot makes every commit fail
        std::fs::create_dir(&path).unwrap();

        let err = repo.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Store(StoreError::Io(_))));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_clear_forgets_movies_and_favorites() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0)), summary(2, "B", Some(7.5))], 1);
        repo.fetch_page(1).await.unwrap();
        repo.toggle_favorite(2).await.unwrap();

        assert_eq!(repo.clear().unwrap(), 2);
        assert!(store.is_empty().unwrap());
        assert!(!repo.is_favorite(2).unwrap());
        assert!(matches!(repo.toggle_favorite(2).await, Err(RepositoryError::NotFound(2))));
        assert_eq!(repo.clear().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_offline_repository_serves_local_state() {
        let (source, store, repo) = repository();
        source.set_page(1, vec![summary(1, "A", Some(8.0))], 1);
        repo.fetch_page(1).await.unwrap();

        let offline = MovieRepository::new(
            Arc::new(OfflineSource::from_config(&TmdbConfig::default())),
            store.clone(),
        );
        assert!(!offline.is_favorite(1).unwrap());
        assert!(offline.toggle_favorite(1).await.unwrap());
        assert!(repo.is_favorite(1).unwrap());

        let err = offline.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Remote(SourceError::Configuration(_))));
        assert!(store.get(1).unwrap().unwrap().is_favorite);
    }

    #[tokio::test]
    async fn test_image_url_delegates_to_source() {
        let (_source, _store, repo) = repository();
        let url = repo.image_url(Some("/p.jpg"), Some("w185")).unwrap();
        assert_eq!(url.as_str(), "https://images.test/t/p/w185/p.jpg");
        assert!(repo.image_url(None, None).is_none());
    }
}
