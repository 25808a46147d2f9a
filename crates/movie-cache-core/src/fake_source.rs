//! Scripted `RemoteSource` for repository and feed tests.

use async_trait::async_trait;
use movie_cache_models::MovieId;
use movie_cache_sources::{compose_image_url, RemoteDetail, RemotePage, RemoteSource, RemoteSummary, SourceError, Url};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSource {
    pages: Mutex<HashMap<u32, Result<RemotePage, SourceError>>>,
    details: Mutex<HashMap<MovieId, Result<RemoteDetail, SourceError>>>,
    page_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

pub fn summary(id: MovieId, title: &str, vote: Option<f64>) -> RemoteSummary {
    RemoteSummary {
        id,
        title: Some(title.to_string()),
        poster_path: Some(format!("/poster-{}.jpg", id)),
        vote_average: vote,
        release_date: Some("2024-06-14".to_string()),
        original_language: Some("en".to_string()),
        overview: Some(format!("About {}", title)),
    }
}

pub fn detail(id: MovieId, title: &str, backdrop: Option<&str>) -> RemoteDetail {
    RemoteDetail {
        id,
        title: Some(title.to_string()),
        poster_path: Some(format!("/poster-{}.jpg", id)),
        backdrop_path: backdrop.map(str::to_string),
        vote_average: Some(7.0),
        release_date: Some("2024-06-14".to_string()),
        original_language: Some("fr".to_string()),
        overview: Some(format!("Details of {}", title)),
    }
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, page: u32, results: Vec<RemoteSummary>, total_pages: u32) {
        let total_results = results.len() as u32 * total_pages;
        self.pages.lock().unwrap().insert(
            page,
            Ok(RemotePage { page, results, total_pages, total_results }),
        );
    }

    pub fn fail_page(&self, page: u32, err: SourceError) {
        self.pages.lock().unwrap().insert(page, Err(err));
    }

    pub fn set_detail(&self, detail: RemoteDetail) {
        self.details.lock().unwrap().insert(detail.id, Ok(detail));
    }

    pub fn fail_detail(&self, id: MovieId, err: SourceError) {
        self.details.lock().unwrap().insert(id, Err(err));
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for FakeSource {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn fetch_page(&self, page: u32) -> Result<RemotePage, SourceError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or(Err(SourceError::Http { status: 404 }))
    }

    async fn fetch_detail(&self, id: MovieId) -> Result<RemoteDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or(Err(SourceError::Http { status: 404 }))
    }

    fn image_url(&self, path: Option<&str>, size: Option<&str>) -> Option<Url> {
        compose_image_url("https://images.test", path, size.unwrap_or("w500"))
    }
}
