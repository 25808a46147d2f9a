use async_trait::async_trait;
use movie_cache_models::MovieId;
use reqwest::Url;
use crate::dto::{RemoteDetail, RemotePage};
use crate::error::SourceError;

/// Stateless request/response access to a remote movie catalogue.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Fetch one page of the discovery listing. Pages start at 1.
    async fn fetch_page(&self, page: u32) -> Result<RemotePage, SourceError>;

    async fn fetch_detail(&self, id: MovieId) -> Result<RemoteDetail, SourceError>;

    /// Compose an image URL; `None` when there is no path (show a placeholder).
    /// `size` falls back to the source's default size token.
    fn image_url(&self, path: Option<&str>, size: Option<&str>) -> Option<Url>;
}
