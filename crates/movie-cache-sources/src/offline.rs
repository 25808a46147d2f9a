use crate::dto::{RemoteDetail, RemotePage};
use crate::error::SourceError;
use crate::image::compose_image_url;
use crate::traits::RemoteSource;
use async_trait::async_trait;
use movie_cache_config::TmdbConfig;
use movie_cache_models::MovieId;
use reqwest::Url;
use tracing::debug;

/// Stand-in source for when no API key is configured.
///
/// Fetches fail with `Configuration` without touching the network. Image URLs
/// still compose, since they need no key.
#[derive(Debug, Clone)]
pub struct OfflineSource {
    image_base_url: String,
    image_size: String,
}

impl OfflineSource {
    pub fn from_config(config: &TmdbConfig) -> Self {
        Self {
            image_base_url: config.image_base_url.clone(),
            image_size: config.image_size.clone(),
        }
    }

    fn unavailable(&self) -> SourceError {
        SourceError::Configuration("TMDB API key is not configured".to_string())
    }
}

#[async_trait]
impl RemoteSource for OfflineSource {
    fn source_name(&self) -> &str {
        "offline"
    }

    async fn fetch_page(&self, page: u32) -> Result<RemotePage, SourceError> {
        debug!("Page {} requested from the offline source", page);
        Err(self.unavailable())
    }

    async fn fetch_detail(&self, id: MovieId) -> Result<RemoteDetail, SourceError> {
        debug!("Movie {} requested from the offline source", id);
        Err(self.unavailable())
    }

    fn image_url(&self, path: Option<&str>, size: Option<&str>) -> Option<Url> {
        compose_image_url(&self.image_base_url, path, size.unwrap_or(&self.image_size))
    }
}
