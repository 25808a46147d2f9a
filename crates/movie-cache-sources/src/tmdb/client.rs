use crate::dto::{RemoteDetail, RemotePage};
use crate::error::SourceError;
use crate::image::compose_image_url;
use crate::tmdb::api;
use crate::traits::RemoteSource;
use async_trait::async_trait;
use movie_cache_config::TmdbConfig;
use movie_cache_models::MovieId;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = concat!("movie-cache/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    api_key: String,
    api_base_url: String,
    image_base_url: String,
    image_size: String,
}

impl TmdbClient {
    pub fn from_config(config: &TmdbConfig, api_key: String) -> Result<Self, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::Configuration("TMDB API key is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SourceError::Configuration(e.to_string()))?;

        info!("TMDB client targeting {}", config.api_base_url);
        Ok(Self {
            client: Arc::new(client),
            api_key,
            api_base_url: config.api_base_url.clone(),
            image_base_url: config.image_base_url.clone(),
            image_size: config.image_size.clone(),
        })
    }
}

#[async_trait]
impl RemoteSource for TmdbClient {
    fn source_name(&self) -> &str {
        "tmdb"
    }

    async fn fetch_page(&self, page: u32) -> Result<RemotePage, SourceError> {
        api::get_page(&self.client, &self.api_base_url, &self.api_key, page).await
    }

    async fn fetch_detail(&self, id: MovieId) -> Result<RemoteDetail, SourceError> {
        api::get_detail(&self.client, &self.api_base_url, &self.api_key, id).await
    }

    fn image_url(&self, path: Option<&str>, size: Option<&str>) -> Option<Url> {
        compose_image_url(&self.image_base_url, path, size.unwrap_or(&self.image_size))
    }
}
