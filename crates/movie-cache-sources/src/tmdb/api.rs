use crate::dto::{RemoteDetail, RemotePage};
use crate::error::SourceError;
use movie_cache_models::MovieId;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

const LANGUAGE: &str = "en-US";
const SORT_BY: &str = "vote_average.desc";
const RELEASE_YEAR: &str = "2024";
const MIN_VOTE_COUNT: &str = "100";

/// Discovery listing: best-rated 2024 releases with enough votes to matter.
pub fn discover_url(base: &str, api_key: &str, page: u32) -> Result<Url, SourceError> {
    let endpoint = format!("{}/discover/movie", base.trim_end_matches('/'));
    let page = page.to_string();
    Url::parse_with_params(
        &endpoint,
        &[
            ("api_key", api_key),
            ("language", LANGUAGE),
            ("sort_by", SORT_BY),
            ("primary_release_year", RELEASE_YEAR),
            ("vote_count.gte", MIN_VOTE_COUNT),
            ("page", page.as_str()),
        ],
    )
    .map_err(|e| SourceError::Configuration(format!("bad API base URL {}: {}", base, e)))
}

pub fn detail_url(base: &str, api_key: &str, id: MovieId) -> Result<Url, SourceError> {
    let endpoint = format!("{}/movie/{}", base.trim_end_matches('/'), id);
    Url::parse_with_params(&endpoint, &[("api_key", api_key), ("language", LANGUAGE)])
        .map_err(|e| SourceError::Configuration(format!("bad API base URL {}: {}", base, e)))
}

/// Status is checked before the body is looked at: a non-2xx answer is an
/// `Http` error even when its body happens to be valid JSON.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, SourceError> {
    if !status.is_success() {
        return Err(SourceError::Http { status: status.as_u16() });
    }
    Ok(serde_json::from_slice(body)?)
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T, SourceError> {
    // The query carries the API key, so only the path is logged
    let path = url.path().to_string();
    debug!("GET {}", path);

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;
    let status = response.status();
    let body = response.bytes().await?;
    trace!("GET {} -> {} ({} bytes)", path, status, body.len());

    decode_response(status, &body)
}

pub async fn get_page(client: &Client, base: &str, api_key: &str, page: u32) -> Result<RemotePage, SourceError> {
    get_json(client, discover_url(base, api_key, page)?).await
}

pub async fn get_detail(client: &Client, base: &str, api_key: &str, id: MovieId) -> Result<RemoteDetail, SourceError> {
    get_json(client, detail_url(base, api_key, id)?).await
}
