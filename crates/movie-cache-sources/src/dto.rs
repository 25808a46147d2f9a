//! Wire-format payloads of the discovery and detail endpoints.
//!
//! Only the consumed subset of the remote schema is modelled; unknown fields
//! are ignored.

use movie_cache_models::{MovieId, MovieUpdate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemotePage {
    pub page: u32,
    pub results: Vec<RemoteSummary>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// Detail payload. Adds `backdrop_path`, which the list schema lacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteDetail {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl From<&RemoteSummary> for MovieUpdate {
    fn from(dto: &RemoteSummary) -> Self {
        Self {
            id: dto.id,
            title: dto.title.clone(),
            poster_path: dto.poster_path.clone(),
            vote_average: dto.vote_average,
            release_date: dto.release_date.clone(),
            original_language: dto.original_language.clone(),
            overview: dto.overview.clone(),
        }
    }
}

impl From<&RemoteDetail> for MovieUpdate {
    fn from(dto: &RemoteDetail) -> Self {
        Self {
            id: dto.id,
            title: dto.title.clone(),
            poster_path: dto.poster_path.clone(),
            vote_average: dto.vote_average,
            release_date: dto.release_date.clone(),
            original_language: dto.original_language.clone(),
            overview: dto.overview.clone(),
        }
    }
}
