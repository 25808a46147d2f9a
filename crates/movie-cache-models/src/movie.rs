use serde::{Deserialize, Serialize};
use crate::record::{MovieId, MovieRecord};

/// Read-only list projection of a stored record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub is_favorite: bool,
}

impl From<&MovieRecord> for Movie {
    fn from(record: &MovieRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            poster_path: record.poster_path.clone(),
            vote_average: record.vote_average,
            release_date: record.release_date.clone(),
            original_language: record.original_language.clone(),
            overview: record.overview.clone(),
            is_favorite: record.is_favorite,
        }
    }
}

/// Detail projection. `backdrop_path` is never persisted; it comes from the
/// detail response that produced this value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub is_favorite: bool,
}

impl MovieDetail {
    pub fn from_record(record: &MovieRecord, backdrop_path: Option<String>) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            poster_path: record.poster_path.clone(),
            backdrop_path,
            vote_average: record.vote_average,
            release_date: record.release_date.clone(),
            original_language: record.original_language.clone(),
            overview: record.overview.clone(),
            is_favorite: record.is_favorite,
        }
    }
}

/// One page of the discovery listing, in remote order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    pub movies: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
}
