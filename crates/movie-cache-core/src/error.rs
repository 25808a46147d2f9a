use movie_cache_models::{InvalidUpdate, MovieId};
use movie_cache_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("movie {0} not found")]
    NotFound(MovieId),

    #[error("invalid movie record: {0}")]
    InvalidRecord(#[from] InvalidUpdate),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors surfaced by `MovieRepository`. Source and store failures are
/// passed through as-is; the repository adds no retry or fallback.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Remote(#[from] SourceError),

    #[error("movie {0} not found")]
    NotFound(MovieId),

    #[error("invalid page number {0}: pages start at 1")]
    InvalidPage(u32),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RepositoryError::NotFound(id),
            other => RepositoryError::Store(other),
        }
    }
}
