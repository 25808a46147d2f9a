use serde::{Deserialize, Serialize};
use crate::record::MovieId;

/// A favorite flag flip, published after it has been committed to the local store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteChange {
    pub id: MovieId,
    pub is_favorite: bool,
}

impl FavoriteChange {
    pub fn new(id: MovieId, is_favorite: bool) -> Self {
        Self { id, is_favorite }
    }
}
