use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote identity of a movie. Zero is never a valid id.
pub type MovieId = u64;

/// Persisted movie row, owned by the local store.
///
/// `is_favorite` is local-only state: merges from the remote never write it,
/// only the favorite toggle does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// The remote-authoritative half of a `MovieRecord`.
///
/// Both wire DTOs convert into this, and it is the only input the store's
/// upsert accepts, so there is no way to smuggle a favorite flag through a merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieUpdate {
    pub id: MovieId,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidUpdate {
    ZeroId,
    VoteAverage { id: MovieId, value: f64 },
}

impl fmt::Display for InvalidUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidUpdate::ZeroId => write!(f, "movie id must be non-zero"),
            InvalidUpdate::VoteAverage { id, value } => {
                write!(f, "movie {} has vote average {} outside 0-10", id, value)
            }
        }
    }
}

impl std::error::Error for InvalidUpdate {}

impl MovieUpdate {
    pub fn new(id: MovieId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InvalidUpdate> {
        if self.id == 0 {
            return Err(InvalidUpdate::ZeroId);
        }
        if let Some(value) = self.vote_average {
            if !value.is_finite() || !(0.0..=10.0).contains(&value) {
                return Err(InvalidUpdate::VoteAverage { id: self.id, value });
            }
        }
        Ok(())
    }
}

impl MovieRecord {
    /// Create a record the first time an id is seen. Favorites start off.
    pub fn from_update(update: &MovieUpdate) -> Self {
        Self {
            id: update.id,
            title: update.title.clone(),
            poster_path: update.poster_path.clone(),
            vote_average: update.vote_average,
            release_date: update.release_date.clone(),
            original_language: update.original_language.clone(),
            overview: update.overview.clone(),
            is_favorite: false,
        }
    }

    /// Apply a fresh remote snapshot.
    ///
    /// Text fields are replaced wholesale, including with `None`. The vote
    /// average keeps its prior value when the remote sends none. The favorite
    /// flag is left alone.
    pub fn merge(&mut self, update: &MovieUpdate) {
        self.title = update.title.clone();
        self.poster_path = update.poster_path.clone();
        if update.vote_average.is_some() {
            self.vote_average = update.vote_average;
        }
        self.release_date = update.release_date.clone();
        self.original_language = update.original_language.clone();
        self.overview = update.overview.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: MovieId, title: &str, vote: Option<f64>) -> MovieUpdate {
        MovieUpdate {
            id,
            title: Some(title.to_string()),
            poster_path: Some(format!("/{}.jpg", id)),
            vote_average: vote,
            release_date: Some("2024-03-01".to_string()),
            original_language: Some("en".to_string()),
            overview: Some("overview".to_string()),
        }
    }

    #[test]
    fn test_from_update_starts_unfavorited() {
        let record = MovieRecord::from_update(&update(7, "Dune", Some(8.2)));
        assert_eq!(record.id, 7);
        assert_eq!(record.title.as_deref(), Some("Dune"));
        assert!(!record.is_favorite);
    }

    #[test]
    fn test_merge_keeps_favorite_and_overwrites_fields() {
        let mut record = MovieRecord::from_update(&update(7, "Dune", Some(8.2)));
        record.is_favorite = true;

        let mut fresh = update(7, "Dune: Part Two", Some(8.5));
        fresh.overview = None;
        record.merge(&fresh);

        assert!(record.is_favorite);
        assert_eq!(record.title.as_deref(), Some("Dune: Part Two"));
        assert_eq!(record.vote_average, Some(8.5));
        assert_eq!(record.overview, None);
    }

    #[test]
    fn test_merge_keeps_vote_average_when_remote_has_none() {
        let mut record = MovieRecord::from_update(&update(7, "Dune", Some(8.2)));
        record.merge(&update(7, "Dune", None));
        assert_eq!(record.vote_average, Some(8.2));
    }

    #[test]
    fn test_validate() {
        assert!(update(1, "A", Some(0.0)).validate().is_ok());
        assert!(update(1, "A", Some(10.0)).validate().is_ok());
        assert!(update(1, "A", None).validate().is_ok());
        assert_eq!(update(0, "A", None).validate(), Err(InvalidUpdate::ZeroId));
        assert!(update(1, "A", Some(10.5)).validate().is_err());
        assert!(update(1, "A", Some(f64::NAN)).validate().is_err());
    }

    #[test]
    fn test_record_without_favorite_field_deserializes() {
        let json = r#"{"id":3,"title":"A","poster_path":null,"vote_average":7.0,"release_date":null,"original_language":"en","overview":null}"#;
        let record: MovieRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_favorite);
    }
}
