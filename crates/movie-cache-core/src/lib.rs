pub mod detail;
pub mod error;
pub mod feed;
pub mod notify;
pub mod repository;
pub mod store;
pub mod store_file;

#[cfg(test)]
mod fake_source;

pub use detail::{follow_detail_favorites, DetailView};
pub use error::{RepositoryError, StoreError};
pub use feed::{follow_favorites, MovieFeed, PageLoad, PREFETCH_THRESHOLD};
pub use notify::{FavoriteNotifier, FavoriteSubscription};
pub use repository::MovieRepository;
pub use store::{LocalStore, UpsertReport};
pub use store_file::StoreFile;
