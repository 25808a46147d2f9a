pub mod dto;
pub mod error;
pub mod image;
pub mod offline;
pub mod tmdb;
pub mod traits;

pub use dto::{RemoteDetail, RemotePage, RemoteSummary};
pub use error::SourceError;
pub use image::compose_image_url;
pub use offline::OfflineSource;
pub use reqwest::Url;
pub use tmdb::TmdbClient;
pub use traits::RemoteSource;
