pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, LoggingConfig, StoreConfig, TmdbConfig, DEFAULT_API_BASE_URL, DEFAULT_IMAGE_BASE_URL, DEFAULT_IMAGE_SIZE};
pub use credentials::{CredentialStore, API_KEY_ENV};
pub use paths::{PathManager, container_base_path};
