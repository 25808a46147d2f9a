use color_eyre::Result;
use movie_cache_config::{Config, CredentialStore, PathManager};
use movie_cache_core::{LocalStore, MovieRepository};
use movie_cache_sources::{OfflineSource, TmdbClient};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs before it touches the network.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
        Ok(Self { paths, config })
    }

    fn open_store(&self) -> Result<Arc<LocalStore>> {
        let store_path = self.config.store_path(&self.paths);
        let store = LocalStore::open(&store_path)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to open movie store at {}: {}", store_path.display(), e))?;
        debug!("Opened movie store at {}", store_path.display());
        Ok(Arc::new(store))
    }

    /// Compose client, store and repository. The store is opened once here
    /// and shared for the life of the process.
    pub fn repository(&self) -> Result<Arc<MovieRepository>> {
        let credentials_file = self.paths.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
        let api_key = cred_store
            .resolve_tmdb_api_key()
            .map_err(|e| color_eyre::eyre::eyre!("{}\nRun 'movies config init --api-key <KEY>' first.", e))?;

        let client = TmdbClient::from_config(&self.config.tmdb, api_key)?;
        let store = self.open_store()?;
        Ok(Arc::new(MovieRepository::new(Arc::new(client), store)))
    }

    /// Repository for commands that only touch local state. No API key is
    /// needed; any remote fetch fails with a configuration error.
    pub fn local_repository(&self) -> Result<Arc<MovieRepository>> {
        let source = OfflineSource::from_config(&self.config.tmdb);
        let store = self.open_store()?;
        Ok(Arc::new(MovieRepository::new(Arc::new(source), store)))
    }
}
