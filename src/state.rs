use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::fiction_repository::{FictionRepository, MongoFictionRepository};
use crate::db::user_repository::{MongoUserRepository, UserRepository};
use crate::error::AppError;
use crate::storage::client::{LocalStorageClient, StorageClient};

/// Shared state handed to every handler.
///
/// Collaborators are trait objects so tests can swap in mocks.
#[derive(Clone)]
pub struct AppState {
    pub fiction_repo: Arc<dyn FictionRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub storage_client: Arc<dyn StorageClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire MongoDB-backed repositories and local upload storage.
    ///
    /// The client is owned by the caller, which is also responsible for
    /// shutting it down.
    pub async fn connect(client: &mongodb::Client, config: AppConfig) -> Result<Self, AppError> {
        let db = client.database(&config.mongodb_database);

        let fiction_repo = MongoFictionRepository::new(&db);
        fiction_repo.ensure_indexes().await?;

        let user_repo = MongoUserRepository::new(&db);
        user_repo.ensure_indexes().await?;

        let storage_client = LocalStorageClient::new(&config.uploads_dir).await?;

        Ok(Self {
            fiction_repo: Arc::new(fiction_repo),
            user_repo: Arc::new(user_repo),
            storage_client: Arc::new(storage_client),
            config: Arc::new(config),
        })
    }
}
