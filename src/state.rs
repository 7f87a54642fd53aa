use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::store::{MemoryStore, Store};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl AppState {
    /// Connects and migrates the Postgres store; an unreachable store or a
    /// failed migration fails startup.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = PgStore::connect(&config.database).await?;
        store.migrate().await?;
        Ok(Self::from_parts(Arc::new(store), Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::from(&config.jwt);
        Self {
            store,
            keys,
            config,
        }
    }

    /// State backed by [`MemoryStore`], for tests and database-less runs.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(Arc::new(MemoryStore::new()), Arc::new(config))
    }
}
