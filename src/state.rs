use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{
    memory::MemoryUserStore, paths::ExcludedPaths, repo::PgUserStore, repo::UserStore,
    services::AuthService,
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub config: Arc<AppConfig>,
    pub excluded: Arc<ExcludedPaths>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                tracing::info!("using postgres user store");
                Arc::new(PgUserStore::new(db))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory");
                Arc::new(MemoryUserStore::new())
            }
        };
        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: AppConfig) -> Self {
        let excluded = Arc::new(ExcludedPaths::new(&config.excluded_paths));
        if excluded.is_empty() {
            tracing::warn!("no auth exclusions; every gated route needs a session");
        } else {
            tracing::info!(patterns = excluded.len(), "auth exclusions compiled");
        }
        Self {
            auth: AuthService::new(store),
            config: Arc::new(config),
            excluded,
        }
    }

    pub fn fake() -> Self {
        Self::from_parts(Arc::new(MemoryUserStore::new()), AppConfig::default())
    }
}
