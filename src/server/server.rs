use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub profile_service: Arc<dyn ProfileService>,
    pub relationship_service: Arc<dyn RelationshipService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let profile_repo: Arc<dyn ProfileRepo>;
        let relationship_repo: Arc<dyn RelationshipRepo>;
        let tx_manager: Arc<dyn TxManager>;
        let pool = match settings.storage.backend.as_str() {
            "mysql" => {
                let pool = Pool::<MySql>::connect(&settings.database.dsn).await?;
                profile_repo = Arc::new(MySqlProfileRepo::new(pool.clone()));
                relationship_repo = Arc::new(MySqlRelationshipRepo::new(pool.clone()));
                tx_manager = Arc::new(MySqlTxManager::new(pool.clone()));
                Some(pool)
            }
            "memory" => {
                profile_repo = Arc::new(MemoryProfileRepo::new());
                relationship_repo = Arc::new(MemoryRelationshipRepo::new());
                tx_manager = Arc::new(MemoryTxManager::new());
                None
            }
            other => return Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        };

        // token issuance belongs to the account subsystem; only its
        // verification port is wired here
        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let profile_service: Arc<dyn ProfileService> = Arc::new(RealProfileService::new(
            profile_repo,
            tx_manager.clone(),
        ));

        let relationship_service: Arc<dyn RelationshipService> = Arc::new(
            RealRelationshipService::new(relationship_repo, tx_manager.clone()),
        );

        info!("server started");

        Ok(Self {
            auth_service,
            profile_service,
            relationship_service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
