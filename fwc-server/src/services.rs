//! Service construction and dependency wiring

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use url::Url;

use fwc_config::FwcConfig;
use fwc_identity::{
    DisabledRoleSync, IdentityState, NeonRoleSync, RoleSync, UserProvisioner, UserStore,
};
use fwc_rbac::{AccessEngine, PolicyTable, RbacConfig};
use fwc_storage::{SeaOrmProfileStore, SeaOrmUserStore};

use crate::handlers::ProfileApiState;

/// Service container holding all application services
#[derive(Clone)]
pub struct ServiceContainer {
    pub engine: AccessEngine,
    pub rbac: Arc<RbacConfig>,
    pub users: Arc<SeaOrmUserStore>,
    pub profiles: Arc<SeaOrmProfileStore>,
    pub provisioner: UserProvisioner,
    internal_secret: Option<String>,
    api_key: Option<Arc<str>>,
}

impl ServiceContainer {
    /// Connect to the database and build every service
    pub async fn new(config: &FwcConfig) -> Result<Self> {
        let db = fwc_storage::connect(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to connect to database")?;

        if config.database.create_schema {
            fwc_storage::create_schema(&db)
                .await
                .context("Failed to create schema")?;
        }

        Self::from_connection(db, config)
    }

    /// Build every service on an existing connection
    pub fn from_connection(db: DatabaseConnection, config: &FwcConfig) -> Result<Self> {
        let table = PolicyTable::standard();
        table.validate().context("Collection policies are inconsistent")?;

        let rbac = config.auth.rbac_config();
        let users = Arc::new(SeaOrmUserStore::new(db.clone()));
        let profiles = Arc::new(SeaOrmProfileStore::new(db));
        let engine = AccessEngine::new(Arc::new(table), profiles.clone(), rbac.clone());

        let default_role = config.auth.default_role()?;
        let provisioner = UserProvisioner::new(users.clone(), role_sync(config)?, default_role);

        Ok(Self {
            engine,
            rbac: Arc::new(rbac),
            users,
            profiles,
            provisioner,
            internal_secret: config.auth.internal_secret.clone(),
            api_key: config.auth.api_key.as_deref().map(Arc::from),
        })
    }

    pub fn identity_state(&self) -> IdentityState {
        IdentityState::new(self.provisioner.clone(), self.internal_secret.clone())
    }

    pub fn profile_api_state(&self) -> ProfileApiState {
        let users: Arc<dyn UserStore> = self.users.clone();
        ProfileApiState {
            engine: self.engine.clone(),
            users,
            profiles: self.profiles.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

fn role_sync(config: &FwcConfig) -> Result<Arc<dyn RoleSync>> {
    match config.identity_provider.credentials() {
        Some((base_url, secret)) => {
            let base_url = Url::parse(base_url).context("Invalid identity provider URL")?;
            tracing::info!(%base_url, "Identity provider role sync enabled");
            Ok(Arc::new(NeonRoleSync::new(base_url, secret)))
        }
        None => {
            tracing::warn!("Identity provider credentials missing; role sync disabled");
            Ok(Arc::new(DisabledRoleSync))
        }
    }
}
