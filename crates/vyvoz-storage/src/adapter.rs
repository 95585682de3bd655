// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use vyvoz_config::model::StorageConfig;
use vyvoz_core::domain::{Complaint, PickupRequest, User};
use vyvoz_core::{AdapterType, HealthStatus, PluginAdapter, RecordStore, UserId, VyvozError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed record store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`RecordStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new store for the given configuration.
    ///
    /// The database connection is not opened until [`RecordStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, VyvozError> {
        self.db.get().ok_or_else(|| VyvozError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, VyvozError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VyvozError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn initialize(&self) -> Result<(), VyvozError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| VyvozError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite record store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), VyvozError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> Result<bool, VyvozError> {
        queries::users::user_exists(self.db()?, id).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), VyvozError> {
        queries::users::insert_user(self.db()?, user).await
    }

    async fn lookup_user(&self, id: UserId) -> Result<Option<User>, VyvozError> {
        queries::users::lookup_user(self.db()?, id).await
    }

    async fn insert_pickup_request(&self, request: &PickupRequest) -> Result<i64, VyvozError> {
        queries::pickups::insert_pickup_request(self.db()?, request).await
    }

    async fn insert_complaint(&self, complaint: &Complaint) -> Result<i64, VyvozError> {
        queries::complaints::insert_complaint(self.db()?, complaint).await
    }
}
