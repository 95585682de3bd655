// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;
use vyvoz_core::VyvozError;

use crate::migrations;

/// Handle to the single SQLite connection backing the record store.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs and
    /// runs pending migrations. Existing data is never touched.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, VyvozError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| VyvozError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| VyvozError::Storage {
                source: Box::new(e),
            })?;

        Self::prepare(conn, wal_mode).await
    }

    /// Opens a private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, VyvozError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| VyvozError::Storage {
                source: Box::new(e),
            })?;

        Self::prepare(conn, false).await
    }

    async fn prepare(conn: tokio_rusqlite::Connection, wal_mode: bool) -> Result<Self, VyvozError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| VyvozError::Storage {
                source: format!("migration failed: {e}").into(),
            })?;

        debug!(wal_mode, "database ready");
        Ok(Self { conn })
    }

    /// The underlying async connection. Every query goes through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Truncates the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), VyvozError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite call error into the crate-wide error type.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VyvozError {
    VyvozError::Storage {
        source: Box::new(e),
    }
}
