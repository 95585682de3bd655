// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite record store for the Vyvoz intake bot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. Users, pickup
//! requests and complaints are append-only: there is no update path.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
