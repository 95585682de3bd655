// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for the local relational database.

use async_trait::async_trait;

use crate::domain::{Complaint, PickupRequest, User};
use crate::error::VyvozError;
use crate::traits::adapter::PluginAdapter;
use crate::types::UserId;

/// Append-only store for users and finalized requests.
///
/// There is no update or delete path: a user row is immutable once inserted
/// and every request is written at most once, at confirmation time.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Opens the backend and creates the schema if absent (never destructive).
    async fn initialize(&self) -> Result<(), VyvozError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), VyvozError>;

    /// Whether a user with this id has completed registration.
    async fn user_exists(&self, id: UserId) -> Result<bool, VyvozError>;

    /// Inserts a new user. Fails if the id is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), VyvozError>;

    /// Looks up a registered user.
    async fn lookup_user(&self, id: UserId) -> Result<Option<User>, VyvozError>;

    /// Appends a pickup request, returning its row id.
    async fn insert_pickup_request(&self, request: &PickupRequest) -> Result<i64, VyvozError>;

    /// Appends a complaint, returning its row id.
    async fn insert_complaint(&self, complaint: &Complaint) -> Result<i64, VyvozError>;
}
