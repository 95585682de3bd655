// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording and failing doubles for the finalization sinks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vyvoz_core::domain::{Complaint, PickupRequest, User};
use vyvoz_core::{
    AdapterType, HealthStatus, PluginAdapter, RecordStore, SheetAdapter, UploadAdapter, UserId,
    VyvozError,
};

macro_rules! plugin_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, VyvozError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), VyvozError> {
                Ok(())
            }
        }
    };
}

/// Spreadsheet double that records every appended row.
#[derive(Default)]
pub struct RecordingSheets {
    rows: Mutex<Vec<(String, Vec<String>)>>,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every append fails with a sink error.
    pub fn failing() -> Self {
        let sheets = Self::default();
        sheets.failing.store(true, Ordering::SeqCst);
        sheets
    }

    /// Each append sleeps first, to stand in for a slow remote call.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// `(sheet, row)` pairs in append order.
    pub async fn rows(&self) -> Vec<(String, Vec<String>)> {
        self.rows.lock().await.clone()
    }
}

plugin_adapter!(RecordingSheets, "recording-sheets", AdapterType::Sheets);

#[async_trait]
impl SheetAdapter for RecordingSheets {
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), VyvozError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(VyvozError::sink("sheets", format!("append to {sheet} rejected")));
        }
        self.rows.lock().await.push((sheet.to_string(), row));
        Ok(())
    }
}

/// Upload double that records destination paths and returns a fake link.
#[derive(Default)]
pub struct RecordingUploader {
    uploads: Mutex<Vec<(String, usize)>>,
    failing: AtomicBool,
}

impl RecordingUploader {
    pub const BASE_URL: &'static str = "https://disk.example/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let uploader = Self::default();
        uploader.failing.store(true, Ordering::SeqCst);
        uploader
    }

    /// `(destination_path, byte_len)` pairs in upload order.
    pub async fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().await.clone()
    }
}

plugin_adapter!(RecordingUploader, "recording-uploader", AdapterType::Upload);

#[async_trait]
impl UploadAdapter for RecordingUploader {
    async fn upload(&self, bytes: Vec<u8>, destination_path: &str) -> Result<String, VyvozError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VyvozError::sink("disk", "quota exceeded"));
        }
        self.uploads
            .lock()
            .await
            .push((destination_path.to_string(), bytes.len()));
        Ok(format!("{}{destination_path}", Self::BASE_URL))
    }
}

/// Record store whose writes always fail; reads report an empty store.
#[derive(Default)]
pub struct FailingRecordStore;

impl FailingRecordStore {
    fn write_error() -> VyvozError {
        VyvozError::Storage {
            source: "database is locked".into(),
        }
    }
}

plugin_adapter!(FailingRecordStore, "failing-store", AdapterType::Storage);

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn initialize(&self) -> Result<(), VyvozError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), VyvozError> {
        Ok(())
    }

    async fn user_exists(&self, _id: UserId) -> Result<bool, VyvozError> {
        Ok(false)
    }

    async fn insert_user(&self, _user: &User) -> Result<(), VyvozError> {
        Err(Self::write_error())
    }

    async fn lookup_user(&self, _id: UserId) -> Result<Option<User>, VyvozError> {
        Ok(None)
    }

    async fn insert_pickup_request(&self, _request: &PickupRequest) -> Result<i64, VyvozError> {
        Err(Self::write_error())
    }

    async fn insert_complaint(&self, _complaint: &Complaint) -> Result<i64, VyvozError> {
        Err(Self::write_error())
    }
}

/// Record store where every user is registered and one user's lookup
/// stalls for `delay`. Writes succeed without storing anything.
pub struct SlowLookupStore {
    slow_user: UserId,
    delay: Duration,
}

impl SlowLookupStore {
    pub fn new(slow_user: UserId, delay: Duration) -> Self {
        Self { slow_user, delay }
    }
}

plugin_adapter!(SlowLookupStore, "slow-lookup-store", AdapterType::Storage);

#[async_trait]
impl RecordStore for SlowLookupStore {
    async fn initialize(&self) -> Result<(), VyvozError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), VyvozError> {
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> Result<bool, VyvozError> {
        if id == self.slow_user {
            tokio::time::sleep(self.delay).await;
        }
        Ok(true)
    }

    async fn insert_user(&self, _user: &User) -> Result<(), VyvozError> {
        Ok(())
    }

    async fn lookup_user(&self, _id: UserId) -> Result<Option<User>, VyvozError> {
        Ok(None)
    }

    async fn insert_pickup_request(&self, _request: &PickupRequest) -> Result<i64, VyvozError> {
        Ok(1)
    }

    async fn insert_complaint(&self, _complaint: &Complaint) -> Result<i64, VyvozError> {
        Ok(1)
    }
}
