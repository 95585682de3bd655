// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end dialogue testing.
//!
//! `TestHarness` assembles a complete dialogue stack: mock channel, temp
//! SQLite record store, in-memory sessions, recording sinks, and a
//! [`DialogueLoop`]. Events are driven through
//! [`DialogueLoop::handle_inbound`] so each call returns only the replies
//! produced by that event.

use std::sync::Arc;

use vyvoz_config::model::StorageConfig;
use vyvoz_core::types::{EventPayload, OutboundMessage, PhotoRef, Recipient, UserId};
use vyvoz_core::{ChannelAdapter, RecordStore, VyvozError};
use vyvoz_dialogue::{
    DialogueEngine, DialogueLoop, EngineSettings, Finalizer, MemorySessionStore, menus,
};
use vyvoz_storage::SqliteStore;

use crate::mock_channel::{MockChannel, event};
use crate::mock_sinks::{RecordingSheets, RecordingUploader};

/// Folder the harness uploads photos into.
pub const PHOTO_FOLDER: &str = "kgm_photos";

/// Builder for creating test environments with configurable sinks.
pub struct TestHarnessBuilder {
    settings: EngineSettings,
    sheets: Option<RecordingSheets>,
    uploader: Option<RecordingUploader>,
    store: Option<Arc<dyn RecordStore>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            settings: EngineSettings::default(),
            sheets: Some(RecordingSheets::new()),
            uploader: Some(RecordingUploader::new()),
            store: None,
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sheets(mut self, sheets: RecordingSheets) -> Self {
        self.sheets = Some(sheets);
        self
    }

    pub fn with_uploader(mut self, uploader: RecordingUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Leaves sheet export unconfigured.
    pub fn without_sheets(mut self) -> Self {
        self.sheets = None;
        self
    }

    /// Leaves photo upload unconfigured.
    pub fn without_uploader(mut self) -> Self {
        self.uploader = None;
        self
    }

    /// Replaces the SQLite store used by the loop and the finalizer.
    pub fn with_record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> Result<TestHarness, VyvozError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| VyvozError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let sqlite = Arc::new(SqliteStore::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        sqlite.initialize().await?;
        let store: Arc<dyn RecordStore> = match self.store {
            Some(store) => store,
            None => sqlite.clone(),
        };

        let channel = Arc::new(MockChannel::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let sheets = self.sheets.map(Arc::new);
        let uploader = self.uploader.map(Arc::new);

        let mut finalizer = Finalizer::new(channel.clone(), store.clone());
        if let Some(sheets) = &sheets {
            finalizer = finalizer.with_sheets(sheets.clone());
        }
        if let Some(uploader) = &uploader {
            finalizer = finalizer.with_uploader(uploader.clone(), PHOTO_FOLDER);
        }

        let dialogue = DialogueLoop::new(
            channel.clone(),
            store,
            sessions.clone(),
            DialogueEngine::new(self.settings),
            finalizer,
        );

        Ok(TestHarness {
            channel,
            sqlite,
            sessions,
            sheets,
            uploader,
            dialogue,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete dialogue environment with mock adapters and temp storage.
pub struct TestHarness {
    pub channel: Arc<MockChannel>,
    /// Temp SQLite store, cleaned up on drop. Also the loop's store unless
    /// the builder replaced it.
    pub sqlite: Arc<SqliteStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub sheets: Option<Arc<RecordingSheets>>,
    pub uploader: Option<Arc<RecordingUploader>>,
    pub dialogue: DialogueLoop,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Handles one event and returns the replies it produced, in order.
    pub async fn send(
        &self,
        user: i64,
        payload: EventPayload,
    ) -> Result<Vec<OutboundMessage>, VyvozError> {
        let before = self.channel.sent_to(Recipient::User(UserId(user))).await.len();
        self.dialogue.handle_inbound(event(user, payload)).await?;
        let sent = self.channel.sent_to(Recipient::User(UserId(user))).await;
        Ok(sent[before..].to_vec())
    }

    pub async fn text(&self, user: i64, text: &str) -> Result<Vec<OutboundMessage>, VyvozError> {
        self.send(user, EventPayload::Text(text.to_string())).await
    }

    pub async fn button(&self, user: i64, data: &str) -> Result<Vec<OutboundMessage>, VyvozError> {
        self.send(user, EventPayload::Button(data.to_string())).await
    }

    /// Sends a photo, making its bytes downloadable first.
    pub async fn photo(
        &self,
        user: i64,
        photo: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<OutboundMessage>, VyvozError> {
        self.channel.add_photo(photo, bytes).await;
        self.send(user, EventPayload::Photo(PhotoRef(photo.to_string())))
            .await
    }

    pub async fn cancel(&self, user: i64) -> Result<Vec<OutboundMessage>, VyvozError> {
        self.send(user, EventPayload::Cancel).await
    }

    /// Waits for every finalization spawned so far.
    pub async fn settle(&self) {
        self.dialogue.wait_for_finalizations().await;
    }

    /// Runs the registration flow for `user` and waits for the insert.
    pub async fn register(&self, user: i64) -> Result<(), VyvozError> {
        self.button(user, menus::REGISTER).await?;
        self.text(user, "Тестов Тест Тестович").await?;
        self.text(user, "+7 913 000-00-00").await?;
        self.text(user, "Школа 1").await?;
        self.button(user, menus::CONFIRM).await?;
        self.settle().await;
        Ok(())
    }

    /// Walks the pickup flow up to the confirmation step.
    pub async fn pickup_until_confirm(
        &self,
        user: i64,
        photo: Option<&str>,
    ) -> Result<(), VyvozError> {
        self.button(user, menus::PICKUP).await?;
        self.text(user, "Иванов Иван Иванович").await?;
        self.text(user, "8 913 123 45 67").await?;
        self.text(user, "УК Сибирь").await?;
        self.button(user, "district:leninsky").await?;
        self.text(user, "ул. Станиславского, 5").await?;
        self.button(user, "waste:bulky").await?;
        self.text(user, "Старый диван").await?;
        match photo {
            Some(id) => self.photo(user, id, vec![0xFF, 0xD8, 0xFF]).await?,
            None => self.button(user, menus::NO_PHOTO).await?,
        };
        Ok(())
    }

    /// Registered sheet rows, or an empty list when export is unconfigured.
    pub async fn sheet_rows(&self) -> Vec<(String, Vec<String>)> {
        match &self.sheets {
            Some(sheets) => sheets.rows().await,
            None => Vec::new(),
        }
    }

    /// Messages that reached the operator chat.
    pub async fn operator_messages(&self) -> Vec<OutboundMessage> {
        self.channel.sent_to(Recipient::Operators).await
    }

    /// The loop's channel as a trait object.
    pub fn channel_adapter(&self) -> Arc<dyn ChannelAdapter> {
        self.channel.clone()
    }
}
