// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vyvoz serve` command implementation.
//!
//! Wires the SQLite record store, the Telegram channel and the optional
//! Sheets/Disk sinks into a [`DialogueLoop`], then runs it until SIGTERM or
//! Ctrl+C. In-flight finalizations are drained before the process exits.

use std::sync::Arc;

use tracing::{error, info, warn};
use vyvoz_config::model::VyvozConfig;
use vyvoz_core::{ChannelAdapter, PluginAdapter, RecordStore, VyvozError};
use vyvoz_dialogue::shutdown;
use vyvoz_dialogue::{DialogueEngine, DialogueLoop, EngineSettings, Finalizer, MemorySessionStore};
use vyvoz_disk::YandexDisk;
use vyvoz_sheets::GoogleSheets;
use vyvoz_storage::SqliteStore;
use vyvoz_telegram::TelegramChannel;

/// Builds the finalizer with whichever sinks are configured.
fn build_finalizer(
    config: &VyvozConfig,
    channel: Arc<dyn ChannelAdapter>,
    store: Arc<dyn RecordStore>,
) -> Result<Finalizer, VyvozError> {
    let mut finalizer = Finalizer::new(channel, store);

    match GoogleSheets::from_config(&config.sheets)? {
        Some(sheets) => finalizer = finalizer.with_sheets(Arc::new(sheets)),
        None => warn!("sheets export not configured, rows will be skipped"),
    }
    match YandexDisk::from_config(&config.disk)? {
        Some(disk) => finalizer = finalizer.with_uploader(Arc::new(disk), &config.disk.folder),
        None => warn!("disk upload not configured, photos will keep their placeholder"),
    }

    Ok(finalizer)
}

/// Runs the `vyvoz serve` command.
pub async fn run_serve(config: VyvozConfig) -> Result<(), VyvozError> {
    info!("starting vyvoz serve");

    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let store: Arc<dyn RecordStore> = Arc::new(store);

    let mut telegram = TelegramChannel::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in vyvoz.toml or VYVOZ_TELEGRAM_BOT_TOKEN"
        );
        e
    })?;
    telegram.connect().await?;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    if config.telegram.operator_chat_id.is_none() {
        warn!("telegram.operator_chat_id not set, operator messages are only logged");
    }

    let finalizer = build_finalizer(&config, channel.clone(), store.clone())?;
    let engine = DialogueEngine::new(EngineSettings::from_config(&config));
    let sessions = Arc::new(MemorySessionStore::new());
    let dialogue = DialogueLoop::new(channel.clone(), store, sessions, engine, finalizer);

    let cancel = shutdown::install_signal_handler();
    dialogue.run(cancel).await?;

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    info!("vyvoz serve stopped");
    Ok(())
}
