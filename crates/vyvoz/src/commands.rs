// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `init-db`, `mail` and `config`.

use tracing::info;
use vyvoz_config::model::VyvozConfig;
use vyvoz_core::{MailAdapter, RecordStore, VyvozError};
use vyvoz_email::SmtpMailer;
use vyvoz_storage::SqliteStore;

/// Opens the database, applies migrations and checkpoints it.
pub async fn run_init_db(config: &VyvozConfig) -> Result<(), VyvozError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    store.close().await?;
    info!(path = %config.storage.database_path, "database schema ready");
    println!("database ready: {}", config.storage.database_path);
    Ok(())
}

/// Sends `body` to `recipient` through the configured SMTP account.
pub async fn run_mail(config: &VyvozConfig, body: &str, recipient: &str) -> Result<(), VyvozError> {
    let mailer = SmtpMailer::from_config(&config.mail)?;
    mailer.send(body, recipient).await?;
    info!(recipient, "mail sent");
    println!("mail sent to {recipient}");
    Ok(())
}

/// Prints the effective configuration, secrets masked.
pub fn print_config(config: &VyvozConfig) -> Result<(), VyvozError> {
    let rendered = vyvoz_config::render_redacted(config)
        .map_err(|e| VyvozError::Internal(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}
