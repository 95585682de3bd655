// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vyvoz intake bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use vyvoz_core::domain::CostZone;

/// Top-level Vyvoz configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VyvozConfig {
    /// Process-level settings (logging).
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Local record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Google Sheets export and worksheet routing.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Yandex Disk photo upload.
    #[serde(default)]
    pub disk: DiskConfig,

    /// SMTP mail utility.
    #[serde(default)]
    pub mail: MailConfig,

    /// Dialogue behavior toggles.
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `vyvoz serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat that receives new-request announcements and sink failure alerts.
    /// `None` turns operator messages into log lines only.
    #[serde(default)]
    pub operator_chat_id: Option<i64>,
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vyvoz").join("vyvoz.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vyvoz.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Google Sheets export configuration.
///
/// Export is enabled when both `spreadsheet_id` and `access_token` are set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// OAuth bearer token with the spreadsheets scope.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,

    /// Worksheet per cost zone for pickup requests (`zone1 = "..."`).
    #[serde(default = "default_pickup_sheets")]
    pub pickup_sheets: BTreeMap<String, String>,

    /// Worksheet per cost zone for complaints.
    #[serde(default = "default_complaint_sheets")]
    pub complaint_sheets: BTreeMap<String, String>,
}

impl SheetsConfig {
    pub fn is_enabled(&self) -> bool {
        self.spreadsheet_id.is_some() && self.access_token.is_some()
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            access_token: None,
            api_base: default_sheets_api_base(),
            pickup_sheets: default_pickup_sheets(),
            complaint_sheets: default_complaint_sheets(),
        }
    }
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn zone_table(prefix: &str) -> BTreeMap<String, String> {
    CostZone::iter()
        .map(|zone| (zone.key().to_string(), format!("{prefix} {}", zone.label())))
        .collect()
}

fn default_pickup_sheets() -> BTreeMap<String, String> {
    zone_table("КГМ")
}

fn default_complaint_sheets() -> BTreeMap<String, String> {
    zone_table("Жалобы")
}

/// Yandex Disk upload configuration. Uploads are enabled when `token` is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiskConfig {
    /// OAuth token for the Disk REST API.
    #[serde(default)]
    pub token: Option<String>,

    /// Folder that receives request photos.
    #[serde(default = "default_disk_folder")]
    pub folder: String,

    #[serde(default = "default_disk_api_base")]
    pub api_base: String,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            token: None,
            folder: default_disk_folder(),
            api_base: default_disk_api_base(),
        }
    }
}

fn default_disk_folder() -> String {
    "kgm_photos".to_string()
}

fn default_disk_api_base() -> String {
    "https://cloud-api.yandex.net".to_string()
}

/// SMTP configuration for the mail utility.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender address; defaults to `username` when unset.
    #[serde(default)]
    pub from: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.yandex.ru".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

/// Dialogue behavior toggles.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueConfig {
    /// Announce every confirmed request in the operator chat.
    #[serde(default = "default_notify_operators")]
    pub notify_operators: bool,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            notify_operators: default_notify_operators(),
        }
    }
}

fn default_notify_operators() -> bool {
    true
}
