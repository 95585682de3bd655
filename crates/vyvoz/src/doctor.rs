// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vyvoz doctor` command implementation.
//!
//! Checks the database and every configured external service through the
//! adapters' health checks, without starting the bot.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use vyvoz_config::model::VyvozConfig;
use vyvoz_core::{HealthStatus, PluginAdapter, RecordStore, VyvozError};
use vyvoz_disk::YandexDisk;
use vyvoz_email::SmtpMailer;
use vyvoz_sheets::GoogleSheets;
use vyvoz_storage::SqliteStore;
use vyvoz_telegram::TelegramChannel;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `vyvoz doctor` command.
pub async fn run_doctor(config: &VyvozConfig, plain: bool) -> Result<(), VyvozError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_database(config).await,
        check_telegram(config).await,
        check_operator_chat(config),
        check_sheets(config).await,
        check_disk(config).await,
        check_mail(config).await,
    ];

    println!();
    println!("  vyvoz doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();
    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Maps an adapter's health report onto a check result.
async fn check_adapter(name: &str, adapter: &dyn PluginAdapter, start: Instant) -> CheckResult {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "reachable", start),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new(name, CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new(name, CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

fn not_configured(name: &str, hint: &str, start: Instant) -> CheckResult {
    CheckResult::new(name, CheckStatus::Warn, format!("not configured ({hint})"), start)
}

async fn check_database(config: &VyvozConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.storage.database_path;
    if !std::path::Path::new(path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {path} (run `vyvoz init-db`)"),
            start,
        );
    }

    let store = SqliteStore::new(config.storage.clone());
    if let Err(e) = store.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start);
    }
    check_adapter("Database", &store, start).await
}

async fn check_telegram(config: &VyvozConfig) -> CheckResult {
    let start = Instant::now();
    match TelegramChannel::new(&config.telegram) {
        Ok(channel) => check_adapter("Telegram", &channel, start).await,
        Err(e) => CheckResult::new("Telegram", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_operator_chat(config: &VyvozConfig) -> CheckResult {
    let start = Instant::now();
    match config.telegram.operator_chat_id {
        Some(id) => CheckResult::new("Operator chat", CheckStatus::Pass, id.to_string(), start),
        None => not_configured("Operator chat", "alerts go to the log only", start),
    }
}

async fn check_sheets(config: &VyvozConfig) -> CheckResult {
    let start = Instant::now();
    match GoogleSheets::from_config(&config.sheets) {
        Ok(Some(sheets)) => check_adapter("Google Sheets", &sheets, start).await,
        Ok(None) => not_configured("Google Sheets", "rows are skipped", start),
        Err(e) => CheckResult::new("Google Sheets", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_disk(config: &VyvozConfig) -> CheckResult {
    let start = Instant::now();
    match YandexDisk::from_config(&config.disk) {
        Ok(Some(disk)) => check_adapter("Yandex Disk", &disk, start).await,
        Ok(None) => not_configured("Yandex Disk", "photos are not uploaded", start),
        Err(e) => CheckResult::new("Yandex Disk", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_mail(config: &VyvozConfig) -> CheckResult {
    let start = Instant::now();
    if config.mail.username.is_none() {
        return not_configured("Mail", "`vyvoz mail` unavailable", start);
    }
    match SmtpMailer::from_config(&config.mail) {
        Ok(mailer) => check_adapter("Mail", &mailer, start).await,
        Err(e) => CheckResult::new("Mail", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_database_warns() {
        let mut config = VyvozConfig::default();
        config.storage.database_path = "/tmp/nonexistent-vyvoz-doctor-xyz.db".into();
        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("init-db"));
    }

    #[tokio::test]
    async fn existing_database_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VyvozConfig::default();
        config.storage.database_path = dir.path().join("doctor.db").display().to_string();
        let store = SqliteStore::new(config.storage.clone());
        store.initialize().await.unwrap();
        store.close().await.unwrap();

        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[tokio::test]
    async fn missing_token_fails_telegram_check() {
        let result = check_telegram(&VyvozConfig::default()).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("bot_token"));
    }

    #[tokio::test]
    async fn optional_services_warn_when_unconfigured() {
        let config = VyvozConfig::default();
        assert_eq!(check_operator_chat(&config).status, CheckStatus::Warn);
        assert_eq!(check_sheets(&config).await.status, CheckStatus::Warn);
        assert_eq!(check_disk(&config).await.status, CheckStatus::Warn);
        assert_eq!(check_mail(&config).await.status, CheckStatus::Warn);
    }

    #[test]
    fn plain_rendering_uses_tags() {
        let result = CheckResult {
            name: "Database".into(),
            status: CheckStatus::Fail,
            message: "locked".into(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("locked (3ms)"));
    }
}
