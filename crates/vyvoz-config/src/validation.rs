// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as complete worksheet routing tables and paired credentials.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;
use vyvoz_core::domain::CostZone;

use crate::diagnostic::ConfigError;
use crate::model::VyvozConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VyvozConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.log_level `{}` must be one of {}",
                config.bot.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let sheets = &config.sheets;
    if sheets.spreadsheet_id.is_some() != sheets.access_token.is_some() {
        errors.push(ConfigError::Validation {
            message: "sheets.spreadsheet_id and sheets.access_token must be set together"
                .to_string(),
        });
    }
    validate_zone_table("sheets.pickup_sheets", &sheets.pickup_sheets, &mut errors);
    validate_zone_table(
        "sheets.complaint_sheets",
        &sheets.complaint_sheets,
        &mut errors,
    );

    if config.disk.token.is_some() && config.disk.folder.trim_matches('/').is_empty() {
        errors.push(ConfigError::Validation {
            message: "disk.folder must not be empty when disk.token is set".to_string(),
        });
    }

    if let Some(from) = &config.mail.from
        && !from.contains('@')
    {
        errors.push(ConfigError::Validation {
            message: format!("mail.from `{from}` is not an email address"),
        });
    }

    if config.mail.username.is_some() != config.mail.password.is_some() {
        errors.push(ConfigError::Validation {
            message: "mail.username and mail.password must be set together".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every cost zone needs a non-empty worksheet, and only known zones are allowed.
fn validate_zone_table(
    name: &str,
    table: &BTreeMap<String, String>,
    errors: &mut Vec<ConfigError>,
) {
    for zone in CostZone::iter() {
        match table.get(zone.key()) {
            None => errors.push(ConfigError::Validation {
                message: format!("{name} has no worksheet for `{}`", zone.key()),
            }),
            Some(sheet) if sheet.trim().is_empty() => errors.push(ConfigError::Validation {
                message: format!("{name}.{} must not be empty", zone.key()),
            }),
            Some(_) => {}
        }
    }

    for key in table.keys() {
        if key.parse::<CostZone>().is_err() {
            errors.push(ConfigError::Validation {
                message: format!("{name} has unknown zone `{key}`"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &VyvozConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&VyvozConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails() {
        let mut config = VyvozConfig::default();
        config.storage.database_path = "  ".into();
        assert!(
            messages(&config)
                .iter()
                .any(|m| m.contains("storage.database_path"))
        );
    }

    #[test]
    fn half_configured_sheets_fail() {
        let mut config = VyvozConfig::default();
        config.sheets.spreadsheet_id = Some("sheet".into());
        assert!(
            messages(&config)
                .iter()
                .any(|m| m.contains("must be set together"))
        );
    }

    #[test]
    fn missing_and_unknown_zones_are_reported_together() {
        let mut config = VyvozConfig::default();
        config.sheets.pickup_sheets.remove("zone2");
        config
            .sheets
            .complaint_sheets
            .insert("zone9".into(), "Жалобы".into());
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("no worksheet for `zone2`")));
        assert!(msgs.iter().any(|m| m.contains("unknown zone `zone9`")));
    }

    #[test]
    fn bad_log_level_fails() {
        let mut config = VyvozConfig::default();
        config.bot.log_level = "loud".into();
        assert!(messages(&config).iter().any(|m| m.contains("bot.log_level")));
    }

    #[test]
    fn mail_from_must_look_like_an_address() {
        let mut config = VyvozConfig::default();
        config.mail.from = Some("robot".into());
        assert!(messages(&config).iter().any(|m| m.contains("mail.from")));
    }
}
