// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vyvoz configuration system.

use vyvoz_config::diagnostic::ConfigError;
use vyvoz_config::model::VyvozConfig;
use vyvoz_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_vyvoz_config() {
    let toml = r#"
[bot]
log_level = "debug"
log_file = "/var/log/vyvoz.log"

[telegram]
bot_token = "123:ABC"
operator_chat_id = -1001234567890

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[sheets]
spreadsheet_id = "1AbC"
access_token = "ya29.token"

[sheets.pickup_sheets]
zone1 = "Центр"
zone2 = "Левый берег"
zone3 = "Правый берег"

[disk]
token = "y0_disk"
folder = "photos"

[mail]
smtp_host = "smtp.example.org"
smtp_port = 465
username = "bot@example.org"
password = "secret"

[dialogue]
notify_operators = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.bot.log_file.as_deref(), Some("/var/log/vyvoz.log"));
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.operator_chat_id, Some(-1001234567890));
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert!(config.sheets.is_enabled());
    assert_eq!(config.sheets.pickup_sheets["zone2"], "Левый берег");
    assert_eq!(config.sheets.complaint_sheets["zone3"], "Жалобы Зона 3");
    assert_eq!(config.disk.folder, "photos");
    assert_eq!(config.mail.smtp_port, 465);
    assert!(!config.dialogue.notify_operators);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.bot.log_level, "info");
    assert!(config.bot.log_file.is_none());
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.operator_chat_id.is_none());
    assert!(config.storage.wal_mode);
    assert!(!config.sheets.is_enabled());
    assert_eq!(config.disk.folder, "kgm_photos");
    assert_eq!(config.mail.smtp_host, "smtp.yandex.ru");
    assert_eq!(config.mail.smtp_port, 587);
    assert!(config.dialogue.notify_operators);
}

/// Unknown field in [telegram] section is rejected.
#[test]
fn unknown_field_in_telegram_produces_error() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bot_tken"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[anthropic]
api_key = "x"
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("anthropic"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// An env-style override (`VYVOZ_TELEGRAM_BOT_TOKEN`) lands on `telegram.bot_token`.
#[test]
fn env_override_maps_to_bot_token() {
    use figment::{Figment, providers::Serialized};
    use vyvoz_config::loader::env_key_to_path;

    let path = env_key_to_path("telegram_bot_token");
    let config: VyvozConfig = Figment::new()
        .merge(Serialized::defaults(VyvozConfig::default()))
        .merge((path.as_str(), "xyz-from-env"))
        .extract()
        .expect("should set bot_token via dot notation");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
}

/// Env-style override replaces a value coming from TOML.
#[test]
fn env_override_beats_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: VyvozConfig = Figment::new()
        .merge(Serialized::defaults(VyvozConfig::default()))
        .merge(Toml::string("[disk]\nfolder = \"from-toml\"\n"))
        .merge(("disk.folder", "from-env"))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.disk.folder, "from-env");
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: VyvozConfig = Figment::new()
        .merge(Serialized::defaults(VyvozConfig::default()))
        .merge(Toml::file("/nonexistent/path/vyvoz.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.disk.folder, "kgm_photos");
}

/// Unknown key produces an UnknownKey diagnostic with a suggestion.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[telegram]
operator_chatid = 1
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "operator_chatid"
                && suggestion.as_deref() == Some("operator_chat_id")
                && valid_keys.contains("bot_token")
        })
    });
    assert!(
        has_unknown_key,
        "expected UnknownKey for operator_chatid, got: {errors:?}"
    );
}

/// Invalid type (string where number expected) is reported.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[mail]
smtp_port = "submission"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("smtp_port"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_rejects_incomplete_zone_table() {
    let toml = r#"
[sheets.complaint_sheets]
zone1 = "Жалобы"
"#;

    let errors = load_and_validate_str(toml).expect_err("zone2 and zone3 are missing");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("zone2")))
    );
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "foldr".to_string(),
        suggestion: Some("folder".to_string()),
        valid_keys: "token, folder, api_base".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `folder`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("foldr"));
}

/// A valid TOML string passes both parse and validation.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[telegram]
bot_token = "1:x"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("1:x"));
}
