// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vyvoz.toml` > `~/.config/vyvoz/vyvoz.toml` > `/etc/vyvoz/vyvoz.toml`
//! with environment variable overrides via `VYVOZ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VyvozConfig;

/// Top-level sections, used to turn `VYVOZ_<SECTION>_<KEY>` into `section.key`.
const SECTIONS: &[&str] = &[
    "bot", "telegram", "storage", "sheets", "disk", "mail", "dialogue",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vyvoz/vyvoz.toml` (system-wide)
/// 3. `~/.config/vyvoz/vyvoz.toml` (user XDG config)
/// 4. `./vyvoz.toml` (local directory)
/// 5. `VYVOZ_*` environment variables
pub fn load_config() -> Result<VyvozConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VyvozConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VyvozConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VyvozConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VyvozConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VyvozConfig::default()))
        .merge(Toml::file("/etc/vyvoz/vyvoz.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vyvoz/vyvoz.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vyvoz.toml"))
        .merge(env_provider())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
///
/// Only the leading section name is split off, so `telegram_bot_token`
/// becomes `telegram.bot_token` and never `telegram.bot.token`.
pub fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("VYVOZ_").map(|key| env_key_to_path(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(env_key_to_path("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(
            env_key_to_path("telegram_operator_chat_id"),
            "telegram.operator_chat_id"
        );
        assert_eq!(env_key_to_path("bot_log_file"), "bot.log_file");
        assert_eq!(env_key_to_path("sheets_access_token"), "sheets.access_token");
        assert_eq!(env_key_to_path("disk_token"), "disk.token");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(env_key_to_path("unrelated"), "unrelated");
    }
}
