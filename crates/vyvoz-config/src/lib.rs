// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Vyvoz intake bot.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `VYVOZ_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use vyvoz_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::VyvozConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `VyvozConfig` or every diagnostic collected.
pub fn load_and_validate() -> Result<VyvozConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<VyvozConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<VyvozConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Render the effective configuration as TOML with credentials masked.
pub fn render_redacted(config: &VyvozConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    mask(&mut shown.telegram.bot_token);
    mask(&mut shown.sheets.access_token);
    mask(&mut shown.disk.token);
    mask(&mut shown.mail.password);
    toml::to_string_pretty(&shown)
}

fn mask(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("********".to_string());
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string("vyvoz.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("vyvoz.toml").display().to_string())
            .unwrap_or_else(|_| "vyvoz.toml".to_string());
        sources.push((path, content));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("vyvoz/vyvoz.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    let system_path = std::path::Path::new("/etc/vyvoz/vyvoz.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
