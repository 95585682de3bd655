// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use vyvoz_config::model::BotConfig;
use vyvoz_core::VyvozError;

/// Default filter: our crates at the configured level, everything else at warn.
fn default_directives(log_level: &str) -> String {
    format!("vyvoz={log_level},warn")
}

/// Installs the global subscriber. `RUST_LOG` overrides `bot.log_level`;
/// `bot.log_file` redirects output from stderr to an appended file.
pub fn init_tracing(bot: &BotConfig) -> Result<(), VyvozError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&bot.log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false);

    match &bot.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| VyvozError::Config(format!("cannot open bot.log_file {path}: {e}")))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
