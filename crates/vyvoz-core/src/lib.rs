// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vyvoz intake bot.
//!
//! This crate provides the adapter traits the dialogue engine consumes, the
//! shared error type, the transport-level event/reply types, and the domain
//! records with their closed enumerations.

pub mod domain;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VyvozError;
pub use types::{AdapterType, HealthStatus, MessageId, PhotoRef, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{
    ChannelAdapter, MailAdapter, PluginAdapter, RecordStore, SheetAdapter, UploadAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Button, Keyboard, OutboundMessage, Recipient};

    #[test]
    fn vyvoz_error_messages() {
        let config = VyvozError::Config("missing token".into());
        assert_eq!(config.to_string(), "configuration error: missing token");

        let sink = VyvozError::sink("sheets", "HTTP 500");
        assert_eq!(sink.to_string(), "sheets error: HTTP 500");

        let storage = VyvozError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert_eq!(storage.to_string(), "storage error: disk full");

        let timeout = VyvozError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(timeout.to_string().contains("30s"));
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Channel,
            AdapterType::Storage,
            AdapterType::Sheets,
            AdapterType::Upload,
            AdapterType::Mail,
        ];
        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn keyboard_builders() {
        let keyboard = Keyboard::single_column([
            Button::new("Да", "confirm"),
            Button::new("Нет", "cancel"),
        ])
        .with_row(vec![Button::new("Меню", "menu")]);

        assert_eq!(keyboard.rows.len(), 3);
        let data: Vec<&str> = keyboard.data().collect();
        assert_eq!(data, vec!["confirm", "cancel", "menu"]);
    }

    #[test]
    fn outbound_message_builders() {
        let msg = OutboundMessage::text(Recipient::Operators, "новая заявка")
            .with_photo(PhotoRef("file-1".into()));
        assert_eq!(msg.recipient, Recipient::Operators);
        assert_eq!(msg.photo, Some(PhotoRef("file-1".into())));
        assert!(msg.keyboard.is_none());
    }

    #[test]
    fn all_traits_are_object_safe() {
        fn _channel(_: &dyn ChannelAdapter) {}
        fn _store(_: &dyn RecordStore) {}
        fn _sheets(_: &dyn SheetAdapter) {}
        fn _upload(_: &dyn UploadAdapter) {}
        fn _mail(_: &dyn MailAdapter) {}
    }
}
