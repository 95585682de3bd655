// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the dialogue engine.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod mail;
pub mod sheets;
pub mod storage;
pub mod upload;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use mail::MailAdapter;
pub use sheets::SheetAdapter;
pub use storage::RecordStore;
pub use upload::UploadAdapter;
