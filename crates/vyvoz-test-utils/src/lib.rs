// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vyvoz integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without Telegram, Google or Yandex.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock chat transport with event injection and capture
//! - [`RecordingSheets`], [`RecordingUploader`] - Recording sink doubles
//! - [`FailingRecordStore`] - Record store whose writes always fail
//! - [`SlowLookupStore`] - Record store with one stalled registration lookup
//! - [`TestHarness`] - Full dialogue stack over a temp SQLite database

pub mod harness;
pub mod mock_channel;
pub mod mock_sinks;

pub use harness::TestHarness;
pub use mock_channel::MockChannel;
pub use mock_sinks::{FailingRecordStore, RecordingSheets, RecordingUploader, SlowLookupStore};
