// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events,
//! captured outbound messages, and an in-memory photo store for
//! `download_photo`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};
use vyvoz_core::traits::adapter::PluginAdapter;
use vyvoz_core::traits::channel::ChannelAdapter;
use vyvoz_core::types::{
    AdapterType, EventPayload, HealthStatus, InboundEvent, MessageId, OutboundMessage, PhotoRef,
    Recipient, UserId,
};
use vyvoz_core::VyvozError;

/// A mock chat transport for testing.
///
/// - **inbound**: events injected via `inject_event()` are returned by `receive()`
/// - **sent**: messages passed to `send()` are captured for assertions
/// - **photos**: bytes registered via `add_photo()` are served by `download_photo()`
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    photos: Arc<Mutex<HashMap<PhotoRef, Vec<u8>>>>,
    notify: Arc<Notify>,
    closed: AtomicBool,
    fail_operator_sends: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            photos: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            fail_operator_sends: AtomicBool::new(false),
        }
    }

    /// Queues an event for the next `receive()`.
    pub async fn inject_event(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Queues `payload` from `user` with the current timestamp.
    pub async fn inject(&self, user: i64, payload: EventPayload) {
        self.inject_event(event(user, payload)).await;
    }

    /// Makes `photo` downloadable with the given bytes.
    pub async fn add_photo(&self, photo: &str, bytes: Vec<u8>) {
        self.photos
            .lock()
            .await
            .insert(PhotoRef(photo.to_string()), bytes);
    }

    /// After the queue drains, `receive()` reports a closed channel.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Makes every message to the operator chat fail.
    pub fn fail_operator_sends(&self) {
        self.fail_operator_sends.store(true, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages addressed to `recipient`, in send order.
    pub async fn sent_to(&self, recipient: Recipient) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.recipient == recipient)
            .cloned()
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an inbound event stamped with the current time.
pub fn event(user: i64, payload: EventPayload) -> InboundEvent {
    InboundEvent {
        user_id: UserId(user),
        username: Some(format!("user{user}")),
        payload,
        received_at: Utc::now(),
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, VyvozError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VyvozError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), VyvozError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, VyvozError> {
        if msg.recipient == Recipient::Operators && self.fail_operator_sends.load(Ordering::SeqCst)
        {
            return Err(VyvozError::Channel {
                message: "operator chat unreachable".into(),
                source: None,
            });
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundEvent, VyvozError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(VyvozError::Channel {
                    message: "mock channel closed".into(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }

    async fn download_photo(&self, photo: &PhotoRef) -> Result<Vec<u8>, VyvozError> {
        self.photos
            .lock()
            .await
            .get(photo)
            .cloned()
            .ok_or_else(|| VyvozError::Channel {
                message: format!("unknown photo {}", photo.0),
                source: None,
            })
    }
}
