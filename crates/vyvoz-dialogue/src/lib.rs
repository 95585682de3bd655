// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue engine and dispatch loop for the Vyvoz intake bot.
//!
//! The [`DialogueLoop`] is the central coordinator that:
//! - Receives events from the channel adapter and queues them per user
//! - Runs them through the [`DialogueEngine`] state machine
//! - Persists the per-user [`DialogueSession`] and sends the replies
//! - Spawns finalization plans without blocking the next event
//! - Drains in-flight events and finalizations on shutdown

pub mod draft;
pub mod engine;
pub mod finalize;
pub mod flow;
pub mod menus;
pub mod session;
pub mod shutdown;
pub mod texts;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use vyvoz_core::types::{InboundEvent, OutboundMessage, Recipient, UserId};
use vyvoz_core::{ChannelAdapter, RecordStore, VyvozError};

pub use engine::{DialogueEngine, EngineContext, EngineSettings, Outcome, Trigger};
pub use finalize::{FinalizationPlan, FinalizationReport, Finalizer, SinkTask};
pub use session::{DialogueSession, MemorySessionStore, SessionStore};

/// How long shutdown waits for in-flight events and finalizations.
pub const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Coordinates message flow between the channel, the engine and the sinks.
///
/// Each user gets a worker task that handles their events in arrival order.
/// Workers for different users run concurrently, so a slow lookup or send
/// for one user never holds up another. A worker exits once its queue is
/// empty and is re-spawned on that user's next event.
pub struct DialogueLoop {
    state: Arc<LoopState>,
}

struct LoopState {
    channel: Arc<dyn ChannelAdapter>,
    store: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionStore>,
    engine: DialogueEngine,
    finalizer: Arc<Finalizer>,
    tracker: TaskTracker,
    queues: DashMap<UserId, mpsc::UnboundedSender<InboundEvent>>,
}

impl DialogueLoop {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionStore>,
        engine: DialogueEngine,
        finalizer: Finalizer,
    ) -> Self {
        info!(channel = channel.name(), store = store.name(), "dialogue loop initialized");
        Self {
            state: Arc::new(LoopState {
                channel,
                store,
                sessions,
                engine,
                finalizer: Arc::new(finalizer),
                tracker: TaskTracker::new(),
                queues: DashMap::new(),
            }),
        }
    }

    /// Runs until the token is cancelled or the channel closes, then drains
    /// user workers and finalizations and closes the record store.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), VyvozError> {
        info!("dialogue loop running");

        loop {
            tokio::select! {
                event = self.state.channel.receive() => {
                    match event {
                        Ok(event) => self.dispatch(event),
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dialogue loop");
                    break;
                }
            }
        }

        shutdown::drain_finalizations(&self.state.tracker, SHUTDOWN_DRAIN_TIMEOUT).await;
        self.state.store.close().await?;

        info!("dialogue loop stopped");
        Ok(())
    }

    /// Queues `event` on its user's worker, spawning one if none is running.
    fn dispatch(&self, event: InboundEvent) {
        match self.state.queues.entry(event.user_id) {
            Entry::Occupied(mut entry) => {
                if let Err(mpsc::error::SendError(event)) = entry.get().send(event) {
                    let user_id = event.user_id;
                    entry.insert(spawn_worker(&self.state, user_id, event));
                }
            }
            Entry::Vacant(entry) => {
                let user_id = event.user_id;
                entry.insert(spawn_worker(&self.state, user_id, event));
            }
        }
    }

    /// Handles one event inline: engine step, session write, replies, then
    /// the finalization plan in the background.
    pub async fn handle_inbound(&self, event: InboundEvent) -> Result<(), VyvozError> {
        self.state.handle_inbound(event).await
    }

    /// Waits until every worker and finalization spawned so far has finished.
    pub async fn wait_for_finalizations(&self) {
        self.state.tracker.close();
        self.state.tracker.wait().await;
        self.state.tracker.reopen();
    }
}

/// Starts a worker for `user_id` seeded with `first`. The returned sender
/// feeds the worker's queue. The shard lock held by the caller keeps the
/// worker from deregistering before the sender is stored.
fn spawn_worker(
    state: &Arc<LoopState>,
    user_id: UserId,
    first: InboundEvent,
) -> mpsc::UnboundedSender<InboundEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let state = state.clone();
    let tracker = state.tracker.clone();
    tracker.spawn(async move {
        let mut next = Some(first);
        loop {
            while let Some(event) = next.take().or_else(|| rx.try_recv().ok()) {
                if let Err(e) = state.handle_inbound(event).await {
                    error!(user_id = %user_id, error = %e, "failed to handle inbound event");
                }
            }
            // Deregister only while the queue is empty, under the shard lock.
            let deregistered = state
                .queues
                .remove_if(&user_id, |_, _| rx.is_empty())
                .is_some();
            if deregistered || !state.queues.contains_key(&user_id) {
                break;
            }
        }
        debug!(user_id = %user_id, "user worker idle");
    });
    tx
}

impl LoopState {
    async fn handle_inbound(&self, event: InboundEvent) -> Result<(), VyvozError> {
        let InboundEvent {
            user_id,
            username,
            payload,
            received_at,
        } = event;
        debug!(user_id = %user_id, "handling inbound event");

        let session = self.sessions.get(user_id).await?;

        let registered = if Trigger::needs_registration_status(&payload) {
            match self.store.user_exists(user_id).await {
                Ok(exists) => exists,
                Err(e) => {
                    let notice = OutboundMessage::text(
                        Recipient::User(user_id),
                        texts::TEMPORARILY_UNAVAILABLE,
                    );
                    if let Err(send_err) = self.channel.send(notice).await {
                        warn!(error = %send_err, "failed to send unavailability notice");
                    }
                    return Err(e);
                }
            }
        } else {
            false
        };

        let ctx = EngineContext {
            user_id,
            username,
            registered,
            now: received_at,
        };
        let outcome = self.engine.handle_event(&ctx, session, &payload);

        match outcome.session {
            Some(session) => self.sessions.put(user_id, session).await?,
            None => {
                self.sessions.delete(user_id).await?;
            }
        }

        for reply in outcome.replies {
            if let Err(e) = self.channel.send(reply).await {
                error!(user_id = %user_id, error = %e, "failed to send reply");
            }
        }

        if let Some(plan) = outcome.plan {
            let finalizer = self.finalizer.clone();
            self.tracker.spawn(async move {
                finalizer.run(plan).await;
            });
        }

        Ok(())
    }
}
