// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue state machine.
//!
//! [`DialogueEngine::handle_event`] is a pure step: given the user's current
//! session and one event it returns the next session, the replies, and an
//! optional finalization plan. It performs no I/O; the caller persists the
//! session, sends the replies and runs the plan.
//!
//! Rules, in order:
//! 1. `Cancel` clears any session.
//! 2. Flow-start triggers (buttons and commands) start, redirect, or answer
//!    with the idle menu.
//! 3. Without a session, anything else gets a canned fallback.
//! 4. Inside a session the event is parsed against the current step.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};
use vyvoz_config::VyvozConfig;
use vyvoz_core::UserId;
use vyvoz_core::domain::{CostZone, Record};
use vyvoz_core::types::{EventPayload, Keyboard, OutboundMessage, Recipient};

use crate::draft::Draft;
use crate::finalize::{FinalizationPlan, SinkTask};
use crate::flow::{self, Flow, Step, Transition};
use crate::menus;
use crate::session::DialogueSession;
use crate::texts;

/// Who sent the event and what the engine may assume about them.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub user_id: UserId,
    pub username: Option<String>,
    /// Only meaningful for flow-start triggers; the loop resolves it lazily.
    pub registered: bool,
    pub now: DateTime<Utc>,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// `None` deletes the user's session.
    pub session: Option<DialogueSession>,
    pub replies: Vec<OutboundMessage>,
    pub plan: Option<FinalizationPlan>,
}

/// Buttons and commands that (re)start a dialogue or show the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Menu,
    Register,
    Pickup,
    Complaint,
}

impl Trigger {
    pub fn parse(payload: &EventPayload) -> Option<Self> {
        match payload {
            EventPayload::Button(data) => match data.as_str() {
                menus::REGISTER => Some(Self::Register),
                menus::PICKUP => Some(Self::Pickup),
                menus::COMPLAINT => Some(Self::Complaint),
                menus::MENU => Some(Self::Menu),
                _ => None,
            },
            EventPayload::Text(text) => {
                // `/start@vyvoz_bot` in group chats carries the bot name.
                let command = text.trim().split('@').next().unwrap_or_default();
                match command {
                    "/start" => Some(Self::Start),
                    "/menu" => Some(Self::Menu),
                    "/register" => Some(Self::Register),
                    "/pickup" => Some(Self::Pickup),
                    "/complaint" => Some(Self::Complaint),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Whether handling this event requires knowing if the user is registered.
    pub fn needs_registration_status(payload: &EventPayload) -> bool {
        Self::parse(payload).is_some()
    }
}

/// Routing and notification settings the engine bakes into finalization plans.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub pickup_sheets: BTreeMap<String, String>,
    pub complaint_sheets: BTreeMap<String, String>,
    pub notify_operators: bool,
}

impl EngineSettings {
    pub fn from_config(config: &VyvozConfig) -> Self {
        Self {
            pickup_sheets: config.sheets.pickup_sheets.clone(),
            complaint_sheets: config.sheets.complaint_sheets.clone(),
            notify_operators: config.dialogue.notify_operators,
        }
    }

    fn sheet(table: &BTreeMap<String, String>, zone: CostZone) -> String {
        table
            .get(zone.key())
            .cloned()
            .unwrap_or_else(|| zone.label().to_string())
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&VyvozConfig::default())
    }
}

/// The multi-flow state machine.
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    settings: EngineSettings,
}

impl DialogueEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Handles one event for one user.
    pub fn handle_event(
        &self,
        ctx: &EngineContext,
        session: Option<DialogueSession>,
        payload: &EventPayload,
    ) -> Outcome {
        if matches!(payload, EventPayload::Cancel) {
            return cancel(ctx, session);
        }
        if let Some(trigger) = Trigger::parse(payload) {
            return start(ctx, session, trigger);
        }
        match session {
            None => fallback(ctx),
            Some(session) => self.advance(ctx, session, payload),
        }
    }

    fn advance(
        &self,
        ctx: &EngineContext,
        mut session: DialogueSession,
        payload: &EventPayload,
    ) -> Outcome {
        let flow = session.flow();
        let step = session.step;

        let answer = match flow::parse_answer(step, payload) {
            Ok(answer) => answer,
            Err(hint) => {
                debug!(user_id = %ctx.user_id, %flow, %step, "answer rejected");
                let replies = if step == Step::Confirm {
                    vec![reply(ctx, hint).with_keyboard(menus::confirm_or_cancel())]
                } else {
                    vec![reply(ctx, hint), prompt(ctx, step, &session.draft)]
                };
                return Outcome {
                    session: Some(session),
                    replies,
                    plan: None,
                };
            }
        };

        let next = flow::transition(flow, step, &answer);
        session.draft.apply(answer);

        match next {
            Transition::Next(next_step) => {
                debug!(user_id = %ctx.user_id, %flow, from = %step, to = %next_step, "step advanced");
                session.step = next_step;
                let replies = vec![prompt(ctx, next_step, &session.draft)];
                Outcome {
                    session: Some(session),
                    replies,
                    plan: None,
                }
            }
            Transition::ShortCircuit => {
                info!(user_id = %ctx.user_id, %flow, %step, "dialogue ended without a record");
                Outcome {
                    session: None,
                    replies: vec![with_menu(ctx, texts::TODAY_SHORT_CIRCUIT, menus::main_menu())],
                    plan: None,
                }
            }
            Transition::Finalize => self.finalize(ctx, session),
        }
    }

    fn finalize(&self, ctx: &EngineContext, mut session: DialogueSession) -> Outcome {
        let record = match session.draft.finalize(ctx) {
            Ok(record) => record,
            Err(missing) => {
                warn!(user_id = %ctx.user_id, step = %missing, "confirmation with incomplete draft");
                session.step = missing;
                let replies = vec![prompt(ctx, missing, &session.draft)];
                return Outcome {
                    session: Some(session),
                    replies,
                    plan: None,
                };
            }
        };

        info!(user_id = %ctx.user_id, record = record.kind(), "dialogue confirmed");
        let acknowledgement = match &record {
            Record::Registration(_) => texts::REGISTRATION_DONE,
            Record::Pickup(_) => texts::PICKUP_ACCEPTED,
            Record::Complaint(_) => texts::COMPLAINT_ACCEPTED,
        };
        Outcome {
            session: None,
            replies: vec![with_menu(ctx, acknowledgement, menus::main_menu())],
            plan: Some(self.plan_for(record)),
        }
    }

    /// The sink tasks a confirmed record fans out to.
    pub fn plan_for(&self, record: Record) -> FinalizationPlan {
        let sheet = match &record {
            Record::Registration(_) => None,
            Record::Pickup(r) => Some(EngineSettings::sheet(
                &self.settings.pickup_sheets,
                r.district.cost_zone(),
            )),
            Record::Complaint(c) => Some(EngineSettings::sheet(
                &self.settings.complaint_sheets,
                c.district.cost_zone(),
            )),
        };

        let mut tasks = Vec::new();
        if let Some(sheet) = sheet {
            if record.photo().is_some() {
                tasks.push(SinkTask::UploadPhoto);
            }
            tasks.push(SinkTask::AppendRow { sheet });
            tasks.push(SinkTask::InsertRecord);
            if self.settings.notify_operators {
                tasks.push(SinkTask::AnnounceToOperators);
            }
        } else {
            tasks.push(SinkTask::InsertRecord);
        }

        FinalizationPlan { record, tasks }
    }
}

fn cancel(ctx: &EngineContext, session: Option<DialogueSession>) -> Outcome {
    let reply = match session {
        Some(session) => {
            info!(user_id = %ctx.user_id, flow = %session.flow(), step = %session.step, "dialogue cancelled");
            with_menu(ctx, texts::CANCELLED, menus::main_menu())
        }
        None => reply(ctx, texts::NOTHING_TO_CANCEL),
    };
    Outcome {
        session: None,
        replies: vec![reply],
        plan: None,
    }
}

fn start(ctx: &EngineContext, session: Option<DialogueSession>, trigger: Trigger) -> Outcome {
    let flow = match trigger {
        Trigger::Start | Trigger::Menu => {
            let mut replies = vec![idle_reply(ctx)];
            if let Some(active) = &session {
                replies.push(reply(ctx, texts::SESSION_IN_PROGRESS));
                replies.push(prompt(ctx, active.step, &active.draft));
            }
            return Outcome {
                session,
                replies,
                plan: None,
            };
        }
        Trigger::Register if ctx.registered => {
            return Outcome {
                session,
                replies: vec![with_menu(ctx, texts::ALREADY_REGISTERED, menus::main_menu())],
                plan: None,
            };
        }
        Trigger::Pickup | Trigger::Complaint if !ctx.registered => {
            info!(user_id = %ctx.user_id, ?trigger, "unregistered user redirected to registration");
            let session = DialogueSession::start(Flow::Registration);
            let replies = vec![
                reply(ctx, texts::REGISTER_FIRST),
                prompt(ctx, session.step, &session.draft),
            ];
            return Outcome {
                session: Some(session),
                replies,
                plan: None,
            };
        }
        Trigger::Register => Flow::Registration,
        Trigger::Pickup => Flow::Pickup,
        Trigger::Complaint => Flow::Complaint,
    };

    if let Some(previous) = &session {
        debug!(user_id = %ctx.user_id, previous = %previous.flow(), %flow, "overwriting active session");
    }
    info!(user_id = %ctx.user_id, %flow, "dialogue started");
    let session = DialogueSession::start(flow);
    let replies = vec![prompt(ctx, session.step, &session.draft)];
    Outcome {
        session: Some(session),
        replies,
        plan: None,
    }
}

fn fallback(ctx: &EngineContext) -> Outcome {
    let text = texts::FALLBACKS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(texts::FALLBACKS[0]);
    Outcome {
        session: None,
        replies: vec![with_menu(ctx, text, menus::main_menu())],
        plan: None,
    }
}

fn idle_reply(ctx: &EngineContext) -> OutboundMessage {
    if ctx.registered {
        with_menu(ctx, texts::WELCOME_REGISTERED, menus::main_menu())
    } else {
        with_menu(ctx, texts::WELCOME_NEW, menus::registration_invite())
    }
}

fn reply(ctx: &EngineContext, text: impl Into<String>) -> OutboundMessage {
    OutboundMessage::text(Recipient::User(ctx.user_id), text)
}

fn with_menu(ctx: &EngineContext, text: &str, keyboard: Keyboard) -> OutboundMessage {
    reply(ctx, text).with_keyboard(keyboard)
}

fn prompt(ctx: &EngineContext, step: Step, draft: &Draft) -> OutboundMessage {
    let (text, keyboard) = texts::prompt(step, draft);
    reply(ctx, text).with_keyboard(keyboard)
}
