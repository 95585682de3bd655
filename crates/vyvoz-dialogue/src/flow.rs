// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flows, steps, and the transition table between them.
//!
//! A step never decides its successor on its own: [`transition`] maps the
//! current step and the parsed [`Answer`] to the next step, a short circuit,
//! or finalization.

use strum::{Display, IntoStaticStr};
use vyvoz_core::domain::{
    ComplaintCategory, ContactMethod, DaysWithout, District, QualityTrouble, WasteType,
};
use vyvoz_core::types::{EventPayload, PhotoRef};

use crate::menus;
use crate::texts;
use crate::validate;

/// The three guided dialogues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Flow {
    Registration,
    Pickup,
    Complaint,
}

/// One question of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    FullName,
    Phone,
    Workplace,
    ManagementCompany,
    District,
    Address,
    WasteType,
    Category,
    DaysWithout,
    Trouble,
    Comment,
    Photo,
    ContactMethod,
    Email,
    Confirm,
}

const REGISTRATION_ORDER: &[Step] = &[Step::FullName, Step::Phone, Step::Workplace, Step::Confirm];

const PICKUP_ORDER: &[Step] = &[
    Step::FullName,
    Step::Phone,
    Step::ManagementCompany,
    Step::District,
    Step::Address,
    Step::WasteType,
    Step::Comment,
    Step::Photo,
    Step::Confirm,
];

const COMPLAINT_ORDER: &[Step] = &[
    Step::Category,
    Step::DaysWithout,
    Step::Trouble,
    Step::FullName,
    Step::Phone,
    Step::ManagementCompany,
    Step::District,
    Step::Address,
    Step::Comment,
    Step::Photo,
    Step::ContactMethod,
    Step::Email,
    Step::Confirm,
];

impl Flow {
    /// Every step the flow can visit, in order. Branch-only steps included.
    pub fn order(self) -> &'static [Step] {
        match self {
            Self::Registration => REGISTRATION_ORDER,
            Self::Pickup => PICKUP_ORDER,
            Self::Complaint => COMPLAINT_ORDER,
        }
    }

    pub fn first_step(self) -> Step {
        self.order()[0]
    }
}

/// A successfully parsed answer; carries exactly one draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    FullName(String),
    Phone(String),
    Workplace(String),
    ManagementCompany(String),
    District(District),
    Address(String),
    WasteType(WasteType),
    Category(ComplaintCategory),
    Days(DaysWithout),
    Trouble(QualityTrouble),
    /// `None` when the user pressed "no comment".
    Comment(Option<String>),
    /// `None` when the user pressed "no photo".
    Photo(Option<PhotoRef>),
    ContactMethod(ContactMethod),
    Email(String),
    Confirm,
}

/// Where the dialogue goes after an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(Step),
    /// End the dialogue with an informational message and no record.
    ShortCircuit,
    Finalize,
}

/// The transition table.
pub fn transition(flow: Flow, step: Step, answer: &Answer) -> Transition {
    match (flow, step, answer) {
        (_, Step::Confirm, Answer::Confirm) => Transition::Finalize,
        (Flow::Complaint, Step::Category, Answer::Category(ComplaintCategory::NoCollection)) => {
            Transition::Next(Step::DaysWithout)
        }
        (Flow::Complaint, Step::Category, Answer::Category(ComplaintCategory::QualityIssue)) => {
            Transition::Next(Step::Trouble)
        }
        (Flow::Complaint, Step::DaysWithout, Answer::Days(DaysWithout::Today)) => {
            Transition::ShortCircuit
        }
        (Flow::Complaint, Step::DaysWithout | Step::Trouble, _) => {
            Transition::Next(Step::FullName)
        }
        (Flow::Complaint, Step::ContactMethod, Answer::ContactMethod(ContactMethod::Email)) => {
            Transition::Next(Step::Email)
        }
        (Flow::Complaint, Step::ContactMethod, _) => Transition::Next(Step::Confirm),
        _ => next_in_order(flow, step),
    }
}

fn next_in_order(flow: Flow, step: Step) -> Transition {
    let order = flow.order();
    order
        .iter()
        .position(|s| *s == step)
        .and_then(|idx| order.get(idx + 1))
        .map_or(Transition::Finalize, |next| Transition::Next(*next))
}

/// Parses an event against the step it answers.
///
/// Returns the corrective hint to show when the event does not fit the step,
/// either because of its kind (photo where text is expected) or its content.
pub fn parse_answer(step: Step, payload: &EventPayload) -> Result<Answer, &'static str> {
    match step {
        Step::FullName => text_answer(payload, validate::is_valid_full_name, texts::HINT_FULL_NAME)
            .map(Answer::FullName),
        Step::Phone => {
            text_answer(payload, validate::is_valid_phone, texts::HINT_PHONE).map(Answer::Phone)
        }
        Step::Workplace => text_answer(payload, validate::is_valid_workplace, texts::HINT_WORKPLACE)
            .map(Answer::Workplace),
        Step::ManagementCompany => text_answer(
            payload,
            validate::is_valid_workplace,
            texts::HINT_MANAGEMENT_COMPANY,
        )
        .map(Answer::ManagementCompany),
        Step::Address => text_answer(payload, validate::is_valid_address, texts::HINT_ADDRESS)
            .map(Answer::Address),
        Step::Email => {
            text_answer(payload, validate::is_valid_email, texts::HINT_EMAIL).map(Answer::Email)
        }
        Step::District => button_answer(payload, menus::DISTRICT_PREFIX).map(Answer::District),
        Step::WasteType => button_answer(payload, menus::WASTE_PREFIX).map(Answer::WasteType),
        Step::Category => button_answer(payload, menus::CATEGORY_PREFIX).map(Answer::Category),
        Step::DaysWithout => button_answer(payload, menus::DAYS_PREFIX).map(Answer::Days),
        Step::Trouble => button_answer(payload, menus::TROUBLE_PREFIX).map(Answer::Trouble),
        Step::ContactMethod => {
            button_answer(payload, menus::CONTACT_PREFIX).map(Answer::ContactMethod)
        }
        Step::Comment => match payload {
            EventPayload::Button(data) if data == menus::NO_COMMENT => Ok(Answer::Comment(None)),
            EventPayload::Text(text) if !text.trim().is_empty() => {
                Ok(Answer::Comment(Some(text.trim().to_string())))
            }
            _ => Err(texts::HINT_COMMENT),
        },
        Step::Photo => match payload {
            EventPayload::Photo(photo) => Ok(Answer::Photo(Some(photo.clone()))),
            EventPayload::Button(data) if data == menus::NO_PHOTO => Ok(Answer::Photo(None)),
            _ => Err(texts::HINT_PHOTO),
        },
        Step::Confirm => match payload {
            EventPayload::Button(data) if data == menus::CONFIRM => Ok(Answer::Confirm),
            EventPayload::Text(text) if is_confirmation_text(text) => Ok(Answer::Confirm),
            _ => Err(texts::CONFIRM_REMINDER),
        },
    }
}

/// The typed confirmation word, case-insensitive.
pub fn is_confirmation_text(text: &str) -> bool {
    text.trim().to_lowercase() == texts::CONFIRM_WORD
}

fn text_answer(
    payload: &EventPayload,
    is_valid: fn(&str) -> bool,
    hint: &'static str,
) -> Result<String, &'static str> {
    match payload {
        EventPayload::Text(text) if is_valid(text) => Ok(text.trim().to_string()),
        EventPayload::Text(_) => Err(hint),
        _ => Err(texts::HINT_EXPECTED_TEXT),
    }
}

fn button_answer<T: std::str::FromStr>(
    payload: &EventPayload,
    prefix: &str,
) -> Result<T, &'static str> {
    match payload {
        EventPayload::Button(data) => menus::answer_key(data, prefix)
            .and_then(|key| key.parse().ok())
            .ok_or(texts::HINT_EXPECTED_BUTTON),
        _ => Err(texts::HINT_EXPECTED_BUTTON),
    }
}
