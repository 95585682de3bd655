// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboards and the callback data their buttons carry.
//!
//! Answer buttons are namespaced as `<prefix>:<key>` where `key` is the
//! stable snake_case form of the enum value (`district:kirovsky`).

use strum::IntoEnumIterator;
use vyvoz_core::domain::{
    ComplaintCategory, ContactMethod, DaysWithout, District, QualityTrouble, WasteType,
};
use vyvoz_core::types::{Button, CANCEL_BUTTON_DATA, Keyboard};

pub const REGISTER: &str = "register";
pub const PICKUP: &str = "pickup";
pub const COMPLAINT: &str = "complaint";
pub const MENU: &str = "menu";
pub const CANCEL: &str = CANCEL_BUTTON_DATA;
pub const CONFIRM: &str = "confirm";
pub const NO_COMMENT: &str = "no_comment";
pub const NO_PHOTO: &str = "no_photo";

pub const DISTRICT_PREFIX: &str = "district";
pub const WASTE_PREFIX: &str = "waste";
pub const CATEGORY_PREFIX: &str = "category";
pub const DAYS_PREFIX: &str = "days";
pub const TROUBLE_PREFIX: &str = "trouble";
pub const CONTACT_PREFIX: &str = "contact";

/// Callback data for an answer button.
pub fn answer_data(prefix: &str, key: &str) -> String {
    format!("{prefix}:{key}")
}

/// Splits `prefix:key` callback data, returning the key when the prefix matches.
pub fn answer_key<'a>(data: &'a str, prefix: &str) -> Option<&'a str> {
    data.split_once(':')
        .filter(|(p, _)| *p == prefix)
        .map(|(_, key)| key)
}

fn cancel_button() -> Button {
    Button::new("Отмена", CANCEL)
}

/// Options laid out one per row, followed by a cancel row.
fn choices(buttons: impl IntoIterator<Item = Button>) -> Keyboard {
    Keyboard::single_column(buttons).with_row(vec![cancel_button()])
}

/// Main menu shown to users outside a dialogue.
pub fn main_menu() -> Keyboard {
    Keyboard::single_column([
        Button::new("Заявка на вывоз КГМ", PICKUP),
        Button::new("Пожаловаться на качество услуг", COMPLAINT),
    ])
}

/// Invitation shown to users who have not registered yet.
pub fn registration_invite() -> Keyboard {
    Keyboard::single_column([Button::new("Зарегистрироваться", REGISTER)])
}

pub fn cancel_only() -> Keyboard {
    Keyboard::single_column([cancel_button()])
}

/// Districts, two per row.
pub fn districts() -> Keyboard {
    let buttons: Vec<Button> = District::iter()
        .map(|d| Button::new(d.label(), answer_data(DISTRICT_PREFIX, d.key())))
        .collect();
    let mut keyboard = Keyboard::default();
    for pair in buttons.chunks(2) {
        keyboard = keyboard.with_row(pair.to_vec());
    }
    keyboard.with_row(vec![cancel_button()])
}

pub fn waste_types() -> Keyboard {
    choices(
        WasteType::iter().map(|w| Button::new(w.label(), answer_data(WASTE_PREFIX, w.key()))),
    )
}

pub fn complaint_categories() -> Keyboard {
    choices(
        ComplaintCategory::iter()
            .map(|c| Button::new(c.label(), answer_data(CATEGORY_PREFIX, c.key()))),
    )
}

pub fn day_counts() -> Keyboard {
    choices(DaysWithout::iter().map(|d| Button::new(d.label(), answer_data(DAYS_PREFIX, d.key()))))
}

pub fn quality_troubles() -> Keyboard {
    choices(
        QualityTrouble::iter()
            .map(|t| Button::new(t.label(), answer_data(TROUBLE_PREFIX, t.key()))),
    )
}

pub fn contact_methods() -> Keyboard {
    choices(
        ContactMethod::iter()
            .map(|m| Button::new(m.label(), answer_data(CONTACT_PREFIX, m.key()))),
    )
}

pub fn skip_comment() -> Keyboard {
    choices([Button::new("Без комментария", NO_COMMENT)])
}

pub fn skip_photo() -> Keyboard {
    choices([Button::new("Без фото", NO_PHOTO)])
}

/// Exactly two actions: confirm and cancel.
pub fn confirm_or_cancel() -> Keyboard {
    Keyboard::default().with_row(vec![Button::new("Подтвердить", CONFIRM), cancel_button()])
}
