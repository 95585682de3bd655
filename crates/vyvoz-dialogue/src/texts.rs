// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing wording: step prompts, hints, and canned replies.

use vyvoz_core::domain::{NOT_SPECIFIED, or_not_specified};
use vyvoz_core::types::Keyboard;

use crate::draft::{ComplaintDraft, Draft, PickupDraft, RegistrationDraft};
use crate::flow::Step;
use crate::menus;

pub const CANCELLED: &str = "Заявка отменена.";
pub const NOTHING_TO_CANCEL: &str = "Нечего отменять.";
pub const ALREADY_REGISTERED: &str = "Вы уже зарегистрированы! Добро пожаловать!";
pub const WELCOME_REGISTERED: &str = "Выберите, что вы хотите сделать:";
pub const WELCOME_NEW: &str =
    "Добро пожаловать! Похоже, вы новый пользователь. Нажмите кнопку ниже для регистрации.";
pub const REGISTER_FIRST: &str =
    "Чтобы оставить обращение, сначала нужно зарегистрироваться.";
pub const SESSION_IN_PROGRESS: &str = "У вас есть незавершённое обращение. Продолжим:";
pub const TODAY_SHORT_CIRCUIT: &str = "Вывоз мусора выполняется по графику в течение дня. \
     Если мусор не вывезут до конца дня, пожалуйста, оставьте жалобу завтра.";
pub const REGISTRATION_DONE: &str =
    "Вы успешно зарегистрированы и теперь можете пользоваться ботом!";
pub const PICKUP_ACCEPTED: &str = "Спасибо! Ваша заявка на вывоз принята.";
pub const COMPLAINT_ACCEPTED: &str = "Спасибо! Ваша жалоба принята и будет рассмотрена.";
pub const TEMPORARILY_UNAVAILABLE: &str =
    "Сервис временно недоступен. Пожалуйста, попробуйте позже.";

/// The typed confirmation, compared after lowercasing.
pub const CONFIRM_WORD: &str = "подтверждаю";
pub const CONFIRM_REMINDER: &str =
    "Пожалуйста, нажмите «Подтвердить» или «Отмена» (или отправьте «Подтверждаю»).";

pub const HINT_FULL_NAME: &str = "Имя слишком короткое: укажите не менее 5 символов.";
pub const HINT_PHONE: &str =
    "Некорректный номер. Введите номер в формате +7 913 123-45-67 или 8 913 123-45-67.";
pub const HINT_WORKPLACE: &str = "Укажите место работы: не менее 3 символов.";
pub const HINT_MANAGEMENT_COMPANY: &str =
    "Укажите название управляющей компании: не менее 3 символов.";
pub const HINT_ADDRESS: &str = "Адрес слишком короткий: укажите улицу и дом.";
pub const HINT_EMAIL: &str = "Некорректный адрес электронной почты. Пример: name@example.ru";
pub const HINT_COMMENT: &str = "Напишите комментарий текстом или нажмите «Без комментария».";
pub const HINT_PHOTO: &str = "Пришлите фотографию или нажмите «Без фото».";
pub const HINT_EXPECTED_TEXT: &str = "Пожалуйста, ответьте текстовым сообщением.";
pub const HINT_EXPECTED_BUTTON: &str = "Пожалуйста, выберите вариант с помощью кнопок.";

/// Replies for messages that arrive outside any dialogue.
pub const FALLBACKS: &[&str] = &[
    "Я бот для приёма заявок и жалоб. Выберите действие в меню.",
    "Не совсем понял вас. Воспользуйтесь кнопками меню.",
    "Чтобы оставить заявку или жалобу, выберите пункт меню.",
    "Я умею принимать заявки на вывоз КГМ и жалобы на качество услуг.",
];

/// The question asked at `step`, with its keyboard.
pub fn prompt(step: Step, draft: &Draft) -> (String, Keyboard) {
    match step {
        Step::FullName => (
            "Пожалуйста, введите ваше полное имя (Фамилия Имя Отчество):".into(),
            menus::cancel_only(),
        ),
        Step::Phone => (
            "Теперь введите ваш номер телефона:".into(),
            menus::cancel_only(),
        ),
        Step::Workplace => (
            "Теперь укажите ваше место работы:".into(),
            menus::cancel_only(),
        ),
        Step::ManagementCompany => (
            "Укажите вашу управляющую компанию или ТСЖ:".into(),
            menus::cancel_only(),
        ),
        Step::District => ("Выберите район:".into(), menus::districts()),
        Step::Address => {
            let mut text = String::new();
            if let Some(district) = draft.district() {
                text.push_str(&format!(
                    "Район: {} ({}).\n",
                    district.label(),
                    district.cost_zone().label()
                ));
            }
            text.push_str("Введите адрес (улица, дом):");
            (text, menus::cancel_only())
        }
        Step::WasteType => ("Выберите тип отходов:".into(), menus::waste_types()),
        Step::Category => (
            "Выберите, на что вы хотите пожаловаться:".into(),
            menus::complaint_categories(),
        ),
        Step::DaysWithout => (
            "Сколько дней не вывозят мусор?".into(),
            menus::day_counts(),
        ),
        Step::Trouble => ("Выберите проблему:".into(), menus::quality_troubles()),
        Step::Comment => (
            "Добавьте комментарий или нажмите «Без комментария»:".into(),
            menus::skip_comment(),
        ),
        Step::Photo => (
            "Прикрепите фотографию или нажмите «Без фото»:".into(),
            menus::skip_photo(),
        ),
        Step::ContactMethod => (
            "Как с вами связаться по результатам рассмотрения?".into(),
            menus::contact_methods(),
        ),
        Step::Email => (
            "Введите адрес электронной почты:".into(),
            menus::cancel_only(),
        ),
        Step::Confirm => (review(draft), menus::confirm_or_cancel()),
    }
}

/// Review message echoing every draft field before confirmation.
pub fn review(draft: &Draft) -> String {
    let mut lines = vec!["Проверьте ваши данные:".to_string()];
    match draft {
        Draft::Registration(d) => review_registration(d, &mut lines),
        Draft::Pickup(d) => review_pickup(d, &mut lines),
        Draft::Complaint(d) => review_complaint(d, &mut lines),
    }
    lines.push(String::new());
    lines.push("Если все верно, нажмите «Подтвердить» или отправьте «Подтверждаю».".into());
    lines.join("\n")
}

fn field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    lines.push(format!("{label}: {}", or_not_specified(value)));
}

fn review_registration(d: &RegistrationDraft, lines: &mut Vec<String>) {
    field(lines, "ФИО", d.full_name.as_deref());
    field(lines, "Номер телефона", d.phone_number.as_deref());
    field(lines, "Место работы", d.workplace.as_deref());
}

fn review_pickup(d: &PickupDraft, lines: &mut Vec<String>) {
    field(lines, "ФИО", d.full_name.as_deref());
    field(lines, "Номер телефона", d.phone_number.as_deref());
    field(lines, "Управляющая компания", d.management_company.as_deref());
    field(lines, "Район", d.district.map(|x| x.label()));
    field(lines, "Адрес", d.address.as_deref());
    field(lines, "Тип отходов", d.waste_type.map(|x| x.label()));
    field(lines, "Комментарий", d.comment.as_ref().and_then(|c| c.as_deref()));
    lines.push(format!("Фото: {}", photo_label(d.photo.as_ref().map(Option::is_some))));
}

fn review_complaint(d: &ComplaintDraft, lines: &mut Vec<String>) {
    field(lines, "Категория", d.category.map(|x| x.label()));
    field(lines, "Проблема", d.trouble.map(|x| x.label()).as_deref());
    field(lines, "ФИО", d.full_name.as_deref());
    field(lines, "Номер телефона", d.phone_number.as_deref());
    field(lines, "Управляющая компания", d.management_company.as_deref());
    field(lines, "Район", d.district.map(|x| x.label()));
    field(lines, "Адрес", d.address.as_deref());
    field(lines, "Комментарий", d.comment.as_ref().and_then(|c| c.as_deref()));
    lines.push(format!("Фото: {}", photo_label(d.photo.as_ref().map(Option::is_some))));
    field(lines, "Способ связи", d.contact_method.map(|x| x.label()));
    if d.email.is_some() {
        field(lines, "Электронная почта", d.email.as_deref());
    }
}

fn photo_label(attached: Option<bool>) -> &'static str {
    match attached {
        Some(true) => "прикреплено",
        _ => NOT_SPECIFIED,
    }
}

#[cfg(test)]
mod tests {
    use vyvoz_core::domain::District;

    use super::*;
    use crate::flow::Flow;

    #[test]
    fn address_prompt_echoes_district_and_zone() {
        let mut draft = Draft::new(Flow::Pickup);
        if let Draft::Pickup(d) = &mut draft {
            d.district = Some(District::Leninsky);
        }
        let (text, _) = prompt(Step::Address, &draft);
        assert!(text.contains("Ленинский"));
        assert!(text.contains("Зона 3"));
    }

    #[test]
    fn review_uses_fallback_for_missing_optionals() {
        let mut draft = Draft::new(Flow::Pickup);
        if let Draft::Pickup(d) = &mut draft {
            d.full_name = Some("Иванов Иван".into());
            d.comment = Some(None);
            d.photo = Some(None);
        }
        let text = review(&draft);
        assert!(text.contains("ФИО: Иванов Иван"));
        assert!(text.contains("Комментарий: не указано"));
        assert!(text.contains("Фото: не указано"));
    }

    #[test]
    fn confirm_prompt_offers_two_actions() {
        let (_, keyboard) = prompt(Step::Confirm, &Draft::new(Flow::Registration));
        assert_eq!(keyboard.data().count(), 2);
    }

    #[test]
    fn confirm_word_is_lowercase() {
        assert_eq!(CONFIRM_WORD, CONFIRM_WORD.to_lowercase());
    }
}
