// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records and the closed enumerations they are built from.
//!
//! Enum values double as inline button keys: the ASCII snake_case form
//! (`strum` serialization) is what travels in callback data and is stored in
//! the database, while [`label`](WasteType::label) is what users see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::types::{PhotoRef, UserId};

/// Label rendered for optional data the user did not provide.
pub const NOT_SPECIFIED: &str = "не указано";

/// Type of waste for a pickup request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WasteType {
    /// Regular municipal solid waste.
    Rso,
    /// Bulky waste (furniture, appliances).
    Bulky,
    Leaves,
    Branches,
}

impl WasteType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rso => "РСО",
            Self::Bulky => "КГМ",
            Self::Leaves => "Листва в мешках",
            Self::Branches => "Ветки 0,7м",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// Tariff zone a district belongs to. Selects the target worksheet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, IntoStaticStr,
    EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CostZone {
    Zone1,
    Zone2,
    Zone3,
}

impl CostZone {
    pub fn label(self) -> &'static str {
        match self {
            Self::Zone1 => "Зона 1",
            Self::Zone2 => "Зона 2",
            Self::Zone3 => "Зона 3",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// City district of the pickup/complaint address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum District {
    Dzerzhinsky,
    Zheleznodorozhny,
    Zaeltsovsky,
    Kalininsky,
    Kirovsky,
    Leninsky,
    Oktyabrsky,
    Pervomaisky,
    Sovetsky,
    Tsentralny,
}

impl District {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dzerzhinsky => "Дзержинский",
            Self::Zheleznodorozhny => "Железнодорожный",
            Self::Zaeltsovsky => "Заельцовский",
            Self::Kalininsky => "Калининский",
            Self::Kirovsky => "Кировский",
            Self::Leninsky => "Ленинский",
            Self::Oktyabrsky => "Октябрьский",
            Self::Pervomaisky => "Первомайский",
            Self::Sovetsky => "Советский",
            Self::Tsentralny => "Центральный",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Fixed district to tariff zone table.
    pub fn cost_zone(self) -> CostZone {
        match self {
            Self::Tsentralny | Self::Zheleznodorozhny | Self::Zaeltsovsky => CostZone::Zone1,
            Self::Dzerzhinsky | Self::Kalininsky | Self::Oktyabrsky | Self::Pervomaisky => {
                CostZone::Zone2
            }
            Self::Kirovsky | Self::Leninsky | Self::Sovetsky => CostZone::Zone3,
        }
    }
}

/// Top-level complaint category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    NoCollection,
    QualityIssue,
}

impl ComplaintCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::NoCollection => "Не вывезли мусор",
            Self::QualityIssue => "Качество услуги",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// How long waste has gone uncollected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DaysWithout {
    Today,
    OneDay,
    TwoDays,
    ThreeOrMore,
}

impl DaysWithout {
    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Сегодня",
            Self::OneDay => "1 день",
            Self::TwoDays => "2 дня",
            Self::ThreeOrMore => "3 дня и более",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// Specific service-quality problem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QualityTrouble {
    DirtyPlatform,
    DamagedContainer,
    SpilledWaste,
    OffSchedule,
    Other,
}

impl QualityTrouble {
    pub fn label(self) -> &'static str {
        match self {
            Self::DirtyPlatform => "Не убрана контейнерная площадка",
            Self::DamagedContainer => "Повреждён контейнер",
            Self::SpilledWaste => "Мусор рассыпан при погрузке",
            Self::OffSchedule => "Вывоз не по графику",
            Self::Other => "Другое",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// The sub-issue chosen after the complaint category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ComplaintTrouble {
    Days(DaysWithout),
    Quality(QualityTrouble),
}

impl ComplaintTrouble {
    pub fn label(self) -> String {
        match self {
            Self::Days(days) => format!("Не вывозят: {}", days.label()),
            Self::Quality(trouble) => trouble.label().to_string(),
        }
    }

    /// Stable key stored in the database, e.g. `days:two_days`.
    pub fn key(self) -> String {
        match self {
            Self::Days(days) => format!("days:{}", days.key()),
            Self::Quality(trouble) => format!("quality:{}", trouble.key()),
        }
    }
}

impl std::str::FromStr for ComplaintTrouble {
    type Err = strum::ParseError;

    /// Parses the stored key form produced by [`ComplaintTrouble::key`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("days", days)) => days.parse().map(Self::Days),
            Some(("quality", trouble)) => trouble.parse().map(Self::Quality),
            _ => Err(strum::ParseError::VariantNotFound),
        }
    }
}

/// Preferred way to get an answer to a complaint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    None,
    Phone,
    Email,
    Telegram,
}

impl ContactMethod {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Не связываться",
            Self::Phone => "Телефон",
            Self::Email => "Электронная почта",
            Self::Telegram => "Telegram",
        }
    }

    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// A registered user. Inserted once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub phone_number: String,
    pub workplace: String,
    pub username: Option<String>,
}

/// A confirmed bulk-waste pickup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupRequest {
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub full_name: String,
    pub phone_number: String,
    pub management_company: String,
    pub district: District,
    pub address: String,
    pub waste_type: WasteType,
    pub comment: Option<String>,
    pub photo: Option<PhotoRef>,
    /// Public link resolved by the upload sink after confirmation.
    pub photo_url: Option<String>,
    pub username: Option<String>,
}

/// A confirmed service-quality complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub full_name: String,
    pub phone_number: String,
    pub management_company: String,
    pub district: District,
    pub address: String,
    pub category: ComplaintCategory,
    pub trouble: ComplaintTrouble,
    pub comment: Option<String>,
    pub photo: Option<PhotoRef>,
    pub photo_url: Option<String>,
    pub contact_method: ContactMethod,
    /// Present only when `contact_method` is [`ContactMethod::Email`].
    pub email: Option<String>,
    pub username: Option<String>,
}

/// A finalized record, ready for the sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Registration(User),
    Pickup(PickupRequest),
    Complaint(Complaint),
}

impl Record {
    /// Short name for logs and operator alerts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registration(_) => "registration",
            Self::Pickup(_) => "pickup",
            Self::Complaint(_) => "complaint",
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Self::Registration(user) => user.id,
            Self::Pickup(request) => request.user_id,
            Self::Complaint(complaint) => complaint.user_id,
        }
    }

    pub fn photo(&self) -> Option<&PhotoRef> {
        match self {
            Self::Registration(_) => None,
            Self::Pickup(request) => request.photo.as_ref(),
            Self::Complaint(complaint) => complaint.photo.as_ref(),
        }
    }

    pub fn set_photo_url(&mut self, url: String) {
        match self {
            Self::Registration(_) => {}
            Self::Pickup(request) => request.photo_url = Some(url),
            Self::Complaint(complaint) => complaint.photo_url = Some(url),
        }
    }

    /// Pretty JSON payload attached to operator failure alerts.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{self:?} ({e})"))
    }

    /// Ordered spreadsheet row. Registrations are not exported.
    pub fn sheet_row(&self) -> Vec<String> {
        match self {
            Self::Registration(_) => Vec::new(),
            Self::Pickup(r) => vec![
                format_timestamp(r.created_at),
                r.full_name.clone(),
                r.phone_number.clone(),
                r.management_company.clone(),
                r.district.label().to_string(),
                r.address.clone(),
                r.waste_type.label().to_string(),
                or_not_specified(r.comment.as_deref()),
                or_not_specified(r.photo_url.as_deref()),
                or_not_specified(format_username(r.username.as_deref()).as_deref()),
            ],
            Self::Complaint(c) => vec![
                format_timestamp(c.created_at),
                c.full_name.clone(),
                c.phone_number.clone(),
                c.management_company.clone(),
                c.district.label().to_string(),
                c.address.clone(),
                c.category.label().to_string(),
                c.trouble.label(),
                or_not_specified(c.comment.as_deref()),
                c.contact_method.label().to_string(),
                or_not_specified(c.email.as_deref()),
                or_not_specified(c.photo_url.as_deref()),
                or_not_specified(format_username(c.username.as_deref()).as_deref()),
            ],
        }
    }
}

/// Renders an optional value, falling back to [`NOT_SPECIFIED`].
pub fn or_not_specified(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

/// `@handle` form of a username.
pub fn format_username(username: Option<&str>) -> Option<String> {
    username.map(|u| format!("@{}", u.trim_start_matches('@')))
}

/// Human-readable local timestamp used in sheets and operator alerts.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&chrono::Local)
        .format("%d.%m.%Y %H:%M")
        .to_string()
}
