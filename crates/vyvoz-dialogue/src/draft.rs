// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-flow typed drafts, filled one answer at a time.
//!
//! Optional answers (comment, photo) use `Option<Option<T>>`: the outer
//! `Option` records whether the step was answered, the inner one whether the
//! user gave a value or pressed the skip button.

use vyvoz_core::domain::{
    Complaint, ComplaintCategory, ComplaintTrouble, ContactMethod, District, PickupRequest,
    Record, User, WasteType,
};
use vyvoz_core::types::PhotoRef;

use crate::engine::EngineContext;
use crate::flow::{Answer, Flow, Step};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub workplace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickupDraft {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub management_company: Option<String>,
    pub district: Option<District>,
    pub address: Option<String>,
    pub waste_type: Option<WasteType>,
    pub comment: Option<Option<String>>,
    pub photo: Option<Option<PhotoRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintDraft {
    pub category: Option<ComplaintCategory>,
    pub trouble: Option<ComplaintTrouble>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub management_company: Option<String>,
    pub district: Option<District>,
    pub address: Option<String>,
    pub comment: Option<Option<String>>,
    pub photo: Option<Option<PhotoRef>>,
    pub contact_method: Option<ContactMethod>,
    pub email: Option<String>,
}

/// The answers collected so far; the variant is the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Registration(RegistrationDraft),
    Pickup(PickupDraft),
    Complaint(ComplaintDraft),
}

impl Draft {
    pub fn new(flow: Flow) -> Self {
        match flow {
            Flow::Registration => Self::Registration(RegistrationDraft::default()),
            Flow::Pickup => Self::Pickup(PickupDraft::default()),
            Flow::Complaint => Self::Complaint(ComplaintDraft::default()),
        }
    }

    pub fn flow(&self) -> Flow {
        match self {
            Self::Registration(_) => Flow::Registration,
            Self::Pickup(_) => Flow::Pickup,
            Self::Complaint(_) => Flow::Complaint,
        }
    }

    pub fn district(&self) -> Option<District> {
        match self {
            Self::Registration(_) => None,
            Self::Pickup(d) => d.district,
            Self::Complaint(d) => d.district,
        }
    }

    /// Merges exactly the one field the answer carries.
    ///
    /// Answers that have no field in this flow are ignored; the step parser
    /// never produces them.
    pub fn apply(&mut self, answer: Answer) {
        match (self, answer) {
            (Self::Registration(d), Answer::FullName(v)) => d.full_name = Some(v),
            (Self::Registration(d), Answer::Phone(v)) => d.phone_number = Some(v),
            (Self::Registration(d), Answer::Workplace(v)) => d.workplace = Some(v),

            (Self::Pickup(d), Answer::FullName(v)) => d.full_name = Some(v),
            (Self::Pickup(d), Answer::Phone(v)) => d.phone_number = Some(v),
            (Self::Pickup(d), Answer::ManagementCompany(v)) => d.management_company = Some(v),
            (Self::Pickup(d), Answer::District(v)) => d.district = Some(v),
            (Self::Pickup(d), Answer::Address(v)) => d.address = Some(v),
            (Self::Pickup(d), Answer::WasteType(v)) => d.waste_type = Some(v),
            (Self::Pickup(d), Answer::Comment(v)) => d.comment = Some(v),
            (Self::Pickup(d), Answer::Photo(v)) => d.photo = Some(v),

            (Self::Complaint(d), Answer::Category(v)) => d.category = Some(v),
            (Self::Complaint(d), Answer::Days(v)) => d.trouble = Some(ComplaintTrouble::Days(v)),
            (Self::Complaint(d), Answer::Trouble(v)) => {
                d.trouble = Some(ComplaintTrouble::Quality(v))
            }
            (Self::Complaint(d), Answer::FullName(v)) => d.full_name = Some(v),
            (Self::Complaint(d), Answer::Phone(v)) => d.phone_number = Some(v),
            (Self::Complaint(d), Answer::ManagementCompany(v)) => d.management_company = Some(v),
            (Self::Complaint(d), Answer::District(v)) => d.district = Some(v),
            (Self::Complaint(d), Answer::Address(v)) => d.address = Some(v),
            (Self::Complaint(d), Answer::Comment(v)) => d.comment = Some(v),
            (Self::Complaint(d), Answer::Photo(v)) => d.photo = Some(v),
            (Self::Complaint(d), Answer::ContactMethod(v)) => d.contact_method = Some(v),
            (Self::Complaint(d), Answer::Email(v)) => d.email = Some(v),

            _ => {}
        }
    }

    /// Builds the record, or returns the first step whose answer is missing.
    pub fn finalize(&self, ctx: &EngineContext) -> Result<Record, Step> {
        match self {
            Self::Registration(d) => Ok(Record::Registration(User {
                id: ctx.user_id,
                full_name: required(&d.full_name, Step::FullName)?,
                phone_number: required(&d.phone_number, Step::Phone)?,
                workplace: required(&d.workplace, Step::Workplace)?,
                username: ctx.username.clone(),
            })),
            Self::Pickup(d) => Ok(Record::Pickup(PickupRequest {
                created_at: ctx.now,
                user_id: ctx.user_id,
                full_name: required(&d.full_name, Step::FullName)?,
                phone_number: required(&d.phone_number, Step::Phone)?,
                management_company: required(&d.management_company, Step::ManagementCompany)?,
                district: required(&d.district, Step::District)?,
                address: required(&d.address, Step::Address)?,
                waste_type: required(&d.waste_type, Step::WasteType)?,
                comment: required(&d.comment, Step::Comment)?,
                photo: required(&d.photo, Step::Photo)?,
                photo_url: None,
                username: ctx.username.clone(),
            })),
            Self::Complaint(d) => {
                let category = required(&d.category, Step::Category)?;
                let trouble_step = match category {
                    ComplaintCategory::NoCollection => Step::DaysWithout,
                    ComplaintCategory::QualityIssue => Step::Trouble,
                };
                let trouble = required(&d.trouble, trouble_step)?;
                let full_name = required(&d.full_name, Step::FullName)?;
                let phone_number = required(&d.phone_number, Step::Phone)?;
                let management_company =
                    required(&d.management_company, Step::ManagementCompany)?;
                let district = required(&d.district, Step::District)?;
                let address = required(&d.address, Step::Address)?;
                let comment = required(&d.comment, Step::Comment)?;
                let photo = required(&d.photo, Step::Photo)?;
                let contact_method = required(&d.contact_method, Step::ContactMethod)?;
                let email = match contact_method {
                    ContactMethod::Email => Some(required(&d.email, Step::Email)?),
                    _ => None,
                };
                Ok(Record::Complaint(Complaint {
                    created_at: ctx.now,
                    user_id: ctx.user_id,
                    full_name,
                    phone_number,
                    management_company,
                    district,
                    address,
                    category,
                    trouble,
                    comment,
                    photo,
                    photo_url: None,
                    contact_method,
                    email,
                    username: ctx.username.clone(),
                }))
            }
        }
    }
}

fn required<T: Clone>(value: &Option<T>, step: Step) -> Result<T, Step> {
    value.clone().ok_or(step)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vyvoz_core::domain::{DaysWithout, QualityTrouble};
    use vyvoz_core::types::UserId;

    use super::*;

    fn ctx() -> EngineContext {
        EngineContext {
            user_id: UserId(77),
            username: Some("resident".into()),
            registered: true,
            now: Utc::now(),
        }
    }

    #[test]
    fn registration_reports_first_missing_step() {
        let mut draft = Draft::new(Flow::Registration);
        assert_eq!(draft.finalize(&ctx()), Err(Step::FullName));
        draft.apply(Answer::FullName("Иванов Иван".into()));
        draft.apply(Answer::Workplace("ТСЖ".into()));
        assert_eq!(draft.finalize(&ctx()), Err(Step::Phone));
        draft.apply(Answer::Phone("89131234567".into()));

        let Ok(Record::Registration(user)) = draft.finalize(&ctx()) else {
            panic!("registration should finalize");
        };
        assert_eq!(user.id, UserId(77));
        assert_eq!(user.username.as_deref(), Some("resident"));
        assert_eq!(user.workplace, "ТСЖ");
    }

    #[test]
    fn skipped_comment_counts_as_answered() {
        let mut draft = Draft::new(Flow::Pickup);
        for answer in [
            Answer::FullName("Иванов Иван".into()),
            Answer::Phone("89131234567".into()),
            Answer::ManagementCompany("УК Заря".into()),
            Answer::District(District::Kirovsky),
            Answer::Address("ул. Сибирская, 1".into()),
            Answer::WasteType(WasteType::Rso),
        ] {
            draft.apply(answer);
        }
        assert_eq!(draft.finalize(&ctx()), Err(Step::Comment));
        draft.apply(Answer::Comment(None));
        assert_eq!(draft.finalize(&ctx()), Err(Step::Photo));
        draft.apply(Answer::Photo(None));

        let Ok(Record::Pickup(request)) = draft.finalize(&ctx()) else {
            panic!("pickup should finalize");
        };
        assert_eq!(request.comment, None);
        assert_eq!(request.photo, None);
        assert_eq!(request.photo_url, None);
    }

    #[test]
    fn complaint_email_required_only_for_email_contact() {
        let mut draft = Draft::new(Flow::Complaint);
        for answer in [
            Answer::Category(ComplaintCategory::NoCollection),
            Answer::Days(DaysWithout::TwoDays),
            Answer::FullName("Иванов Иван".into()),
            Answer::Phone("89131234567".into()),
            Answer::ManagementCompany("УК Заря".into()),
            Answer::District(District::Sovetsky),
            Answer::Address("ул. Ильича, 6".into()),
            Answer::Comment(Some("Третий день".into())),
            Answer::Photo(None),
            Answer::ContactMethod(ContactMethod::Email),
        ] {
            draft.apply(answer);
        }
        assert_eq!(draft.finalize(&ctx()), Err(Step::Email));

        draft.apply(Answer::ContactMethod(ContactMethod::Phone));
        let Ok(Record::Complaint(complaint)) = draft.finalize(&ctx()) else {
            panic!("complaint should finalize");
        };
        assert_eq!(complaint.email, None);
        assert_eq!(complaint.trouble, ComplaintTrouble::Days(DaysWithout::TwoDays));
    }

    #[test]
    fn quality_complaint_needs_trouble_step() {
        let mut draft = Draft::new(Flow::Complaint);
        draft.apply(Answer::Category(ComplaintCategory::QualityIssue));
        assert_eq!(draft.finalize(&ctx()), Err(Step::Trouble));
        draft.apply(Answer::Trouble(QualityTrouble::DamagedContainer));
        assert_eq!(draft.finalize(&ctx()), Err(Step::FullName));
    }

    #[test]
    fn foreign_answers_are_ignored() {
        let mut draft = Draft::new(Flow::Registration);
        draft.apply(Answer::WasteType(WasteType::Bulky));
        assert_eq!(draft, Draft::new(Flow::Registration));
    }
}
