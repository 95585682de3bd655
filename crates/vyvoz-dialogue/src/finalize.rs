// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget fan-out of a confirmed record to the external sinks.
//!
//! The user has already been acknowledged when a plan runs. Every task is
//! isolated: a failure is logged and forwarded to the operator chat, and the
//! remaining tasks still run. Nothing is retried or rolled back.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info};
use vyvoz_core::domain::{Record, format_timestamp, format_username, or_not_specified};
use vyvoz_core::types::{OutboundMessage, Recipient};
use vyvoz_core::{ChannelAdapter, RecordStore, SheetAdapter, UploadAdapter, VyvozError};

/// One best-effort side effect of a confirmed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTask {
    /// Fetch the attached photo from the transport and publish it.
    UploadPhoto,
    AppendRow { sheet: String },
    InsertRecord,
    AnnounceToOperators,
}

impl SinkTask {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UploadPhoto => "upload_photo",
            Self::AppendRow { .. } => "append_row",
            Self::InsertRecord => "insert_record",
            Self::AnnounceToOperators => "announce",
        }
    }
}

/// A confirmed record and the tasks it fans out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizationPlan {
    pub record: Record,
    pub tasks: Vec<SinkTask>,
}

/// Per-task outcome of one plan, by task name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FinalizationReport {
    pub done: Vec<&'static str>,
    /// Tasks whose sink is not configured.
    pub skipped: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

enum TaskStatus {
    Done,
    Skipped,
}

/// Runs finalization plans against the configured sinks.
pub struct Finalizer {
    channel: Arc<dyn ChannelAdapter>,
    store: Arc<dyn RecordStore>,
    sheets: Option<Arc<dyn SheetAdapter>>,
    uploader: Option<Arc<dyn UploadAdapter>>,
    photo_folder: String,
}

impl Finalizer {
    pub fn new(channel: Arc<dyn ChannelAdapter>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            channel,
            store,
            sheets: None,
            uploader: None,
            photo_folder: String::new(),
        }
    }

    pub fn with_sheets(mut self, sheets: Arc<dyn SheetAdapter>) -> Self {
        self.sheets = Some(sheets);
        self
    }

    /// Enables photo upload into `folder` on the remote disk.
    pub fn with_uploader(mut self, uploader: Arc<dyn UploadAdapter>, folder: &str) -> Self {
        self.uploader = Some(uploader);
        self.photo_folder = folder.trim_end_matches('/').to_string();
        self
    }

    /// Executes the plan. The upload goes first so the row and the alert
    /// carry the photo link; everything else runs concurrently.
    pub async fn run(&self, plan: FinalizationPlan) -> FinalizationReport {
        let FinalizationPlan { mut record, tasks } = plan;
        let mut report = FinalizationReport::default();

        if tasks.contains(&SinkTask::UploadPhoto) {
            match self.upload_photo(&record).await {
                Ok(Some(url)) => {
                    record.set_photo_url(url);
                    report.done.push(SinkTask::UploadPhoto.name());
                }
                Ok(None) => report.skipped.push(SinkTask::UploadPhoto.name()),
                Err(e) => {
                    self.report_failure(&SinkTask::UploadPhoto, &record, &e).await;
                    report.failed.push(SinkTask::UploadPhoto.name());
                }
            }
        }

        let record = &record;
        let pending = tasks
            .iter()
            .filter(|task| **task != SinkTask::UploadPhoto)
            .map(|task| async move { (task, self.execute(task, record).await) });

        for (task, result) in join_all(pending).await {
            match result {
                Ok(TaskStatus::Done) => report.done.push(task.name()),
                Ok(TaskStatus::Skipped) => report.skipped.push(task.name()),
                Err(e) => {
                    self.report_failure(task, record, &e).await;
                    report.failed.push(task.name());
                }
            }
        }

        info!(
            record = record.kind(),
            user_id = %record.user_id(),
            done = report.done.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "finalization finished"
        );
        report
    }

    async fn upload_photo(&self, record: &Record) -> Result<Option<String>, VyvozError> {
        let Some(photo) = record.photo() else {
            return Ok(None);
        };
        let Some(uploader) = &self.uploader else {
            debug!(user_id = %record.user_id(), "photo upload not configured, skipping");
            return Ok(None);
        };

        let bytes = self.channel.download_photo(photo).await?;
        let path = photo_path(&self.photo_folder, record);
        let url = uploader.upload(bytes, &path).await?;
        debug!(path = path.as_str(), url = url.as_str(), "photo uploaded");
        Ok(Some(url))
    }

    async fn execute(&self, task: &SinkTask, record: &Record) -> Result<TaskStatus, VyvozError> {
        match task {
            // Handled before the concurrent batch.
            SinkTask::UploadPhoto => Ok(TaskStatus::Skipped),
            SinkTask::AppendRow { sheet } => {
                let Some(sheets) = &self.sheets else {
                    debug!(sheet = sheet.as_str(), "sheet export not configured, skipping");
                    return Ok(TaskStatus::Skipped);
                };
                sheets.append_row(sheet, record.sheet_row()).await?;
                debug!(sheet = sheet.as_str(), "row appended");
                Ok(TaskStatus::Done)
            }
            SinkTask::InsertRecord => {
                match record {
                    Record::Registration(user) => self.store.insert_user(user).await?,
                    Record::Pickup(request) => {
                        let id = self.store.insert_pickup_request(request).await?;
                        debug!(id, "pickup request stored");
                    }
                    Record::Complaint(complaint) => {
                        let id = self.store.insert_complaint(complaint).await?;
                        debug!(id, "complaint stored");
                    }
                }
                Ok(TaskStatus::Done)
            }
            SinkTask::AnnounceToOperators => {
                self.channel.send(announcement(record)).await?;
                Ok(TaskStatus::Done)
            }
        }
    }

    async fn report_failure(&self, task: &SinkTask, record: &Record, err: &VyvozError) {
        error!(
            task = task.name(),
            record = record.kind(),
            user_id = %record.user_id(),
            error = %err,
            "finalization task failed"
        );
        let alert = OutboundMessage::text(Recipient::Operators, failure_alert(task, record, err));
        if let Err(e) = self.channel.send(alert).await {
            error!(error = %e, task = task.name(), "failed to alert operators");
        }
    }
}

/// Remote path for a record's photo: `<folder>/<unix-millis>_<user>.jpg`.
pub fn photo_path(folder: &str, record: &Record) -> String {
    let millis = match record {
        Record::Registration(_) => chrono::Utc::now().timestamp_millis(),
        Record::Pickup(r) => r.created_at.timestamp_millis(),
        Record::Complaint(c) => c.created_at.timestamp_millis(),
    };
    let name = format!("{millis}_{}.jpg", record.user_id());
    if folder.is_empty() {
        name
    } else {
        format!("{folder}/{name}")
    }
}

fn failure_alert(task: &SinkTask, record: &Record, err: &VyvozError) -> String {
    let target = match task {
        SinkTask::AppendRow { sheet } => format!(" (лист «{sheet}»)"),
        _ => String::new(),
    };
    format!(
        "Ошибка обработки обращения: {}{target}\n{err}\n\n{}",
        task.name(),
        record.to_json()
    )
}

/// Operator announcement for a new request, with the photo attached when given.
pub fn announcement(record: &Record) -> OutboundMessage {
    let (title, fields): (&str, Vec<(&str, String)>) = match record {
        Record::Registration(u) => (
            "Новый пользователь",
            vec![
                ("ФИО", u.full_name.clone()),
                ("Телефон", u.phone_number.clone()),
                ("Место работы", u.workplace.clone()),
            ],
        ),
        Record::Pickup(r) => (
            "Новая заявка на вывоз",
            vec![
                ("Дата", format_timestamp(r.created_at)),
                ("ФИО", r.full_name.clone()),
                ("Телефон", r.phone_number.clone()),
                ("УК", r.management_company.clone()),
                (
                    "Район",
                    format!("{} ({})", r.district.label(), r.district.cost_zone().label()),
                ),
                ("Адрес", r.address.clone()),
                ("Тип отходов", r.waste_type.label().to_string()),
                ("Комментарий", or_not_specified(r.comment.as_deref())),
                ("Фото", or_not_specified(r.photo_url.as_deref())),
            ],
        ),
        Record::Complaint(c) => {
            let mut fields = vec![
                ("Дата", format_timestamp(c.created_at)),
                ("Категория", c.category.label().to_string()),
                ("Проблема", c.trouble.label()),
                ("ФИО", c.full_name.clone()),
                ("Телефон", c.phone_number.clone()),
                ("УК", c.management_company.clone()),
                (
                    "Район",
                    format!("{} ({})", c.district.label(), c.district.cost_zone().label()),
                ),
                ("Адрес", c.address.clone()),
                ("Комментарий", or_not_specified(c.comment.as_deref())),
                ("Способ связи", c.contact_method.label().to_string()),
            ];
            if let Some(email) = &c.email {
                fields.push(("Эл. почта", email.clone()));
            }
            fields.push(("Фото", or_not_specified(c.photo_url.as_deref())));
            ("Новая жалоба", fields)
        }
    };

    let username = match record {
        Record::Registration(u) => u.username.as_deref(),
        Record::Pickup(r) => r.username.as_deref(),
        Record::Complaint(c) => c.username.as_deref(),
    };

    let mut lines = vec![title.to_string()];
    lines.extend(fields.into_iter().map(|(label, value)| format!("{label}: {value}")));
    lines.push(format!(
        "Пользователь: {}",
        or_not_specified(format_username(username).as_deref())
    ));

    let message = OutboundMessage::text(Recipient::Operators, lines.join("\n"));
    match record.photo() {
        Some(photo) => message.with_photo(photo.clone()),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tracing_test::traced_test;
    use vyvoz_core::UserId;
    use vyvoz_core::domain::{
        Complaint, ComplaintCategory, ComplaintTrouble, ContactMethod, District, NOT_SPECIFIED,
        PickupRequest, QualityTrouble, User, WasteType,
    };
    use vyvoz_core::types::PhotoRef;
    use vyvoz_test_utils::{FailingRecordStore, MockChannel};

    use super::*;

    fn pickup(photo: Option<&str>) -> Record {
        Record::Pickup(PickupRequest {
            created_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
            user_id: UserId(555),
            full_name: "Иванов Иван".into(),
            phone_number: "89131234567".into(),
            management_company: "УК Заря".into(),
            district: District::Oktyabrsky,
            address: "ул. Кирова, 3".into(),
            waste_type: WasteType::Branches,
            comment: None,
            photo: photo.map(|p| PhotoRef(p.into())),
            photo_url: None,
            username: Some("ivan".into()),
        })
    }

    #[test]
    fn photo_path_uses_creation_millis_and_user() {
        let record = pickup(Some("file"));
        assert_eq!(
            photo_path("kgm_photos", &record),
            "kgm_photos/1777887000000_555.jpg"
        );
        assert_eq!(photo_path("", &record), "1777887000000_555.jpg");
    }

    #[test]
    fn announcement_lists_fields_and_attaches_photo() {
        let message = announcement(&pickup(Some("AgAD")));
        assert_eq!(message.recipient, Recipient::Operators);
        assert_eq!(message.photo, Some(PhotoRef("AgAD".into())));
        assert!(message.text.starts_with("Новая заявка на вывоз"));
        assert!(message.text.contains("Район: Октябрьский (Зона 2)"));
        assert!(message.text.contains(&format!("Комментарий: {NOT_SPECIFIED}")));
        assert!(message.text.contains("Пользователь: @ivan"));
    }

    #[test]
    fn complaint_announcement_includes_email_only_when_present() {
        let complaint = Complaint {
            created_at: Utc::now(),
            user_id: UserId(1),
            full_name: "Петрова Мария".into(),
            phone_number: "89130000000".into(),
            management_company: "ТСЖ".into(),
            district: District::Sovetsky,
            address: "ул. Ильича, 6".into(),
            category: ComplaintCategory::QualityIssue,
            trouble: ComplaintTrouble::Quality(QualityTrouble::SpilledWaste),
            comment: Some("Опять".into()),
            photo: None,
            photo_url: None,
            contact_method: ContactMethod::Email,
            email: Some("m@example.ru".into()),
            username: None,
        };
        let message = announcement(&Record::Complaint(complaint.clone()));
        assert!(message.text.contains("Эл. почта: m@example.ru"));
        assert!(message.text.contains("Мусор рассыпан при погрузке"));
        assert_eq!(message.photo, None);

        let without = Complaint {
            contact_method: ContactMethod::Phone,
            email: None,
            ..complaint
        };
        let message = announcement(&Record::Complaint(without));
        assert!(!message.text.contains("Эл. почта"));
    }

    #[test]
    fn failure_alert_carries_record_json() {
        let err = VyvozError::sink("sheets", "HTTP 503");
        let alert = failure_alert(
            &SinkTask::AppendRow {
                sheet: "КГМ Зона 2".into(),
            },
            &pickup(None),
            &err,
        );
        assert!(alert.contains("append_row"));
        assert!(alert.contains("КГМ Зона 2"));
        assert!(alert.contains("HTTP 503"));
        assert!(alert.contains("\"record\": \"pickup\""));
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_write_and_failed_alert_are_both_logged() {
        let channel = Arc::new(MockChannel::new());
        channel.fail_operator_sends();
        let finalizer = Finalizer::new(channel.clone(), Arc::new(FailingRecordStore));

        let record = Record::Registration(User {
            id: UserId(42),
            full_name: "Сидоров Сидор".into(),
            phone_number: "+79130000042".into(),
            workplace: "Школа 7".into(),
            username: None,
        });
        let report = finalizer
            .run(FinalizationPlan {
                record,
                tasks: vec![SinkTask::InsertRecord],
            })
            .await;

        assert_eq!(report.failed, vec!["insert_record"]);
        assert!(logs_contain("finalization task failed"));
        assert!(logs_contain("failed to alert operators"));
        assert!(channel.sent_to(Recipient::Operators).await.is_empty());
    }
}
