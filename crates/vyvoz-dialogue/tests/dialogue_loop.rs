// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dialogue behavior through the loop, the finalizer and a temp
//! SQLite store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use vyvoz_config::model::StorageConfig;
use vyvoz_core::domain::NOT_SPECIFIED;
use vyvoz_core::types::{EventPayload, Recipient};
use vyvoz_core::UserId;
use vyvoz_dialogue::flow::Step;
use vyvoz_dialogue::{EngineSettings, SessionStore, menus, texts};
use vyvoz_storage::{SqliteStore, queries};
use vyvoz_test_utils::{
    FailingRecordStore, RecordingSheets, RecordingUploader, SlowLookupStore, TestHarness,
};

#[tokio::test]
async fn acknowledgement_does_not_wait_for_slow_sinks() {
    let harness = TestHarness::builder()
        .with_sheets(RecordingSheets::with_delay(Duration::from_millis(300)))
        .build()
        .await
        .unwrap();
    harness.register(1).await.unwrap();
    harness.pickup_until_confirm(1, None).await.unwrap();

    let replies = harness.button(1, menus::CONFIRM).await.unwrap();
    assert_eq!(replies[0].text, texts::PICKUP_ACCEPTED);
    assert!(harness.sheet_rows().await.is_empty(), "append still in flight");
    assert!(harness.sessions.is_empty(), "session cleared before sinks finish");

    harness.settle().await;
    let rows = harness.sheet_rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "КГМ Зона 3");
}

#[tokio::test]
async fn photo_is_uploaded_before_row_and_announcement() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.register(12).await.unwrap();
    harness.pickup_until_confirm(12, Some("AgAD-sofa")).await.unwrap();
    harness.button(12, menus::CONFIRM).await.unwrap();
    harness.settle().await;

    let uploads = harness.uploader.as_ref().unwrap().uploads().await;
    assert_eq!(uploads.len(), 1);
    let (path, size) = &uploads[0];
    assert!(path.starts_with("kgm_photos/"));
    assert!(path.ends_with("_12.jpg"));
    assert_eq!(*size, 3);

    let url = format!("{}{path}", RecordingUploader::BASE_URL);
    let rows = harness.sheet_rows().await;
    assert_eq!(rows[0].1[8], url);

    let db = harness.sqlite.db().unwrap();
    let stored = queries::pickups::list_for_user(db, UserId(12)).await.unwrap();
    assert_eq!(stored[0].photo_url.as_deref(), Some(url.as_str()));

    let operators = harness.operator_messages().await;
    assert_eq!(operators.len(), 1);
    assert!(operators[0].photo.is_some());
    assert!(operators[0].text.contains(&url));
}

#[tokio::test]
async fn failing_sheet_does_not_stop_other_sinks() {
    let harness = TestHarness::builder()
        .with_sheets(RecordingSheets::failing())
        .build()
        .await
        .unwrap();
    harness.register(2).await.unwrap();
    harness.pickup_until_confirm(2, None).await.unwrap();
    let replies = harness.button(2, menus::CONFIRM).await.unwrap();
    assert_eq!(replies[0].text, texts::PICKUP_ACCEPTED);
    harness.settle().await;

    let db = harness.sqlite.db().unwrap();
    assert_eq!(
        queries::pickups::list_for_user(db, UserId(2)).await.unwrap().len(),
        1
    );

    let operators = harness.operator_messages().await;
    assert_eq!(operators.len(), 2, "announcement plus failure alert");
    let alert = operators
        .iter()
        .find(|m| m.text.contains("append_row"))
        .expect("failure alert");
    assert!(alert.text.contains("\"record\": \"pickup\""));

    // Nothing about the failure reaches the user.
    let to_user = harness.channel.sent_to(Recipient::User(UserId(2))).await;
    assert!(to_user.iter().all(|m| !m.text.contains("append_row")));
}

#[tokio::test]
async fn failed_upload_leaves_fallback_link() {
    let harness = TestHarness::builder()
        .with_uploader(RecordingUploader::failing())
        .build()
        .await
        .unwrap();
    harness.register(3).await.unwrap();
    harness.pickup_until_confirm(3, Some("AgAD-x")).await.unwrap();
    harness.button(3, menus::CONFIRM).await.unwrap();
    harness.settle().await;

    let rows = harness.sheet_rows().await;
    assert_eq!(rows[0].1[8], NOT_SPECIFIED);
    let operators = harness.operator_messages().await;
    assert!(operators.iter().any(|m| m.text.contains("upload_photo")));
}

#[tokio::test]
async fn unconfigured_sinks_are_skipped_quietly() {
    let harness = TestHarness::builder()
        .without_sheets()
        .without_uploader()
        .build()
        .await
        .unwrap();
    harness.register(4).await.unwrap();
    harness.pickup_until_confirm(4, Some("AgAD-y")).await.unwrap();
    harness.button(4, menus::CONFIRM).await.unwrap();
    harness.settle().await;

    let db = harness.sqlite.db().unwrap();
    let stored = queries::pickups::list_for_user(db, UserId(4)).await.unwrap();
    assert_eq!(stored[0].photo_url, None);
    let operators = harness.operator_messages().await;
    assert_eq!(operators.len(), 1, "announcement only, no failure alerts");
}

#[tokio::test]
async fn store_write_failure_is_reported_to_operators_only() {
    let harness = TestHarness::builder()
        .with_record_store(Arc::new(FailingRecordStore))
        .build()
        .await
        .unwrap();
    harness.button(5, menus::REGISTER).await.unwrap();
    harness.text(5, "Сидоров Сидор").await.unwrap();
    harness.text(5, "89130001122").await.unwrap();
    harness.text(5, "Гимназия 2").await.unwrap();
    let replies = harness.text(5, "Подтверждаю").await.unwrap();
    assert_eq!(replies[0].text, texts::REGISTRATION_DONE);
    harness.settle().await;

    let operators = harness.operator_messages().await;
    assert_eq!(operators.len(), 1);
    assert!(operators[0].text.contains("insert_record"));
    assert!(operators[0].text.contains("database is locked"));
}

#[tokio::test]
async fn unreachable_operator_chat_is_tolerated() {
    let harness = TestHarness::builder()
        .with_sheets(RecordingSheets::failing())
        .build()
        .await
        .unwrap();
    harness.channel.fail_operator_sends();
    harness.register(6).await.unwrap();
    harness.pickup_until_confirm(6, None).await.unwrap();
    harness.button(6, menus::CONFIRM).await.unwrap();
    harness.settle().await;

    let db = harness.sqlite.db().unwrap();
    assert_eq!(
        queries::pickups::list_for_user(db, UserId(6)).await.unwrap().len(),
        1
    );
    assert!(harness.operator_messages().await.is_empty());
}

#[tokio::test]
async fn double_confirmation_stores_one_record() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.register(7).await.unwrap();
    harness.pickup_until_confirm(7, None).await.unwrap();
    harness.button(7, menus::CONFIRM).await.unwrap();
    let second = harness.button(7, menus::CONFIRM).await.unwrap();
    assert_ne!(second[0].text, texts::PICKUP_ACCEPTED);
    harness.settle().await;

    let db = harness.sqlite.db().unwrap();
    assert_eq!(
        queries::pickups::list_for_user(db, UserId(7)).await.unwrap().len(),
        1
    );
    assert_eq!(harness.sheet_rows().await.len(), 1);
}

#[tokio::test]
async fn unregistered_user_is_sent_to_registration_then_can_file() {
    let harness = TestHarness::builder().build().await.unwrap();
    let replies = harness.button(8, menus::COMPLAINT).await.unwrap();
    assert_eq!(replies[0].text, texts::REGISTER_FIRST);

    harness.text(8, "Петрова Мария").await.unwrap();
    harness.text(8, "+79131234567").await.unwrap();
    harness.text(8, "Детский сад 4").await.unwrap();
    harness.button(8, menus::CONFIRM).await.unwrap();
    harness.settle().await;

    let replies = harness.button(8, menus::COMPLAINT).await.unwrap();
    assert!(replies[0].text.contains("пожаловаться"));
}

#[tokio::test]
async fn complaint_with_email_is_stored_and_routed() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.register(9).await.unwrap();
    for data in ["complaint", "category:quality_issue", "trouble:damaged_container"] {
        harness.button(9, data).await.unwrap();
    }
    harness.text(9, "Петрова Мария").await.unwrap();
    harness.text(9, "89137654321").await.unwrap();
    harness.text(9, "ТСЖ Радуга").await.unwrap();
    harness.button(9, "district:kalininsky").await.unwrap();
    harness.text(9, "ул. Богдана Хмельницкого, 40").await.unwrap();
    harness.text(9, "Бак сломан вторую неделю").await.unwrap();
    harness.button(9, menus::NO_PHOTO).await.unwrap();
    harness.button(9, "contact:email").await.unwrap();
    let hint = harness.text(9, "maria@").await.unwrap();
    assert_eq!(hint[0].text, texts::HINT_EMAIL);
    harness.text(9, "maria@example.ru").await.unwrap();
    let replies = harness.button(9, menus::CONFIRM).await.unwrap();
    assert_eq!(replies[0].text, texts::COMPLAINT_ACCEPTED);
    harness.settle().await;

    let db = harness.sqlite.db().unwrap();
    let stored = queries::complaints::list_for_user(db, UserId(9)).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email.as_deref(), Some("maria@example.ru"));
    assert_eq!(stored[0].comment.as_deref(), Some("Бак сломан вторую неделю"));

    let rows = harness.sheet_rows().await;
    assert_eq!(rows[0].0, "Жалобы Зона 2");
}

#[tokio::test]
async fn complaint_today_writes_nothing() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.register(10).await.unwrap();
    harness.button(10, menus::COMPLAINT).await.unwrap();
    harness.button(10, "category:no_collection").await.unwrap();
    let replies = harness.button(10, "days:today").await.unwrap();
    assert_eq!(replies[0].text, texts::TODAY_SHORT_CIRCUIT);
    harness.settle().await;

    assert!(harness.sessions.is_empty());
    assert!(harness.sheet_rows().await.is_empty());
    let db = harness.sqlite.db().unwrap();
    assert!(
        queries::complaints::list_for_user(db, UserId(10))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn muted_operators_get_no_announcement() {
    let harness = TestHarness::builder()
        .with_settings(EngineSettings {
            notify_operators: false,
            ..EngineSettings::default()
        })
        .build()
        .await
        .unwrap();
    harness.register(11).await.unwrap();
    harness.pickup_until_confirm(11, None).await.unwrap();
    harness.button(11, menus::CONFIRM).await.unwrap();
    harness.settle().await;
    assert!(harness.operator_messages().await.is_empty());
    assert_eq!(harness.sheet_rows().await.len(), 1);
}

#[tokio::test]
async fn interleaved_users_keep_separate_sessions() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.register(21).await.unwrap();
    harness.register(22).await.unwrap();

    harness.button(21, menus::PICKUP).await.unwrap();
    harness.button(22, menus::COMPLAINT).await.unwrap();
    harness.text(21, "Иванов Иван").await.unwrap();
    harness.cancel(22).await.unwrap();

    let next = harness.text(21, "89131234567").await.unwrap();
    assert!(next[0].text.contains("управляющую компанию"));
    assert_eq!(harness.sessions.len(), 1);
}

#[tokio::test]
async fn store_outage_during_lookup_tells_user_to_retry() {
    let uninitialized = SqliteStore::new(StorageConfig {
        database_path: "unused.db".into(),
        wal_mode: false,
    });
    let harness = TestHarness::builder()
        .with_record_store(Arc::new(uninitialized))
        .build()
        .await
        .unwrap();

    let result = harness.button(30, menus::PICKUP).await;
    assert!(result.is_err());
    let to_user = harness.channel.sent_to(Recipient::User(UserId(30))).await;
    assert_eq!(to_user.len(), 1);
    assert_eq!(to_user[0].text, texts::TEMPORARILY_UNAVAILABLE);
    assert!(harness.sessions.is_empty());
}

#[tokio::test]
async fn run_processes_queued_events_until_channel_closes() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.channel.inject(40, EventPayload::Text("/start".into())).await;
    harness.channel.inject(40, EventPayload::Cancel).await;
    harness.channel.close();

    tokio::time::timeout(
        Duration::from_secs(5),
        harness.dialogue.run(CancellationToken::new()),
    )
    .await
    .expect("loop should stop on closed channel")
    .unwrap();

    let to_user = harness.channel.sent_to(Recipient::User(UserId(40))).await;
    assert_eq!(to_user[0].text, texts::WELCOME_NEW);
    assert_eq!(to_user[1].text, texts::NOTHING_TO_CANCEL);
}

#[tokio::test]
async fn run_stops_on_cancellation() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), harness.dialogue.run(cancel))
        .await
        .expect("loop should stop when cancelled")
        .unwrap();
}

#[tokio::test]
async fn slow_user_does_not_delay_other_users() {
    let harness = TestHarness::builder()
        .with_record_store(Arc::new(SlowLookupStore::new(
            UserId(50),
            Duration::from_secs(1),
        )))
        .build()
        .await
        .unwrap();
    harness.channel.inject(50, EventPayload::Text("/pickup".into())).await;
    harness.channel.inject(51, EventPayload::Text("привет".into())).await;
    harness
        .channel
        .inject(50, EventPayload::Text("Иванов Иван Иванович".into()))
        .await;

    let cancel = CancellationToken::new();
    let started = Instant::now();
    let first_reply_to_other_user = async {
        loop {
            if !harness.channel.sent_to(Recipient::User(UserId(51))).await.is_empty() {
                let waited = started.elapsed();
                cancel.cancel();
                return waited;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    let (result, waited) = tokio::join!(
        harness.dialogue.run(cancel.clone()),
        first_reply_to_other_user
    );
    result.unwrap();
    assert!(waited < Duration::from_millis(500), "user 51 waited {waited:?}");

    // Shutdown drained the slow user's queue, in arrival order.
    let slow = harness.channel.sent_to(Recipient::User(UserId(50))).await;
    assert_eq!(slow.len(), 2);
    let session = harness.sessions.get(UserId(50)).await.unwrap().unwrap();
    assert_eq!(session.step, Step::Phone);
}
