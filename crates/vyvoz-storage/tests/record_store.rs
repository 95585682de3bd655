// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store behavior through the `RecordStore` trait object.

use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;
use vyvoz_config::model::StorageConfig;
use vyvoz_core::domain::{District, PickupRequest, User, WasteType};
use vyvoz_core::{RecordStore, UserId};
use vyvoz_storage::{SqliteStore, queries};

fn user(id: i64) -> User {
    User {
        id: UserId(id),
        full_name: "Павлов Игорь".into(),
        phone_number: "89131112233".into(),
        workplace: "Школа 12".into(),
        username: None,
    }
}

fn pickup(id: i64) -> PickupRequest {
    PickupRequest {
        created_at: Utc::now(),
        user_id: UserId(id),
        full_name: "Павлов Игорь".into(),
        phone_number: "89131112233".into(),
        management_company: "УК Заря".into(),
        district: District::Zaeltsovsky,
        address: "ул. Дуси Ковальчук, 10".into(),
        waste_type: WasteType::Branches,
        comment: None,
        photo: None,
        photo_url: None,
        username: None,
    }
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vyvoz.db").to_string_lossy().into_owned();
    let config = StorageConfig {
        database_path: path.clone(),
        wal_mode: true,
    };

    {
        let store = SqliteStore::new(config.clone());
        store.initialize().await.unwrap();
        store.insert_user(&user(5)).await.unwrap();
        store.insert_pickup_request(&pickup(5)).await.unwrap();
        store.close().await.unwrap();
    }

    let store = SqliteStore::new(config);
    store.initialize().await.unwrap();
    assert!(store.user_exists(UserId(5)).await.unwrap());
    let rows = queries::pickups::list_for_user(store.db().unwrap(), UserId(5))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].waste_type, WasteType::Branches);
}

#[tokio::test]
async fn concurrent_inserts_through_shared_store() {
    let dir = tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(StorageConfig {
        database_path: dir.path().join("c.db").to_string_lossy().into_owned(),
        wal_mode: true,
    }));
    store.initialize().await.unwrap();

    let mut handles = Vec::new();
    for id in 1..=8 {
        let store: Arc<dyn RecordStore> = store.clone();
        handles.push(tokio::spawn(async move {
            store.insert_user(&user(id)).await.unwrap();
            store.insert_pickup_request(&pickup(id)).await.unwrap()
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8, "every insert gets its own row id");

    for id in 1..=8 {
        assert!(store.user_exists(UserId(id)).await.unwrap());
    }
}
