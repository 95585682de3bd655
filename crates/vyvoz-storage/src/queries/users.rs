// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User registration rows. Insert and lookup only; there is no update path.

use rusqlite::params;
use vyvoz_core::VyvozError;
use vyvoz_core::domain::User;
use vyvoz_core::types::UserId;

use crate::database::{Database, map_tr_err};

/// Insert a newly registered user. Fails on a duplicate id.
pub async fn insert_user(db: &Database, user: &User) -> Result<(), VyvozError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, full_name, phone_number, workplace, username)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.0,
                    user.full_name,
                    user.phone_number,
                    user.workplace,
                    user.username,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Whether a user row exists for this id.
pub async fn user_exists(db: &Database, id: UserId) -> Result<bool, VyvozError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                params![id.0],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user by id.
pub async fn lookup_user(db: &Database, id: UserId) -> Result<Option<User>, VyvozError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, full_name, phone_number, workplace, username
                 FROM users WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        full_name: row.get(1)?,
                        phone_number: row.get(2)?,
                        workplace: row.get(3)?,
                        username: row.get(4)?,
                    })
                },
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}
