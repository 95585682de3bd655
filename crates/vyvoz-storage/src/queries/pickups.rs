// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pickup request rows.

use rusqlite::params;
use vyvoz_core::VyvozError;
use vyvoz_core::domain::PickupRequest;
use vyvoz_core::types::{PhotoRef, UserId};

use super::{parse_key, parse_timestamp};
use crate::database::{Database, map_tr_err};

/// Append a confirmed pickup request and return its row id.
pub async fn insert_pickup_request(
    db: &Database,
    request: &PickupRequest,
) -> Result<i64, VyvozError> {
    let r = request.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pickup_requests (created_at, user_id, full_name, phone_number,
                 management_company, district, address, waste_type, comment, photo_link, username)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    r.created_at.to_rfc3339(),
                    r.user_id.0,
                    r.full_name,
                    r.phone_number,
                    r.management_company,
                    r.district.key(),
                    r.address,
                    r.waste_type.key(),
                    r.comment,
                    r.photo_url,
                    r.username,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All pickup requests of one user, oldest first.
///
/// The stored row keeps the photo link only, so `photo` comes back empty.
pub async fn list_for_user(db: &Database, user: UserId) -> Result<Vec<PickupRequest>, VyvozError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT created_at, user_id, full_name, phone_number, management_company,
                 district, address, waste_type, comment, photo_link, username
                 FROM pickup_requests WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user.0], |row| {
                Ok(PickupRequest {
                    created_at: parse_timestamp(row, 0)?,
                    user_id: UserId(row.get(1)?),
                    full_name: row.get(2)?,
                    phone_number: row.get(3)?,
                    management_company: row.get(4)?,
                    district: parse_key(row, 5)?,
                    address: row.get(6)?,
                    waste_type: parse_key(row, 7)?,
                    comment: row.get(8)?,
                    photo: None::<PhotoRef>,
                    photo_url: row.get(9)?,
                    username: row.get(10)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
