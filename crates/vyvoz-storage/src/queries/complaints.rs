// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complaint rows.

use rusqlite::params;
use vyvoz_core::VyvozError;
use vyvoz_core::domain::Complaint;
use vyvoz_core::types::UserId;

use super::{parse_key, parse_timestamp};
use crate::database::{Database, map_tr_err};

/// Append a confirmed complaint and return its row id.
pub async fn insert_complaint(db: &Database, complaint: &Complaint) -> Result<i64, VyvozError> {
    let c = complaint.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO complaints (created_at, user_id, full_name, phone_number,
                 management_company, district, address, category, trouble, comment,
                 contact_method, email, photo_link, username)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    c.created_at.to_rfc3339(),
                    c.user_id.0,
                    c.full_name,
                    c.phone_number,
                    c.management_company,
                    c.district.key(),
                    c.address,
                    c.category.key(),
                    c.trouble.key(),
                    c.comment,
                    c.contact_method.key(),
                    c.email,
                    c.photo_url,
                    c.username,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All complaints of one user, oldest first. `photo` comes back empty.
pub async fn list_for_user(db: &Database, user: UserId) -> Result<Vec<Complaint>, VyvozError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT created_at, user_id, full_name, phone_number, management_company,
                 district, address, category, trouble, comment, contact_method, email,
                 photo_link, username
                 FROM complaints WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user.0], |row| {
                Ok(Complaint {
                    created_at: parse_timestamp(row, 0)?,
                    user_id: UserId(row.get(1)?),
                    full_name: row.get(2)?,
                    phone_number: row.get(3)?,
                    management_company: row.get(4)?,
                    district: parse_key(row, 5)?,
                    address: row.get(6)?,
                    category: parse_key(row, 7)?,
                    trouble: parse_key(row, 8)?,
                    comment: row.get(9)?,
                    contact_method: parse_key(row, 10)?,
                    email: row.get(11)?,
                    photo: None,
                    photo_url: row.get(12)?,
                    username: row.get(13)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
