// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure predicates for free-text answers. Input is trimmed before checking.

use std::sync::LazyLock;

use regex::Regex;

/// Russian mobile/landline number: `+7` or `8`, then 10 digits with optional
/// spaces, dashes and parentheses around the area code.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+7|8)[\s-]?\(?\d{3}\)?[\s-]?\d{3}[\s-]?\d{2}[\s-]?\d{2}$").unwrap()
});

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

pub fn is_valid_full_name(text: &str) -> bool {
    char_len(text) >= 5
}

pub fn is_valid_phone(text: &str) -> bool {
    PHONE_RE.is_match(text.trim())
}

/// Also used for the management company name.
pub fn is_valid_workplace(text: &str) -> bool {
    char_len(text) >= 3
}

pub fn is_valid_address(text: &str) -> bool {
    char_len(text) >= 5
}

/// Exactly one `@`, a non-empty local part, and a dotted domain with no
/// empty labels. Whitespace anywhere is rejected.
pub fn is_valid_email(text: &str) -> bool {
    let text = text.trim();
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = text.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
