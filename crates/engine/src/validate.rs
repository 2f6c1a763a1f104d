//! Field validation helpers.
//!
//! Every check here is pure: no store access, no clock. The `parse_*`
//! functions return the canonical value that is bound into the insert, the
//! `validate_*` functions are their boolean counterparts.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::{Amount, RecordId};

/// The store's fixed date format (`YYYY-MM-DD HH:MM:SS`).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum length of a comment, as defined by the `expenses` table.
pub const COMMENT_MAX_LEN: usize = 255;

/// Parse a positive identifier from an integer or a numeric string.
pub(crate) fn parse_id(value: &Value) -> Option<RecordId> {
    let raw = match value {
        Value::Number(number) => number.as_i64()?,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            text.parse().ok()?
        }
        _ => return None,
    };
    RecordId::new(raw).ok()
}

/// Parse a non-negative amount from a number or a decimal string.
pub(crate) fn parse_amount(value: &Value) -> Option<Amount> {
    match value {
        Value::Number(number) => number.to_string().parse().ok(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

/// Accept a string whose length in characters does not exceed `max_len`.
pub(crate) fn parse_text(value: &Value, max_len: usize) -> Option<&str> {
    value
        .as_str()
        .filter(|text| text.chars().count() <= max_len)
}

/// Parse a date string in [`DATE_FORMAT`].
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    value
        .as_str()
        .and_then(|text| NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT).ok())
}

/// `true` iff `value` is a positive integer or a numeric string representing one.
#[must_use]
pub fn validate_id(value: &Value) -> bool {
    parse_id(value).is_some()
}

/// `true` iff `value` parses to a non-negative amount.
#[must_use]
pub fn validate_amount(value: &Value) -> bool {
    parse_amount(value).is_some()
}

/// `true` iff `value` is a string of at most 255 characters.
#[must_use]
pub fn validate_comment(value: &Value) -> bool {
    parse_text(value, COMMENT_MAX_LEN).is_some()
}

/// `true` iff `value` is a string in the store's date format.
#[must_use]
pub fn validate_date_string(value: &Value) -> bool {
    parse_date(value).is_some()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert!(validate_id(&json!(1)));
        assert!(validate_id(&json!("42")));
        assert!(validate_id(&json!(" 7 ")));
        assert!(!validate_id(&json!(0)));
        assert!(!validate_id(&json!(-3)));
        assert!(!validate_id(&json!("-3")));
        assert!(!validate_id(&json!("0")));
        assert!(!validate_id(&json!("abc")));
        assert!(!validate_id(&json!("1.5")));
        assert!(!validate_id(&json!(1.5)));
        assert!(!validate_id(&json!("")));
        assert!(!validate_id(&json!(null)));
        assert!(!validate_id(&json!(true)));
    }

    #[test]
    fn amounts_must_be_non_negative_numbers() {
        assert!(validate_amount(&json!("12.50")));
        assert!(validate_amount(&json!("0")));
        assert!(validate_amount(&json!(3)));
        assert!(validate_amount(&json!(3.5)));
        assert!(validate_amount(&json!(".50")));
        assert!(validate_amount(&json!("12.345")));
        assert!(validate_amount(&json!("1e3")));
        assert!(validate_amount(&json!(1e3)));
        assert!(!validate_amount(&json!("-1")));
        assert!(!validate_amount(&json!(-0.5)));
        assert!(!validate_amount(&json!("twelve")));
        assert!(!validate_amount(&json!("")));
        assert!(!validate_amount(&json!(["1"])));
    }

    #[test]
    fn comments_are_bounded_strings() {
        assert!(validate_comment(&json!("")));
        assert!(validate_comment(&json!("a".repeat(255))));
        assert!(validate_comment(&json!("é".repeat(255))));
        assert!(!validate_comment(&json!("a".repeat(256))));
        assert!(!validate_comment(&json!(12)));
    }

    #[test]
    fn dates_follow_the_store_format() {
        assert!(validate_date_string(&json!("2014-03-01 12:30:00")));
        assert!(!validate_date_string(&json!("2014-03-01")));
        assert!(!validate_date_string(&json!("01/03/2014 12:30:00")));
        assert!(!validate_date_string(&json!("2014-02-30 12:30:00")));
        assert!(!validate_date_string(&json!(20140301)));
    }
}
