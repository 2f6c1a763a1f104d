//! Per-table schema descriptors.
//!
//! A [`Schema`] lists the writable fields of a table together with their
//! semantic [`AttributeKind`] and whether they are required. The kind decides
//! both how an input value is validated and how it is bound into the insert.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::{
    EngineError, ResultEngine,
    store::FieldValue,
    validate::{self, DATE_FORMAT},
};

/// Input of a create operation: field name to raw value.
pub type Fields = Map<String, Value>;

/// Semantic type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    /// Identifier of a row in another table. Bound as an integer.
    Reference,
    /// Non-negative decimal, bound as its canonical string.
    Decimal,
    /// Free text up to `max_len` characters, empty allowed.
    Text { max_len: usize },
    /// Trimmed, non-empty text up to `max_len` characters.
    Label { max_len: usize },
    /// Date in the store format, bound as a string.
    Timestamp,
}

/// What happens when a field is absent from the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional(Fallback),
}

/// Value used for an absent optional field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    EmptyText,
    CurrentTimestamp,
}

#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub presence: Presence,
}

impl Field {
    pub const fn required(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: AttributeKind, fallback: Fallback) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional(fallback),
        }
    }

    /// Validate `value` and convert it into its bound representation.
    fn bind(&self, value: &Value) -> ResultEngine<FieldValue> {
        let invalid = || EngineError::InvalidValue(format!("invalid {} specified", self.name));
        match self.kind {
            AttributeKind::Reference => validate::parse_id(value)
                .map(|id| FieldValue::Int(id.get()))
                .ok_or_else(|| {
                    EngineError::InvalidReference(format!("invalid {} specified", self.name))
                }),
            AttributeKind::Decimal => validate::parse_amount(value)
                .map(|amount| FieldValue::Text(amount.to_string()))
                .ok_or_else(invalid),
            AttributeKind::Text { max_len } => validate::parse_text(value, max_len)
                .map(|text| FieldValue::Text(text.to_string()))
                .ok_or_else(invalid),
            AttributeKind::Label { max_len } => validate::parse_text(value, max_len)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| FieldValue::Text(text.to_string()))
                .ok_or_else(invalid),
            AttributeKind::Timestamp => validate::parse_date(value)
                .map(|date| FieldValue::Text(date.format(DATE_FORMAT).to_string()))
                .ok_or_else(invalid),
        }
    }

    /// Value bound in place of an absent optional field.
    fn fallback(&self, now: NaiveDateTime) -> Option<FieldValue> {
        match self.presence {
            Presence::Required => None,
            Presence::Optional(Fallback::EmptyText) => Some(FieldValue::Text(String::new())),
            Presence::Optional(Fallback::CurrentTimestamp) => {
                Some(FieldValue::Text(now.format(DATE_FORMAT).to_string()))
            }
        }
    }
}

/// Layout of a store table.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub table: &'static str,
    pub id_column: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    /// Validate `input` against the schema and return the values to insert, in
    /// field order.
    ///
    /// All required fields are checked for presence first, then every field is
    /// validated in declaration order; the first failure is returned. Absent
    /// optional fields get their fallback, with `now` standing in for the
    /// current time. Keys not named by the schema are ignored.
    pub fn prepare(
        &self,
        input: &Fields,
        now: NaiveDateTime,
    ) -> ResultEngine<Vec<(&'static str, FieldValue)>> {
        let provided = |name: &str| input.get(name).filter(|value| !value.is_null());

        if let Some(field) = self
            .fields
            .iter()
            .find(|field| field.presence == Presence::Required && provided(field.name).is_none())
        {
            return Err(EngineError::MissingField(format!(
                "specified data must include {}",
                field.name
            )));
        }

        self.fields
            .iter()
            .map(|field| {
                let value = match provided(field.name) {
                    Some(value) => field.bind(value)?,
                    None => field.fallback(now).ok_or_else(|| {
                        EngineError::MissingField(format!(
                            "specified data must include {}",
                            field.name
                        ))
                    })?,
                };
                Ok((field.name, value))
            })
            .collect()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A table described by a [`Schema`].
pub trait Table: Send + Sync + 'static {
    const SCHEMA: Schema;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    const NOTES: Schema = Schema {
        table: "notes",
        id_column: "noteid",
        fields: &[
            Field::required("ownerid", AttributeKind::Reference),
            Field::required("title", AttributeKind::Label { max_len: 10 }),
            Field::optional("body", AttributeKind::Text { max_len: 20 }, Fallback::EmptyText),
            Field::optional("at", AttributeKind::Timestamp, Fallback::CurrentTimestamp),
        ],
    };

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 5, 0))
            .unwrap()
    }

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn presence_is_checked_before_validity() {
        let err = NOTES
            .prepare(&fields(json!({ "ownerid": "x" })), now())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingField("specified data must include title".to_string())
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let err = NOTES
            .prepare(&fields(json!({ "ownerid": null, "title": "a" })), now())
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingField(_)));

        let values = NOTES
            .prepare(&fields(json!({ "ownerid": 1, "title": "a", "body": null })), now())
            .unwrap();
        assert_eq!(values[2], ("body", FieldValue::Text(String::new())));
    }

    #[test]
    fn fallbacks_fill_absent_optional_fields() {
        let values = NOTES
            .prepare(&fields(json!({ "ownerid": "3", "title": " hi " })), now())
            .unwrap();
        assert_eq!(
            values,
            vec![
                ("ownerid", FieldValue::Int(3)),
                ("title", FieldValue::Text("hi".to_string())),
                ("body", FieldValue::Text(String::new())),
                ("at", FieldValue::Text("2014-03-01 09:05:00".to_string())),
            ]
        );
    }

    #[test]
    fn labels_reject_blank_text() {
        let err = NOTES
            .prepare(&fields(json!({ "ownerid": 1, "title": "   " })), now())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidValue("invalid title specified".to_string())
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let values = NOTES
            .prepare(
                &fields(json!({ "ownerid": 1, "title": "a", "noteid": 99, "extra": true })),
                now(),
            )
            .unwrap();
        assert_eq!(values.len(), 4);
        assert!(NOTES.field("extra").is_none());
    }
}
