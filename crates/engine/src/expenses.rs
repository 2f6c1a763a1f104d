//! Expenses: what was spent, when, on what and where.

use chrono::{NaiveDateTime, Utc};

use crate::{
    Amount, DateFormatter, EngineError, ExpenseType, Location, Record, RecordId, ResultEngine,
    schema::{AttributeKind, Fallback, Field, Fields, Schema, Table},
    store::{FieldValue, Store},
    validate::COMMENT_MAX_LEN,
};

pub const DATE: &str = "date";
pub const TYPE_ID: &str = "typeid";
pub const LOCATION_ID: &str = "locationid";
pub const AMOUNT: &str = "amount";
pub const COMMENT: &str = "comment";

/// The `expenses` table.
///
/// Field order is validation order: references first, then the amount, the
/// comment and the date.
#[derive(Debug)]
pub struct Expenses;

impl Table for Expenses {
    const SCHEMA: Schema = Schema {
        table: "expenses",
        id_column: "expenseid",
        fields: &[
            Field::required(TYPE_ID, AttributeKind::Reference),
            Field::required(LOCATION_ID, AttributeKind::Reference),
            Field::required(AMOUNT, AttributeKind::Decimal),
            Field::optional(
                COMMENT,
                AttributeKind::Text {
                    max_len: COMMENT_MAX_LEN,
                },
                Fallback::EmptyText,
            ),
            Field::optional(DATE, AttributeKind::Timestamp, Fallback::CurrentTimestamp),
        ],
    };
}

pub type Expense = Record<Expenses>;

impl Record<Expenses> {
    /// Like [`Record::create`], but the referenced type and location must
    /// exist in `store`; an unknown one fails with `InvalidReference`.
    pub async fn create_resolved<S>(store: &S, fields: &Fields) -> ResultEngine<Self>
    where
        S: Store + ?Sized,
    {
        Self::create_resolved_at(store, fields, Utc::now().naive_utc()).await
    }

    /// Like [`Record::create_resolved`], with `now` used for the default date.
    pub async fn create_resolved_at<S>(
        store: &S,
        fields: &Fields,
        now: NaiveDateTime,
    ) -> ResultEngine<Self>
    where
        S: Store + ?Sized,
    {
        let values = Expenses::SCHEMA.prepare(fields, now)?;

        for (column, value) in &values {
            let FieldValue::Int(id) = value else {
                continue;
            };
            let id = RecordId::new(*id)?;
            let resolved = match *column {
                TYPE_ID => ExpenseType::find(store, id).await.map(drop),
                LOCATION_ID => Location::find(store, id).await.map(drop),
                _ => continue,
            };
            match resolved {
                Err(EngineError::NotFound(_)) => {
                    return Err(EngineError::InvalidReference(format!(
                        "invalid {column} specified"
                    )));
                }
                other => other?,
            }
        }

        Self::insert(store, values).await
    }

    /// The stored date, in the store format.
    pub fn raw_date(&self) -> ResultEngine<&str> {
        self.text(DATE)
    }

    /// The stored date rendered by `formatter`.
    pub fn date<F>(&self, formatter: &F, descriptive: bool) -> ResultEngine<String>
    where
        F: DateFormatter + ?Sized,
    {
        Ok(formatter.format_date(self.raw_date()?, descriptive))
    }

    pub fn type_id(&self) -> ResultEngine<RecordId> {
        self.reference(TYPE_ID)
    }

    pub fn location_id(&self) -> ResultEngine<RecordId> {
        self.reference(LOCATION_ID)
    }

    pub fn amount(&self) -> ResultEngine<Amount> {
        self.text(AMOUNT)?.parse()
    }

    pub fn comment(&self) -> ResultEngine<&str> {
        self.text(COMMENT)
    }

    /// Load the referenced type.
    ///
    /// The reference is not re-validated; a dangling id fails with `NotFound`.
    pub async fn expense_type<S>(&self, store: &S) -> ResultEngine<ExpenseType>
    where
        S: Store + ?Sized,
    {
        ExpenseType::find(store, self.type_id()?).await
    }

    /// Load the referenced location.
    pub async fn location<S>(&self, store: &S) -> ResultEngine<Location>
    where
        S: Store + ?Sized,
    {
        Location::find(store, self.location_id()?).await
    }
}
