//! The generic store-backed record.

use std::{fmt, marker::PhantomData};

use chrono::{NaiveDateTime, Utc};

use crate::{
    EngineError, ResultEngine,
    schema::{Fields, Table},
    store::{FieldValue, Row, Store},
};

/// Identifier assigned by the store. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(value: i64) -> ResultEngine<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidReference(format!(
                "identifier must be positive, got {value}"
            )))
        }
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single row of table `T`, identified by its id.
///
/// A record built with [`Record::new`] only knows its id; [`Record::load`]
/// populates the attributes. Records returned by [`Record::create`],
/// [`Record::find`] and [`Record::all`] are already loaded.
#[derive(Debug)]
pub struct Record<T: Table> {
    id: RecordId,
    attributes: Row,
    table: PhantomData<T>,
}

impl<T: Table> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            attributes: self.attributes.clone(),
            table: PhantomData,
        }
    }
}

impl<T: Table> PartialEq for Record<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.attributes == other.attributes
    }
}

impl<T: Table> Record<T> {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            attributes: Row::new(),
            table: PhantomData,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn is_loaded(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Validate `fields`, insert them and return the reloaded record.
    pub async fn create<S>(store: &S, fields: &Fields) -> ResultEngine<Self>
    where
        S: Store + ?Sized,
    {
        Self::create_at(store, fields, Utc::now().naive_utc()).await
    }

    /// Like [`Record::create`], with `now` used for timestamp fallbacks.
    pub async fn create_at<S>(store: &S, fields: &Fields, now: NaiveDateTime) -> ResultEngine<Self>
    where
        S: Store + ?Sized,
    {
        let values = T::SCHEMA.prepare(fields, now)?;
        Self::insert(store, values).await
    }

    /// Insert already validated `values` and return the reloaded record.
    pub(crate) async fn insert<S>(
        store: &S,
        values: Vec<(&'static str, FieldValue)>,
    ) -> ResultEngine<Self>
    where
        S: Store + ?Sized,
    {
        let schema = T::SCHEMA;
        let outcome = store.insert(schema.table, values).await?;
        if outcome.rows_affected != 1 {
            return Err(EngineError::Persistence(format!(
                "{} entry not inserted: {} rows affected",
                schema.table, outcome.rows_affected
            )));
        }

        let id = i64::try_from(outcome.last_insert_id)
            .ok()
            .and_then(|id| RecordId::new(id).ok())
            .ok_or_else(|| {
                EngineError::Persistence(format!(
                    "{} entry inserted without a usable id",
                    schema.table
                ))
            })?;

        Self::find(store, id).await
    }

    /// Fetch this record's row and populate all attributes.
    pub async fn load<S>(&mut self, store: &S) -> ResultEngine<()>
    where
        S: Store + ?Sized,
    {
        let schema = T::SCHEMA;
        let row = store
            .fetch(&schema, self.id.get())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("{} {}", schema.table, self.id)))?;
        self.attributes = row;
        Ok(())
    }

    /// Construct a record for `id` and load it.
    pub async fn find<S>(store: &S, id: RecordId) -> ResultEngine<Self>
    where
        S: Store + ?Sized,
    {
        let mut record = Self::new(id);
        record.load(store).await?;
        Ok(record)
    }

    /// Every record of the table, ordered by id.
    pub async fn all<S>(store: &S) -> ResultEngine<Vec<Self>>
    where
        S: Store + ?Sized,
    {
        let schema = T::SCHEMA;
        store
            .fetch_all(&schema)
            .await?
            .into_iter()
            .map(|attributes| {
                let id = match attributes.get(schema.id_column) {
                    Some(FieldValue::Int(id)) => RecordId::new(*id)?,
                    _ => {
                        return Err(EngineError::Persistence(format!(
                            "{} row without {}",
                            schema.table, schema.id_column
                        )));
                    }
                };
                Ok(Self {
                    id,
                    attributes,
                    table: PhantomData,
                })
            })
            .collect()
    }

    /// Raw attribute value.
    pub fn attribute(&self, name: &str) -> ResultEngine<&FieldValue> {
        self.attributes.get(name).ok_or_else(|| {
            EngineError::NotLoaded(format!("{} {}: {name}", T::SCHEMA.table, self.id))
        })
    }

    pub(crate) fn int(&self, name: &str) -> ResultEngine<i64> {
        match self.attribute(name)? {
            FieldValue::Int(value) => Ok(*value),
            FieldValue::Text(_) => Err(self.mistyped(name)),
        }
    }

    pub(crate) fn text(&self, name: &str) -> ResultEngine<&str> {
        match self.attribute(name)? {
            FieldValue::Text(value) => Ok(value),
            FieldValue::Int(_) => Err(self.mistyped(name)),
        }
    }

    pub(crate) fn reference(&self, name: &str) -> ResultEngine<RecordId> {
        RecordId::new(self.int(name)?)
    }

    fn mistyped(&self, name: &str) -> EngineError {
        EngineError::Persistence(format!(
            "{} {}: unexpected type for {name}",
            T::SCHEMA.table,
            self.id
        ))
    }
}
