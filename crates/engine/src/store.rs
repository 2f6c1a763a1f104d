//! The store abstraction records are persisted through.
//!
//! A [`Store`] knows three things: insert a row with typed bound values, fetch
//! one row by id, fetch every row of a table. The `sea-orm` connection and
//! transaction types implement it by building `sea_query` statements, so the
//! same record code runs inside or outside a database transaction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, QueryResult,
    sea_query::{Alias, Expr, Order, Query, SelectStatement, SimpleExpr, Value},
};

use crate::schema::{AttributeKind, Schema};

/// A bound attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Int(int) => int.into(),
            FieldValue::Text(text) => text.into(),
        }
    }
}

/// One row of a table, keyed by column name. Includes the id column.
pub type Row = BTreeMap<&'static str, FieldValue>;

/// What the store reports after an insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertOutcome {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one row into `table` with the given column values.
    async fn insert(
        &self,
        table: &'static str,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<InsertOutcome, DbErr>;

    /// Fetch the row of `schema` whose id column equals `id`.
    async fn fetch(&self, schema: &Schema, id: i64) -> Result<Option<Row>, DbErr>;

    /// Fetch every row of `schema`, ordered by id.
    async fn fetch_all(&self, schema: &Schema) -> Result<Vec<Row>, DbErr>;
}

#[async_trait]
impl Store for DatabaseConnection {
    async fn insert(
        &self,
        table: &'static str,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<InsertOutcome, DbErr> {
        insert_row(self, table, values).await
    }

    async fn fetch(&self, schema: &Schema, id: i64) -> Result<Option<Row>, DbErr> {
        fetch_row(self, schema, id).await
    }

    async fn fetch_all(&self, schema: &Schema) -> Result<Vec<Row>, DbErr> {
        fetch_rows(self, schema).await
    }
}

#[async_trait]
impl Store for DatabaseTransaction {
    async fn insert(
        &self,
        table: &'static str,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<InsertOutcome, DbErr> {
        insert_row(self, table, values).await
    }

    async fn fetch(&self, schema: &Schema, id: i64) -> Result<Option<Row>, DbErr> {
        fetch_row(self, schema, id).await
    }

    async fn fetch_all(&self, schema: &Schema) -> Result<Vec<Row>, DbErr> {
        fetch_rows(self, schema).await
    }
}

async fn insert_row<C: ConnectionTrait>(
    conn: &C,
    table: &'static str,
    values: Vec<(&'static str, FieldValue)>,
) -> Result<InsertOutcome, DbErr> {
    let (columns, values): (Vec<_>, Vec<_>) = values
        .into_iter()
        .map(|(column, value)| (Alias::new(column), SimpleExpr::from(Value::from(value))))
        .unzip();

    let mut insert = Query::insert();
    insert.into_table(Alias::new(table)).columns(columns);
    insert
        .values(values)
        .map_err(|err| DbErr::Custom(format!("invalid insert into {table}: {err}")))?;

    let result = conn.execute(conn.get_database_backend().build(&insert)).await?;
    Ok(InsertOutcome {
        rows_affected: result.rows_affected(),
        last_insert_id: result.last_insert_id(),
    })
}

async fn fetch_row<C: ConnectionTrait>(
    conn: &C,
    schema: &Schema,
    id: i64,
) -> Result<Option<Row>, DbErr> {
    let select = select_all(schema)
        .and_where(Expr::col(Alias::new(schema.id_column)).eq(id))
        .to_owned();

    conn.query_one(conn.get_database_backend().build(&select))
        .await?
        .map(|row| decode_row(schema, &row))
        .transpose()
}

async fn fetch_rows<C: ConnectionTrait>(conn: &C, schema: &Schema) -> Result<Vec<Row>, DbErr> {
    let select = select_all(schema)
        .order_by(Alias::new(schema.id_column), Order::Asc)
        .to_owned();

    conn.query_all(conn.get_database_backend().build(&select))
        .await?
        .iter()
        .map(|row| decode_row(schema, row))
        .collect()
}

fn select_all(schema: &Schema) -> SelectStatement {
    Query::select()
        .column(Alias::new(schema.id_column))
        .columns(schema.fields.iter().map(|field| Alias::new(field.name)))
        .from(Alias::new(schema.table))
        .to_owned()
}

fn decode_row(schema: &Schema, row: &QueryResult) -> Result<Row, DbErr> {
    let mut decoded = Row::new();
    decoded.insert(
        schema.id_column,
        FieldValue::Int(row.try_get::<i64>("", schema.id_column)?),
    );
    for field in schema.fields {
        let value = match field.kind {
            AttributeKind::Reference => FieldValue::Int(row.try_get::<i64>("", field.name)?),
            AttributeKind::Decimal
            | AttributeKind::Text { .. }
            | AttributeKind::Label { .. }
            | AttributeKind::Timestamp => FieldValue::Text(row.try_get::<String>("", field.name)?),
        };
        decoded.insert(field.name, value);
    }
    Ok(decoded)
}
