//! Store-backed records for the expenses tracker.
//!
//! Every table is described by a [`Schema`] and accessed through the generic
//! [`Record`]: `create` validates a field mapping, inserts it and reloads the
//! row, `load`/`find` fetch a row by id, `all` lists a table. The store is
//! always passed in explicitly; [`Store`] is implemented for `sea-orm`
//! connections and transactions.
//!
//! ```no_run
//! # async fn run(db: sea_orm::DatabaseConnection) -> Result<(), engine::EngineError> {
//! use engine::{Expense, Fields, UserClock};
//! use serde_json::json;
//!
//! let fields: Fields = json!({ "typeid": 2, "locationid": 5, "amount": "12.50" })
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//! let expense = Expense::create(&db, &fields).await?;
//! let kind = expense.expense_type(&db).await?;
//! println!(
//!     "{} on {} ({})",
//!     expense.amount()?,
//!     kind.description()?,
//!     expense.date(&UserClock::default(), true)?
//! );
//! # Ok(())
//! # }
//! ```

pub use amount::Amount;
pub use dates::{DateFormatter, UserClock};
pub use error::EngineError;
pub use expenses::{Expense, Expenses};
pub use lookups::{ExpenseType, Location, Locations, Types};
pub use record::{Record, RecordId};
pub use schema::{AttributeKind, Fallback, Field, Fields, Presence, Schema, Table};
pub use store::{FieldValue, InsertOutcome, Row, Store};
pub use validate::{
    COMMENT_MAX_LEN, DATE_FORMAT, validate_amount, validate_comment, validate_date_string,
    validate_id,
};

mod amount;
mod dates;
mod error;
pub mod expenses;
mod lookups;
mod record;
mod schema;
mod store;
mod validate;

pub type ResultEngine<T> = Result<T, EngineError>;
