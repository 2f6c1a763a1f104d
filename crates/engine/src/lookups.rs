//! Lookup tables referenced by expenses: types and locations.

use crate::{
    Record, ResultEngine,
    schema::{AttributeKind, Field, Schema, Table},
};

const DESCRIPTION: Field = Field::required("description", AttributeKind::Label { max_len: 255 });

/// The `types` table (groceries, rent, ...).
#[derive(Debug)]
pub struct Types;

impl Table for Types {
    const SCHEMA: Schema = Schema {
        table: "types",
        id_column: "typeid",
        fields: &[DESCRIPTION],
    };
}

/// The `locations` table (shops, online stores, ...).
#[derive(Debug)]
pub struct Locations;

impl Table for Locations {
    const SCHEMA: Schema = Schema {
        table: "locations",
        id_column: "locationid",
        fields: &[DESCRIPTION],
    };
}

pub type ExpenseType = Record<Types>;
pub type Location = Record<Locations>;

impl Record<Types> {
    pub fn description(&self) -> ResultEngine<&str> {
        self.text(DESCRIPTION.name)
    }
}

impl Record<Locations> {
    pub fn description(&self) -> ResultEngine<&str> {
        self.text(DESCRIPTION.name)
    }
}
