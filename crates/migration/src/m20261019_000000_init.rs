//! Initial schema migration.
//!
//! - `types`: what an expense was for
//! - `locations`: where an expense was made
//! - `expenses`: the expenses, referencing one type and one location
//!
//! `date` and `amount` are text columns: dates use the fixed
//! `YYYY-MM-DD HH:MM:SS` format and amounts their canonical decimal string, so
//! sqlite never coerces them to floating point.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Types {
    Table,
    #[iden = "typeid"]
    Id,
    Description,
}

#[derive(Iden)]
enum Locations {
    Table,
    #[iden = "locationid"]
    Id,
    Description,
}

#[derive(Iden)]
enum Expenses {
    Table,
    #[iden = "expenseid"]
    Id,
    Date,
    #[iden = "typeid"]
    TypeId,
    #[iden = "locationid"]
    LocationId,
    Amount,
    Comment,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Types::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Types::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Types::Description).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Locations::Description)
                            .string_len(255)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Date).string().not_null())
                    .col(ColumnDef::new(Expenses::TypeId).integer().not_null())
                    .col(ColumnDef::new(Expenses::LocationId).integer().not_null())
                    .col(ColumnDef::new(Expenses::Amount).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Comment)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-typeid")
                            .from(Expenses::Table, Expenses::TypeId)
                            .to(Types::Table, Types::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-locationid")
                            .from(Expenses::Table, Expenses::LocationId)
                            .to(Locations::Table, Locations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-date")
                    .table(Expenses::Table)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Types::Table).to_owned())
            .await
    }
}
