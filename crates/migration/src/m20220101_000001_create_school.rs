//! Create `school` table.
//!
//! `name` carries the global uniqueness constraint for schools.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(School::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(School::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(School::Name, 100).unique_key().not_null())
                    .col(string_len(School::Address, 255).not_null())
                    .col(ColumnDef::new(School::PhoneNumber).string_len(32).null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(School::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum School { Table, Id, Name, Address, PhoneNumber }
