//! Create `student` table with FK to `school`.
//!
//! Emails are stored lower-cased, so the unique key on `email` is effectively
//! case-insensitive. The FK restricts deletion of schools that still have
//! students.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Student::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Student::Firstname, 50).not_null())
                    .col(string_len(Student::Lastname, 50).not_null())
                    .col(string_len(Student::Email, 255).unique_key().not_null())
                    .col(big_integer(Student::SchoolId).not_null())
                    .col(timestamp_with_time_zone(Student::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_school")
                            .from(Student::Table, Student::SchoolId)
                            .to(School::Table, School::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Student::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Id, Firstname, Lastname, Email, SchoolId, CreatedAt }

#[derive(DeriveIden)]
enum School { Table, Id }
