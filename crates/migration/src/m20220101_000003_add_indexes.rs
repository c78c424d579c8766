use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Student: index on school_id (school listing, student counts, FK checks)
        manager
            .create_index(
                Index::create()
                    .name("idx_student_school")
                    .table(Student::Table)
                    .col(Student::SchoolId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_student_school").table(Student::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Student { Table, SchoolId }
