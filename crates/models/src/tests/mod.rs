


use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::{db, school, student};

/// Connect and migrate, or `None` when no database is configured for this run.
pub(crate) async fn setup_test_db() -> anyhow::Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = db::connect().await?;
    db::migrate(&db).await?;
    Ok(Some(db))
}

pub(crate) async fn insert_school(db: &DatabaseConnection, prefix: &str) -> anyhow::Result<school::Model> {
    let am = school::ActiveModel {
        name: Set(format!("{}_{}", prefix, Uuid::new_v4().simple())),
        address: Set("1 College Ave".into()),
        phone_number: Set(None),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub(crate) async fn insert_student(
    db: &DatabaseConnection,
    school_id: i64,
    firstname: &str,
    lastname: &str,
) -> anyhow::Result<student::Model> {
    let am = student::ActiveModel {
        firstname: Set(firstname.into()),
        lastname: Set(lastname.into()),
        email: Set(format!("{}_{}@example.com", firstname.to_lowercase(), Uuid::new_v4().simple())),
        school_id: Set(school_id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
