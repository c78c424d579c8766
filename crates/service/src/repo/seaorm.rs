use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, Set, Unchanged,
};

use models::{school, student};

use crate::domain::{School, Student};
use crate::errors::ServiceError;
use crate::repository::{SchoolRepository, StudentRepository};

pub struct SeaOrmSchoolRepository {
    pub db: DatabaseConnection,
}

pub struct SeaOrmStudentRepository {
    pub db: DatabaseConnection,
}

fn school_from(m: school::Model, students: Option<Vec<student::Model>>) -> School {
    School {
        id: Some(m.id),
        name: m.name,
        address: m.address,
        phone_number: m.phone_number,
        students: students.map(|list| list.into_iter().map(|s| student_from(s, None)).collect()),
    }
}

fn student_from(m: student::Model, school: Option<school::Model>) -> Student {
    Student {
        id: Some(m.id),
        firstname: m.firstname,
        lastname: m.lastname,
        email: m.email,
        school: school.map(|s| school_from(s, None)),
        created_at: Some(m.created_at.with_timezone(&Utc)),
    }
}

fn school_id_of(student: &Student) -> Result<i64, ServiceError> {
    student
        .school
        .as_ref()
        .and_then(|s| s.id)
        .ok_or_else(|| ServiceError::validation("student has no resolved school"))
}

/// `%fragment%` with LIKE wildcards in the fragment escaped.
fn contains_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for c in fragment.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

impl SeaOrmSchoolRepository {
    async fn load_one(&self, filter: Condition) -> Result<Option<School>, ServiceError> {
        let mut rows = school::Entity::find()
            .filter(filter)
            .find_with_related(student::Entity)
            .order_by_asc(school::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.pop().map(|(s, students)| school_from(s, Some(students))))
    }
}

#[async_trait::async_trait]
impl SchoolRepository for SeaOrmSchoolRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<School>, ServiceError> {
        self.load_one(Condition::all().add(school::Column::Id.eq(id))).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<School>, ServiceError> {
        self.load_one(Condition::all().add(school::Column::Name.eq(name))).await
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError> {
        let n = school::Entity::find()
            .filter(school::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn find_all(&self) -> Result<Vec<School>, ServiceError> {
        let rows = school::Entity::find()
            .find_with_related(student::Entity)
            .order_by_asc(school::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|(s, students)| school_from(s, Some(students))).collect())
    }

    async fn insert(&self, school: &School) -> Result<School, ServiceError> {
        let am = school::ActiveModel {
            id: NotSet,
            name: Set(school.name.clone()),
            address: Set(school.address.clone()),
            phone_number: Set(school.phone_number.clone()),
        };
        let saved = am
            .insert(&self.db)
            .await
            .map_err(|e| ServiceError::from_write(e, || ServiceError::Db("unexpected foreign key".into())))?;
        Ok(school_from(saved, Some(Vec::new())))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let res = school::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                ServiceError::from_write(e, || ServiceError::Conflict(format!("school {} still has students", id)))
            })?;
        Ok(res.rows_affected > 0)
    }
}

impl SeaOrmStudentRepository {
    async fn load(&self, filter: Condition) -> Result<Vec<Student>, ServiceError> {
        let rows = student::Entity::find()
            .find_also_related(school::Entity)
            .filter(filter)
            .order_by_asc(student::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|(s, school)| student_from(s, school)).collect())
    }

    async fn load_one(&self, filter: Condition) -> Result<Option<Student>, ServiceError> {
        Ok(self.load(filter).await?.into_iter().next())
    }
}

#[async_trait::async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, ServiceError> {
        self.load_one(Condition::all().add(student::Column::Id.eq(id))).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, ServiceError> {
        self.load_one(Condition::all().add(student::Column::Email.eq(email))).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
        let n = student::Entity::find()
            .filter(student::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn find_all(&self) -> Result<Vec<Student>, ServiceError> {
        self.load(Condition::all()).await
    }

    async fn find_by_school_name(&self, name: &str) -> Result<Vec<Student>, ServiceError> {
        self.load(Condition::all().add(school::Column::Name.eq(name))).await
    }

    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, ServiceError> {
        let pattern = contains_pattern(fragment);
        let lower = |col: student::Column| Expr::expr(Func::lower(Expr::col((student::Entity, col))));
        let cond = Condition::any()
            .add(lower(student::Column::Firstname).like(pattern.as_str()))
            .add(lower(student::Column::Lastname).like(pattern.as_str()));
        self.load(cond).await
    }

    async fn count_by_school_id(&self, school_id: i64) -> Result<u64, ServiceError> {
        let n = student::Entity::find()
            .filter(student::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await?;
        Ok(n)
    }

    async fn insert(&self, student: &Student) -> Result<Student, ServiceError> {
        let am = student::ActiveModel {
            id: NotSet,
            firstname: Set(student.firstname.clone()),
            lastname: Set(student.lastname.clone()),
            email: Set(student.email.clone()),
            school_id: Set(school_id_of(student)?),
            created_at: Set(Utc::now().into()),
        };
        let saved = am
            .insert(&self.db)
            .await
            .map_err(|e| ServiceError::from_write(e, || ServiceError::not_found("school")))?;
        self.find_by_id(saved.id).await?.ok_or_else(|| ServiceError::not_found("student"))
    }

    async fn update(&self, student: &Student) -> Result<Student, ServiceError> {
        let id = student.id.ok_or_else(|| ServiceError::validation("student id is required"))?;
        let am = student::ActiveModel {
            id: Unchanged(id),
            firstname: Set(student.firstname.clone()),
            lastname: Set(student.lastname.clone()),
            email: Set(student.email.clone()),
            school_id: Set(school_id_of(student)?),
            created_at: NotSet,
        };
        am.update(&self.db)
            .await
            .map_err(|e| ServiceError::from_write(e, || ServiceError::not_found("school")))?;
        self.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("student"))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let res = student::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_by_email(&self, email: &str) -> Result<bool, ServiceError> {
        let res = student::Entity::delete_many()
            .filter(student::Column::Email.eq(email))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
