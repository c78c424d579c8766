use async_trait::async_trait;

use crate::domain::{School, Student};
use crate::errors::ServiceError;

/// Persistence contract for schools.
///
/// Loaded schools carry their student set so callers can count it.
/// Implementations report a duplicate name as `AlreadyExists` and deleting a
/// school that still has students as `Conflict`.
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<School>, ServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<School>, ServiceError>;
    async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError>;
    async fn find_all(&self) -> Result<Vec<School>, ServiceError>;
    async fn insert(&self, school: &School) -> Result<School, ServiceError>;
    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError>;
}

/// Persistence contract for students.
///
/// Loaded students carry their school (without its student set). Emails are
/// expected in normalized form. A duplicate email is `AlreadyExists`; a write
/// pointing at a missing school is `NotFound`.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, ServiceError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError>;
    async fn find_all(&self) -> Result<Vec<Student>, ServiceError>;
    /// Exact, case-sensitive match on the school name.
    async fn find_by_school_name(&self, name: &str) -> Result<Vec<Student>, ServiceError>;
    /// Case-insensitive substring match on firstname or lastname.
    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, ServiceError>;
    async fn count_by_school_id(&self, school_id: i64) -> Result<u64, ServiceError>;
    async fn insert(&self, student: &Student) -> Result<Student, ServiceError>;
    async fn update(&self, student: &Student) -> Result<Student, ServiceError>;
    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError>;
    async fn delete_by_email(&self, email: &str) -> Result<bool, ServiceError>;
}

/// In-memory store implementing both repositories, for tests and doc examples.
///
/// Enforces the same constraints as the database schema: unique school names,
/// unique student emails, existing school on student writes, and no deletion of
/// schools that still have students.
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Utc};

    #[derive(Clone)]
    struct SchoolRow {
        name: String,
        address: String,
        phone_number: Option<String>,
    }

    #[derive(Clone)]
    struct StudentRow {
        firstname: String,
        lastname: String,
        email: String,
        school_id: i64,
        created_at: DateTime<Utc>,
    }

    #[derive(Default)]
    struct State {
        schools: BTreeMap<i64, SchoolRow>, // key: id
        students: BTreeMap<i64, StudentRow>, // key: id
        last_school_id: i64,
        last_student_id: i64,
        writes: usize,
    }

    impl State {
        fn school(&self, id: i64, with_students: bool) -> Option<School> {
            let row = self.schools.get(&id)?;
            let students = with_students.then(|| {
                self.students
                    .iter()
                    .filter(|(_, s)| s.school_id == id)
                    .map(|(sid, s)| self.student_from(*sid, s, None))
                    .collect()
            });
            Some(School {
                id: Some(id),
                name: row.name.clone(),
                address: row.address.clone(),
                phone_number: row.phone_number.clone(),
                students,
            })
        }

        fn student_from(&self, id: i64, row: &StudentRow, school: Option<School>) -> Student {
            Student {
                id: Some(id),
                firstname: row.firstname.clone(),
                lastname: row.lastname.clone(),
                email: row.email.clone(),
                school,
                created_at: Some(row.created_at),
            }
        }

        fn student(&self, id: i64) -> Option<Student> {
            let row = self.students.get(&id)?;
            Some(self.student_from(id, row, self.school(row.school_id, false)))
        }

        fn students_where(&self, pred: impl Fn(&StudentRow) -> bool) -> Vec<Student> {
            self.students
                .iter()
                .filter(|(_, s)| pred(s))
                .map(|(id, s)| self.student_from(*id, s, self.school(s.school_id, false)))
                .collect()
        }

        fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
            self.students.iter().any(|(id, s)| s.email == email && Some(*id) != except)
        }

        fn resolved_school_id(&self, student: &Student) -> Result<i64, ServiceError> {
            let id = student
                .school
                .as_ref()
                .and_then(|s| s.id)
                .ok_or_else(|| ServiceError::validation("student has no resolved school"))?;
            if !self.schools.contains_key(&id) {
                return Err(ServiceError::not_found("school"));
            }
            Ok(id)
        }
    }

    #[derive(Default)]
    pub struct InMemoryRepository {
        state: Mutex<State>,
    }

    impl InMemoryRepository {
        pub fn new() -> Self { Self::default() }

        /// Number of successful mutations so far.
        pub fn write_count(&self) -> usize { self.lock().writes }

        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[async_trait]
    impl SchoolRepository for InMemoryRepository {
        async fn find_by_id(&self, id: i64) -> Result<Option<School>, ServiceError> {
            Ok(self.lock().school(id, true))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<School>, ServiceError> {
            let st = self.lock();
            let id = st.schools.iter().find(|(_, s)| s.name == name).map(|(id, _)| *id);
            Ok(id.and_then(|id| st.school(id, true)))
        }

        async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError> {
            Ok(self.lock().schools.values().any(|s| s.name == name))
        }

        async fn find_all(&self) -> Result<Vec<School>, ServiceError> {
            let st = self.lock();
            Ok(st.schools.keys().filter_map(|id| st.school(*id, true)).collect())
        }

        async fn insert(&self, school: &School) -> Result<School, ServiceError> {
            let mut st = self.lock();
            if st.schools.values().any(|s| s.name == school.name) {
                return Err(ServiceError::AlreadyExists(format!("school name {}", school.name)));
            }
            st.last_school_id += 1;
            let id = st.last_school_id;
            st.schools.insert(id, SchoolRow {
                name: school.name.clone(),
                address: school.address.clone(),
                phone_number: school.phone_number.clone(),
            });
            st.writes += 1;
            st.school(id, true).ok_or_else(|| ServiceError::not_found("school"))
        }

        async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
            let mut st = self.lock();
            if st.students.values().any(|s| s.school_id == id) {
                return Err(ServiceError::Conflict(format!("school {} still has students", id)));
            }
            let removed = st.schools.remove(&id).is_some();
            if removed {
                st.writes += 1;
            }
            Ok(removed)
        }
    }

    #[async_trait]
    impl StudentRepository for InMemoryRepository {
        async fn find_by_id(&self, id: i64) -> Result<Option<Student>, ServiceError> {
            Ok(self.lock().student(id))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Student>, ServiceError> {
            let st = self.lock();
            let id = st.students.iter().find(|(_, s)| s.email == email).map(|(id, _)| *id);
            Ok(id.and_then(|id| st.student(id)))
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
            Ok(self.lock().email_taken(email, None))
        }

        async fn find_all(&self) -> Result<Vec<Student>, ServiceError> {
            Ok(self.lock().students_where(|_| true))
        }

        async fn find_by_school_name(&self, name: &str) -> Result<Vec<Student>, ServiceError> {
            let st = self.lock();
            let ids: Vec<i64> = st.schools.iter().filter(|(_, s)| s.name == name).map(|(id, _)| *id).collect();
            Ok(st.students_where(|s| ids.contains(&s.school_id)))
        }

        async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, ServiceError> {
            let needle = fragment.to_lowercase();
            Ok(self.lock().students_where(|s| {
                s.firstname.to_lowercase().contains(&needle) || s.lastname.to_lowercase().contains(&needle)
            }))
        }

        async fn count_by_school_id(&self, school_id: i64) -> Result<u64, ServiceError> {
            Ok(self.lock().students.values().filter(|s| s.school_id == school_id).count() as u64)
        }

        async fn insert(&self, student: &Student) -> Result<Student, ServiceError> {
            let mut st = self.lock();
            let school_id = st.resolved_school_id(student)?;
            if st.email_taken(&student.email, None) {
                return Err(ServiceError::AlreadyExists(format!("student email {}", student.email)));
            }
            st.last_student_id += 1;
            let id = st.last_student_id;
            st.students.insert(id, StudentRow {
                firstname: student.firstname.clone(),
                lastname: student.lastname.clone(),
                email: student.email.clone(),
                school_id,
                created_at: Utc::now(),
            });
            st.writes += 1;
            st.student(id).ok_or_else(|| ServiceError::not_found("student"))
        }

        async fn update(&self, student: &Student) -> Result<Student, ServiceError> {
            let mut st = self.lock();
            let id = student.id.ok_or_else(|| ServiceError::validation("student id is required"))?;
            let school_id = st.resolved_school_id(student)?;
            if st.email_taken(&student.email, Some(id)) {
                return Err(ServiceError::AlreadyExists(format!("student email {}", student.email)));
            }
            let row = st.students.get_mut(&id).ok_or_else(|| ServiceError::not_found("student"))?;
            row.firstname = student.firstname.clone();
            row.lastname = student.lastname.clone();
            row.email = student.email.clone();
            row.school_id = school_id;
            st.writes += 1;
            st.student(id).ok_or_else(|| ServiceError::not_found("student"))
        }

        async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
            let mut st = self.lock();
            let removed = st.students.remove(&id).is_some();
            if removed {
                st.writes += 1;
            }
            Ok(removed)
        }

        async fn delete_by_email(&self, email: &str) -> Result<bool, ServiceError> {
            let mut st = self.lock();
            let before = st.students.len();
            st.students.retain(|_, s| s.email != email);
            let removed = st.students.len() != before;
            if removed {
                st.writes += 1;
            }
            Ok(removed)
        }
    }
}
