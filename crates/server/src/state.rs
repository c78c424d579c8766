use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::repo::{SeaOrmSchoolRepository, SeaOrmStudentRepository};
use service::repository::{mock::InMemoryRepository, SchoolRepository, StudentRepository};
use service::school_service::SchoolService;
use service::student_service::StudentService;

/// Shared handler state: both services over the chosen repositories.
pub struct AppState<S: StudentRepository, R: SchoolRepository> {
    pub students: Arc<StudentService<S, R>>,
    pub schools: Arc<SchoolService<R>>,
}

// derive(Clone) would require S: Clone and R: Clone
impl<S: StudentRepository, R: SchoolRepository> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self { students: Arc::clone(&self.students), schools: Arc::clone(&self.schools) }
    }
}

impl<S: StudentRepository, R: SchoolRepository> AppState<S, R> {
    pub fn new(student_repo: Arc<S>, school_repo: Arc<R>) -> Self {
        let schools = Arc::new(SchoolService::new(school_repo));
        let students = Arc::new(StudentService::new(student_repo, Arc::clone(&schools)));
        Self { students, schools }
    }
}

pub type DbState = AppState<SeaOrmStudentRepository, SeaOrmSchoolRepository>;
pub type MemoryState = AppState<InMemoryRepository, InMemoryRepository>;

impl DbState {
    pub fn from_db(db: DatabaseConnection) -> Self {
        Self::new(
            Arc::new(SeaOrmStudentRepository { db: db.clone() }),
            Arc::new(SeaOrmSchoolRepository { db }),
        )
    }
}

impl MemoryState {
    pub fn in_memory() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        Self::new(Arc::clone(&repo), repo)
    }
}
