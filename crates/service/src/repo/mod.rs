pub mod seaorm;

pub use seaorm::{SeaOrmSchoolRepository, SeaOrmStudentRepository};
