use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::dto::StudentDto;
use crate::errors::ServiceError;
use crate::mapper::student as mapper;
use crate::repository::{SchoolRepository, StudentRepository};
use crate::school_service::SchoolService;
use crate::validation::{normalize_email, validate_student_patch};

/// Student business service. School names are resolved through [`SchoolService`].
pub struct StudentService<S: StudentRepository, R: SchoolRepository> {
    repo: Arc<S>,
    schools: Arc<SchoolService<R>>,
}

impl<S: StudentRepository, R: SchoolRepository> StudentService<S, R> {
    pub fn new(repo: Arc<S>, schools: Arc<SchoolService<R>>) -> Self { Self { repo, schools } }

    /// Register a student at an existing school.
    ///
    /// # Examples
    /// ```
    /// use service::{school_service::SchoolService, student_service::StudentService};
    /// use service::{repository::mock::InMemoryRepository, dto::{SchoolDto, StudentDto}};
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryRepository::new());
    /// let schools = Arc::new(SchoolService::new(repo.clone()));
    /// let students = StudentService::new(repo, schools.clone());
    /// let mit = SchoolDto { name: Some("MIT".into()), address: Some("77 Mass Ave".into()), ..Default::default() };
    /// tokio_test::block_on(schools.create(&mit)).unwrap();
    /// let dto = StudentDto {
    ///     firstname: Some("John".into()),
    ///     lastname: Some("Doe".into()),
    ///     email: Some("JohnDoe@Gmail.com".into()),
    ///     school_name: Some("MIT".into()),
    ///     ..Default::default()
    /// };
    /// let created = tokio_test::block_on(students.create(&dto)).unwrap();
    /// assert_eq!(created.email.as_deref(), Some("johndoe@gmail.com"));
    /// assert_eq!(created.school_name.as_deref(), Some("MIT"));
    /// ```
    #[instrument(skip(self, dto), fields(email = ?dto.email))]
    pub async fn create(&self, dto: &StudentDto) -> Result<StudentDto, ServiceError> {
        let mut student = mapper::to_student(Some(dto))?;
        let school_name = student
            .school
            .take()
            .map(|s| s.name)
            .ok_or_else(|| ServiceError::validation("school name is required"))?;

        if self.repo.exists_by_email(&student.email).await? {
            debug!("student exists: {}", student.email);
            return Err(ServiceError::AlreadyExists(format!(
                "student with email {} already exists",
                student.email
            )));
        }
        let school = self.schools.find_by_name(&school_name).await?;
        student.school = Some(school.without_students());

        let saved = self.repo.insert(&student).await?;
        info!(student_id = ?saved.id, email = %saved.email, school = %school_name, "student_created");
        mapper::to_dto(Some(&saved))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<StudentDto>, ServiceError> {
        let email = normalize_email(email);
        debug!(email = %email, "find student by email");
        let student = self.repo.find_by_email(&email).await?;
        student.as_ref().map(|s| mapper::to_dto(Some(s))).transpose()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<StudentDto>, ServiceError> {
        debug!(student_id = id, "find student by id");
        let student = self.repo.find_by_id(id).await?;
        student.as_ref().map(|s| mapper::to_dto(Some(s))).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<StudentDto>, ServiceError> {
        let students = self.repo.find_all().await?;
        Ok(mapper::to_dto_list(Some(&students)))
    }

    pub async fn find_by_school_name(&self, name: &str) -> Result<Vec<StudentDto>, ServiceError> {
        let students = self.repo.find_by_school_name(name).await?;
        Ok(mapper::to_dto_list(Some(&students)))
    }

    /// Case-insensitive substring match on firstname or lastname.
    pub async fn search_by_name(&self, fragment: &str) -> Result<Vec<StudentDto>, ServiceError> {
        let students = self.repo.find_by_name_containing(fragment).await?;
        Ok(mapper::to_dto_list(Some(&students)))
    }

    /// Partial update: only fields present in `dto` change.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: i64, dto: &StudentDto) -> Result<StudentDto, ServiceError> {
        validate_student_patch(dto)?;
        let mut student = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("student not found with id: {}", id)))?;

        if let Some(email) = dto.email.as_deref().map(normalize_email) {
            if email != student.email {
                if let Some(other) = self.repo.find_by_email(&email).await? {
                    if other.id != student.id {
                        return Err(ServiceError::AlreadyExists(format!(
                            "student with email {} already exists",
                            email
                        )));
                    }
                }
            }
        }

        if let Some(name) = dto.school_name.as_deref().map(str::trim) {
            let current = student.school.as_ref().map(|s| s.name.as_str());
            if current != Some(name) {
                let school = self.schools.find_by_name(name).await?;
                student.school = Some(school.without_students());
            }
        }

        mapper::apply_update(Some(dto), Some(&mut student))?;
        let saved = self.repo.update(&student).await?;
        info!(student_id = id, email = %saved.email, "student_updated");
        mapper::to_dto(Some(&saved))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete_by_id(id).await? {
            return Err(ServiceError::NotFound(format!("student not found with id: {}", id)));
        }
        info!(student_id = id, "student_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_by_email(&self, email: &str) -> Result<(), ServiceError> {
        let email = normalize_email(email);
        if !self.repo.delete_by_email(&email).await? {
            return Err(ServiceError::NotFound(format!("student not found with email: {}", email)));
        }
        info!(email = %email, "student_deleted");
        Ok(())
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
        self.repo.exists_by_email(&normalize_email(email)).await
    }

    pub async fn count_by_school(&self, school_id: i64) -> Result<u64, ServiceError> {
        self.repo.count_by_school_id(school_id).await
    }
}
