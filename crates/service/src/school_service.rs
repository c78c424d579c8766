use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::School;
use crate::dto::SchoolDto;
use crate::errors::ServiceError;
use crate::mapper::school as mapper;
use crate::repository::SchoolRepository;

/// School business service, independent of the web framework.
pub struct SchoolService<R: SchoolRepository> {
    repo: Arc<R>,
}

impl<R: SchoolRepository> SchoolService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a school with a unique name.
    ///
    /// # Examples
    /// ```
    /// use service::{school_service::SchoolService, repository::mock::InMemoryRepository, dto::SchoolDto};
    /// use std::sync::Arc;
    /// let svc = SchoolService::new(Arc::new(InMemoryRepository::new()));
    /// let dto = SchoolDto { name: Some("MIT".into()), address: Some("77 Mass Ave".into()), ..Default::default() };
    /// let created = tokio_test::block_on(svc.create(&dto)).unwrap();
    /// assert_eq!(created.name.as_deref(), Some("MIT"));
    /// assert_eq!(created.student_count, Some(0));
    /// ```
    #[instrument(skip(self, dto), fields(name = ?dto.name))]
    pub async fn create(&self, dto: &SchoolDto) -> Result<SchoolDto, ServiceError> {
        let school = mapper::to_school(Some(dto))?;
        if self.repo.exists_by_name(&school.name).await? {
            debug!("school exists: {}", school.name);
            return Err(ServiceError::AlreadyExists(format!("school with name {} already exists", school.name)));
        }
        let saved = self.repo.insert(&school).await?;
        info!(school_id = ?saved.id, name = %saved.name, "school_created");
        mapper::to_dto(Some(&saved))
    }

    /// Domain lookup by exact name; used to resolve a student's school.
    pub async fn find_by_name(&self, name: &str) -> Result<School, ServiceError> {
        self.repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("school not found with name: {}", name)))
    }

    pub async fn find_dto_by_name(&self, name: &str) -> Result<Option<SchoolDto>, ServiceError> {
        debug!(name, "find school by name");
        let school = self.repo.find_by_name(name).await?;
        school.as_ref().map(|s| mapper::to_dto(Some(s))).transpose()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<SchoolDto>, ServiceError> {
        debug!(school_id = id, "find school by id");
        let school = self.repo.find_by_id(id).await?;
        school.as_ref().map(|s| mapper::to_dto(Some(s))).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<SchoolDto>, ServiceError> {
        let schools = self.repo.find_all().await?;
        Ok(mapper::to_dto_list(Some(&schools)))
    }

    /// Number of students enrolled in the school with `id`.
    pub async fn count_students(&self, id: i64) -> Result<u64, ServiceError> {
        let school = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("school not found with id: {}", id)))?;
        Ok(school.student_count() as u64)
    }

    /// Delete a school. Refused with `Conflict` while students still reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let school = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("school not found with id: {}", id)))?;
        let enrolled = school.student_count();
        if enrolled > 0 {
            return Err(ServiceError::Conflict(format!(
                "school {} still has {} student(s)",
                school.name, enrolled
            )));
        }
        if !self.repo.delete_by_id(id).await? {
            return Err(ServiceError::NotFound(format!("school not found with id: {}", id)));
        }
        info!(school_id = id, name = %school.name, "school_deleted");
        Ok(())
    }
}
