use chrono::{DateTime, Utc};

/// School as seen by the business layer.
///
/// `students` is the read-side projection of the students referencing this
/// school; `None` means it was not loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct School {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub students: Option<Vec<Student>>,
}

impl School {
    /// Unresolved reference carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn without_students(self) -> Self {
        Self { students: None, ..self }
    }

    pub fn student_count(&self) -> usize {
        self.students.as_ref().map_or(0, Vec::len)
    }
}

/// Student as seen by the business layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Student {
    pub id: Option<i64>,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub school: Option<School>,
    pub created_at: Option<DateTime<Utc>>,
}
