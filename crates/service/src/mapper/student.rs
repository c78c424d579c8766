use crate::domain::{School, Student};
use crate::dto::StudentDto;
use crate::errors::ServiceError;
use crate::validation::{is_valid_email, normalize_email, required, validate_student_patch};

/// Build an unsaved student from a DTO.
///
/// Names are trimmed, the email is trimmed and lower-cased, and the school is
/// an unresolved [`School::named`] placeholder (or `None` without a school name).
pub fn to_student(dto: Option<&StudentDto>) -> Result<Student, ServiceError> {
    let dto = dto.ok_or_else(|| ServiceError::validation("student dto must not be null"))?;
    let firstname = required("firstname", dto.firstname.as_deref())?;
    let lastname = required("lastname", dto.lastname.as_deref())?;
    let email = dto
        .email
        .as_deref()
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| ServiceError::validation("email must be valid"))?;

    Ok(Student {
        id: None,
        firstname: firstname.trim().to_string(),
        lastname: lastname.trim().to_string(),
        email: normalize_email(email),
        school: dto.school_name.as_deref().map(|n| School::named(n.trim())),
        created_at: None,
    })
}

pub fn to_dto(student: Option<&Student>) -> Result<StudentDto, ServiceError> {
    let student = student.ok_or_else(|| ServiceError::validation("student must not be null"))?;
    Ok(dto_from(student))
}

pub fn to_dto_list(students: Option<&[Student]>) -> Vec<StudentDto> {
    students.map_or_else(Vec::new, |list| list.iter().map(dto_from).collect())
}

/// Overwrite the fields present in `dto`; id and school are left alone.
pub fn apply_update(dto: Option<&StudentDto>, student: Option<&mut Student>) -> Result<(), ServiceError> {
    let (Some(dto), Some(student)) = (dto, student) else {
        return Err(ServiceError::validation("student dto and student must not be null"));
    };
    validate_student_patch(dto)?;

    if let Some(v) = dto.firstname.as_deref() {
        student.firstname = v.trim().to_string();
    }
    if let Some(v) = dto.lastname.as_deref() {
        student.lastname = v.trim().to_string();
    }
    if let Some(v) = dto.email.as_deref() {
        student.email = normalize_email(v);
    }
    Ok(())
}

fn dto_from(student: &Student) -> StudentDto {
    StudentDto {
        id: student.id,
        firstname: Some(student.firstname.clone()),
        lastname: Some(student.lastname.clone()),
        email: Some(student.email.clone()),
        school_name: student.school.as_ref().map(|s| s.name.clone()),
        created_at: student.created_at,
    }
}
