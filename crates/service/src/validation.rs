//! Request validation applied at the HTTP boundary before any service call.

use crate::dto::{SchoolDto, StudentDto};
use crate::errors::ServiceError;

pub const PERSON_NAME_LEN: (usize, usize) = (2, 50);
pub const SCHOOL_NAME_LEN: (usize, usize) = (2, 100);
pub const EMAIL_MAX_LEN: usize = 255;
pub const ADDRESS_MAX_LEN: usize = 255;
pub const PHONE_MAX_LEN: usize = 32;

/// Shape check: non-blank, contains `@` and `.`, and the first `@` comes
/// before the last `.`.
pub fn is_valid_email(email: &str) -> bool {
    if email.trim().is_empty() {
        return false;
    }
    match (email.find('@'), email.rfind('.')) {
        (Some(at), Some(dot)) => at < dot,
        _ => false,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reject an absent (`null`) request body.
pub fn require_body<T>(body: Option<T>, what: &str) -> Result<T, ServiceError> {
    body.ok_or_else(|| ServiceError::validation(format!("{} payload is required", what)))
}

/// Non-blank value of a required field.
pub fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::validation(format!("{} is required", field))),
    }
}

fn check_len(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), ServiceError> {
    let n = value.trim().chars().count();
    if n < min || n > max {
        return Err(ServiceError::validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

fn check_max(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.trim().chars().count() > max {
        return Err(ServiceError::validation(format!("{} must be at most {} characters", field, max)));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), ServiceError> {
    if !is_valid_email(value) {
        return Err(ServiceError::validation("email should be valid"));
    }
    check_max("email", value, EMAIL_MAX_LEN)
}

pub fn validate_new_student(dto: &StudentDto) -> Result<(), ServiceError> {
    check_len("firstname", required("firstname", dto.firstname.as_deref())?, PERSON_NAME_LEN)?;
    check_len("lastname", required("lastname", dto.lastname.as_deref())?, PERSON_NAME_LEN)?;
    check_email(required("email", dto.email.as_deref())?)?;
    check_len("school_name", required("school_name", dto.school_name.as_deref())?, SCHOOL_NAME_LEN)?;
    Ok(())
}

/// Same bounds as [`validate_new_student`], only for fields that are present.
pub fn validate_student_patch(dto: &StudentDto) -> Result<(), ServiceError> {
    if let Some(v) = dto.firstname.as_deref() {
        check_len("firstname", v, PERSON_NAME_LEN)?;
    }
    if let Some(v) = dto.lastname.as_deref() {
        check_len("lastname", v, PERSON_NAME_LEN)?;
    }
    if let Some(v) = dto.email.as_deref() {
        check_email(v)?;
    }
    if let Some(v) = dto.school_name.as_deref() {
        check_len("school_name", v, SCHOOL_NAME_LEN)?;
    }
    Ok(())
}

pub fn validate_new_school(dto: &SchoolDto) -> Result<(), ServiceError> {
    check_len("name", required("name", dto.name.as_deref())?, SCHOOL_NAME_LEN)?;
    check_max("address", required("address", dto.address.as_deref())?, ADDRESS_MAX_LEN)?;
    if let Some(phone) = dto.phone_number.as_deref() {
        check_max("phone_number", phone, PHONE_MAX_LEN)?;
    }
    Ok(())
}
