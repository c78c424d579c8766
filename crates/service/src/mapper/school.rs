use crate::domain::School;
use crate::dto::SchoolDto;
use crate::errors::ServiceError;
use crate::validation::required;

pub fn to_school(dto: Option<&SchoolDto>) -> Result<School, ServiceError> {
    let dto = dto.ok_or_else(|| ServiceError::validation("school dto must not be null"))?;
    let name = required("name", dto.name.as_deref())?;
    let address = required("address", dto.address.as_deref())?;

    Ok(School {
        id: dto.id,
        name: name.trim().to_string(),
        address: address.trim().to_string(),
        phone_number: dto
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        students: None,
    })
}

pub fn to_dto(school: Option<&School>) -> Result<SchoolDto, ServiceError> {
    let school = school.ok_or_else(|| ServiceError::validation("school must not be null"))?;
    Ok(dto_from(school))
}

pub fn to_dto_list(schools: Option<&[School]>) -> Vec<SchoolDto> {
    schools.map_or_else(Vec::new, |list| list.iter().map(dto_from).collect())
}

fn dto_from(school: &School) -> SchoolDto {
    SchoolDto {
        id: school.id,
        name: Some(school.name.clone()),
        address: Some(school.address.clone()),
        phone_number: school.phone_number.clone(),
        student_count: Some(school.student_count() as u64),
    }
}
