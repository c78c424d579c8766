//! Wire-format records exchanged over HTTP.
//!
//! Every field is optional on the wire: required-ness is checked by
//! `validation` and the mappers, and on updates `None` means "leave unchanged".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: Option<i64>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    /// Kept as `school_name` on the wire for client compatibility.
    #[serde(rename = "school_name")]
    pub school_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub student_count: Option<u64>,
}
