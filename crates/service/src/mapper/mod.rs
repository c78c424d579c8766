//! Conversions between wire DTOs and domain entities.
//!
//! Inputs are `Option`s: an absent record is a validation failure, never a panic.

pub mod school;
pub mod student;
