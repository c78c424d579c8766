//! Service layer for the school registry.
//! - Separates business rules from data access (`repository` traits, `repo` SeaORM impls).
//! - Maps between wire DTOs and domain entities in `mapper`.
//! - Reports failures through a single `ServiceError`.

pub mod errors;
pub mod domain;
pub mod dto;
pub mod validation;
pub mod mapper;
pub mod repository;
pub mod repo;
pub mod school_service;
pub mod student_service;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
