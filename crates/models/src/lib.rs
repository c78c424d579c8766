//! SeaORM entities for the school registry and connection helpers.

pub mod db;
pub mod school;
pub mod student;

#[cfg(test)]
mod tests;
