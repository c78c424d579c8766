//! Cross-cutting helpers shared by the server crates: tracing setup,
//! health payload and the Prometheus registry.

pub mod types;
pub mod utils;
pub mod metrics;
