//! Entity structs and DTOs matching the database schema.

pub mod host;
pub mod location;
pub mod statistics;
