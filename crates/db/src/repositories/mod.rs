//! Repository layer. One unit struct per table family.

pub mod host_repo;
pub mod location_repo;
pub mod statistics_repo;

pub use host_repo::HostRepo;
pub use location_repo::LocationRepo;
pub use statistics_repo::StatisticsRepo;
