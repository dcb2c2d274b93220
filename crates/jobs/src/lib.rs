//! Background engines for the fleet core.
//!
//! Three periodic jobs, each a plain method on its engine:
//! - [`rotation::RotationEngine::rotate_all`] -- re-issue every host's
//!   credential (every 8 hours).
//! - [`sweep::SweepEngine::sweep`] -- probe the whole fleet with bounded
//!   concurrency and reconcile host status (hourly).
//! - [`statistics::StatisticsAggregator::aggregate`] -- upsert daily
//!   per-(city, data-center) health snapshots (00:00 UTC).
//!
//! [`scheduler`] drives the three on their cadences; each returns a
//! summary instead of failing on partial errors.

pub mod credentials;
pub mod error;
pub mod probe;
pub mod rotation;
pub mod scheduler;
pub mod statistics;
pub mod sweep;
