//! Shared type aliases used across the workspace.

use chrono::{DateTime, Utc};

/// Database primary key type (BIGSERIAL).
pub type DbId = i64;

/// UTC timestamp type matching TIMESTAMPTZ columns.
pub type Timestamp = DateTime<Utc>;
