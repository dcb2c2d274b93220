//! Host entity and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hostfleet_core::status::{HostStatus, StatusId};
use hostfleet_core::types::{DbId, Timestamp};

/// A host row from the `hosts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Host {
    pub id: DbId,
    pub name: String,
    /// Unique across the fleet.
    pub ip_address: String,
    pub datacenter_id: DbId,
    pub status_id: StatusId,
    /// Opaque token from the credential cipher. Never serialized out.
    #[serde(skip_serializing)]
    pub encrypted_credential: String,
    pub credential_rotated_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Host {
    /// Decode the status lookup ID into the enum.
    ///
    /// `None` only if the database holds an ID outside the seeded lookup
    /// table, which the schema's foreign key prevents.
    pub fn status(&self) -> Option<HostStatus> {
        HostStatus::from_id(self.status_id)
    }
}

/// DTO for provisioning a host. The credential token is produced by the
/// credential store before the row is inserted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHost {
    pub name: String,
    pub ip_address: String,
    pub datacenter_id: DbId,
    pub status: Option<HostStatus>,
    pub encrypted_credential: String,
}
