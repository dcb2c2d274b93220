//! Host status enum and the sweep reconciliation rule.
//!
//! Variant discriminants match the seed order (1-based) of the
//! `host_statuses` lookup table.

use serde::{Deserialize, Serialize};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Lifecycle status of a host.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Active = 1,
    Inactive = 2,
    Maintenance = 3,
}

impl HostStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Active),
            2 => Some(Self::Inactive),
            3 => Some(Self::Maintenance),
            _ => None,
        }
    }

    /// Lowercase name as stored in the lookup table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
        }
    }
}

impl From<HostStatus> for StatusId {
    fn from(value: HostStatus) -> Self {
        value as StatusId
    }
}

/// Decide the status transition implied by a probe outcome.
///
/// Returns `Some(new_status)` only when the sweep should write:
/// - active + unreachable → inactive
/// - inactive + reachable → active
///
/// Maintenance is an operator-asserted state and is never overwritten by
/// probe results. Everything else is a no-op.
pub fn reconcile(current: HostStatus, reachable: bool) -> Option<HostStatus> {
    match (current, reachable) {
        (HostStatus::Maintenance, _) => None,
        (HostStatus::Active, false) => Some(HostStatus::Inactive),
        (HostStatus::Inactive, true) => Some(HostStatus::Active),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in [
            HostStatus::Active,
            HostStatus::Inactive,
            HostStatus::Maintenance,
        ] {
            assert_eq!(HostStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(HostStatus::from_id(0), None);
        assert_eq!(HostStatus::from_id(4), None);
    }

    #[test]
    fn unreachable_active_host_goes_inactive() {
        assert_eq!(
            reconcile(HostStatus::Active, false),
            Some(HostStatus::Inactive)
        );
    }

    #[test]
    fn reachable_inactive_host_goes_active() {
        assert_eq!(
            reconcile(HostStatus::Inactive, true),
            Some(HostStatus::Active)
        );
    }

    #[test]
    fn maintenance_is_never_touched() {
        assert_eq!(reconcile(HostStatus::Maintenance, true), None);
        assert_eq!(reconcile(HostStatus::Maintenance, false), None);
    }

    #[test]
    fn agreeing_states_are_noops() {
        assert_eq!(reconcile(HostStatus::Active, true), None);
        assert_eq!(reconcile(HostStatus::Inactive, false), None);
    }
}
