use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of actor roles known to the workflow.
///
/// Roles come from the identity provider as part of the acting identity;
/// anything outside this set is rejected at the boundary rather than
/// silently falling through a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Technician,
    Coordinator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Technician, Role::Coordinator, Role::Admin];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Technician => write!(f, "TECHNICIAN"),
            Role::Coordinator => write!(f, "COORDINATOR"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TECHNICIAN" => Ok(Role::Technician),
            "COORDINATOR" => Ok(Role::Coordinator),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid Role: {s}")),
        }
    }
}
