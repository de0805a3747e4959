use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::Role;

/// The authenticated identity performing an action.
///
/// Supplied by the identity provider at the boundary; the engine never
/// verifies credentials itself and trusts the identity it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub actor_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(actor_id: Uuid, role: Role) -> Self {
        Self { actor_id, role }
    }
}

/// Reference into the external prosecutorial-office catalog (fiscalía).
/// The catalog owns these keys; the workflow only checks existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeId(pub i32);

impl std::fmt::Display for OfficeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
