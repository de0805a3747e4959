use chrono::{DateTime, Utc};
use expediente_core_api::{Actor, Role};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityKind {
    Case,
    Evidence,
}

impl std::fmt::Display for AuditEntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditEntityKind::Case => write!(f, "case"),
            AuditEntityKind::Evidence => write!(f, "evidence"),
        }
    }
}

impl FromStr for AuditEntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "case" => Ok(AuditEntityKind::Case),
            "evidence" => Ok(AuditEntityKind::Evidence),
            _ => Err(format!("Invalid AuditEntityKind: {s}")),
        }
    }
}

/// Kind of mutating action an audit entry documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Transition,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Create => write!(f, "create"),
            AuditAction::Update => write!(f, "update"),
            AuditAction::Delete => write!(f, "delete"),
            AuditAction::Transition => write!(f, "transition"),
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "transition" => Ok(AuditAction::Transition),
            _ => Err(format!("Invalid AuditAction: {s}")),
        }
    }
}

/// # Documentation
/// - Append-only record of one mutating action against a case or an
///   evidence item.
/// - Written in the same transaction as the mutation it documents: an audit
///   entry never exists without its mutation, nor the mutation without its
///   entry.
/// - `before` is null for creates, `after` is null for deletes; both are
///   present on updates and transitions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntryModel {
    pub id: Uuid,
    pub entity_kind: AuditEntityKind,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub actor_id: Uuid,
    pub actor_role: Role,
    pub recorded_at: DateTime<Utc>,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

impl AuditEntryModel {
    pub fn new(
        entity_kind: AuditEntityKind,
        entity_id: Uuid,
        action: AuditAction,
        actor: &Actor,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_kind,
            entity_id,
            action,
            actor_id: actor.actor_id,
            actor_role: actor.role,
            recorded_at: Utc::now(),
            before,
            after,
        }
    }
}
