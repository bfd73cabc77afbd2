//! Team and roster domain model.
//!
//! # Invariants
//! - A roster row is keyed by `(team_id, user_id, is_leader)`.
//! - One user may hold a leader row and a member row for the same team.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::caller::UserId;

/// Stable team identifier.
pub type TeamId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One roster membership row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub team_id: TeamId,
    pub user_id: UserId,
    /// `true` marks a manager (leader) row.
    pub is_leader: bool,
}

/// Team with its roster split by leadership flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub managers: Vec<UserId>,
    pub members: Vec<UserId>,
}

impl TeamDetail {
    /// Splits roster rows into manager and member id lists, keeping order.
    pub fn from_roster(team: Team, roster: Vec<RosterEntry>) -> Self {
        let (leaders, plain): (Vec<_>, Vec<_>) =
            roster.into_iter().partition(|entry| entry.is_leader);
        Self {
            team,
            managers: leaders.into_iter().map(|entry| entry.user_id).collect(),
            members: plain.into_iter().map(|entry| entry.user_id).collect(),
        }
    }
}
