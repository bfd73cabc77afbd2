//! Team authorization and roster management.
//!
//! # Responsibility
//! - Answer leader/member roster lookups.
//! - Gate team management on the caller's global role and leadership.
//! - Create teams and mutate rosters for authorized callers.
//!
//! # Invariants
//! - `member` callers never manage teams.
//! - `manager` callers manage only teams where they hold a leader row.
//! - Elevated callers bypass the per-team leader check.
//! - Removing a member row never removes a manager row, and vice versa.

use crate::model::caller::{Caller, CallerRole, UserId};
use crate::model::team::{TeamDetail, TeamId};
use crate::repo::team_repo::{SqliteTeamRepository, TeamRepository};
use crate::service::error::{require_non_blank, ForbiddenReason, ServiceError, ServiceResult};
use crate::service::finish;
use rusqlite::Connection;

const MODULE: &str = "team_service";

/// Team service facade over a roster repository.
pub struct TeamService<T> {
    teams: T,
}

impl<'conn> TeamService<SqliteTeamRepository<'conn>> {
    pub fn from_connection(conn: &'conn Connection) -> ServiceResult<Self> {
        Ok(Self::new(SqliteTeamRepository::try_new(conn)?))
    }
}

impl<T: TeamRepository> TeamService<T> {
    pub fn new(teams: T) -> Self {
        Self { teams }
    }

    /// Whether the user holds a leader row on the team.
    pub fn is_leader(&self, user_id: &str, team_id: TeamId) -> ServiceResult<bool> {
        Ok(self.teams.is_leader(user_id, team_id)?)
    }

    /// Whether the user holds any roster row on the team.
    pub fn is_member(&self, user_id: &str, team_id: TeamId) -> ServiceResult<bool> {
        Ok(self.teams.is_member(user_id, team_id)?)
    }

    /// Checks the caller may manage `team_id`.
    ///
    /// # Errors
    /// - `Forbidden(MemberRoleNotAllowed)` for `member` callers.
    /// - `Forbidden(NotTeamLeader)` for `manager` callers without a leader row.
    pub fn authorize_team_management(&self, caller: &Caller, team_id: TeamId) -> ServiceResult<()> {
        match &caller.role {
            CallerRole::Member => Err(ServiceError::Forbidden(
                ForbiddenReason::MemberRoleNotAllowed,
            )),
            CallerRole::Manager => {
                if self.teams.is_leader(caller.id(), team_id)? {
                    Ok(())
                } else {
                    Err(ServiceError::Forbidden(ForbiddenReason::NotTeamLeader))
                }
            }
            CallerRole::Elevated(_) => Ok(()),
        }
    }

    /// Creates a team with its initial managers and members in one
    /// transaction. The creator is not added implicitly.
    pub fn create_team(
        &self,
        name: &str,
        manager_ids: &[UserId],
        member_ids: &[UserId],
        caller: &Caller,
    ) -> ServiceResult<TeamDetail> {
        let result = self.create_team_inner(name, manager_ids, member_ids, caller);
        let fields = match &result {
            Ok(detail) => format!(
                "team_id={} role={} managers={} members={}",
                detail.team.id,
                caller.role.label(),
                detail.managers.len(),
                detail.members.len()
            ),
            Err(_) => format!("role={}", caller.role.label()),
        };
        finish("team_create", MODULE, &fields, result)
    }

    /// Loads a team with its roster split by leadership.
    pub fn get_team(&self, team_id: TeamId) -> ServiceResult<TeamDetail> {
        let team = self.teams.get_team(team_id)?.ok_or(ServiceError::NotFound {
            entity: "team",
            id: team_id,
        })?;
        let roster = self.teams.list_roster(team_id)?;
        Ok(TeamDetail::from_roster(team, roster))
    }

    /// Adds a member row. Returns `false` when it already existed.
    pub fn add_member(&self, team_id: TeamId, user_id: &str, caller: &Caller) -> ServiceResult<bool> {
        self.mutate_roster("team_member_add", team_id, user_id, false, caller, |teams, user| {
            teams.add_roster_entry(team_id, user, false)
        })
    }

    /// Adds a manager row. Returns `false` when it already existed.
    pub fn add_manager(&self, team_id: TeamId, user_id: &str, caller: &Caller) -> ServiceResult<bool> {
        self.mutate_roster("team_manager_add", team_id, user_id, true, caller, |teams, user| {
            teams.add_roster_entry(team_id, user, true)
        })
    }

    /// Removes the member row only. Returns whether it existed.
    pub fn delete_member(&self, team_id: TeamId, user_id: &str, caller: &Caller) -> ServiceResult<bool> {
        self.mutate_roster("team_member_delete", team_id, user_id, false, caller, |teams, user| {
            teams.remove_roster_entry(team_id, user, false)
        })
    }

    /// Removes the manager row only. Returns whether it existed.
    pub fn delete_manager(&self, team_id: TeamId, user_id: &str, caller: &Caller) -> ServiceResult<bool> {
        self.mutate_roster("team_manager_delete", team_id, user_id, true, caller, |teams, user| {
            teams.remove_roster_entry(team_id, user, true)
        })
    }

    fn create_team_inner(
        &self,
        name: &str,
        manager_ids: &[UserId],
        member_ids: &[UserId],
        caller: &Caller,
    ) -> ServiceResult<TeamDetail> {
        if caller.role == CallerRole::Member {
            return Err(ServiceError::Forbidden(
                ForbiddenReason::MemberRoleNotAllowed,
            ));
        }
        let name = require_non_blank(name, "team name")?;
        let mut roster = Vec::with_capacity(manager_ids.len() + member_ids.len());
        for user_id in manager_ids {
            roster.push((require_non_blank(user_id, "manager id")?, true));
        }
        for user_id in member_ids {
            roster.push((require_non_blank(user_id, "member id")?, false));
        }

        let team = self.teams.create_team(name.as_str(), &roster)?;
        let entries = self.teams.list_roster(team.id)?;
        Ok(TeamDetail::from_roster(team, entries))
    }

    fn mutate_roster<Op>(
        &self,
        event: &str,
        team_id: TeamId,
        user_id: &str,
        is_leader: bool,
        caller: &Caller,
        op: Op,
    ) -> ServiceResult<bool>
    where
        Op: FnOnce(&T, &str) -> crate::repo::error::RepoResult<bool>,
    {
        let result = require_non_blank(user_id, "user id").and_then(|user| {
            self.authorize_team_management(caller, team_id)?;
            if self.teams.get_team(team_id)?.is_none() {
                return Err(ServiceError::NotFound {
                    entity: "team",
                    id: team_id,
                });
            }
            Ok(op(&self.teams, user.as_str())?)
        });
        let fields = match &result {
            Ok(changed) => format!(
                "team_id={} is_leader={} role={} changed={}",
                team_id,
                is_leader,
                caller.role.label(),
                changed
            ),
            Err(_) => format!(
                "team_id={} is_leader={} role={}",
                team_id,
                is_leader,
                caller.role.label()
            ),
        };
        finish(event, MODULE, &fields, result)
    }
}
