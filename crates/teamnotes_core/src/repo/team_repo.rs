//! Team and roster repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist teams and their roster rows.
//! - Answer leader/member lookups used by team authorization.
//!
//! # Invariants
//! - Roster rows are keyed by `(team_id, user_id, is_leader)`; re-adding an
//!   identical row is a no-op.
//! - Roster deletes are scoped to one `is_leader` value.
//! - Team creation inserts the team and its whole roster atomically.

use crate::model::caller::UserId;
use crate::model::team::{RosterEntry, Team, TeamId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{bool_to_int, ensure_connection_ready, parse_flag, parse_uuid};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Repository interface for teams and rosters.
pub trait TeamRepository {
    /// Inserts one team and its initial roster in one transaction.
    fn create_team(&self, name: &str, roster: &[(UserId, bool)]) -> RepoResult<Team>;
    /// Loads one team by id.
    fn get_team(&self, team_id: TeamId) -> RepoResult<Option<Team>>;
    /// Lists roster rows of one team in insertion order.
    fn list_roster(&self, team_id: TeamId) -> RepoResult<Vec<RosterEntry>>;
    /// Lists distinct user ids on one team's roster.
    fn list_roster_user_ids(&self, team_id: TeamId) -> RepoResult<Vec<UserId>>;
    /// Adds one roster row. Returns `false` when the identical row existed.
    fn add_roster_entry(
        &self,
        team_id: TeamId,
        user_id: &str,
        is_leader: bool,
    ) -> RepoResult<bool>;
    /// Removes one roster row matching the leadership flag.
    fn remove_roster_entry(
        &self,
        team_id: TeamId,
        user_id: &str,
        is_leader: bool,
    ) -> RepoResult<bool>;
    /// Whether a leader row exists for the user on the team.
    fn is_leader(&self, user_id: &str, team_id: TeamId) -> RepoResult<bool>;
    /// Whether any roster row exists for the user on the team.
    fn is_member(&self, user_id: &str, team_id: TeamId) -> RepoResult<bool>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("teams", &["id", "name", "created_at", "updated_at"]),
                ("rosters", &["team_id", "user_id", "is_leader"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn create_team(&self, name: &str, roster: &[(UserId, bool)]) -> RepoResult<Team> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let team_id = Uuid::new_v4();
        let team_text = team_id.to_string();

        tx.execute(
            "INSERT INTO teams (id, name) VALUES (?1, ?2);",
            params![team_text.as_str(), name],
        )?;
        for (user_id, is_leader) in roster {
            insert_roster_row(&tx, team_id, user_id, *is_leader)?;
        }

        let team = load_team(&tx, team_id)?.ok_or(RepoError::NotFound {
            entity: "team",
            id: team_id,
        })?;
        tx.commit()?;
        Ok(team)
    }

    fn get_team(&self, team_id: TeamId) -> RepoResult<Option<Team>> {
        load_team(self.conn, team_id)
    }

    fn list_roster(&self, team_id: TeamId) -> RepoResult<Vec<RosterEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, is_leader
             FROM rosters
             WHERE team_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([team_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let flag: i64 = row.get("is_leader")?;
            entries.push(RosterEntry {
                team_id,
                user_id: row.get("user_id")?,
                is_leader: parse_flag(flag, "rosters.is_leader")?,
            });
        }
        Ok(entries)
    }

    fn list_roster_user_ids(&self, team_id: TeamId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id
             FROM rosters
             WHERE team_id = ?1
             GROUP BY user_id
             ORDER BY MIN(rowid) ASC;",
        )?;
        let mut rows = stmt.query([team_id.to_string()])?;
        let mut user_ids = Vec::new();
        while let Some(row) = rows.next()? {
            user_ids.push(row.get(0)?);
        }
        Ok(user_ids)
    }

    fn add_roster_entry(
        &self,
        team_id: TeamId,
        user_id: &str,
        is_leader: bool,
    ) -> RepoResult<bool> {
        insert_roster_row(self.conn, team_id, user_id, is_leader)
    }

    fn remove_roster_entry(
        &self,
        team_id: TeamId,
        user_id: &str,
        is_leader: bool,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM rosters
             WHERE team_id = ?1
               AND user_id = ?2
               AND is_leader = ?3;",
            params![team_id.to_string(), user_id, bool_to_int(is_leader)],
        )?;
        Ok(changed > 0)
    }

    fn is_leader(&self, user_id: &str, team_id: TeamId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM rosters
                WHERE team_id = ?1
                  AND user_id = ?2
                  AND is_leader = 1
            );",
            params![team_id.to_string(), user_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn is_member(&self, user_id: &str, team_id: TeamId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM rosters
                WHERE team_id = ?1
                  AND user_id = ?2
            );",
            params![team_id.to_string(), user_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn insert_roster_row(
    conn: &Connection,
    team_id: TeamId,
    user_id: &str,
    is_leader: bool,
) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO rosters (team_id, user_id, is_leader)
         VALUES (?1, ?2, ?3);",
        params![team_id.to_string(), user_id, bool_to_int(is_leader)],
    )?;
    Ok(changed > 0)
}

fn load_team(conn: &Connection, team_id: TeamId) -> RepoResult<Option<Team>> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at, updated_at
             FROM teams
             WHERE id = ?1;",
            [team_id.to_string()],
            |row| Ok(parse_team_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let id_text: String = row.get("id")?;
    Ok(Team {
        id: parse_uuid(&id_text, "teams.id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
