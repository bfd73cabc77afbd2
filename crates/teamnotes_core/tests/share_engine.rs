use rusqlite::Connection;
use teamnotes_core::db::open_db_in_memory;
use teamnotes_core::{
    AccessLevel, Caller, ErrorKind, FolderService, ForbiddenReason, NoteService, ServiceError,
    ShareService, TeamService,
};
use uuid::Uuid;

fn count(conn: &Connection, sql: &str, id: Uuid) -> i64 {
    conn.query_row(sql, [id.to_string()], |row| row.get(0))
        .unwrap()
}

#[test]
fn folder_share_stamps_current_notes() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Shared", "alice").unwrap();
    let n1 = notes.create_note(folder.id, "N1", "", "alice").unwrap();
    let n2 = notes.create_note(folder.id, "N2", "", "alice").unwrap();

    let outcome = shares
        .share_folder(folder.id, "xavier", AccessLevel::Write, "alice")
        .unwrap();
    assert_eq!(outcome.notes_stamped, 2);

    assert!(notes.get_note(n1.id, "xavier").is_ok());
    assert!(notes.get_note(n2.id, "xavier").is_ok());
    let updated = notes.update_note(n1.id, "N1", "edited", "xavier").unwrap();
    assert_eq!(updated.body, "edited");
}

#[test]
fn notes_added_after_share_are_not_covered() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Shared", "alice").unwrap();
    notes.create_note(folder.id, "N1", "", "alice").unwrap();
    shares
        .share_folder(folder.id, "xavier", AccessLevel::Write, "alice")
        .unwrap();

    let n3 = notes.create_note(folder.id, "N3", "", "alice").unwrap();
    assert_eq!(
        notes.get_note(n3.id, "xavier").unwrap_err().kind(),
        ErrorKind::NotFoundOrDenied
    );
    // The folder grant itself still lists the late note.
    assert_eq!(notes.list_folder_notes(folder.id, "xavier").unwrap().len(), 2);
}

#[test]
fn revoking_folder_share_keeps_stamped_note_grants() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Shared", "alice").unwrap();
    let n1 = notes.create_note(folder.id, "N1", "", "alice").unwrap();
    shares
        .share_folder(folder.id, "xavier", AccessLevel::Read, "alice")
        .unwrap();

    assert!(shares
        .revoke_folder_share(folder.id, "xavier", "alice")
        .unwrap());

    assert_eq!(
        folders.get_folder(folder.id, "xavier").unwrap_err().kind(),
        ErrorKind::NotFoundOrDenied
    );
    assert!(notes.get_note(n1.id, "xavier").is_ok());
}

#[test]
fn resharing_folder_updates_single_row() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Shared", "alice").unwrap();
    let n1 = notes.create_note(folder.id, "N1", "", "alice").unwrap();

    shares
        .share_folder(folder.id, "xavier", AccessLevel::Read, "alice")
        .unwrap();
    shares
        .share_folder(folder.id, "xavier", AccessLevel::Write, "alice")
        .unwrap();

    let grants = shares.list_folder_shares(folder.id, "alice").unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].access, AccessLevel::Write);
    assert_eq!(
        count(
            &conn,
            "SELECT COUNT(*) FROM note_shares WHERE note_id = ?1;",
            n1.id
        ),
        1
    );
    let note_grants = shares.list_note_shares(n1.id, "alice").unwrap();
    assert_eq!(note_grants[0].access, AccessLevel::Write);
}

#[test]
fn self_share_is_invalid_target() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();
    let note = notes.create_note(folder.id, "N", "", "alice").unwrap();

    let folder_err = shares
        .share_folder(folder.id, "alice", AccessLevel::Read, "alice")
        .unwrap_err();
    assert!(matches!(
        folder_err,
        ServiceError::InvalidTarget("cannot share with yourself")
    ));
    assert_eq!(folder_err.kind().http_status(), 403);

    let note_err = shares
        .share_note(note.id, "alice", AccessLevel::Read, "alice")
        .unwrap_err();
    assert_eq!(note_err.kind(), ErrorKind::InvalidTarget);
}

#[test]
fn share_requires_existing_folder_and_ownership() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();

    let missing = shares
        .share_folder(Uuid::new_v4(), "bob", AccessLevel::Read, "alice")
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let stranger = shares
        .share_folder(folder.id, "carol", AccessLevel::Read, "bob")
        .unwrap_err();
    assert_eq!(stranger.forbidden_reason(), Some(ForbiddenReason::NotOwner));

    let listing = shares.list_folder_shares(folder.id, "bob").unwrap_err();
    assert_eq!(listing.forbidden_reason(), Some(ForbiddenReason::NotOwner));
}

#[test]
fn revoking_absent_grant_is_noop_but_owner_gated() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();
    let note = notes.create_note(folder.id, "N", "", "alice").unwrap();

    assert!(!shares.revoke_folder_share(folder.id, "bob", "alice").unwrap());
    assert!(!shares.revoke_note_share(note.id, "bob", "alice").unwrap());

    let err = shares.revoke_note_share(note.id, "bob", "bob").unwrap_err();
    assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotOwner));
}

#[test]
fn revoke_matches_grantee_id_the_way_share_stored_it() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();
    let note = notes.create_note(folder.id, "N", "", "alice").unwrap();

    shares
        .share_folder(folder.id, " bob ", AccessLevel::Read, "alice")
        .unwrap();
    shares
        .share_note(note.id, " bob ", AccessLevel::Write, "alice")
        .unwrap();

    assert!(shares
        .revoke_folder_share(folder.id, " bob ", "alice")
        .unwrap());
    assert!(shares.revoke_note_share(note.id, " bob ", "alice").unwrap());

    assert_eq!(
        folders.get_folder(folder.id, "bob").unwrap_err().kind(),
        ErrorKind::NotFoundOrDenied
    );
    assert_eq!(
        notes.get_note(note.id, "bob").unwrap_err().kind(),
        ErrorKind::NotFoundOrDenied
    );
}

#[test]
fn revoke_with_blank_target_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();

    let err = shares.revoke_folder_share(folder.id, "  ", "alice").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTarget);
}

#[test]
fn padded_caller_cannot_share_with_itself() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();

    let err = shares
        .share_folder(folder.id, "alice", AccessLevel::Read, "alice ")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTarget);
}

#[test]
fn resharing_note_updates_single_row() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();
    let note = notes.create_note(folder.id, "N", "v1", "alice").unwrap();

    shares
        .share_note(note.id, "bob", AccessLevel::Read, "alice")
        .unwrap();
    shares
        .share_note(note.id, "bob", AccessLevel::Write, "alice")
        .unwrap();

    let grants = shares.list_note_shares(note.id, "alice").unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].user_id, "bob");
    assert_eq!(grants[0].access, AccessLevel::Write);
    assert_eq!(notes.update_note(note.id, "N", "v2", "bob").unwrap().body, "v2");
}

#[test]
fn revoke_note_share_removes_visibility() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Mine", "alice").unwrap();
    let note = notes.create_note(folder.id, "N", "", "alice").unwrap();
    shares
        .share_note(note.id, "bob", AccessLevel::Read, "alice")
        .unwrap();

    assert!(shares.revoke_note_share(note.id, "bob", "alice").unwrap());
    assert!(notes.get_note(note.id, "bob").is_err());
}

#[test]
fn user_assets_split_owned_and_shared() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let own = folders.create_folder("Own", "bob").unwrap();
    notes.create_note(own.id, "Own note", "", "bob").unwrap();
    let theirs = folders.create_folder("Theirs", "alice").unwrap();
    let granted = notes.create_note(theirs.id, "Granted", "", "alice").unwrap();
    shares
        .share_folder(theirs.id, "bob", AccessLevel::Read, "alice")
        .unwrap();

    let bundle = shares.get_user_assets("bob").unwrap();
    assert_eq!(bundle.owned_folders.len(), 1);
    assert_eq!(bundle.owned_folders[0].id, own.id);
    assert_eq!(bundle.owned_notes.len(), 1);
    assert_eq!(bundle.shared_folders.len(), 1);
    assert_eq!(bundle.shared_folders[0].folder.id, theirs.id);
    assert_eq!(bundle.shared_folders[0].access, AccessLevel::Read);
    assert_eq!(bundle.shared_notes.len(), 1);
    assert_eq!(bundle.shared_notes[0].note.id, granted.id);
    assert_eq!(bundle.shared_notes[0].grantee_id, "bob");
}

#[test]
fn team_assets_cover_whole_roster() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let teams = TeamService::from_connection(&conn).unwrap();
    let admin = Caller::new("root", "admin").unwrap();
    let team = teams
        .create_team(
            "Platform",
            &["lead".to_string()],
            &["dev".to_string()],
            &admin,
        )
        .unwrap();
    folders.create_folder("Lead folder", "lead").unwrap();
    folders.create_folder("Dev folder", "dev").unwrap();
    folders.create_folder("Outsider folder", "outsider").unwrap();

    let bundle = shares.get_team_assets(team.team.id).unwrap();
    let owners: Vec<_> = bundle
        .owned_folders
        .iter()
        .map(|folder| folder.owner_id.as_str())
        .collect();
    assert_eq!(owners, vec!["lead", "dev"]);
}

#[test]
fn team_without_roster_yields_empty_bundle() {
    let conn = open_db_in_memory().unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let teams = TeamService::from_connection(&conn).unwrap();
    let admin = Caller::new("root", "admin").unwrap();
    let team = teams.create_team("Empty", &[], &[], &admin).unwrap();

    assert!(shares.get_team_assets(team.team.id).unwrap().is_empty());
    assert!(shares.get_team_assets(Uuid::new_v4()).unwrap().is_empty());
}

#[test]
fn asset_bundle_serializes_four_named_collections() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Theirs", "alice").unwrap();
    shares
        .share_folder(folder.id, "bob", AccessLevel::Write, "alice")
        .unwrap();

    let value = serde_json::to_value(shares.get_user_assets("bob").unwrap()).unwrap();
    for key in ["ownedFolders", "sharedFolders", "ownedNotes", "sharedNotes"] {
        assert!(value[key].is_array(), "missing {key}");
    }
    let shared = &value["sharedFolders"][0];
    assert_eq!(shared["id"], folder.id.to_string());
    assert_eq!(shared["ownerId"], "alice");
    assert_eq!(shared["granteeId"], "bob");
    assert_eq!(shared["access"], "write");
}
