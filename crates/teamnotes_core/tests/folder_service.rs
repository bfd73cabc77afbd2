use teamnotes_core::db::open_db_in_memory;
use teamnotes_core::{
    AccessLevel, EffectiveAccess, ErrorKind, FolderService, ForbiddenReason, NoteService,
    ServiceError, ShareService,
};
use uuid::Uuid;

#[test]
fn create_folder_trims_name_and_sets_caller_as_owner() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();

    let folder = folders.create_folder("  Roadmap  ", "alice").unwrap();
    assert_eq!(folder.name, "Roadmap");
    assert_eq!(folder.owner_id, "alice");

    let detail = folders.get_folder(folder.id, "alice").unwrap();
    assert_eq!(detail.folder, folder);
    assert_eq!(detail.access, EffectiveAccess::Owner);
    assert!(detail.notes.is_empty());
}

#[test]
fn blank_folder_name_is_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();

    let err = folders.create_folder("   ", "alice").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn get_folder_hides_existence_from_strangers() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Private", "alice").unwrap();

    let hidden = folders.get_folder(folder.id, "mallory").unwrap_err();
    let missing = folders.get_folder(Uuid::new_v4(), "mallory").unwrap_err();

    assert_eq!(hidden.kind(), ErrorKind::NotFoundOrDenied);
    assert_eq!(missing.kind(), ErrorKind::NotFoundOrDenied);
    assert_eq!(hidden.to_string(), missing.to_string());
}

#[test]
fn grantee_sees_folder_with_notes_and_effective_access() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let notes = NoteService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();

    let folder = folders.create_folder("Specs", "alice").unwrap();
    let first = notes.create_note(folder.id, "One", "", "alice").unwrap();
    let second = notes.create_note(folder.id, "Two", "", "alice").unwrap();
    shares
        .share_folder(folder.id, "bob", AccessLevel::Read, "alice")
        .unwrap();

    let detail = folders.get_folder(folder.id, "bob").unwrap();
    assert_eq!(detail.access, EffectiveAccess::Read);
    let ids: Vec<_> = detail.notes.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn only_owner_renames_even_with_write_grant() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Draft", "alice").unwrap();
    shares
        .share_folder(folder.id, "bob", AccessLevel::Write, "alice")
        .unwrap();

    let err = folders.update_folder(folder.id, "Hijacked", "bob").unwrap_err();
    assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotOwner));

    let renamed = folders.update_folder(folder.id, "Final", "alice").unwrap();
    assert_eq!(renamed.name, "Final");
    assert!(renamed.updated_at >= folder.updated_at);
}

#[test]
fn update_and_delete_missing_folder_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        folders.update_folder(missing, "x", "alice"),
        Err(ServiceError::NotFound { entity: "folder", .. })
    ));
    assert!(matches!(
        folders.delete_folder(missing, "alice"),
        Err(ServiceError::NotFound { entity: "folder", .. })
    ));
}

#[test]
fn delete_folder_is_owner_only() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let shares = ShareService::from_connection(&conn).unwrap();
    let folder = folders.create_folder("Keep", "alice").unwrap();
    shares
        .share_folder(folder.id, "bob", AccessLevel::Write, "alice")
        .unwrap();

    let err = folders.delete_folder(folder.id, "bob").unwrap_err();
    assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotOwner));
    assert!(folders.get_folder(folder.id, "alice").is_ok());
}

#[test]
fn list_owned_folders_returns_creation_order_for_caller_only() {
    let conn = open_db_in_memory().unwrap();
    let folders = FolderService::from_connection(&conn).unwrap();
    let a = folders.create_folder("A", "alice").unwrap();
    folders.create_folder("B", "bob").unwrap();
    let c = folders.create_folder("C", "alice").unwrap();

    let owned = folders.list_owned_folders("alice").unwrap();
    let ids: Vec<_> = owned.iter().map(|folder| folder.id).collect();
    assert_eq!(ids, vec![a.id, c.id]);
}
