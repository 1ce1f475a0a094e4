//! Postgres repository tests. They start a container, so they only run with
//! `cargo test -- --ignored` on a machine with Docker.

use domain_notes::*;
use test_utils::{TestDataBuilder, TestDatabase};

fn groceries(title: String) -> CreateNote {
    CreateNote {
        title,
        description: "Milk, eggs".to_string(),
        tags: "home".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_view_joins_creator_and_hides_deleted() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_view_joins_creator_and_hides_deleted");
    let owner = db
        .create_test_user(builder.user_id(), "Ada", "Lovelace")
        .await;
    let repo = PgNoteRepository::new(db.connection());

    let note = repo
        .insert(Note::new(groceries(builder.title("groceries")), owner))
        .await
        .unwrap();

    let view = repo.get_view(note.id).await.unwrap().unwrap();
    assert_eq!(view.created_by, "Ada Lovelace");
    assert_eq!(view.created_by_id, owner);

    let listed = repo.list(NoteFilter::owned_by(owner)).await.unwrap();
    assert_eq!(listed.len(), 1);

    repo.delete(note.clone()).await.unwrap();

    assert!(repo.get_by_id(note.id).await.unwrap().is_none());
    assert!(repo.get_view(note.id).await.unwrap().is_none());
    assert!(repo.list(NoteFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_keeps_created_fields() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_update_keeps_created_fields");
    let owner = db
        .create_test_user(builder.user_id(), "Ada", "Lovelace")
        .await;
    let repo = PgNoteRepository::new(db.connection());

    let note = repo
        .insert(Note::new(groceries(builder.title("groceries")), owner))
        .await
        .unwrap();

    let mut changed = note.clone();
    changed.title = "Weekly groceries".to_string();
    changed.audit.created_by = None;
    let updated = repo.update(changed).await.unwrap();

    assert_eq!(updated.title, "Weekly groceries");
    assert_eq!(updated.owner(), Some(owner));
}
