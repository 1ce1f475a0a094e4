//! Postgres identity store tests. They start a container, so they only run
//! with `cargo test -- --ignored` on a machine with Docker.

use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase};

fn user(email: String) -> User {
    User::new(
        "Ada".to_string(),
        "Lovelace".to_string(),
        email,
        "$argon2id$v=19$m=19456,t=2,p=1$test$test".to_string(),
        None,
    )
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_roles_are_seeded_and_exclusive() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_roles_are_seeded_and_exclusive");
    let store = PgIdentityStore::new(db.connection());

    let admin = store.find_role_by_name("Admin").await.unwrap().unwrap();
    let member = store.find_role_by_name("User").await.unwrap().unwrap();
    let ada = store.create(user(builder.email("ada"))).await.unwrap();

    store.add_to_role(ada.id, member.id).await.unwrap();
    let err = store.add_to_role(ada.id, admin.id).await.unwrap_err();
    assert!(matches!(err, UserError::RoleAlreadyAssigned));

    store.remove_from_all_roles(ada.id).await.unwrap();
    store.add_to_role(ada.id, admin.id).await.unwrap();

    let roles = store.roles_of(ada.id).await.unwrap();
    assert_eq!(roles, vec![admin]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_soft_deleted_user_releases_email() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_soft_deleted_user_releases_email");
    let store = PgIdentityStore::new(db.connection());
    let email = builder.email("ada");

    let ada = store.create(user(email.clone())).await.unwrap();
    assert!(store.email_taken(&email, None).await.unwrap());
    assert!(!store.email_taken(&email, Some(ada.id)).await.unwrap());

    store.delete(ada.clone()).await.unwrap();

    assert!(store.find_by_id(ada.id).await.unwrap().is_none());
    assert!(!store.email_taken(&email, None).await.unwrap());
    let deleted = store.find_by_email(&email).await.unwrap().unwrap();
    assert!(deleted.audit.is_deleted);

    store.create(user(email.clone())).await.unwrap();
    let live = store.find_by_email(&email).await.unwrap().unwrap();
    assert!(!live.audit.is_deleted);
}
