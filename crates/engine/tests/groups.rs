mod common;

use uuid::Uuid;

use common::{count_rows, draft, engine_with_db, group_with, halves, user};
use engine::EngineError;

#[tokio::test]
async fn creator_is_first_member_and_admin() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "Alice").await;

    let group = engine
        .create_group("  Ski week ", Some(" Feb 2026 "), alice)
        .await
        .unwrap();
    assert_eq!(group.name, "Ski week");
    assert_eq!(group.description.as_deref(), Some("Feb 2026"));
    assert!(group.is_admin(alice));
    assert!(engine.is_member(alice, group.id).await.unwrap());

    let loaded = engine.group(group.id, alice).await.unwrap();
    assert_eq!(loaded.members.len(), 1);
    assert_eq!(loaded.members[0].user_id, alice);
    assert_eq!(loaded.members[0].name, "Alice");
}

#[tokio::test]
async fn create_group_validates_input() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "Alice").await;

    assert!(matches!(
        engine.create_group("   ", None, alice).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_group("Trip", None, Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn all_members_of_deduplicates_and_requires_everyone() {
    let (engine, _db) = engine_with_db().await;
    let u1 = user(&engine, "Alice").await;
    let u2 = user(&engine, "Bob").await;
    let outsider = user(&engine, "Carol").await;
    let group = group_with(&engine, u1, &[u2]).await;

    assert!(engine.all_members_of(&[], group).await.unwrap());
    assert!(engine.all_members_of(&[u1, u2], group).await.unwrap());
    assert!(engine.all_members_of(&[u1, u1, u2, u2], group).await.unwrap());
    assert!(!engine.all_members_of(&[u1, outsider], group).await.unwrap());
    assert!(!engine.all_members_of(&[outsider, outsider], group).await.unwrap());
    assert!(!engine.is_member(outsider, group).await.unwrap());
    assert!(!engine.all_members_of(&[u1], Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn add_members_skips_unknown_users() {
    let (engine, _db) = engine_with_db().await;
    let admin = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let group = group_with(&engine, admin, &[]).await;

    let added = engine
        .add_group_members(group, &[Uuid::new_v4(), bob, bob, admin], admin)
        .await
        .unwrap();
    assert_eq!(added, vec![bob, admin]);
    assert!(engine.is_member(bob, group).await.unwrap());

    let err = engine
        .add_group_members(group, &[Uuid::new_v4()], admin)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert!(matches!(
        engine.add_group_members(group, &[], admin).await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn only_admin_manages_members() {
    let (engine, _db) = engine_with_db().await;
    let admin = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let carol = user(&engine, "Carol").await;
    let group = group_with(&engine, admin, &[bob]).await;

    assert!(matches!(
        engine.add_group_members(group, &[carol], bob).await,
        Err(EngineError::Forbidden(_))
    ));
    engine.add_group_members(group, &[carol], admin).await.unwrap();

    assert!(matches!(
        engine.remove_group_members(group, &[carol], bob).await,
        Err(EngineError::Forbidden(_))
    ));
    engine
        .remove_group_members(group, &[carol], admin)
        .await
        .unwrap();
    assert!(!engine.is_member(carol, group).await.unwrap());
}

#[tokio::test]
async fn group_admin_can_never_be_removed() {
    let (engine, _db) = engine_with_db().await;
    let admin = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let group = group_with(&engine, admin, &[bob]).await;

    for requester in [admin, bob] {
        let err = engine
            .remove_group_members(group, &[bob, admin], requester)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Forbidden("cannot remove group admin".to_string())
        );
    }
    assert!(engine.is_member(admin, group).await.unwrap());
    assert!(engine.is_member(bob, group).await.unwrap());
}

#[tokio::test]
async fn removed_member_can_no_longer_be_split_against() {
    let (engine, _db) = engine_with_db().await;
    let admin = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let group = group_with(&engine, admin, &[bob]).await;

    engine
        .remove_group_members(group, &[bob], admin)
        .await
        .unwrap();
    let err = engine
        .create_expense(draft(group, 10_000, halves(admin, bob, 10_000)), admin)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidSplit("split user not in group".to_string())
    );
}

#[tokio::test]
async fn guests_join_through_the_admin() {
    let (engine, _db) = engine_with_db().await;
    let admin = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let group = group_with(&engine, admin, &[bob]).await;

    let guest = engine.add_group_guest(group, "Grandpa Joe", admin).await.unwrap();
    assert!(guest.is_guest);
    assert_eq!(guest.email, None);
    assert!(engine.is_member(guest.id, group).await.unwrap());

    assert!(matches!(
        engine.add_group_guest(group, "Uncle Bill", bob).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn group_listing_is_scoped_and_visible_to_members_only() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let carol = user(&engine, "Carol").await;

    let first = group_with(&engine, alice, &[bob]).await;
    let second = group_with(&engine, bob, &[]).await;

    let mut of_bob: Vec<_> = engine
        .groups_of_member(bob)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.id)
        .collect();
    of_bob.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(of_bob, expected);

    let by_alice: Vec<_> = engine
        .groups_created_by(alice)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(by_alice, vec![first]);

    assert!(engine.groups_of_member(carol).await.unwrap().is_empty());
    assert!(matches!(
        engine.group(first, carol).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.group(Uuid::new_v4(), carol).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_group_cascades() {
    let (engine, db) = engine_with_db().await;
    let admin = user(&engine, "Alice").await;
    let bob = user(&engine, "Bob").await;
    let group = group_with(&engine, admin, &[bob]).await;

    let expense = engine
        .create_expense(draft(group, 10_000, halves(admin, bob, 10_000)), bob)
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_group(group, bob).await,
        Err(EngineError::Forbidden(_))
    ));
    engine.delete_group(group, admin).await.unwrap();

    assert!(matches!(
        engine.expense(expense.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    let splits = count_rows(
        &db,
        "SELECT COUNT(*) FROM expense_splits WHERE expense_id = ?",
        expense.id,
    )
    .await;
    let members = count_rows(
        &db,
        "SELECT COUNT(*) FROM group_members WHERE group_id = ?",
        group,
    )
    .await;
    assert_eq!((splits, members), (0, 0));
    assert!(engine.groups_of_member(bob).await.unwrap().is_empty());
}
