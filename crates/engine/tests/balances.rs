mod common;

use common::{backdate, draft, engine_with_db, group_with, halves, user};
use engine::{EngineError, ExpenseSplit};

#[tokio::test]
async fn net_spending_reports_paid_minus_owed() {
    let (engine, _db) = engine_with_db().await;
    let u1 = user(&engine, "Alice").await;
    let u2 = user(&engine, "Bob").await;
    let group = group_with(&engine, u1, &[u2]).await;

    let expense = engine
        .create_expense(draft(group, 10_000, halves(u1, u2, 10_000)), u1)
        .await
        .unwrap();

    let payer = engine.net_spending(group, u1).await.unwrap();
    assert_eq!(payer.len(), 1);
    assert_eq!(payer[0].expense_id, expense.id);
    assert_eq!(payer[0].title, "Dinner");
    assert_eq!(payer[0].total_minor, 10_000);
    assert_eq!(payer[0].paid_minor, 10_000);
    assert_eq!(payer[0].owed_minor, 5_000);
    assert_eq!(payer[0].net_minor, 5_000);
    assert_eq!(payer[0].created_at, expense.created_at);

    let debtor = engine.net_spending(group, u2).await.unwrap();
    assert_eq!(debtor.len(), 1);
    assert_eq!(debtor[0].paid_minor, 0);
    assert_eq!(debtor[0].owed_minor, 5_000);
    assert_eq!(debtor[0].net_minor, -5_000);
}

#[tokio::test]
async fn zero_net_and_untouched_expenses_are_omitted() {
    let (engine, _db) = engine_with_db().await;
    let u1 = user(&engine, "Alice").await;
    let u2 = user(&engine, "Bob").await;
    let u3 = user(&engine, "Carol").await;
    let group = group_with(&engine, u1, &[u2, u3]).await;

    // u1 pays exactly their own share.
    let even = vec![
        ExpenseSplit::paid(u1, 5_000),
        ExpenseSplit::paid(u2, 5_000),
        ExpenseSplit::owed(u1, 5_000),
        ExpenseSplit::owed(u2, 5_000),
    ];
    engine
        .create_expense(draft(group, 10_000, even), u1)
        .await
        .unwrap();

    assert!(engine.net_spending(group, u1).await.unwrap().is_empty());
    assert!(engine.net_spending(group, u2).await.unwrap().is_empty());
    // u3 has no split at all.
    assert!(engine.net_spending(group, u3).await.unwrap().is_empty());
}

#[tokio::test]
async fn net_spending_is_newest_first_and_scoped_to_group() {
    let (engine, db) = engine_with_db().await;
    let u1 = user(&engine, "Alice").await;
    let u2 = user(&engine, "Bob").await;
    let group = group_with(&engine, u1, &[u2]).await;
    let other = group_with(&engine, u1, &[u2]).await;

    let old = engine
        .create_expense(draft(group, 2_000, halves(u1, u2, 2_000)), u1)
        .await
        .unwrap();
    let mid = engine
        .create_expense(draft(group, 4_000, halves(u1, u2, 4_000)), u1)
        .await
        .unwrap();
    let new = engine
        .create_expense(draft(group, 6_000, halves(u1, u2, 6_000)), u1)
        .await
        .unwrap();
    engine
        .create_expense(draft(other, 8_000, halves(u1, u2, 8_000)), u1)
        .await
        .unwrap();

    backdate(&db, old.id, 7_200).await;
    backdate(&db, mid.id, 3_600).await;

    let ids: Vec<_> = engine
        .net_spending(group, u1)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.expense_id)
        .collect();
    assert_eq!(ids, vec![new.id, mid.id, old.id]);
}

#[tokio::test]
async fn net_spending_reflects_updates_and_deletes() {
    let (engine, _db) = engine_with_db().await;
    let u1 = user(&engine, "Alice").await;
    let u2 = user(&engine, "Bob").await;
    let group = group_with(&engine, u1, &[u2]).await;

    let expense = engine
        .create_expense(draft(group, 10_000, halves(u1, u2, 10_000)), u1)
        .await
        .unwrap();
    engine
        .update_expense(expense.id, draft(group, 10_000, halves(u2, u1, 10_000)), u1)
        .await
        .unwrap();

    let entries = engine.net_spending(group, u1).await.unwrap();
    assert_eq!(entries[0].net_minor, -5_000);

    engine.delete_expense(expense.id, u1).await.unwrap();
    assert!(engine.net_spending(group, u1).await.unwrap().is_empty());
}

#[tokio::test]
async fn group_net_spending_requires_membership() {
    let (engine, _db) = engine_with_db().await;
    let u1 = user(&engine, "Alice").await;
    let u2 = user(&engine, "Bob").await;
    let outsider = user(&engine, "Carol").await;
    let group = group_with(&engine, u1, &[u2]).await;

    engine
        .create_expense(draft(group, 10_000, halves(u1, u2, 10_000)), u1)
        .await
        .unwrap();

    let mine = engine.group_net_spending(group, u2).await.unwrap();
    assert_eq!(mine[0].net_minor, -5_000);
    assert!(matches!(
        engine.group_net_spending(group, outsider).await,
        Err(EngineError::Forbidden(_))
    ));
}
