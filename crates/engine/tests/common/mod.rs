#![allow(dead_code)]

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, ExpenseDraft, ExpenseSplit};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Guests skip password hashing, which keeps fixtures fast.
pub async fn user(engine: &Engine, name: &str) -> Uuid {
    engine.create_guest(name).await.unwrap().id
}

/// Create a group administered by `admin` with `members` added.
pub async fn group_with(engine: &Engine, admin: Uuid, members: &[Uuid]) -> Uuid {
    let group = engine.create_group("Trip", None, admin).await.unwrap();
    if !members.is_empty() {
        engine
            .add_group_members(group.id, members, admin)
            .await
            .unwrap();
    }
    group.id
}

pub fn draft(group_id: Uuid, amount_minor: i64, splits: Vec<ExpenseSplit>) -> ExpenseDraft {
    ExpenseDraft {
        group_id,
        title: "Dinner".to_string(),
        description: None,
        amount_minor,
        incomplete_amount: false,
        incomplete_split: false,
        location: None,
        splits,
    }
}

/// Split 50/50 between `a` and `b`, paid entirely by `a`.
pub fn halves(a: Uuid, b: Uuid, amount_minor: i64) -> Vec<ExpenseSplit> {
    vec![
        ExpenseSplit::paid(a, amount_minor),
        ExpenseSplit::owed(a, amount_minor / 2),
        ExpenseSplit::owed(b, amount_minor - amount_minor / 2),
    ]
}

/// Move an expense's `created_at` into the past.
pub async fn backdate(db: &DatabaseConnection, expense_id: Uuid, seconds: i64) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE expenses SET created_at = created_at - ? WHERE id = ?",
        vec![seconds.into(), expense_id.to_string().into()],
    ))
    .await
    .unwrap();
}

pub async fn count_rows(db: &DatabaseConnection, sql: &str, id: Uuid) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            sql,
            vec![id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}
