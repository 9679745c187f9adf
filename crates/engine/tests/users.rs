mod common;

use uuid::Uuid;

use common::engine_with_db;
use engine::EngineError;

#[tokio::test]
async fn register_then_authenticate() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .register_user("Alice Liddell", "  Alice@Example.com ", "rabbit-hole")
        .await
        .unwrap();
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    assert!(!user.is_guest);

    let logged = engine
        .authenticate("ALICE@example.com", "rabbit-hole")
        .await
        .unwrap();
    assert_eq!(logged, user);
    assert_eq!(engine.user(user.id).await.unwrap(), user);
}

#[tokio::test]
async fn bad_credentials_look_the_same() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("Alice", "alice@example.com", "rabbit-hole")
        .await
        .unwrap();

    let wrong_password = engine
        .authenticate("alice@example.com", "looking-glass")
        .await
        .unwrap_err();
    let unknown_email = engine
        .authenticate("bob@example.com", "rabbit-hole")
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, EngineError::Unauthorized(_)));
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("Alice", "alice@example.com", "rabbit-hole")
        .await
        .unwrap();

    let err = engine
        .register_user("Another Alice", "ALICE@EXAMPLE.COM", "queen-of-hearts")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("alice@example.com".to_string())
    );
}

#[tokio::test]
async fn registration_validates_input() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine.register_user("Al", "al@example.com", "pw").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.register_user("Alice", "not-an-email", "pw").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.register_user("Alice", "alice@example.com", "").await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn guests_cannot_log_in() {
    let (engine, _db) = engine_with_db().await;
    let guest = engine.create_guest("Grandpa Joe").await.unwrap();
    assert!(guest.is_guest);
    assert_eq!(engine.user(guest.id).await.unwrap(), guest);

    assert!(matches!(
        engine.user(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
