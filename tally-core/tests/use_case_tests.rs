//! Use-case tests for tally-core services
//!
//! Exercise registration, authentication and the ledger through
//! `TallyContext` backed by the in-memory store.
//!
//! Run with: cargo test --test use_case_tests -- --nocapture

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use tally_core::config::Config;
use tally_core::domain::Argon2Params;
use tally_core::{
    AuthenticateRequest, CreateStatementRequest, CreateUserRequest, Error, OperationType,
    TallyContext, UserProfile,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_config() -> Config {
    let mut config = Config::default();
    config.jwt_secret = Some("946c1fb5c000b8bd932b621de659f4dd".to_string());
    config.password_hashing = Argon2Params {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        output_len: 32,
    };
    config
}

fn create_context() -> TallyContext {
    TallyContext::in_memory(test_config()).expect("Failed to create context")
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn david() -> CreateUserRequest {
    CreateUserRequest {
        name: "David".to_string(),
        email: "david@email.com".to_string(),
        password: "123".to_string(),
    }
}

async fn create_david(ctx: &TallyContext) -> UserProfile {
    ctx.user_service.create_user(david()).await.unwrap()
}

fn statement(user_id: Uuid, operation_type: OperationType, amount: &str) -> CreateStatementRequest {
    CreateStatementRequest {
        user_id,
        operation_type,
        amount: dec(amount),
        description: format!("{} test", operation_type),
    }
}

// ============================================================================
// Create User
// ============================================================================

#[tokio::test]
async fn test_create_user() {
    let ctx = create_context();
    let profile = create_david(&ctx).await;

    assert_eq!(profile.name, "David");
    assert_eq!(profile.email, "david@email.com");
}

#[tokio::test]
async fn test_create_user_with_existing_email_fails() {
    let ctx = create_context();
    create_david(&ctx).await;

    let result = ctx.user_service.create_user(david()).await;
    assert!(matches!(result, Err(Error::UserAlreadyExists)));
}

#[tokio::test]
async fn test_create_user_with_blank_fields_fails() {
    let ctx = create_context();

    let blank_password = CreateUserRequest {
        password: String::new(),
        ..david()
    };
    assert!(matches!(
        ctx.user_service.create_user(blank_password).await,
        Err(Error::Validation(_))
    ));

    let blank_name = CreateUserRequest {
        name: "   ".to_string(),
        ..david()
    };
    assert!(matches!(
        ctx.user_service.create_user(blank_name).await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_profile_never_exposes_hash() {
    let ctx = create_context();
    let profile = create_david(&ctx).await;

    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
}

// ============================================================================
// Authenticate User
// ============================================================================

#[tokio::test]
async fn test_authenticate_user() {
    let ctx = create_context();
    let profile = create_david(&ctx).await;

    let session = ctx
        .auth_service
        .authenticate(AuthenticateRequest {
            email: "david@email.com".to_string(),
            password: "123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(session.user.id, profile.id);
    assert!(!session.token.is_empty());
    assert_eq!(ctx.auth_service.verify_session(&session.token).unwrap(), profile.id);
    assert_eq!(ctx.token_service.verify(&session.token).unwrap(), profile.id);
}

#[tokio::test]
async fn test_authenticate_with_wrong_email_fails() {
    let ctx = create_context();
    create_david(&ctx).await;

    let result = ctx
        .auth_service
        .authenticate(AuthenticateRequest {
            email: "incorrect@email.com".to_string(),
            password: "123".to_string(),
        })
        .await;
    assert!(matches!(result, Err(Error::InvalidCredentials)));
}

#[tokio::test]
async fn test_authenticate_with_wrong_password_fails() {
    let ctx = create_context();
    create_david(&ctx).await;

    let result = ctx
        .auth_service
        .authenticate(AuthenticateRequest {
            email: "david@email.com".to_string(),
            password: "incorrect_123".to_string(),
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
    assert_eq!(err.to_string(), "Incorrect email or password");
}

#[tokio::test]
async fn test_verify_session_rejects_garbage() {
    let ctx = create_context();
    assert!(matches!(
        ctx.auth_service.verify_session("not.a.token"),
        Err(Error::InvalidToken)
    ));
}

// ============================================================================
// Statements and Balance
// ============================================================================

#[tokio::test]
async fn test_deposit() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    let created = ctx
        .statement_service
        .create_statement(statement(user.id, OperationType::Deposit, "500"))
        .await
        .unwrap();
    assert_eq!(created.user_id, user.id);
    assert_eq!(created.amount, dec("500"));

    let balance = ctx.statement_service.get_balance(user.id).await.unwrap();
    assert_eq!(balance.balance, dec("500"));
    assert_eq!(balance.statement.len(), 1);
}

#[tokio::test]
async fn test_withdraw_full_balance() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    ctx.statement_service
        .create_statement(statement(user.id, OperationType::Deposit, "500"))
        .await
        .unwrap();
    ctx.statement_service
        .create_statement(statement(user.id, OperationType::Withdraw, "500"))
        .await
        .unwrap();

    let balance = ctx.statement_service.get_balance(user.id).await.unwrap();
    assert_eq!(balance.balance, Decimal::ZERO);
    assert_eq!(balance.statement.len(), 2);
}

#[tokio::test]
async fn test_withdraw_more_than_balance_fails() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    ctx.statement_service
        .create_statement(statement(user.id, OperationType::Deposit, "500"))
        .await
        .unwrap();

    let result = ctx
        .statement_service
        .create_statement(statement(user.id, OperationType::Withdraw, "501"))
        .await;
    assert!(matches!(result, Err(Error::InsufficientFunds)));

    let balance = ctx.statement_service.get_balance(user.id).await.unwrap();
    assert_eq!(balance.balance, dec("500"));
    assert_eq!(balance.statement.len(), 1);
}

#[tokio::test]
async fn test_withdraw_from_empty_account_fails() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    let result = ctx
        .statement_service
        .create_statement(statement(user.id, OperationType::Withdraw, "0.01"))
        .await;
    assert!(matches!(result, Err(Error::InsufficientFunds)));
}

#[tokio::test]
async fn test_invalid_amounts_rejected() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    for amount in ["0", "-5", "1.001", "10000000000000000"] {
        let result = ctx
            .statement_service
            .create_statement(statement(user.id, OperationType::Deposit, amount))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))), "amount {}", amount);
    }
}

#[tokio::test]
async fn test_balance_of_fresh_user_is_zero() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    let balance = ctx.statement_service.get_balance(user.id).await.unwrap();
    assert_eq!(balance.balance, Decimal::ZERO);
    assert!(balance.statement.is_empty());
}

#[tokio::test]
async fn test_statements_returned_oldest_first() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    let mut ids = Vec::new();
    for amount in ["10", "20.50", "30"] {
        let created = ctx
            .statement_service
            .create_statement(statement(user.id, OperationType::Deposit, amount))
            .await
            .unwrap();
        ids.push(created.id);
    }

    let balance = ctx.statement_service.get_balance(user.id).await.unwrap();
    let listed: Vec<Uuid> = balance.statement.iter().map(|s| s.id).collect();
    assert_eq!(listed, ids);
    assert_eq!(balance.balance, dec("60.50"));
}

#[tokio::test]
async fn test_get_statement_operation() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    let created = ctx
        .statement_service
        .create_statement(statement(user.id, OperationType::Deposit, "500"))
        .await
        .unwrap();

    let found = ctx
        .statement_service
        .get_statement_operation(user.id, created.id)
        .await
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.user_id, user.id);
}

#[tokio::test]
async fn test_get_unknown_statement_fails() {
    let ctx = create_context();
    let user = create_david(&ctx).await;

    let result = ctx
        .statement_service
        .get_statement_operation(user.id, Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(Error::StatementNotFound)));
}

#[tokio::test]
async fn test_statement_of_other_user_is_not_found() {
    let ctx = create_context();
    let david = create_david(&ctx).await;
    let other = ctx
        .user_service
        .create_user(CreateUserRequest {
            name: "Maria".to_string(),
            email: "maria@email.com".to_string(),
            password: "456".to_string(),
        })
        .await
        .unwrap();

    let created = ctx
        .statement_service
        .create_statement(statement(david.id, OperationType::Deposit, "500"))
        .await
        .unwrap();

    let result = ctx
        .statement_service
        .get_statement_operation(other.id, created.id)
        .await;
    assert!(matches!(result, Err(Error::StatementNotFound)));

    // Balances are per user
    let other_balance = ctx.statement_service.get_balance(other.id).await.unwrap();
    assert_eq!(other_balance.balance, Decimal::ZERO);
}

// ============================================================================
// Unknown User
// ============================================================================

#[tokio::test]
async fn test_unknown_user_fails_everywhere() {
    let ctx = create_context();
    let unknown = Uuid::new_v4();

    assert!(matches!(
        ctx.user_service.show_user_profile(unknown).await,
        Err(Error::UserNotFound)
    ));
    assert!(matches!(
        ctx.statement_service
            .create_statement(statement(unknown, OperationType::Deposit, "500"))
            .await,
        Err(Error::UserNotFound)
    ));
    assert!(matches!(
        ctx.statement_service.get_balance(unknown).await,
        Err(Error::UserNotFound)
    ));
    assert!(matches!(
        ctx.statement_service
            .get_statement_operation(unknown, Uuid::new_v4())
            .await,
        Err(Error::UserNotFound)
    ));
}

#[tokio::test]
async fn test_show_user_profile() {
    let ctx = create_context();
    let created = create_david(&ctx).await;

    let profile = ctx.user_service.show_user_profile(created.id).await.unwrap();
    assert_eq!(profile, created);
}

#[test]
fn test_context_requires_secret() {
    let mut config = test_config();
    config.jwt_secret = None;
    assert!(TallyContext::in_memory(config).is_err());
}

#[test]
fn test_context_rejects_unbounded_token_lifetime() {
    let mut config = test_config();
    config.token_ttl_seconds = 10_000_000_000_000;
    assert!(TallyContext::in_memory(config).is_err());
}
