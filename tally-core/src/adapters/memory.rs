//! In-memory repository implementation
//!
//! Backs tests and throwaway sessions. Nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Statement, User};
use crate::ports::{StatementsRepository, UsersRepository};

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    /// email -> id
    by_email: HashMap<String, Uuid>,
}

/// In-memory store for users and statements
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<Users>,
    /// Insertion order is preserved
    statements: RwLock<Vec<Statement>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for InMemoryRepository {
    async fn add_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.by_email.contains_key(&user.email) {
            return Err(Error::UserAlreadyExists);
        }
        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }
}

#[async_trait]
impl StatementsRepository for InMemoryRepository {
    async fn add_statement(&self, statement: &Statement) -> Result<()> {
        self.statements.write().await.push(statement.clone());
        Ok(())
    }

    async fn get_statement(&self, user_id: Uuid, statement_id: Uuid) -> Result<Option<Statement>> {
        Ok(self
            .statements
            .read()
            .await
            .iter()
            .find(|s| s.id == statement_id && s.user_id == user_id)
            .cloned())
    }

    async fn get_statements_by_user(&self, user_id: Uuid) -> Result<Vec<Statement>> {
        Ok(self
            .statements
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OperationType;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryRepository::new();
        let first = User::new("A", "same@email.com", "hash").unwrap();
        let second = User::new("B", "same@email.com", "hash").unwrap();

        repo.add_user(&first).await.unwrap();
        let err = repo.add_user(&second).await.unwrap_err();
        assert!(matches!(err, Error::UserAlreadyExists));

        let stored = repo.get_user_by_email("same@email.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[tokio::test]
    async fn test_statements_scoped_to_user() {
        let repo = InMemoryRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let s1 = Statement::new(alice, OperationType::Deposit, Decimal::new(10, 0), "a1").unwrap();
        let s2 = Statement::new(bob, OperationType::Deposit, Decimal::new(20, 0), "b1").unwrap();
        let s3 = Statement::new(alice, OperationType::Withdraw, Decimal::new(5, 0), "a2").unwrap();
        for s in [&s1, &s2, &s3] {
            repo.add_statement(s).await.unwrap();
        }

        let alice_statements = repo.get_statements_by_user(alice).await.unwrap();
        let ids: Vec<Uuid> = alice_statements.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![s1.id, s3.id]);

        assert!(repo.get_statement(alice, s1.id).await.unwrap().is_some());
        assert!(repo.get_statement(bob, s1.id).await.unwrap().is_none());
    }
}
