//! Statement service - deposits, withdrawals and balance queries

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{compute_balance, Balance, OperationType, Statement};
use crate::ports::{StatementsRepository, UsersRepository};

/// Input for recording a statement
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStatementRequest {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

pub struct StatementService {
    users: Arc<dyn UsersRepository>,
    statements: Arc<dyn StatementsRepository>,
}

impl StatementService {
    pub fn new(users: Arc<dyn UsersRepository>, statements: Arc<dyn StatementsRepository>) -> Self {
        Self { users, statements }
    }

    async fn ensure_user_exists(&self, user_id: Uuid) -> Result<()> {
        match self.users.get_user_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::UserNotFound),
        }
    }

    /// Record a deposit or withdrawal
    ///
    /// A withdrawal larger than the current balance fails with
    /// `InsufficientFunds`; withdrawing the exact balance is allowed.
    ///
    /// The balance check and the append are not atomic: two concurrent
    /// withdrawals for one user can both pass the check.
    #[instrument(
        name = "StatementService: create statement",
        skip(self, request),
        fields(user_id = %request.user_id, operation = %request.operation_type)
    )]
    pub async fn create_statement(&self, request: CreateStatementRequest) -> Result<Statement> {
        self.ensure_user_exists(request.user_id).await?;

        let statement = Statement::new(
            request.user_id,
            request.operation_type,
            request.amount,
            request.description,
        )?;

        if statement.operation_type == OperationType::Withdraw {
            let history = self.statements.get_statements_by_user(request.user_id).await?;
            let balance = compute_balance(&history)?;
            if statement.amount > balance {
                tracing::warn!("Withdrawal rejected: insufficient funds");
                return Err(Error::InsufficientFunds);
            }
        }

        self.statements.add_statement(&statement).await?;
        tracing::info!(statement_id = %statement.id, "Statement recorded");
        Ok(statement)
    }

    /// Full statement history plus the derived balance
    #[instrument(name = "StatementService: get balance", skip(self))]
    pub async fn get_balance(&self, user_id: Uuid) -> Result<Balance> {
        self.ensure_user_exists(user_id).await?;
        let history = self.statements.get_statements_by_user(user_id).await?;
        Balance::from_statements(history)
    }

    /// A single statement belonging to the user
    #[instrument(name = "StatementService: get statement", skip(self))]
    pub async fn get_statement_operation(&self, user_id: Uuid, statement_id: Uuid) -> Result<Statement> {
        self.ensure_user_exists(user_id).await?;
        self.statements
            .get_statement(user_id, statement_id)
            .await?
            .ok_or(Error::StatementNotFound)
    }
}
