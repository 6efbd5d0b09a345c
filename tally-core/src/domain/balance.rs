//! Balance domain model
//!
//! The balance is never stored. It is derived from a user's full statement
//! history every time it is needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::statement::Statement;

/// Sum of deposits minus withdrawals
pub fn compute_balance<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> Result<Decimal> {
    statements.into_iter().try_fold(Decimal::ZERO, |acc, s| {
        acc.checked_add(s.signed_amount())
            .ok_or(Error::BalanceOverflow)
    })
}

/// A user's statement history together with the resulting balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub statement: Vec<Statement>,
    pub balance: Decimal,
}

impl Balance {
    pub fn from_statements(statement: Vec<Statement>) -> Result<Self> {
        let balance = compute_balance(&statement)?;
        Ok(Self { statement, balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OperationType;
    use uuid::Uuid;

    fn statement(user_id: Uuid, kind: OperationType, amount: i64) -> Statement {
        Statement::new(user_id, kind, Decimal::new(amount, 0), "test").unwrap()
    }

    #[test]
    fn test_empty_history_is_zero() {
        let balance = Balance::from_statements(vec![]).unwrap();
        assert_eq!(balance.balance, Decimal::ZERO);
        assert!(balance.statement.is_empty());
    }

    #[test]
    fn test_deposits_minus_withdrawals() {
        let user_id = Uuid::new_v4();
        let history = vec![
            statement(user_id, OperationType::Deposit, 500),
            statement(user_id, OperationType::Withdraw, 120),
            statement(user_id, OperationType::Deposit, 30),
        ];

        assert_eq!(compute_balance(&history).unwrap(), Decimal::new(410, 0));

        let balance = Balance::from_statements(history).unwrap();
        assert_eq!(balance.balance, Decimal::new(410, 0));
        assert_eq!(balance.statement.len(), 3);
    }

    #[test]
    fn test_cents_are_exact() {
        let user_id = Uuid::new_v4();
        let history = vec![
            Statement::new(user_id, OperationType::Deposit, Decimal::new(10, 2), "a").unwrap(),
            Statement::new(user_id, OperationType::Deposit, Decimal::new(20, 2), "b").unwrap(),
        ];
        assert_eq!(compute_balance(&history).unwrap(), Decimal::new(30, 2));
    }

    #[test]
    fn test_overflowing_history_is_an_error() {
        let user_id = Uuid::new_v4();
        let mut huge = statement(user_id, OperationType::Deposit, 1);
        huge.amount = Decimal::MAX;
        let history = vec![huge.clone(), huge];

        assert!(matches!(compute_balance(&history), Err(Error::BalanceOverflow)));
        assert!(matches!(
            Balance::from_statements(history),
            Err(Error::BalanceOverflow)
        ));
    }
}
