//! Statement domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// Largest number of fractional digits an amount may carry (cents)
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount a single statement may carry, the top of DECIMAL(18,2)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 2);

/// Kind of ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Deposit,
    Withdraw,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
        }
    }

    /// Apply this operation's sign to an amount
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            OperationType::Deposit => amount,
            OperationType::Withdraw => -amount,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(OperationType::Deposit),
            "withdraw" => Ok(OperationType::Withdraw),
            other => Err(Error::validation(format!(
                "unknown operation type '{}', expected 'deposit' or 'withdraw'",
                other
            ))),
        }
    }
}

/// A single deposit or withdrawal recorded for a user
///
/// Statements are immutable once stored and are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Statement {
    /// Create a new statement after validating the amount
    pub fn new(
        user_id: Uuid,
        operation_type: OperationType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self> {
        validate_amount(amount)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            operation_type,
            amount: amount.normalize(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Contribution of this statement to the balance
    pub fn signed_amount(&self) -> Decimal {
        self.operation_type.signed(self.amount)
    }
}

/// Amounts must be strictly positive, expressible in cents and fit DECIMAL(18,2)
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation("amount must be greater than zero"));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::validation(format!("amount must not exceed {}", MAX_AMOUNT)));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::validation(format!(
            "amount must have at most {} decimal places",
            AMOUNT_SCALE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_parsing() {
        assert_eq!("deposit".parse::<OperationType>().unwrap(), OperationType::Deposit);
        assert_eq!(" Withdraw ".parse::<OperationType>().unwrap(), OperationType::Withdraw);
        assert!(matches!(
            "transfer".parse::<OperationType>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_signed_amount() {
        let user_id = Uuid::new_v4();
        let deposit = Statement::new(user_id, OperationType::Deposit, Decimal::new(500, 0), "in").unwrap();
        let withdraw = Statement::new(user_id, OperationType::Withdraw, Decimal::new(12050, 2), "out").unwrap();

        assert_eq!(deposit.signed_amount(), Decimal::new(500, 0));
        assert_eq!(withdraw.signed_amount(), Decimal::new(-12050, 2));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let user_id = Uuid::new_v4();
        assert!(Statement::new(user_id, OperationType::Deposit, Decimal::ZERO, "zero").is_err());
        assert!(Statement::new(user_id, OperationType::Deposit, Decimal::new(-1, 0), "neg").is_err());
    }

    #[test]
    fn test_amount_scale() {
        assert!(validate_amount(Decimal::new(1001, 3)).is_err()); // 1.001
        assert!(validate_amount(Decimal::new(1000, 3)).is_ok()); // 1.000 normalizes to 1
        assert!(validate_amount(Decimal::new(199, 2)).is_ok());
    }

    #[test]
    fn test_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999999999.99");
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(matches!(
            validate_amount(MAX_AMOUNT + Decimal::new(1, 2)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_amount(Decimal::from_str("79228162514264337593543950").unwrap()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_type_serializes_lowercase() {
        let statement = Statement::new(Uuid::new_v4(), OperationType::Withdraw, Decimal::ONE, "x").unwrap();
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["type"], "withdraw");
        assert!(json.get("user_id").is_some());
    }
}
