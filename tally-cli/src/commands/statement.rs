//! Statement commands - deposit, withdraw, balance, statement lookup

use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{current_user, get_context};
use crate::output;
use tally_core::{CreateStatementRequest, Error, OperationType};

fn parse_amount(value: &str) -> Result<Decimal, Error> {
    Decimal::from_str(value.trim())
        .map_err(|_| Error::validation(format!("invalid amount '{}'", value.trim())))
}

/// A malformed id cannot name any statement
fn parse_statement_id(value: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| Error::StatementNotFound)
}

pub async fn run_create(
    operation_type: OperationType,
    amount: Option<String>,
    description: Option<String>,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let user_id = current_user(&ctx, token)?;

    // Get amount interactively if not provided
    let amount_str = match amount {
        Some(a) => a,
        None => Input::new().with_prompt("Amount").interact_text()?,
    };
    let amount = parse_amount(&amount_str)?;

    let statement = ctx
        .statement_service
        .create_statement(CreateStatementRequest {
            user_id,
            operation_type,
            amount,
            description: description.unwrap_or_default(),
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
    } else {
        let label = match operation_type {
            OperationType::Deposit => "Deposit recorded",
            OperationType::Withdraw => "Withdrawal recorded",
        };
        output::success(label);
        println!("{}", output::statement_table(&statement));
    }

    Ok(())
}

pub async fn run_balance(token: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user_id = current_user(&ctx, token)?;
    let balance = ctx.statement_service.get_balance(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&balance)?);
        return Ok(());
    }

    if balance.statement.is_empty() {
        println!("No statements yet.");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Date", "Type", "Amount", "Description", "ID"]);
        for statement in &balance.statement {
            table.add_row(vec![
                output::format_time(&statement.created_at),
                statement.operation_type.to_string(),
                output::format_signed_amount(statement.operation_type, statement.amount),
                statement.description.clone(),
                statement.id.to_string(),
            ]);
        }
        println!("{}", table);
    }

    println!();
    println!("{} {}", "Balance:".bold(), output::format_balance(balance.balance));

    Ok(())
}

pub async fn run_show(id: &str, token: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user_id = current_user(&ctx, token)?;
    let statement_id = parse_statement_id(id)?;
    let statement = ctx
        .statement_service
        .get_statement_operation(user_id, statement_id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
    } else {
        println!("{}", output::statement_table(&statement));
    }

    Ok(())
}
