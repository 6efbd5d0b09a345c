//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;

use tally_core::{OperationType, Statement, UserProfile};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Amount with sign and color by operation
pub fn format_signed_amount(operation_type: OperationType, amount: Decimal) -> String {
    match operation_type {
        OperationType::Deposit => format!("+{:.2}", amount).green().to_string(),
        OperationType::Withdraw => format!("-{:.2}", amount).red().to_string(),
    }
}

pub fn format_balance(balance: Decimal) -> String {
    let text = format!("{:.2}", balance);
    if balance.is_sign_negative() {
        text.red().bold().to_string()
    } else {
        text.bold().to_string()
    }
}

pub fn format_time(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Key/value table for a single profile
pub fn profile_table(profile: &UserProfile) -> Table {
    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), profile.id.to_string()]);
    table.add_row(vec!["Name".to_string(), profile.name.clone()]);
    table.add_row(vec!["Email".to_string(), profile.email.clone()]);
    table.add_row(vec!["Created".to_string(), format_time(&profile.created_at)]);
    table
}

/// Key/value table for a single statement
pub fn statement_table(statement: &Statement) -> Table {
    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), statement.id.to_string()]);
    table.add_row(vec!["Type".to_string(), statement.operation_type.to_string()]);
    table.add_row(vec![
        "Amount".to_string(),
        format_signed_amount(statement.operation_type, statement.amount),
    ]);
    table.add_row(vec!["Description".to_string(), statement.description.clone()]);
    table.add_row(vec!["Created".to_string(), format_time(&statement.created_at)]);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
