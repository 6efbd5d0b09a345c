//! Tally CLI - Personal bookkeeping in your terminal

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{get_logger, log_event, login, logs, statement, user};
use tally_core::{LogEvent, OperationType};

/// Tally - personal bookkeeping in your terminal
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Session token (defaults to the token saved by `tally login`)
    #[arg(long, global = true, env = "TALLY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Authenticate and save a session token
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Print the issued token
        #[arg(long)]
        print_token: bool,
    },

    /// Forget the saved session token
    Logout,

    /// Record a deposit
    Deposit {
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Record a withdrawal
    Withdraw {
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Show statement history and balance
    Balance,

    /// Show a single statement
    Statement {
        /// Statement ID
        id: String,
    },

    /// View and manage the command log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Name recorded in the command log
    fn name(&self) -> &'static str {
        match self {
            Commands::User { command } => command.name(),
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Balance => "balance",
            Commands::Statement { .. } => "statement",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let json = cli.json;
    let command_name = cli.command.name();
    let logger = get_logger();

    let started = Instant::now();
    let result = run(cli).await;
    let duration_ms = started.elapsed().as_millis() as i64;

    match result {
        Ok(()) => {
            log_event(
                &logger,
                LogEvent::new("command_executed")
                    .with_command(command_name)
                    .with_duration_ms(duration_ms),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let kind = commands::error_kind(&e);
            log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(command_name)
                    .with_error_kind(kind)
                    .with_duration_ms(duration_ms),
            );

            if json {
                println!("{}", serde_json::json!({"error": kind, "message": format!("{:#}", e)}));
            } else {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli { json, token, command } = cli;
    match command {
        Commands::User { command } => user::run(command, token, json).await,
        Commands::Login { email, password, print_token } => {
            login::run(email, password, print_token, json).await
        }
        Commands::Logout => login::run_logout(json),
        Commands::Deposit { amount, description } => {
            statement::run_create(OperationType::Deposit, amount, description, token, json).await
        }
        Commands::Withdraw { amount, description } => {
            statement::run_create(OperationType::Withdraw, amount, description, token, json).await
        }
        Commands::Balance => statement::run_balance(token, json).await,
        Commands::Statement { id } => statement::run_show(&id, token, json).await,
        Commands::Logs { command } => logs::run(command, json),
    }
}
