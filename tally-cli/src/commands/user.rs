//! User commands - registration and profile

use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Password;

use super::{current_user, get_context};
use crate::output;
use tally_core::CreateUserRequest;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for (with confirmation) when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Show the logged-in user's profile
    Profile,
}

impl UserCommands {
    pub fn name(&self) -> &'static str {
        match self {
            UserCommands::Create { .. } => "user create",
            UserCommands::Profile => "user profile",
        }
    }
}

/// Get password from --password flag or prompt with confirmation
fn get_password_with_confirm(password_flag: Option<String>) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    let p1 = Password::new().with_prompt("Password").interact()?;
    let p2 = Password::new().with_prompt("Confirm password").interact()?;
    if p1 != p2 {
        bail!("Passwords do not match");
    }
    Ok(p1)
}

pub async fn run(command: UserCommands, token: Option<String>, json: bool) -> Result<()> {
    match command {
        UserCommands::Create { name, email, password } => {
            let password = get_password_with_confirm(password)?;
            let ctx = get_context()?;
            let profile = ctx
                .user_service
                .create_user(CreateUserRequest { name, email, password })
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                output::success("User created");
                println!("{}", output::profile_table(&profile));
                output::info("Run `tally login` to start a session.");
            }
        }
        UserCommands::Profile => {
            let ctx = get_context()?;
            let user_id = current_user(&ctx, token)?;
            let profile = ctx.user_service.show_user_profile(user_id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("{}", output::profile_table(&profile));
            }
        }
    }

    Ok(())
}
