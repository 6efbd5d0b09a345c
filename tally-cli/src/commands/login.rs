//! Login and logout commands

use anyhow::Result;
use dialoguer::Password;

use super::{get_context, get_tally_dir, remove_session, save_session};
use crate::output;
use tally_core::AuthenticateRequest;

pub async fn run(
    email: String,
    password: Option<String>,
    print_token: bool,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let ctx = get_context()?;
    let session = ctx
        .auth_service
        .authenticate(AuthenticateRequest { email, password })
        .await?;
    save_session(&get_tally_dir()?, &session)?;

    if json {
        let mut value = serde_json::json!({
            "user": session.user,
            "expires_at": session.expires_at,
        });
        if print_token {
            value["token"] = serde_json::Value::String(session.token.clone());
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    output::success(&format!("Logged in as {}", session.user.email));
    println!("  Session expires: {}", output::format_time(&session.expires_at));
    if print_token {
        println!("{}", session.token);
    }

    Ok(())
}

pub fn run_logout(json: bool) -> Result<()> {
    let removed = remove_session(&get_tally_dir()?)?;

    if json {
        println!("{}", serde_json::json!({"logged_out": removed}));
    } else if removed {
        output::success("Logged out");
    } else {
        output::info("No saved session");
    }

    Ok(())
}
