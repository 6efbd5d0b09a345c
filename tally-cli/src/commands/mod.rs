//! CLI command implementations

pub mod login;
pub mod logs;
pub mod statement;
pub mod user;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use tally_core::{Error, LogEvent, LoggingService, Session, TallyContext};

const SESSION_FILE: &str = "session.json";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let tally_dir = get_tally_dir().ok()?;
    std::fs::create_dir_all(&tally_dir).ok()?;
    LoggingService::new(&tally_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!("Failed to write command log: {:#}", e);
        }
    }
}

/// Get the tally directory from TALLY_DIR or default to ~/.tally
pub fn get_tally_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tally"))
        .ok_or_else(|| anyhow!("Could not find home directory; set TALLY_DIR"))
}

/// Open the ledger in the tally directory
pub fn get_context() -> Result<TallyContext> {
    let tally_dir = get_tally_dir()?;
    TallyContext::new(&tally_dir).context("Failed to initialize tally context")
}

/// Stable error name for JSON output and the command log
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::kind)
        .unwrap_or("error")
}

/// Resolve the acting user from --token / TALLY_TOKEN, falling back to session.json
pub fn current_user(ctx: &TallyContext, token: Option<String>) -> Result<Uuid> {
    let token = match token {
        Some(token) => token,
        None => match load_session(&get_tally_dir()?)? {
            Some(session) => session.token,
            None => bail!("Not logged in. Run `tally login` first."),
        },
    };
    Ok(ctx.auth_service.verify_session(&token)?)
}

pub fn load_session(tally_dir: &Path) -> Result<Option<Session>> {
    let path = tally_dir.join(SESSION_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let session = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(session))
}

pub fn save_session(tally_dir: &Path, session: &Session) -> Result<()> {
    std::fs::create_dir_all(tally_dir)?;
    let path = tally_dir.join(SESSION_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(session)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    // The token is a bearer credential
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Delete session.json, returning whether one existed
pub fn remove_session(tally_dir: &Path) -> Result<bool> {
    let path = tally_dir.join(SESSION_FILE);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(true)
}
