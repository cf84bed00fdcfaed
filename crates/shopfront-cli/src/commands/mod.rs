//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod status;

use anyhow::{Result, anyhow};

use shopfront_core::{AuthError, User};

use crate::cli::{Cli, Commands};
use crate::forms::FieldError;
use crate::output;
use crate::session::{CliSession, Context};

pub async fn handle(cli: Cli) -> Result<()> {
    let ctx = Context::open(&cli.global)?;

    match cli.command {
        Commands::Login(args) => login::run(args, ctx).await,
        Commands::Register(args) => register::run(args, ctx).await,
        Commands::Profile(args) => profile::run(args, ctx).await,
        Commands::Logout(args) => logout::run(args, ctx).await,
        Commands::Status(args) => status::run(args, ctx).await,
    }
}

/// Which form an authentication error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Registration,
}

/// The message shown to the user for a failed login or registration.
pub fn describe(err: &AuthError, action: Action) -> String {
    match err {
        AuthError::InvalidCredentials => "Invalid email or password".to_string(),
        AuthError::Conflict { message: Some(message) } => message.clone(),
        AuthError::Conflict { message: None } => {
            "An account with this email already exists".to_string()
        }
        AuthError::Network(_) | AuthError::SessionExpired => match action {
            Action::Login => "An error occurred during login".to_string(),
            Action::Registration => "An error occurred during registration".to_string(),
        },
    }
}

/// Print the field errors and fail the command.
fn reject_form(errors: &[FieldError]) -> anyhow::Error {
    output::field_errors(errors);
    anyhow!("Invalid input")
}

/// Fail the command with the translated message. The cause is only logged.
fn auth_failure(err: AuthError, action: Action) -> anyhow::Error {
    tracing::debug!(error = ?err, "Authentication failed");
    anyhow!(describe(&err, action))
}

/// Wait for the profile fetch that follows a successful login.
async fn settled_user(session: &CliSession) -> Result<User> {
    session
        .settled()
        .await?
        .ok_or_else(|| anyhow!("Logged in, but the profile could not be loaded"))
}
