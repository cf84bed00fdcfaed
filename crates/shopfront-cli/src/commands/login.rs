//! Login command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::forms::LoginForm;
use crate::output;
use crate::session::Context;

use super::{Action, auth_failure, reject_form, settled_user};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, ctx: Context) -> Result<()> {
    let form = LoginForm {
        email: args.email,
        password: args.password,
    };
    let credentials = form.validate().map_err(|errors| reject_form(&errors))?;

    eprintln!("{}", "Logging in...".dimmed());

    ctx.session
        .login(&credentials)
        .await
        .map_err(|err| auth_failure(err, Action::Login))?;
    let user = settled_user(&ctx.session).await?;

    output::success(&format!("Logged in as {}", user.name));
    println!();
    output::user(&user);

    Ok(())
}
