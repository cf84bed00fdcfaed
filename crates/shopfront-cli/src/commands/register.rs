//! Register command implementation.
//!
//! Uploads the avatar first, then creates the account with the returned
//! location and logs in with the same credentials.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use crate::forms::RegisterForm;
use crate::output;
use crate::session::Context;

use super::{Action, auth_failure, reject_form, settled_user};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Path to the avatar image
    #[arg(long)]
    pub avatar: Option<PathBuf>,
}

pub async fn run(args: RegisterArgs, ctx: Context) -> Result<()> {
    let form = RegisterForm {
        name: args.name,
        email: args.email,
        password: args.password,
        avatar: args.avatar,
    };
    let valid = form.validate().map_err(|errors| reject_form(&errors))?;

    eprintln!("{}", "Uploading avatar...".dimmed());
    let uploaded = ctx
        .uploader
        .upload_path(&valid.avatar)
        .await
        .context("Failed to upload avatar")?;
    tracing::info!(location = %uploaded.location, "Avatar uploaded");

    eprintln!("{}", "Creating account...".dimmed());
    let request = valid.into_request(uploaded.location);
    ctx.session
        .register(&request)
        .await
        .map_err(|err| auth_failure(err, Action::Registration))?;
    let user = settled_user(&ctx.session).await?;

    output::success("Account created");
    println!();
    output::user(&user);

    Ok(())
}
