//! Profile command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ProfileArgs, ctx: Context) -> Result<()> {
    let user = ctx
        .session
        .restore()
        .await
        .context("Not logged in. Run 'shopfront login' first.")?;

    if args.json {
        output::json_pretty(&user)?;
    } else {
        output::user(&user);
    }

    Ok(())
}
