//! Logout command implementation.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::Context;

/// How long to wait for the server to acknowledge the logout.
const NOTIFY_GRACE: Duration = Duration::from_secs(5);

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: Context) -> Result<()> {
    if let Some(notify) = ctx.session.logout()
        && tokio::time::timeout(NOTIFY_GRACE, notify).await.is_err()
    {
        tracing::debug!("Server-side logout still pending; exiting");
    }

    output::success("Logged out");
    Ok(())
}
