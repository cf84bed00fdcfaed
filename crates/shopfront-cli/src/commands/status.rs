//! Status command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use shopfront_core::User;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Status {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

pub async fn run(args: StatusArgs, ctx: Context) -> Result<()> {
    let user = ctx.session.restore().await;
    let authenticated = ctx.session.is_authenticated().get();

    if args.json {
        return output::json_pretty(&Status {
            authenticated,
            user,
        });
    }

    match user {
        Some(user) => {
            output::success(&format!("Logged in as {} <{}>", user.name, user.email));
            output::field("Role", &user.role.to_string());
        }
        None => output::field("Status", "not logged in"),
    }

    Ok(())
}
