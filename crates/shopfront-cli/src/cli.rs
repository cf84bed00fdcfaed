//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{login, logout, profile, register, status};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Command-line client for the shop account API.
#[derive(Parser, Debug)]
#[command(name = "shopfront")]
#[command(author, version = env!("SHOPFRONT_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and storage settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL
    #[arg(long, env = "SHOPFRONT_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Directory holding the stored session tokens
    #[arg(long, env = "SHOPFRONT_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login(login::LoginArgs),

    /// Create an account (uploads the avatar, then logs in)
    Register(register::RegisterArgs),

    /// Show the logged-in user's profile
    Profile(profile::ProfileArgs),

    /// End the session
    Logout(logout::LogoutArgs),

    /// Report whether a stored session is still valid
    Status(status::StatusArgs),
}
