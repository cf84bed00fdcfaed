//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use shopfront_core::User;

use crate::forms::FieldError;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print rejected form fields, one per line.
pub fn field_errors(errors: &[FieldError]) {
    for err in errors {
        eprintln!("{} {} {}", "✗".red(), format!("{}:", err.field).dimmed(), err);
    }
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a user's profile as labeled fields.
pub fn user(user: &User) {
    field("ID", user.id.as_str());
    field("Name", &user.name);
    field("Email", &user.email);
    field("Role", &user.role.to_string());
    if let Some(avatar) = &user.avatar_url {
        field("Avatar", avatar);
    }
    if let Some(created) = &user.creation_at {
        field("Member since", &created.format("%Y-%m-%d").to_string());
    }
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
