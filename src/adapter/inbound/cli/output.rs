//! CLI output.
//!
//! Command results go to stdout as pretty JSON so they can be piped;
//! status lines go to stderr.

use std::fmt::Display;

use serde::Serialize;

use crate::error::Result;

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a `label: value` status line on stderr.
pub fn field(label: &str, value: impl Display) {
    eprintln!("  {label:<12} {value}");
}
