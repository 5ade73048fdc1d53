//! Command-line interface definitions.
//!
//! The operator surface of the gateway: submit batches, inspect payloads
//! without sending them, and run the upstream queries and Radian calls.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Dispatch gateway for Colombian electronic invoicing through Numrot
#[derive(Parser, Debug)]
#[command(name = "numrot-gateway")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file; the environment alone is used when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a batch file and print the batch reply
    Submit(BatchArgs),

    /// Print the upstream payloads of a batch file without sending them
    Transform(BatchArgs),

    /// Acquire an upstream token
    Token,

    /// List the resolutions authorised for a NIT
    Resolutions(NitArg),

    /// Fetch a document by its CUFE
    Info(InfoArgs),

    /// Fetch a document with its DIAN state history
    Search(SearchArgs),

    /// Register a Radian event against a received document
    Event(EventArgs),

    /// Radian document listings
    #[command(subcommand)]
    Radian(RadianCommand),
}

/// Subcommands for `numrot-gateway radian`.
#[derive(Subcommand, Debug)]
pub enum RadianCommand {
    /// Documents emitted by the issuer within a date range.
    Emitted(RangeArgs),
    /// Documents received by the issuer within a date range.
    Received(RangeArgs),
    /// A received document by its full number.
    Lookup(LookupArgs),
}

/// A batch file plus an optional customer directory.
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// JSON batch with `FC`, `NC`, `ND` or `DS` document lists.
    #[arg(short, long)]
    pub file: PathBuf,

    /// JSON array of customer records used to enrich acquirers.
    #[arg(long)]
    pub customers: Option<PathBuf>,
}

/// Shared NIT argument; defaults to the configured issuer.
#[derive(Parser, Debug)]
pub struct NitArg {
    #[arg(long)]
    pub nit: Option<String>,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[arg(long)]
    pub cufe: String,

    #[command(flatten)]
    pub nit: NitArg,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Full document number (prefix + consecutive).
    #[arg(long)]
    pub number: String,

    #[command(flatten)]
    pub nit: NitArg,
}

#[derive(Parser, Debug)]
pub struct EventArgs {
    /// ACUSE, RECLAMO, RECIBOBIEN or ACEPTACION.
    #[arg(long)]
    pub kind: String,

    /// Full number of the received document.
    #[arg(long)]
    pub document: String,

    #[arg(long)]
    pub supplier_nit: String,

    #[arg(long)]
    pub supplier_name: String,

    /// Required for RECLAMO (01..04), rejected otherwise.
    #[arg(long)]
    pub rejection_code: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RangeArgs {
    /// First day, `YYYY-MM-DD`.
    #[arg(long)]
    pub from: String,

    /// Last day, `YYYY-MM-DD`.
    #[arg(long)]
    pub to: String,
}

#[derive(Parser, Debug)]
pub struct LookupArgs {
    #[arg(long)]
    pub supplier_nit: String,

    #[arg(long)]
    pub number: String,
}
