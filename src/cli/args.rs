//! CLI argument definitions (clap)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// netbound - account login and session resume over network-bound resources
#[derive(Debug, Parser)]
#[command(name = "netbound")]
#[command(about = "Log in, register and resume sessions with timeout and offline handling")]
#[command(long_about = r#"
netbound drives auth requests through a loading → success/error lifecycle.
Every request ends in exactly one terminal state; the exit code reflects it.

EXAMPLES:
  # Log in, reading the password from stdin
  echo "$PASSWORD" | netbound login --email a@b.com --password-stdin

  # Register a new account
  netbound register --email a@b.com --username ann --password pw --confirm-password pw

  # Resume the last session from local state
  netbound resume

EXIT CODES:
  0 success, 1 unknown failure, 2 invalid input, 3 no network,
  4 local storage failure, 5 remote error or empty response, 10 timeout

CONFIGURATION:
  Precedence: --config > NETBOUND_CONFIG > <config dir>/netbound/config.toml > defaults
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit states and logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Treat the network as unreachable
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the credential locally
    Login {
        #[arg(long)]
        email: String,

        /// Password (prefer --password-stdin)
        #[arg(long, conflicts_with = "password_stdin")]
        password: Option<String>,

        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Register a new account and store the credential locally
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        confirm_password: String,
    },

    /// Resume the last authenticated session from local state
    Resume,
}

impl Commands {
    /// Operation label used in logs and error reports.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Register { .. } => "register",
            Self::Resume => "resume",
        }
    }
}
