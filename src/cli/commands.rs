//! Command implementations

use std::io::BufRead;

use anyhow::{Context, Result, bail};
use netbound_auth::{AuthRepository, AuthViewState};
use netbound_resource::{ResourceHandle, ResourceState};
use netbound_utils::ExitCode;
use tracing::warn;

use super::args::Commands;
use super::render::{OutputMode, render_state};

/// Start the request for `command`.
pub(crate) fn start(
    command: Commands,
    repository: &AuthRepository,
) -> Result<ResourceHandle<AuthViewState>> {
    let handle = match command {
        Commands::Login {
            email,
            password,
            password_stdin,
        } => {
            let password = match (password, password_stdin) {
                (Some(password), false) => password,
                (None, true) => read_password(std::io::stdin().lock())?,
                _ => bail!("Pass exactly one of --password or --password-stdin"),
            };
            repository.attempt_login(&email, &password)
        }
        Commands::Register {
            email,
            username,
            password,
            confirm_password,
        } => repository.attempt_registration(&email, &username, &password, &confirm_password),
        Commands::Resume => repository.check_previous_auth_user(),
    };
    Ok(handle)
}

fn read_password(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Print every state until the terminal one; Ctrl-C cancels the request.
pub(crate) async fn observe(
    mut handle: ResourceHandle<AuthViewState>,
    repository: &AuthRepository,
    mode: OutputMode,
) -> Result<(), ExitCode> {
    let mut interrupted = false;
    let mut last = None;

    loop {
        tokio::select! {
            state = handle.next_state() => match state {
                Some(state) => {
                    println!("{}", render_state(&state, mode));
                    last = Some(state);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                warn!("Interrupted, cancelling request");
                repository.cancel_active_jobs();
            }
        }
    }

    exit_status(last.as_ref())
}

/// Exit status for the terminal state of a request.
pub(crate) fn exit_status(terminal: Option<&ResourceState<AuthViewState>>) -> Result<(), ExitCode> {
    match terminal {
        Some(ResourceState::Success { .. }) => Ok(()),
        Some(ResourceState::Error { kind, .. }) => Err(ExitCode::from(*kind)),
        Some(ResourceState::Loading { .. }) | None => Err(ExitCode::INTERNAL),
    }
}
