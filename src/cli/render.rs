//! Terminal rendering of resource states

use netbound_auth::AuthViewState;
use netbound_resource::ResourceState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    Human,
    Json,
}

/// What is shown of a view state; the token itself never is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SessionSummary {
    authenticated: bool,
    account_pk: Option<i64>,
}

impl From<AuthViewState> for SessionSummary {
    fn from(view: AuthViewState) -> Self {
        Self {
            authenticated: view.is_authenticated(),
            account_pk: view.account_pk(),
        }
    }
}

pub(crate) fn render_state(state: &ResourceState<AuthViewState>, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let summary = state.clone().map(SessionSummary::from);
            serde_json::to_string(&summary)
                .unwrap_or_else(|e| format!(r#"{{"status":"error","message":"{e}"}}"#))
        }
        OutputMode::Human => render_human(state),
    }
}

fn render_human(state: &ResourceState<AuthViewState>) -> String {
    match state {
        ResourceState::Loading { .. } => "… working".to_string(),
        ResourceState::Success { data, notice } => match (data.account_pk(), notice) {
            (Some(pk), _) => format!("✓ authenticated (account {pk})"),
            (None, Some(notice)) => format!("✓ {}", notice.message),
            (None, None) => "✓ not authenticated".to_string(),
        },
        ResourceState::Error { message, kind, .. } => format!("✗ {message} ({kind})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netbound_resource::{Notice, Severity};
    use netbound_store::AuthToken;
    use netbound_utils::FailureKind;

    #[test]
    fn test_json_hides_token() {
        let state = ResourceState::success(AuthViewState::authenticated(AuthToken::new(1, "T0K3N")));
        let line = render_state(&state, OutputMode::Json);
        assert!(!line.contains("T0K3N"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&line).unwrap(),
            serde_json::json!({"status": "success", "data": {"authenticated": true, "account_pk": 1}})
        );
    }

    #[test]
    fn test_human_lines() {
        let err = ResourceState::error("operation requires network", Severity::Dialog, FailureKind::NoNetwork);
        assert_eq!(
            render_state(&err, OutputMode::Human),
            "✗ operation requires network (no_network)"
        );

        let none = ResourceState::success_with_notice(
            AuthViewState::default(),
            Notice::new("nothing to resume", Severity::None),
        );
        assert_eq!(render_state(&none, OutputMode::Human), "✓ nothing to resume");
    }
}
