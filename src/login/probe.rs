use crate::login::{Authenticator, Credentials};
use std::sync::Arc;

/// Characters of the token shown after a successful login.
const TOKEN_PREVIEW_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Login worked; holds the truncated token.
    Success { token_preview: String },
    Failure { message: String },
}

pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_PREVIEW_LEN).collect();
    format!("{head}...")
}

/// Performs exactly one login on tokio's blocking pool and reports how it went.
pub async fn probe_login(
    credentials: Credentials,
    authenticator: Arc<dyn Authenticator>,
) -> LoginOutcome {
    let result =
        tokio::task::spawn_blocking(move || authenticator.login(&credentials)).await;

    match result {
        Ok(Ok(token)) => LoginOutcome::Success {
            token_preview: token_preview(&token),
        },
        Ok(Err(e)) => LoginOutcome::Failure {
            message: e.to_string(),
        },
        Err(e) => LoginOutcome::Failure {
            message: format!("login task failed: {e}"),
        },
    }
}
