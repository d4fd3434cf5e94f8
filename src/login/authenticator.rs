use crate::login::Credentials;
use md5::{Digest, Md5};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;

const QOBUZ_API_BASE: &str = "https://www.qobuz.com/api.json/0.2";

#[derive(Debug)]
pub enum LoginError {
    InvalidAppId,
    InvalidCredentials,
    FreeAccount,
    ApiError { status: u16, message: String },
    MissingToken,
    ReqwestError(reqwest::Error),
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoginError::InvalidAppId => write!(f, "Invalid app id"),
            LoginError::InvalidCredentials => write!(f, "Invalid username/password"),
            LoginError::FreeAccount => {
                write!(f, "Free accounts are not eligible to download tracks.")
            }
            LoginError::ApiError { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            LoginError::MissingToken => write!(f, "Login response did not contain a token"),
            LoginError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
        }
    }
}

impl std::error::Error for LoginError {}

impl From<reqwest::Error> for LoginError {
    fn from(error: reqwest::Error) -> Self {
        LoginError::ReqwestError(error)
    }
}

/// A service that exchanges credentials for a session token.
///
/// Implementations block; callers are expected to move the call off any
/// async executor.
#[cfg_attr(test, mockall::automock)]
pub trait Authenticator: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<String, LoginError>;
}

/// Logs in to Qobuz with the app id/secret pair of a configured module.
pub struct QobuzAuthenticator {
    client: Client,
    base_url: String,
}

impl QobuzAuthenticator {
    pub fn new() -> Result<Self, LoginError> {
        Self::with_base_url(QOBUZ_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, LoginError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Qobuz expects the account password as a lowercase hex MD5 digest.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Md5::digest(password.as_bytes()))
}

/// Interprets the `user/login` response body once the HTTP status was successful.
fn token_from_response(body: &Value) -> Result<String, LoginError> {
    let has_parameters = body["credential"]["parameters"]
        .as_object()
        .map_or(false, |parameters| !parameters.is_empty());
    if !has_parameters {
        return Err(LoginError::FreeAccount);
    }

    body["user_auth_token"]
        .as_str()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(LoginError::MissingToken)
}

fn error_for_status(status: StatusCode, body: &Value) -> LoginError {
    match status {
        StatusCode::BAD_REQUEST => LoginError::InvalidAppId,
        StatusCode::UNAUTHORIZED => LoginError::InvalidCredentials,
        _ => LoginError::ApiError {
            status: status.as_u16(),
            message: body["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        },
    }
}

impl Authenticator for QobuzAuthenticator {
    fn login(&self, credentials: &Credentials) -> Result<String, LoginError> {
        let url = format!("{}/user/login", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-App-Id", &credentials.app_id)
            .query(&[
                ("email", credentials.username.as_str()),
                ("password", hash_password(&credentials.password).as_str()),
                ("extra", "partner"),
                ("app_id", credentials.app_id.as_str()),
            ])
            .send()?;

        let status = response.status();
        let body: Value = response.json().unwrap_or(Value::Null);
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "login rejected");
            return Err(error_for_status(status, &body));
        }

        token_from_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_password() {
        assert_eq!(hash_password("password"), "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn test_token_from_response() {
        let body = json!({
            "user_auth_token": "abcdefghijklmnop",
            "credential": {"parameters": {"lossless_streaming": true}}
        });

        assert_eq!(token_from_response(&body).unwrap(), "abcdefghijklmnop");
    }

    #[test]
    fn test_free_account_rejected() {
        let body = json!({
            "user_auth_token": "abcdefghijklmnop",
            "credential": {"parameters": {}}
        });

        assert!(matches!(token_from_response(&body), Err(LoginError::FreeAccount)));
    }

    #[test]
    fn test_missing_token() {
        let body = json!({"credential": {"parameters": {"hires_streaming": true}}});

        assert!(matches!(token_from_response(&body), Err(LoginError::MissingToken)));
    }

    #[test]
    fn test_error_for_status() {
        let body = json!({"status": "error", "code": 500, "message": "Server is down"});

        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, &body),
            LoginError::InvalidAppId
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, &body),
            LoginError::InvalidCredentials
        ));
        assert_eq!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, &body).to_string(),
            "API error (500): Server is down"
        );
    }
}
