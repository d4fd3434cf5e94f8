use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

const PLAY_BASE: &str = "https://play.qobuz.com";
const API_BASE: &str = "https://www.qobuz.com/api.json/0.2";

/// Characters appended to every obfuscated secret.
const SECRET_TAIL: usize = 44;

#[derive(Debug)]
pub enum AppSecretsError {
    BundleNotFound,
    AppIdNotFound,
    NoValidSecret { app_id: String },
    PatternError(regex::Error),
    ReqwestError(reqwest::Error),
}

impl fmt::Display for AppSecretsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppSecretsError::BundleNotFound => write!(f, "Could not find bundle URL."),
            AppSecretsError::AppIdNotFound => write!(f, "Could not find app ID."),
            AppSecretsError::NoValidSecret { app_id } => write!(
                f,
                "Could not find a valid secret after testing candidates (app id {})",
                app_id
            ),
            AppSecretsError::PatternError(e) => write!(f, "Pattern error: {}", e),
            AppSecretsError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
        }
    }
}

impl std::error::Error for AppSecretsError {}

impl From<reqwest::Error> for AppSecretsError {
    fn from(error: reqwest::Error) -> Self {
        AppSecretsError::ReqwestError(error)
    }
}

impl From<regex::Error> for AppSecretsError {
    fn from(error: regex::Error) -> Self {
        AppSecretsError::PatternError(error)
    }
}

/// The pair a Qobuz module needs in its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

fn bundle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<script src="(/resources/\d+\.\d+\.\d+-[a-z]\d{3}/bundle\.js)"></script>"#)
            .expect("static regex")
    })
}

fn app_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"production:\{api:\{appId:"(?P<app_id>\d{9})",appSecret:"(\w{32})"#)
            .expect("static regex")
    })
}

fn seed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"[a-z]\.initialSeed\("(?P<seed>[\w=]+)",window\.utimezone\.(?P<timezone>[a-z]+)\)"#,
        )
        .expect("static regex")
    })
}

/// Path of the web player's script bundle, as linked from its login page.
pub fn bundle_path(login_page: &str) -> Option<&str> {
    bundle_regex()
        .captures(login_page)
        .and_then(|captures| captures.get(1))
        .map(|path| path.as_str())
}

/// The nine digit production app id embedded in the bundle.
pub fn app_id(bundle: &str) -> Option<&str> {
    app_id_regex()
        .captures(bundle)
        .and_then(|captures| captures.name("app_id"))
        .map(|id| id.as_str())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reassembles the secrets hidden in the bundle, in the order their seeds appear.
///
/// Each timezone contributes a seed, then the `info` and `extras` strings of
/// the matching timezone entry. The joined parts, minus a fixed tail, are
/// base64. Candidates that do not decode to UTF-8 text are dropped.
pub fn candidate_secrets(bundle: &str) -> Result<Vec<String>, AppSecretsError> {
    let mut parts: Vec<(String, Vec<String>)> = Vec::new();
    for captures in seed_regex().captures_iter(bundle) {
        let seed = captures["seed"].to_string();
        let timezone = captures["timezone"].to_string();
        match parts.iter_mut().find(|(name, _)| *name == timezone) {
            Some((_, pieces)) => *pieces = vec![seed],
            None => parts.push((timezone, vec![seed])),
        }
    }
    if parts.is_empty() {
        return Ok(Vec::new());
    }

    let timezones = parts
        .iter()
        .map(|(name, _)| regex::escape(&capitalize(name)))
        .collect::<Vec<_>>()
        .join("|");
    let info_extras = Regex::new(&format!(
        r#"name:"\w+/(?P<timezone>{timezones})",info:"(?P<info>[\w=]+)",extras:"(?P<extras>[\w=]+)""#
    ))?;
    for captures in info_extras.captures_iter(bundle) {
        let timezone = captures["timezone"].to_lowercase();
        if let Some((_, pieces)) = parts.iter_mut().find(|(name, _)| *name == timezone) {
            pieces.push(captures["info"].to_string());
            pieces.push(captures["extras"].to_string());
        }
    }

    let secrets = parts
        .into_iter()
        .filter_map(|(timezone, pieces)| {
            let joined = pieces.concat();
            let encoded = joined.get(..joined.len().saturating_sub(SECRET_TAIL))?;
            let decoded = STANDARD.decode(encoded).ok()?;
            match String::from_utf8(decoded) {
                Ok(secret) if !secret.is_empty() => Some(secret),
                _ => {
                    tracing::debug!(%timezone, "candidate secret did not decode");
                    None
                }
            }
        })
        .collect();
    Ok(secrets)
}

/// Signature of a `track/getFileUrl` request for track 1 in format 27.
pub fn request_signature(timestamp: &str, secret: &str) -> String {
    let payload = format!("trackgetFileUrlformat_id27intentstreamtrack_id1{timestamp}{secret}");
    format!("{:x}", Md5::digest(payload.as_bytes()))
}

/// Reads the current web player's app id and finds the secret that signs requests.
pub struct SecretScraper {
    client: Client,
    play_base: String,
    api_base: String,
}

impl SecretScraper {
    pub fn new() -> Result<Self, AppSecretsError> {
        Self::with_base_urls(PLAY_BASE, API_BASE)
    }

    pub fn with_base_urls(play_base: &str, api_base: &str) -> Result<Self, AppSecretsError> {
        Ok(Self {
            client: Client::builder().build()?,
            play_base: play_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn page(&self, path: &str) -> Result<String, AppSecretsError> {
        let url = format!("{}{}", self.play_base, path);
        Ok(self.client.get(&url).send().await?.text().await?)
    }

    /// A secret is accepted unless the signed request is rejected with 400.
    async fn accepts(&self, app_id: &str, secret: &str) -> Result<bool, AppSecretsError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
            .to_string();
        let signature = request_signature(&timestamp, secret);

        let url = format!("{}/track/getFileUrl", self.api_base);
        let response = self
            .client
            .get(&url)
            .header("X-App-Id", app_id)
            .query(&[
                ("format_id", "27"),
                ("intent", "stream"),
                ("track_id", "1"),
                ("request_ts", timestamp.as_str()),
                ("request_sig", signature.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "secret checked");
        Ok(status != StatusCode::BAD_REQUEST)
    }

    pub async fn fetch(&self) -> Result<AppCredentials, AppSecretsError> {
        let login_page = self.page("/login").await?;
        let bundle_path = bundle_path(&login_page).ok_or(AppSecretsError::BundleNotFound)?;
        let bundle = self.page(bundle_path).await?;

        let app_id = app_id(&bundle)
            .ok_or(AppSecretsError::AppIdNotFound)?
            .to_string();
        let candidates = candidate_secrets(&bundle)?;
        tracing::debug!(candidates = candidates.len(), "secrets recovered from bundle");

        for secret in candidates {
            if self.accepts(&app_id, &secret).await? {
                return Ok(AppCredentials {
                    app_id,
                    app_secret: secret,
                });
            }
        }
        Err(AppSecretsError::NoValidSecret { app_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SECRET: &str = "abcdefghijklmnopqrstuvwxyz012345";
    const LOGIN_PAGE: &str =
        r#"<html><script src="/resources/7.1.3-b011/bundle.js"></script></html>"#;

    fn tail() -> String {
        "A".repeat(SECRET_TAIL)
    }

    /// A bundle hiding `SECRET` under Berlin and undecodable text under London.
    fn bundle() -> String {
        format!(
            concat!(
                r#"var a=production:{{api:{{appId:"123456789",appSecret:"0123456789abcdef0123456789abcdef"}}}};"#,
                r#"n.initialSeed("YWJjZGVmZ2hpamtsbW5v",window.utimezone.berlin);"#,
                r#"n.initialSeed("badx",window.utimezone.london);"#,
                r#"{{name:"Europe/Berlin",info:"cHFyc3R1dnd4eXowMTIzNDU=",extras:"{tail}"}},"#,
                r#"{{name:"Europe/London",info:"AAAA",extras:"{tail}"}}"#,
            ),
            tail = tail()
        )
    }

    /// Serves the login page and the bundle, and answers every secret check with `check_status`.
    async fn serve(check_status: u16) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let bundle = bundle();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buffer = vec![0u8; 8192];
                let read = stream.read(&mut buffer).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buffer[..read]).to_string();
                let (status, body) = if request.starts_with("GET /login ") {
                    (200, LOGIN_PAGE.to_string())
                } else if request.starts_with("GET /resources/7.1.3-b011/bundle.js ") {
                    (200, bundle.clone())
                } else if request.starts_with("GET /track/getFileUrl?") {
                    (check_status, "{}".to_string())
                } else {
                    (404, String::new())
                };
                let response = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{address}")
    }

    #[test]
    fn test_bundle_path() {
        assert_eq!(bundle_path(LOGIN_PAGE), Some("/resources/7.1.3-b011/bundle.js"));
        assert_eq!(bundle_path("<html></html>"), None);
    }

    #[test]
    fn test_app_id() {
        assert_eq!(app_id(&bundle()), Some("123456789"));
        assert_eq!(app_id("production:{api:{appId:\"12\""), None);
    }

    #[test]
    fn test_candidate_secrets_skip_undecodable() {
        let secrets = candidate_secrets(&bundle()).unwrap();

        assert_eq!(secrets, vec![SECRET.to_string()]);
    }

    #[test]
    fn test_candidate_secrets_without_seeds() {
        assert!(candidate_secrets("no seeds here").unwrap().is_empty());
    }

    #[test]
    fn test_request_signature() {
        assert_eq!(
            request_signature("1700000000", SECRET),
            "1ffa59b5861c1e7d0442b1aaece59bee"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_first_accepted_secret() {
        let base = serve(200).await;
        let scraper = SecretScraper::with_base_urls(&base, &base).unwrap();

        let credentials = scraper.fetch().await.unwrap();

        assert_eq!(
            credentials,
            AppCredentials {
                app_id: "123456789".to_string(),
                app_secret: SECRET.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_without_accepted_secret() {
        let base = serve(400).await;
        let scraper = SecretScraper::with_base_urls(&base, &base).unwrap();

        match scraper.fetch().await {
            Err(AppSecretsError::NoValidSecret { app_id }) => assert_eq!(app_id, "123456789"),
            other => panic!("expected no valid secret, got {:?}", other),
        }
    }
}
