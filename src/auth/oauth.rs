use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

use super::token::TokenSet;
use super::token_store::TokenStore;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const OAUTH_CALLBACK_TIMEOUT_SECS: u64 = 180;
const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/gmail.modify https://www.googleapis.com/auth/gmail.send openid email";

#[derive(Debug, Serialize)]
pub struct AuthLoginResult {
    pub profile: String,
    pub opened_browser: bool,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub profile: String,
    pub logged_in: bool,
    pub email: Option<String>,
    pub expired: Option<bool>,
    pub expires_in_seconds: Option<i64>,
    pub has_refresh_token: Option<bool>,
    pub note: Option<String>,
}

impl AuthStatus {
    fn logged_out(profile: &str, note: String) -> Self {
        Self {
            profile: profile.to_string(),
            logged_in: false,
            email: None,
            expired: None,
            expires_in_seconds: None,
            has_refresh_token: None,
            note: Some(note),
        }
    }
}

#[derive(Debug, Default)]
pub struct AuthService;

impl AuthService {
    /// Runs the one-time consent flow and stores the resulting refresh token.
    pub async fn login<S: TokenStore>(
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<AuthLoginResult> {
        let oauth = OAuthConfig::from_settings(settings)?;
        let flow = LoginFlow::new(&oauth)?;
        let opened_browser = open_browser(&flow.authorization_url);

        if !opened_browser {
            eprintln!(
                "open this URL in your browser to continue login:\n{}",
                flow.authorization_url
            );
        }

        let code = wait_for_auth_callback(
            &oauth.redirect_uri,
            &flow.state,
            Duration::from_secs(OAUTH_CALLBACK_TIMEOUT_SECS),
        )
        .await?;

        let mut token = request_token(
            &oauth,
            Grant::AuthorizationCode {
                code: &code,
                code_verifier: &flow.code_verifier,
            },
        )
        .await?;
        token.email = fetch_email(&token.access_token).await.unwrap_or_default();
        store.save(profile, &token)?;
        info!(profile, email = ?token.email, "oauth login completed");

        Ok(AuthLoginResult {
            profile: profile.to_string(),
            opened_browser,
            email: token.email,
        })
    }

    /// Returns a usable token for `profile`, exchanging the refresh token when
    /// the stored access token has expired.
    pub async fn refresh<S: TokenStore>(
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<TokenSet> {
        let current = store.load(profile)?.ok_or_else(|| {
            AppError::Auth(format!(
                "profile `{profile}` is not logged in. run `gmail-autoreply auth login`"
            ))
        })?;

        if !current.is_expired(SystemTime::now()) {
            return Ok(current);
        }

        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            AppError::Auth("access token expired and no refresh token is stored".to_string())
        })?;

        let oauth = OAuthConfig::from_settings(settings)?;
        let mut refreshed = request_token(
            &oauth,
            Grant::RefreshToken {
                refresh_token: &refresh_token,
            },
        )
        .await?;
        refreshed.refresh_token.get_or_insert(refresh_token);
        refreshed.email = current.email;

        store.save(profile, &refreshed)?;
        debug!(profile, "access token refreshed");
        Ok(refreshed)
    }

    pub fn status<S: TokenStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let Some(token) = store.load(profile)? else {
            return Ok(AuthStatus::logged_out(profile, "no token found".to_string()));
        };

        let now = SystemTime::now();
        Ok(AuthStatus {
            profile: profile.to_string(),
            logged_in: true,
            email: token.email.clone(),
            expired: Some(token.is_expired(now)),
            expires_in_seconds: token.expires_in_seconds(now),
            has_refresh_token: Some(token.has_refresh_token()),
            note: None,
        })
    }

    pub async fn logout<S: TokenStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let note = match store.load(profile)? {
            Some(token) => {
                let revocable = token.refresh_token.as_deref().unwrap_or(&token.access_token);
                match revoke_token(revocable).await {
                    Ok(()) => "remote token revoked and local credentials removed".to_string(),
                    Err(err) => {
                        warn!(profile, error = %err, "token revocation failed");
                        format!("local credentials removed (revoke failed: {err})")
                    }
                }
            }
            None => "local credentials removed".to_string(),
        };

        store.clear(profile)?;
        Ok(AuthStatus::logged_out(profile, note))
    }
}

#[derive(Debug)]
struct OAuthConfig {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl OAuthConfig {
    fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self {
            client_id: settings.client_id()?.to_string(),
            client_secret: settings.client_secret().map(ToOwned::to_owned),
            redirect_uri: settings.redirect_uri(),
        })
    }
}

#[derive(Debug)]
struct LoginFlow {
    authorization_url: String,
    code_verifier: String,
    state: String,
}

impl LoginFlow {
    fn new(config: &OAuthConfig) -> AppResult<Self> {
        let state = random_token(32);
        let code_verifier = random_token(96);

        let mut url = Url::parse(GOOGLE_AUTH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", OAUTH_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce_challenge(&code_verifier))
            .append_pair("code_challenge_method", "S256");

        Ok(Self {
            authorization_url: url.to_string(),
            code_verifier,
            state,
        })
    }
}

enum Grant<'a> {
    AuthorizationCode {
        code: &'a str,
        code_verifier: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
    },
}

impl Grant<'_> {
    fn form(&self, config: &OAuthConfig) -> Vec<(&'static str, String)> {
        let mut form = vec![("client_id", config.client_id.clone())];

        match self {
            Grant::AuthorizationCode {
                code,
                code_verifier,
            } => {
                form.push(("grant_type", "authorization_code".to_string()));
                form.push(("code", code.to_string()));
                form.push(("code_verifier", code_verifier.to_string()));
                form.push(("redirect_uri", config.redirect_uri.clone()));
            }
            Grant::RefreshToken { refresh_token } => {
                form.push(("grant_type", "refresh_token".to_string()));
                form.push(("refresh_token", refresh_token.to_string()));
            }
        }

        if let Some(client_secret) = &config.client_secret {
            form.push(("client_secret", client_secret.clone()));
        }

        form
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
}

async fn request_token(config: &OAuthConfig, grant: Grant<'_>) -> AppResult<TokenSet> {
    let response = reqwest::Client::new()
        .post(GOOGLE_TOKEN_ENDPOINT)
        .form(&grant.form(config))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AppError::Auth(format!(
            "oauth token exchange failed ({status}): {}",
            describe_oauth_error(&body)
        )));
    }

    let payload: OAuthTokenResponse = serde_json::from_str(&body)?;
    Ok(TokenSet {
        access_token: payload.access_token,
        refresh_token: payload.refresh_token,
        expires_at_unix: expires_at_unix(payload.expires_in),
        token_type: payload.token_type,
        scope: payload.scope,
        email: None,
    })
}

fn describe_oauth_error(body: &str) -> String {
    match serde_json::from_str::<OAuthErrorResponse>(body) {
        Ok(payload) => format!(
            "{} ({})",
            payload
                .error
                .unwrap_or_else(|| "unknown_oauth_error".to_string()),
            payload
                .error_description
                .unwrap_or_else(|| "no description".to_string())
        ),
        Err(_) => body.trim().to_string(),
    }
}

fn expires_at_unix(expires_in: Option<u64>) -> Option<u64> {
    let expires_in = expires_in?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(now.saturating_add(expires_in))
}

async fn fetch_email(access_token: &str) -> AppResult<Option<String>> {
    let response = reqwest::Client::new()
        .get(GOOGLE_USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let payload: UserInfoResponse = response.json().await?;
    Ok(payload.email)
}

async fn revoke_token(token: &str) -> AppResult<()> {
    let response = reqwest::Client::new()
        .post(GOOGLE_REVOKE_ENDPOINT)
        .form(&[("token", token)])
        .send()
        .await?;

    if response.status().is_success() {
        return Ok(());
    }

    Err(AppError::Auth(format!(
        "revoke endpoint returned {}",
        response.status()
    )))
}

async fn wait_for_auth_callback(
    redirect_uri: &str,
    expected_state: &str,
    timeout: Duration,
) -> AppResult<String> {
    let redirect = Url::parse(redirect_uri)?;
    if redirect.scheme() != "http" {
        return Err(AppError::Config(
            "redirect_uri must use http for local callback capture".to_string(),
        ));
    }

    let host = redirect
        .host_str()
        .ok_or_else(|| AppError::Config("redirect_uri is missing host".to_string()))?;
    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| AppError::Config("redirect_uri is missing port".to_string()))?;

    let listener = TcpListener::bind((host, port)).await.map_err(|err| {
        AppError::Auth(format!(
            "failed to bind oauth callback listener on {host}:{port}: {err}"
        ))
    })?;
    debug!(host, port, "waiting for oauth callback");

    time::timeout(timeout, async {
        let (mut stream, _) = listener.accept().await?;
        let target = read_request_target(&mut stream).await?;

        match extract_callback_code(&target, redirect.path(), expected_state) {
            Ok(code) => {
                write_callback_response(
                    &mut stream,
                    "200 OK",
                    "gmail-autoreply is authorized. you can return to the terminal.",
                )
                .await?;
                Ok(code)
            }
            Err(err) => {
                let _ = write_callback_response(
                    &mut stream,
                    "400 Bad Request",
                    &format!("oauth callback error: {err}"),
                )
                .await;
                Err(err)
            }
        }
    })
    .await
    .map_err(|_| AppError::Auth("timed out waiting for oauth callback".to_string()))?
}

async fn read_request_target(stream: &mut TcpStream) -> AppResult<String> {
    let mut buf = vec![0_u8; 8192];
    let size = stream.read(&mut buf).await?;
    if size == 0 {
        return Err(AppError::Auth("empty oauth callback request".to_string()));
    }

    let request = String::from_utf8_lossy(&buf[..size]);
    let mut parts = request.lines().next().unwrap_or_default().split_whitespace();

    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Ok(target.to_string()),
        (Some(_), Some(_)) => {
            write_callback_response(
                stream,
                "405 Method Not Allowed",
                "oauth callback only accepts GET requests",
            )
            .await?;
            Err(AppError::Auth(
                "oauth callback received non-GET request".to_string(),
            ))
        }
        _ => Err(AppError::Auth(
            "malformed oauth callback request".to_string(),
        )),
    }
}

fn extract_callback_code(
    target: &str,
    expected_path: &str,
    expected_state: &str,
) -> AppResult<String> {
    let callback_url = Url::parse(&format!("http://localhost{target}"))?;
    if callback_url.path() != expected_path {
        return Err(AppError::Auth(format!(
            "oauth callback path mismatch: expected {expected_path}, got {}",
            callback_url.path()
        )));
    }

    let param = |name: &str| {
        callback_url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(error) = param("error") {
        let description = param("error_description").unwrap_or_else(|| "no description".to_string());
        return Err(AppError::Auth(format!(
            "oauth authorization failed: {error} ({description})"
        )));
    }

    match param("state") {
        Some(state) if state == expected_state => {}
        Some(_) => {
            return Err(AppError::Auth(
                "oauth state mismatch; aborting login".to_string(),
            ));
        }
        None => {
            return Err(AppError::Auth(
                "oauth callback missing state parameter".to_string(),
            ));
        }
    }

    param("code").ok_or_else(|| AppError::Auth("oauth callback missing code parameter".to_string()))
}

async fn write_callback_response(
    stream: &mut TcpStream,
    status: &str,
    message: &str,
) -> AppResult<()> {
    let body = format!(
        "<!doctype html><html><body><p>{}</p></body></html>",
        escape_html(message)
    );

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = std::process::Command::new("open");
        command.arg(url);
        command
    };

    #[cfg(target_os = "linux")]
    let mut command = {
        let mut command = std::process::Command::new("xdg-open");
        command.arg(url);
        command
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = std::process::Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    };

    #[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
    {
        command.status().is_ok_and(|status| status.success())
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = url;
        false
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
