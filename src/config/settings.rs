use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8787/callback";

pub const DEFAULT_QUERY: &str = "label:inbox is:unread";
pub const DEFAULT_REPLY_BODY: &str = "Thank you for your Message!";
pub const DEFAULT_LABEL_NAME: &str = "UNREADMSG";
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_MAX_INTERVAL_SECS: u64 = 45;
pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const MAX_INTERVAL_CEILING_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub responder: ResponderSettings,
}

impl Settings {
    pub fn client_id(&self) -> AppResult<&str> {
        self.client_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "missing oauth client_id in profile settings. run `gmail-autoreply auth login --credentials <file>`"
                        .to_string(),
                )
            })
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn redirect_uri(&self) -> String {
        self.redirect_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
    }
}

/// Tunables for the polling responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderSettings {
    pub query: String,
    pub reply_body: String,
    pub label_name: String,
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    pub batch_size: u32,
    pub exclude_labeled: bool,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            reply_body: DEFAULT_REPLY_BODY.to_string(),
            label_name: DEFAULT_LABEL_NAME.to_string(),
            min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
            max_interval_secs: DEFAULT_MAX_INTERVAL_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            exclude_labeled: true,
        }
    }
}

impl ResponderSettings {
    pub fn validate(&self) -> AppResult<()> {
        if self.label_name.trim().is_empty() {
            return Err(AppError::Config("label_name must not be empty".to_string()));
        }

        if self.batch_size == 0 {
            return Err(AppError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.min_interval_secs > self.max_interval_secs {
            return Err(AppError::Config(format!(
                "min_interval_secs ({}) must not exceed max_interval_secs ({})",
                self.min_interval_secs, self.max_interval_secs
            )));
        }

        if self.max_interval_secs > MAX_INTERVAL_CEILING_SECS {
            return Err(AppError::Config(format!(
                "max_interval_secs ({}) must not exceed {MAX_INTERVAL_CEILING_SECS}",
                self.max_interval_secs
            )));
        }

        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_interval_secs)
    }

    /// Query sent to the mailbox, excluding already tagged messages when enabled.
    pub fn effective_query(&self) -> String {
        let query = self.query.trim();
        if !self.exclude_labeled {
            return query.to_string();
        }

        let label = search_label_term(&self.label_name);
        if query.is_empty() {
            format!("-label:{label}")
        } else {
            format!("{query} -label:{label}")
        }
    }
}

/// Label name as Gmail search spells it: whitespace and reserved punctuation
/// become `-`.
fn search_label_term(name: &str) -> String {
    name.split(|ch: char| {
        ch.is_whitespace()
            || matches!(
                ch,
                '/' | '"' | '\'' | '(' | ')' | '{' | '}' | '[' | ']' | ',' | ':'
            )
    })
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-")
}

pub fn load(path: PathBuf) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}

pub fn save(path: PathBuf, settings: &Settings) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_string_pretty(settings)?;
    fs::write(&path, payload)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ClientSecretBundle {
    installed: Option<ClientSecretEntry>,
    web: Option<ClientSecretEntry>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretEntry {
    client_id: String,
    client_secret: Option<String>,
}

/// Copies the oauth client from a Google client-secret download into `settings`.
pub fn import_client_secret(path: &Path, settings: &mut Settings) -> AppResult<()> {
    let raw = fs::read_to_string(path)?;
    let bundle: ClientSecretBundle = serde_json::from_str(&raw)?;
    let entry = bundle.installed.or(bundle.web).ok_or_else(|| {
        AppError::Config(format!(
            "{} has neither an `installed` nor a `web` client",
            path.display()
        ))
    })?;

    settings.client_id = Some(entry.client_id);
    if entry.client_secret.is_some() {
        settings.client_secret = entry.client_secret;
    }

    Ok(())
}
