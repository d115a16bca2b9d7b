use crate::api::client::GmailClient;
use crate::auth::{AuthService, FileTokenStore, TokenSet};
use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::output::Output;

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub paths: AppPaths,
    pub settings: Settings,
    pub token_store: FileTokenStore,
    pub gmail_client: GmailClient,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile);
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        let token_store = FileTokenStore::new(paths.clone());

        Ok(Self {
            profile,
            paths,
            settings,
            token_store,
            gmail_client: GmailClient::new(),
            output: Output::new(json),
        })
    }

    /// Stored token for the profile, refreshed first when it has expired.
    pub async fn token(&self) -> AppResult<TokenSet> {
        AuthService::refresh(&self.profile, &self.settings, &self.token_store).await
    }
}
