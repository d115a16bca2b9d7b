use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::ResponderSettings;

#[derive(Debug, Parser)]
#[command(
    name = "gmail-autoreply",
    version,
    about = "Acknowledge unread Gmail messages on a randomized polling loop"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Auth(AuthArgs),
    /// Poll until interrupted
    Run(ResponderArgs),
    /// Run a single poll cycle and print its report
    Once(ResponderArgs),
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Login(LoginArgs),
    Status,
    Logout,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, help = "Import the oauth client from a Google client-secret json file")]
    pub credentials: Option<PathBuf>,
}

#[derive(Debug, Default, Args)]
pub struct ResponderArgs {
    #[arg(long, help = "Gmail search query selecting messages to answer")]
    pub query: Option<String>,
    #[arg(long, help = "Name of the marker label applied to handled messages")]
    pub label: Option<String>,
    #[arg(long, help = "Reply body text")]
    pub body: Option<String>,
    #[arg(long, value_name = "SECS", help = "Lower bound of the pause between polls")]
    pub min_interval: Option<u64>,
    #[arg(long, value_name = "SECS", help = "Upper bound of the pause between polls")]
    pub max_interval: Option<u64>,
    #[arg(long, help = "Maximum messages fetched per poll")]
    pub batch_size: Option<u32>,
    #[arg(long, help = "Also revisit messages that already carry the marker label")]
    pub include_labeled: bool,
}

impl ResponderArgs {
    /// Layers the flags given on the command line over profile settings.
    pub fn apply(self, mut settings: ResponderSettings) -> ResponderSettings {
        if let Some(query) = self.query {
            settings.query = query;
        }
        if let Some(label) = self.label {
            settings.label_name = label;
        }
        if let Some(body) = self.body {
            settings.reply_body = body;
        }
        if let Some(secs) = self.min_interval {
            settings.min_interval_secs = secs;
        }
        if let Some(secs) = self.max_interval {
            settings.max_interval_secs = secs;
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        if self.include_labeled {
            settings.exclude_labeled = false;
        }
        settings
    }
}
