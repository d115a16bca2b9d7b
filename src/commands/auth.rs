use std::io::{self, IsTerminal, Write};

use crate::auth::AuthService;
use crate::cli::{AuthCommand, LoginArgs};
use crate::config::{self, Settings};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

pub async fn run(ctx: &AppContext, command: AuthCommand) -> AppResult<()> {
    match command {
        AuthCommand::Login(args) => {
            let settings = ensure_login_settings(ctx, args)?;
            let result = AuthService::login(&ctx.profile, &settings, &ctx.token_store).await?;

            let text = match result.email.as_deref() {
                Some(email) => format!("{}: logged in as {email}", result.profile),
                None => format!("{}: logged in", result.profile),
            };
            ctx.output.emit(&text, &result)
        }
        AuthCommand::Status => {
            let status = AuthService::status(&ctx.profile, &ctx.token_store)?;
            let text = if status.logged_in {
                let account = status
                    .email
                    .as_ref()
                    .map(|email| format!(" as {email}"))
                    .unwrap_or_default();
                let refresh_hint = match status.has_refresh_token {
                    Some(true) => " (refresh available)",
                    Some(false) => " (no refresh token)",
                    None => "",
                };
                format!("{}: logged in{account}{refresh_hint}", status.profile)
            } else {
                format!("{}: logged out", status.profile)
            };

            ctx.output.emit(&text, &status)
        }
        AuthCommand::Logout => {
            let status = AuthService::logout(&ctx.profile, &ctx.token_store).await?;
            let text = format!("{}: logged out", status.profile);
            ctx.output.emit(&text, &status)
        }
    }
}

fn ensure_login_settings(ctx: &AppContext, args: LoginArgs) -> AppResult<Settings> {
    let mut settings = ctx.settings.clone();
    let settings_path = ctx.paths.settings_file(&ctx.profile);

    if let Some(path) = args.credentials {
        config::settings::import_client_secret(&path, &mut settings)?;
        config::save_settings(&ctx.paths, &ctx.profile, &settings)?;
        println!(
            "Imported oauth client from {} into {}.",
            path.display(),
            settings_path.display()
        );
        return Ok(settings);
    }

    let missing_client_id = is_blank(settings.client_id.as_deref());
    let missing_client_secret = is_blank(settings.client_secret.as_deref());
    if !missing_client_id && !missing_client_secret {
        return Ok(settings);
    }

    if !io::stdin().is_terminal() {
        return Err(AppError::Config(format!(
            "missing oauth client in {}. pass --credentials <client_secret.json> or run in an interactive terminal",
            settings_path.display(),
        )));
    }

    println!(
        "OAuth client config is missing for profile `{}`.",
        ctx.profile
    );

    if missing_client_id {
        settings.client_id = Some(prompt_required("OAuth client_id: ")?);
    }

    if missing_client_secret {
        settings.client_secret = Some(prompt_required("OAuth client_secret: ")?);
    }

    config::save_settings(&ctx.paths, &ctx.profile, &settings)?;
    println!("Saved profile settings to {}.", settings_path.display());

    Ok(settings)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).is_none_or(str::is_empty)
}

fn prompt_required(prompt: &str) -> AppResult<String> {
    loop {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut value = String::new();
        io::stdin().read_line(&mut value)?;
        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        eprintln!("value is required");
    }
}
