//! Login and logout commands
//!
//! `larder login` runs the email-code flow: request a code, read it
//! from stdin, verify it, and persist the resulting session next to
//! the config file. `larder logout` removes the session; local records
//! are kept.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use larder_api::HttpAuthService;
use larder_core::config::Config;
use larder_core::domain::Session;
use larder_core::ports::IAuthService;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address of the household account
    pub email: String,
}

impl LoginCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let auth = HttpAuthService::new(&config.server.base_url);

        formatter.info(&format!("Sending a login code to {}...", self.email));
        auth.request_code(&self.email)
            .await
            .context("Failed to request a login code")?;

        let code = prompt_code()?;

        let session = auth
            .verify_code(&self.email, code.trim())
            .await
            .context("Code verification failed")?;

        let session_path = Session::default_path();
        session
            .save(&session_path)
            .context("Failed to persist session")?;

        info!(
            email = %session.email,
            family_id = %session.family_id,
            "Login succeeded"
        );

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::json!({
                "email": session.email,
                "family_id": session.family_id.as_str(),
            }));
        } else {
            formatter.success(&format!(
                "Logged in as {} (family {})",
                session.email, session.family_id
            ));
        }

        Ok(())
    }
}

/// Reads the emailed code from stdin
fn prompt_code() -> Result<String> {
    print!("Enter the code from your email: ");
    std::io::stdout().flush()?;

    let mut code = String::new();
    std::io::stdin()
        .read_line(&mut code)
        .context("Failed to read code from stdin")?;
    Ok(code)
}

#[derive(Debug, Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        Session::remove(&Session::default_path()).context("Failed to remove session")?;
        formatter.success("Logged out. Local records are kept on this device.");
        Ok(())
    }
}
