//! Agent settings commands

use anyhow::Result;
use clap::Subcommand;

use crate::cli::Context;
use crate::cli::output::{print_formatted, print_success};
use crate::error::ApiError;
use crate::model::Settings;
use crate::settings_form::{FIELDS, SettingsForm, join_list};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the agent's current settings
    Show,

    /// Change one setting and save it to the agent
    Set {
        /// Setting name (e.g. "priority", "priority_mode", "proxy")
        key: String,

        /// New value; game lists are comma separated
        value: String,
    },
}

pub async fn run(command: SettingsCommands, ctx: &Context) -> Result<()> {
    match command {
        SettingsCommands::Show => show(ctx).await,
        SettingsCommands::Set { key, value } => set(&key, &value, ctx).await,
    }
}

async fn show(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let settings = client.fetch_settings().await?;
    print_formatted(&settings, ctx.format, format_settings);
    Ok(())
}

async fn set(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let current = client.fetch_settings().await?;

    let mut form = SettingsForm::from_settings(&current);
    form.set_field(key, value)?;

    let saved = match client.put_settings(&form.to_settings()).await {
        Ok(saved) => saved,
        Err(err @ ApiError::Status { .. }) if err.is_validation() => {
            anyhow::bail!("Agent rejected settings: {}", err.message())
        }
        Err(err) => return Err(err.into()),
    };

    print_success(&format!("Set {} = {}", key, value), ctx.quiet);
    if !ctx.quiet {
        print_formatted(&saved, ctx.format, format_settings);
    }
    Ok(())
}

fn format_settings(settings: &Settings) -> String {
    let width = FIELDS.iter().map(|f| f.len()).max().unwrap_or(0);
    let row = |name: &str, value: String| format!("{:<width$}  {}", name, value, width = width);

    [
        row("language", settings.language.clone()),
        row("proxy", settings.proxy.clone()),
        row("priority", join_list(&settings.priority)),
        row("exclude", join_list(&settings.exclude)),
        row("priority_mode", settings.priority_mode.as_str().to_string()),
        row("connection_quality", settings.connection_quality.to_string()),
        row("available_drops_check", settings.available_drops_check.to_string()),
        row("enable_badges_emotes", settings.enable_badges_emotes.to_string()),
        row("tray_notifications", settings.tray_notifications.to_string()),
        row("autostart_tray", settings.autostart_tray.to_string()),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::config::Config;
    use httpmock::prelude::*;
    use serde_json::json;

    fn context(base_url: String) -> Context {
        let mut config = Config::default();
        config.server.base_url = base_url;
        Context {
            config,
            format: OutputFormat::Text,
            quiet: true,
        }
    }

    #[test]
    fn test_format_settings_lists_every_field() {
        let settings = Settings {
            priority: vec!["Game A".into(), "Game B".into()],
            ..Default::default()
        };
        let text = format_settings(&settings);
        assert_eq!(text.lines().count(), FIELDS.len());
        assert!(text.contains("Game A, Game B"));
        assert!(text.contains("PRIORITY_ONLY"));
    }

    #[tokio::test]
    async fn test_set_priority_puts_parsed_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/settings");
                then.status(200).json_body(json!({ "priority": ["Old"], "language": "English" }));
            })
            .await;
        let put = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/settings")
                    .json_body(json!({
                        "language": "English",
                        "proxy": "",
                        "priority": ["Game A", "Game B"],
                        "exclude": [],
                        "priority_mode": "PRIORITY_ONLY",
                        "connection_quality": 1,
                        "available_drops_check": false,
                        "enable_badges_emotes": false,
                        "tray_notifications": true,
                        "autostart_tray": false
                    }));
                then.status(200)
                    .json_body(json!({ "priority": ["Game A", "Game B"], "language": "English" }));
            })
            .await;

        set("priority", "Game A, , Game B", &context(server.base_url()))
            .await
            .unwrap();
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_reports_validation_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/settings");
                then.status(200).json_body(json!({}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/settings");
                then.status(400)
                    .json_body(json!({ "error": ["Unsupported or invalid field: proxy"] }));
            })
            .await;

        let err = set("proxy", "nonsense", &context(server.base_url()))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Agent rejected settings: Unsupported or invalid field: proxy"
        );
    }

    #[tokio::test]
    async fn test_unknown_field_rejected_before_put() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/settings");
                then.status(200).json_body(json!({}));
            })
            .await;
        let err = set("volume", "11", &context(server.base_url()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown settings field: volume");
    }
}
