//! Configuration management commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use crate::cli::output::{OutputFormat, print_formatted, print_success};
use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a specific config value
    Get {
        /// Config key (e.g., "server.base_url", "polling.interval_ms")
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., "server.base_url", "launcher.theme")
        key: String,

        /// Value to set (empty clears optional values)
        value: String,
    },

    /// Show config file path
    Path,
}

#[derive(Serialize)]
struct ConfigPathResult {
    path: String,
    exists: bool,
}

pub async fn run(command: ConfigCommands, format: OutputFormat, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => show(format).await,
        ConfigCommands::Get { key } => get(&key, format).await,
        ConfigCommands::Set { key, value } => set(&key, &value, quiet).await,
        ConfigCommands::Path => path(format).await,
    }
}

async fn show(format: OutputFormat) -> Result<()> {
    let config = redacted(Config::load_from(&Config::config_path()?)?);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => println!("{}", toml::to_string_pretty(&config)?),
    }

    Ok(())
}

/// Hide secrets before printing
fn redacted(mut config: Config) -> Config {
    let hide = |value: &mut Option<String>| {
        if value.is_some() {
            *value = Some("<hidden>".to_string());
        }
    };
    hide(&mut config.server.api_token);
    hide(&mut config.server.basic_password);
    config
}

async fn get(key: &str, format: OutputFormat) -> Result<()> {
    let config = Config::load_from(&Config::config_path()?)?;
    let value = config.get(key)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&value)?),
        OutputFormat::Text => println!("{}", value),
    }

    Ok(())
}

async fn set(key: &str, value: &str, quiet: bool) -> Result<()> {
    Config::update_saved(|config| config.set(key, value))?;

    print_success(&format!("Set {} = {}", key, value), quiet);
    Ok(())
}

async fn path(format: OutputFormat) -> Result<()> {
    let path = Config::config_path()?;
    let exists = path.exists();

    let result = ConfigPathResult {
        path: path.to_string_lossy().to_string(),
        exists,
    };

    print_formatted(&result, format, |r| {
        format!("{}{}", r.path, if r.exists { "" } else { " (not found)" })
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = Config::default();
        config.server.api_token = Some("tok".into());
        config.server.basic_user = Some("admin".into());

        let shown = redacted(config);
        assert_eq!(shown.server.api_token.as_deref(), Some("<hidden>"));
        assert_eq!(shown.server.basic_user.as_deref(), Some("admin"));
        assert_eq!(shown.server.basic_password, None);
    }
}
