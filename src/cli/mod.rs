//! CLI module for Dropdeck
//!
//! Headless access to the same agent operations the dashboard offers.
//! Running without a subcommand opens the dashboard instead.

mod commands;
mod output;
pub mod shell;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::AgentClient;
use crate::config::Config;

pub use output::{OutputFormat, print_error};

/// Dropdeck - control panel for a Twitch drops mining agent
#[derive(Parser, Debug)]
#[command(name = "dropdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[command(flatten)]
    pub output: OutputOptions,

    /// Agent base URL (overrides config and DROPDECK_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// View link to open the dashboard with, e.g. "filter=active&prio=1"
    #[arg(long)]
    pub view: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output formatting options
#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Output in JSON format (for machine parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show agent state and the campaign list
    Status(commands::status::ViewArgs),

    /// List tracked channels
    Channels,

    /// Keep re-rendering status until interrupted
    Watch {
        /// View link to render with
        #[arg(long)]
        view: Option<String>,
    },

    /// Start mining
    Start,

    /// Stop mining
    Stop,

    /// Reload inventory and channels
    Reload,

    /// Switch channel (omit the channel to let the agent choose)
    Switch {
        /// Channel login or numeric id
        channel: Option<String>,
    },

    /// Check that the agent is reachable
    Health,

    /// Agent settings
    Settings {
        #[command(subcommand)]
        command: commands::settings::SettingsCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },

    /// Interactive shell
    Shell,
}

/// Shared inputs for command handlers
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Load config and apply the `--url` override
    pub fn load(url: Option<&str>, format: OutputFormat, quiet: bool) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(url) = url {
            config.server.base_url = url.to_string();
        }
        Ok(Self {
            config,
            format,
            quiet,
        })
    }

    pub fn client(&self) -> Result<AgentClient> {
        AgentClient::from_config(&self.config.server)
    }
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        anyhow::bail!("No command given");
    };

    if matches!(command, Commands::Shell) {
        return shell::run(cli.url).await;
    }

    let ctx = Context::load(cli.url.as_deref(), cli.output.format(), cli.output.quiet)?;
    dispatch(command, &ctx).await
}

/// Run one non-shell command
async fn dispatch(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Status(args) => commands::status::status(args, ctx).await,
        Commands::Channels => commands::status::channels(ctx).await,
        Commands::Watch { view } => commands::status::watch(view, ctx).await,
        Commands::Start => commands::control::start(ctx).await,
        Commands::Stop => commands::control::stop(ctx).await,
        Commands::Reload => commands::control::reload(ctx).await,
        Commands::Switch { channel } => commands::control::switch(channel.as_deref(), ctx).await,
        Commands::Health => commands::control::health(ctx).await,
        Commands::Settings { command } => commands::settings::run(command, ctx).await,
        Commands::Config { command } => commands::config::run(command, ctx.format, ctx.quiet).await,
        Commands::Shell => anyhow::bail!("Already in shell mode"),
    }
}
