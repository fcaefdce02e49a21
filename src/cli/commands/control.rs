//! Agent control commands

use anyhow::Result;
use serde::Serialize;

use crate::cli::Context;
use crate::cli::output::{OutputFormat, print_status, print_success};
use crate::dispatcher::{self, Action, ActionOutcome};
use crate::model::ChannelRef;

pub async fn start(ctx: &Context) -> Result<()> {
    run_action(Action::Start, ctx).await
}

pub async fn stop(ctx: &Context) -> Result<()> {
    run_action(Action::Stop, ctx).await
}

pub async fn reload(ctx: &Context) -> Result<()> {
    run_action(Action::Reload, ctx).await
}

/// Switch to `channel`, or let the agent pick when it is missing or blank
pub async fn switch(channel: Option<&str>, ctx: &Context) -> Result<()> {
    let target = channel.and_then(ChannelRef::classify);
    run_action(Action::SwitchChannel(target), ctx).await
}

async fn run_action(action: Action, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let outcome = dispatcher::execute(&client, action).await;
    let text = outcome.status_text();

    if !outcome.is_success() {
        anyhow::bail!(text);
    }

    match outcome {
        ActionOutcome::Done { reply, .. } if ctx.format == OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reply)?)
        }
        _ => print_success(&text, ctx.quiet),
    }
    Ok(())
}

#[derive(Serialize)]
struct HealthResult {
    url: String,
    reachable: bool,
    status: Option<String>,
    running: Option<bool>,
    error: Option<String>,
}

pub async fn health(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let url = client.base_url().to_string();

    let result = match client.health().await {
        Ok(health) => HealthResult {
            url,
            reachable: true,
            status: Some(health.status),
            running: Some(health.running),
            error: None,
        },
        Err(err) => HealthResult {
            url,
            reachable: false,
            status: None,
            running: None,
            error: Some(err.message()),
        },
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            print_status(result.reachable, &format!("Agent at {}", result.url));
            if let Some(running) = result.running {
                print_status(running, "Mining loop running");
            }
            if let Some(err) = &result.error {
                println!("     {}", err);
            }
        }
    }

    if !result.reachable {
        anyhow::bail!("Agent is not reachable");
    }
    Ok(())
}
