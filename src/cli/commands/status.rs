//! Status, channel list and live watch commands

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::time::Instant;

use crate::cli::Context;
use crate::cli::output::{OutputFormat, print_formatted};
use crate::model::Channel;
use crate::poller::{PollOutcome, SnapshotPoller};
use crate::projection::{self, EmptyState, Projection, RuntimeHeader};
use crate::state::DashboardState;
use crate::ticker::{TICK_PERIOD, UptimeClock};
use crate::view_state::{FilterMode, SortMode, ViewStore};

/// View selection for `status`
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Start from a view link, e.g. "filter=active&sort=name"
    #[arg(long)]
    pub view: Option<String>,

    /// Only campaigns whose name or game contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// all, active, progressing or claimed
    #[arg(long)]
    pub filter: Option<String>,

    /// priority, name or progress
    #[arg(long)]
    pub sort: Option<String>,

    /// Only campaigns for priority games
    #[arg(long)]
    pub prio: bool,
}

impl ViewArgs {
    /// Build the view store, flags overriding the link
    pub fn to_store(&self) -> Result<ViewStore> {
        let mut store = ViewStore::from_query(self.view.as_deref().unwrap_or(""));

        let filter = match &self.filter {
            Some(raw) => Some(
                FilterMode::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown filter: {}", raw))?,
            ),
            None => None,
        };
        let sort = match &self.sort {
            Some(raw) => {
                Some(SortMode::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown sort: {}", raw))?)
            }
            None => None,
        };

        store.update(|view| {
            if let Some(search) = &self.search {
                view.search = search.clone();
            }
            if let Some(filter) = filter {
                view.filter = filter;
            }
            if let Some(sort) = sort {
                view.sort = sort;
            }
            if self.prio {
                view.priority_only = true;
            }
        });
        Ok(store)
    }
}

#[derive(Serialize)]
struct StatusReport<'a> {
    header: &'a RuntimeHeader,
    uptime: Option<String>,
    view: &'a str,
    projection: &'a Projection,
}

pub async fn status(args: ViewArgs, ctx: &Context) -> Result<()> {
    let store = args.to_store()?;
    let client = ctx.client()?;
    let snapshot = client.fetch_snapshot().await?;

    let priority = snapshot
        .settings
        .as_ref()
        .map(|s| s.priority.clone())
        .unwrap_or_default();
    let runtime = snapshot.runtime.as_ref();

    let mut clock = UptimeClock::default();
    clock.observe(runtime.and_then(|r| r.started_at));

    let report = StatusReport {
        header: &projection::project_header(runtime),
        uptime: clock.render(Utc::now()),
        view: store.link(),
        projection: &projection::project(runtime, store.state(), &priority),
    };

    print_formatted(&report, ctx.format, |r| {
        format_status(r.header, r.uptime.as_deref(), r.view, r.projection)
    });
    Ok(())
}

pub async fn channels(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let snapshot = client.fetch_snapshot().await?;
    let channels = snapshot.runtime.map(|r| r.channels).unwrap_or_default();

    print_formatted(&channels, ctx.format, |channels| format_channels(channels));
    Ok(())
}

/// Poll on the configured interval and redraw every second until Ctrl+C
pub async fn watch(view: Option<String>, ctx: &Context) -> Result<()> {
    watch_until(view, ctx, tokio::signal::ctrl_c()).await
}

/// Watch loop that ends once `stop` resolves
async fn watch_until<F: Future>(view: Option<String>, ctx: &Context, stop: F) -> Result<()> {
    let client = ctx.client()?;
    let link = view.unwrap_or_else(|| ctx.config.view.link.clone());
    let mut state = DashboardState::new(&link);
    let mut poller = SnapshotPoller::new(ctx.config.polling.interval());
    let mut ticker = tokio::time::interval(TICK_PERIOD);
    // One listener for the whole loop so a Ctrl+C during a redraw is not lost
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        let now = Instant::now();
        poller.tick(now, &client);

        let mut refreshed = false;
        for outcome in poller.poll() {
            match outcome {
                PollOutcome::Snapshot(snapshot) => {
                    // Nothing is edited here, so settings always apply
                    state.apply_snapshot(snapshot, &false);
                    refreshed = true;
                }
                PollOutcome::Failed(err) => state.record_poll_failure(&err),
                PollOutcome::Stale { .. } => {}
            }
        }
        state.clock.tick(now, Utc::now());

        match ctx.format {
            OutputFormat::Json => {
                if refreshed {
                    let report = StatusReport {
                        header: &state.header().clone(),
                        uptime: state.clock.display().map(str::to_string),
                        view: &state.view_link().to_string(),
                        projection: &state.projection().clone(),
                    };
                    println!("{}", serde_json::to_string(&report)?);
                }
            }
            OutputFormat::Text => {
                let header = state.header().clone();
                let uptime = state.clock.display().map(str::to_string);
                let link = state.view_link().to_string();
                let error = state.last_error().map(str::to_string);
                let projection = state.projection();

                // Clear screen, cursor home
                print!("\x1B[2J\x1B[H");
                println!("{}", format_status(&header, uptime.as_deref(), &link, projection));
                if let Some(err) = error {
                    println!("\nLast poll failed: {}", err);
                }
            }
        }
    }

    Ok(())
}

fn format_status(
    header: &RuntimeHeader,
    uptime: Option<&str>,
    view: &str,
    projection: &Projection,
) -> String {
    let mut lines = vec![
        format!(
            "State:     {}{}",
            header.state_label,
            if header.active { " (active)" } else { "" }
        ),
        format!("Watching:  {}", header.watching.as_deref().unwrap_or("Idle")),
    ];
    if let Some(pending) = &header.pending_switch {
        lines.push(format!("Switching: {}", pending));
    }
    lines.push(format!("Uptime:    {}", uptime.unwrap_or("--:--:--")));
    if !view.is_empty() {
        lines.push(format!("View:      {}", view));
    }

    lines.push(String::new());
    lines.push(format!(
        "Campaigns ({} of {}):",
        projection.visible_count, projection.total_count
    ));
    match projection.empty {
        Some(EmptyState::NoCampaigns) => lines.push("  No campaigns reported by the agent".into()),
        Some(EmptyState::NoMatches) => lines.push("  No campaigns match the current filters".into()),
        None => {}
    }
    for campaign in &projection.campaigns {
        lines.push(format!(
            "  {} {} - {}  {:.0}%  [{}/{} claimed]{}",
            if campaign.is_priority { "*" } else { " " },
            campaign.game,
            campaign.name,
            campaign.aggregate_progress * 100.0,
            campaign.claimed_drops,
            campaign.total_drops,
            if campaign.active { "" } else { "  (inactive)" },
        ));
        for drop in &campaign.drops {
            let progress = if drop.claimed {
                "claimed".to_string()
            } else {
                format!("{}/{} min", drop.current_minutes, drop.required_minutes)
            };
            lines.push(format!("        {:<32} {}", drop.name, progress));
        }
    }

    if !header.errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        for error in &header.errors {
            lines.push(format!("  {}", error));
        }
    }

    lines.join("\n")
}

fn format_channels(channels: &[Channel]) -> String {
    if channels.is_empty() {
        return "No channels tracked".to_string();
    }

    let mut lines = vec![format!(
        "{:<24} {:<10} {:<28} {:>8}",
        "CHANNEL", "STATUS", "GAME", "VIEWERS"
    )];
    for channel in channels {
        lines.push(format!(
            "{:<24} {:<10} {:<28} {:>8}",
            channel.name(),
            channel.status.label(),
            channel.game.as_deref().unwrap_or("-"),
            channel
                .viewers
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Campaign, ChannelStatus, RuntimeSnapshot, TimedDrop};
    use crate::view_state::{Tab, ViewState};

    #[test]
    fn test_flags_override_view_link() {
        let args = ViewArgs {
            view: Some("tab=channels&filter=claimed&sort=name".into()),
            filter: Some("active".into()),
            prio: true,
            ..Default::default()
        };
        let store = args.to_store().unwrap();
        let view: &ViewState = store.state();

        assert_eq!(view.tab, Tab::Channels);
        assert_eq!(view.filter, FilterMode::Active);
        assert_eq!(view.sort, SortMode::Name);
        assert!(view.priority_only);
    }

    #[test]
    fn test_unknown_flag_values_rejected() {
        let args = ViewArgs {
            sort: Some("random".into()),
            ..Default::default()
        };
        assert!(args.to_store().is_err());
    }

    #[test]
    fn test_format_status_lists_campaigns() {
        let runtime = RuntimeSnapshot {
            campaigns: vec![Campaign {
                name: "Winter Drops".into(),
                game: "Rust".into(),
                active: true,
                claimed_drops: 1,
                total_drops: 2,
                drops: vec![TimedDrop {
                    name: "Hoodie".into(),
                    current_minutes: 30,
                    required_minutes: 60,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let header = projection::project_header(Some(&runtime));
        let projection =
            projection::project(Some(&runtime), &ViewState::default(), &["Rust".to_string()]);

        let text = format_status(&header, Some("00:10:00"), "", &projection);
        assert!(text.contains("Watching:  Idle"));
        assert!(text.contains("Uptime:    00:10:00"));
        assert!(text.contains("* Rust - Winter Drops  50%  [1/2 claimed]"));
        assert!(text.contains("30/60 min"));
        assert!(!text.contains("View:"));
    }

    #[test]
    fn test_format_empty_states() {
        let header = projection::project_header(None);
        let projection = projection::project(None, &ViewState::default(), &[]);
        let text = format_status(&header, None, "", &projection);
        assert!(text.contains("No campaigns reported by the agent"));
        assert!(text.contains("--:--:--"));
    }

    #[test]
    fn test_format_channels() {
        let channels = vec![Channel {
            login: "shroud".into(),
            status: ChannelStatus::Online,
            viewers: Some(1200),
            ..Default::default()
        }];
        let text = format_channels(&channels);
        assert!(text.starts_with("CHANNEL"));
        assert!(text.contains("shroud"));
        assert!(text.contains("online"));
        assert!(text.contains("1200"));
        assert_eq!(format_channels(&[]), "No channels tracked");
    }

    #[tokio::test]
    async fn test_watch_stops_on_signal_between_redraws() {
        use crate::config::Config;
        use httpmock::prelude::*;
        use serde_json::json;
        use std::time::Duration;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/snapshot");
                then.status(200).json_body(json!({ "runtime": { "state": "IDLE" } }));
            })
            .await;

        let mut config = Config::default();
        config.server.base_url = server.base_url();
        let ctx = Context {
            config,
            format: OutputFormat::Json,
            quiet: true,
        };

        // Fires after the loop has already redrawn a few times
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            let _ = tx.send(());
        });

        let finished =
            tokio::time::timeout(Duration::from_secs(10), watch_until(None, &ctx, rx)).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }
}
