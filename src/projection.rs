//! Derives what the dashboard shows from a snapshot and the view state.
//!
//! `project` is a pure function: the same runtime, view state and priority
//! list always produce the same ordered output, so it can run on every
//! keystroke without touching the network.
//!
//! Campaigns pass through three filters in a fixed order (search text,
//! priority-only, filter mode) and are then sorted. Channels are listed
//! as-is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::model::{Campaign, Channel, JournalEntry, RuntimeSnapshot, TimedDrop};
use crate::view_state::{FilterMode, SortMode, ViewState};

/// Errors shown in the header/activity view
pub const MAX_VISIBLE_ERRORS: usize = 5;

/// Journal entries shown in the activity feed
pub const MAX_JOURNAL_ENTRIES: usize = 50;

/// Render data for one drop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropView {
    pub name: String,
    pub current_minutes: u32,
    pub required_minutes: u32,
    /// Clamped to [0, 1]
    pub fraction: f64,
    pub claimed: bool,
}

/// Render data for one campaign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignView {
    pub name: String,
    pub game: String,
    pub active: bool,
    /// Game is on the priority list
    pub is_priority: bool,
    /// Server-reported counters, independent of drop progress math
    pub claimed_drops: u32,
    pub total_drops: u32,
    /// sum(current) / sum(required) over the drops
    pub aggregate_progress: f64,
    pub ends_at: Option<DateTime<Utc>>,
    pub drops: Vec<DropView>,
}

/// Why the campaign list is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// The agent reported no campaigns at all
    NoCampaigns,
    /// Campaigns exist but the current filters hide all of them
    NoMatches,
}

/// Projected campaign and channel lists
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Projection {
    pub campaigns: Vec<CampaignView>,
    pub channels: Vec<Channel>,
    pub visible_count: usize,
    pub total_count: usize,
    pub empty: Option<EmptyState>,
}

/// Projected runtime header and activity data
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuntimeHeader {
    pub state_label: String,
    pub active: bool,
    /// "Display name (game)" of the watched channel
    pub watching: Option<String>,
    pub pending_switch: Option<String>,
    /// At most `MAX_VISIBLE_ERRORS`, most recent first
    pub errors: Vec<String>,
    /// Newest first, at most `MAX_JOURNAL_ENTRIES`
    pub journal: Vec<JournalEntry>,
    pub sys_load: Option<String>,
    pub last_reload: Option<DateTime<Utc>>,
}

/// Progress of a single drop, clamped to [0, 1]. Zero when no minutes are required.
pub fn drop_fraction(drop: &TimedDrop) -> f64 {
    if drop.required_minutes == 0 {
        return 0.0;
    }
    (f64::from(drop.current_minutes) / f64::from(drop.required_minutes)).clamp(0.0, 1.0)
}

/// Aggregate campaign progress over its drops. Zero when no minutes are required.
pub fn aggregate_progress(campaign: &Campaign) -> f64 {
    let (current, required) = campaign.drops.iter().fold((0u64, 0u64), |(cur, req), drop| {
        (
            cur + u64::from(drop.current_minutes),
            req + u64::from(drop.required_minutes),
        )
    });
    if required == 0 {
        0.0
    } else {
        current as f64 / required as f64
    }
}

fn is_priority_game(game: &str, priority: &[String]) -> bool {
    let game = game.to_lowercase();
    priority.iter().any(|entry| entry.to_lowercase() == game)
}

fn matches_search(campaign: &Campaign, search_key: &str) -> bool {
    search_key.is_empty()
        || campaign.game.to_lowercase().contains(search_key)
        || campaign.name.to_lowercase().contains(search_key)
}

fn matches_mode(campaign: &Campaign, mode: FilterMode) -> bool {
    match mode {
        FilterMode::All => true,
        FilterMode::Active => campaign.active,
        FilterMode::Progressing => campaign
            .drops
            .iter()
            .any(|drop| drop.current_minutes > 0 && !drop.claimed),
        FilterMode::Claimed => campaign.claimed_drops > 0,
    }
}

fn compare(a: &CampaignView, b: &CampaignView, sort: SortMode) -> Ordering {
    match sort {
        SortMode::Priority => b.active.cmp(&a.active).then_with(|| a.game.cmp(&b.game)),
        SortMode::Name => a.game.cmp(&b.game),
        SortMode::Progress => b.aggregate_progress.total_cmp(&a.aggregate_progress),
    }
}

fn campaign_view(campaign: &Campaign, priority: &[String]) -> CampaignView {
    CampaignView {
        name: campaign.name.clone(),
        game: campaign.game.clone(),
        active: campaign.active,
        is_priority: is_priority_game(&campaign.game, priority),
        claimed_drops: campaign.claimed_drops,
        total_drops: campaign.total_drops,
        aggregate_progress: aggregate_progress(campaign),
        ends_at: campaign.ends_at,
        drops: campaign
            .drops
            .iter()
            .map(|drop| DropView {
                name: drop.name.clone(),
                current_minutes: drop.current_minutes,
                required_minutes: drop.required_minutes,
                fraction: drop_fraction(drop),
                claimed: drop.claimed,
            })
            .collect(),
    }
}

/// Project campaigns and channels for the given view state
pub fn project(runtime: Option<&RuntimeSnapshot>, view: &ViewState, priority: &[String]) -> Projection {
    let Some(runtime) = runtime else {
        return Projection {
            empty: Some(EmptyState::NoCampaigns),
            ..Default::default()
        };
    };

    let search_key = view.search_key();
    let mut campaigns: Vec<CampaignView> = runtime
        .campaigns
        .iter()
        .filter(|c| matches_search(c, &search_key))
        .filter(|c| !view.priority_only || is_priority_game(&c.game, priority))
        .filter(|c| matches_mode(c, view.filter))
        .map(|c| campaign_view(c, priority))
        .collect();

    // Stable sort keeps snapshot order for ties
    campaigns.sort_by(|a, b| compare(a, b, view.sort));

    let visible_count = campaigns.len();
    let total_count = runtime.campaigns.len();
    let empty = match (visible_count, total_count) {
        (0, 0) => Some(EmptyState::NoCampaigns),
        (0, _) => Some(EmptyState::NoMatches),
        _ => None,
    };

    Projection {
        campaigns,
        channels: runtime.channels.clone(),
        visible_count,
        total_count,
        empty,
    }
}

/// Order journal entries newest first; entries without a time keep wire
/// order after the timed ones.
fn order_journal(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| match (a.time, b.time) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ordered.truncate(MAX_JOURNAL_ENTRIES);
    ordered
}

/// Project the runtime header (state, watching, errors, journal)
pub fn project_header(runtime: Option<&RuntimeSnapshot>) -> RuntimeHeader {
    let Some(runtime) = runtime else {
        return RuntimeHeader {
            state_label: "Unknown".to_string(),
            ..Default::default()
        };
    };

    let (state_label, active) = match &runtime.state {
        Some(state) => (state.label().to_string(), state.is_active()),
        None => ("Unknown".to_string(), false),
    };

    let watching = runtime.watching.as_ref().map(|channel| {
        format!("{} ({})", channel.name(), channel.game.as_deref().unwrap_or("?"))
    });

    RuntimeHeader {
        state_label,
        active,
        watching,
        pending_switch: runtime.pending_switch.as_ref().map(|c| c.to_string()),
        errors: runtime
            .errors
            .iter()
            .take(MAX_VISIBLE_ERRORS)
            .cloned()
            .collect(),
        journal: order_journal(&runtime.journal),
        sys_load: runtime.sys_load.clone(),
        last_reload: runtime.last_reload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentState, Snapshot};
    use chrono::TimeZone;
    use serde_json::json;

    fn drop_item(name: &str, current: u32, required: u32, claimed: bool) -> TimedDrop {
        TimedDrop {
            name: name.to_string(),
            current_minutes: current,
            required_minutes: required,
            claimed,
            ..Default::default()
        }
    }

    fn campaign(game: &str, name: &str, active: bool, claimed: u32, drops: Vec<TimedDrop>) -> Campaign {
        Campaign {
            name: name.to_string(),
            game: game.to_string(),
            active,
            claimed_drops: claimed,
            total_drops: drops.len() as u32,
            drops,
            ..Default::default()
        }
    }

    fn runtime_with(campaigns: Vec<Campaign>) -> RuntimeSnapshot {
        RuntimeSnapshot {
            campaigns,
            ..Default::default()
        }
    }

    fn sample_runtime() -> RuntimeSnapshot {
        runtime_with(vec![
            campaign("Zeta", "Z campaign", false, 0, vec![drop_item("z", 0, 60, false)]),
            campaign("alpha", "A campaign", true, 2, vec![drop_item("a", 60, 60, true)]),
            campaign("Mid", "Rust Week", true, 0, vec![drop_item("m", 15, 60, false)]),
            campaign("Beta", "B campaign", false, 1, vec![drop_item("b", 30, 120, false)]),
        ])
    }

    fn view(filter: FilterMode, search: &str, sort: SortMode, priority_only: bool) -> ViewState {
        ViewState {
            filter,
            search: search.to_string(),
            sort,
            priority_only,
            ..Default::default()
        }
    }

    fn games(projection: &Projection) -> Vec<&str> {
        projection.campaigns.iter().map(|c| c.game.as_str()).collect()
    }

    #[test]
    fn test_drop_fraction_bounds() {
        assert_eq!(drop_fraction(&drop_item("d", 30, 60, false)), 0.5);
        assert_eq!(drop_fraction(&drop_item("d", 90, 60, false)), 1.0);
        assert_eq!(drop_fraction(&drop_item("d", 10, 0, false)), 0.0);
        assert_eq!(drop_fraction(&drop_item("d", 0, 0, false)), 0.0);

        for current in [0, 1, 59, 60, 61, 10_000] {
            for required in [0, 1, 60, 120] {
                let fraction = drop_fraction(&drop_item("d", current, required, false));
                assert!((0.0..=1.0).contains(&fraction));
            }
        }
    }

    #[test]
    fn test_scenario_single_working_campaign() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "runtime": {
                "state": "WORKING",
                "campaigns": [{
                    "game": "Foo", "name": "C1", "active": true,
                    "claimed_drops": 1, "total_drops": 2,
                    "drops": [
                        { "name": "D1", "current_minutes": 30, "required_minutes": 60, "claimed": false },
                        { "name": "D2", "current_minutes": 60, "required_minutes": 60, "claimed": true }
                    ]
                }]
            }
        }))
        .unwrap();
        let runtime = snapshot.runtime.unwrap();

        let projection = project(Some(&runtime), &view(FilterMode::All, "", SortMode::Progress, false), &[]);
        assert_eq!(projection.visible_count, 1);
        assert_eq!(projection.campaigns[0].aggregate_progress, 0.75);
        assert_eq!(projection.campaigns[0].drops[0].fraction, 0.5);

        let claimed = project(Some(&runtime), &view(FilterMode::Claimed, "", SortMode::Priority, false), &[]);
        assert_eq!(claimed.visible_count, 1);

        let mut unclaimed = runtime.clone();
        unclaimed.campaigns[0].claimed_drops = 0;
        let hidden = project(Some(&unclaimed), &view(FilterMode::Claimed, "", SortMode::Priority, false), &[]);
        assert_eq!(hidden.visible_count, 0);
        assert_eq!(hidden.empty, Some(EmptyState::NoMatches));
    }

    #[test]
    fn test_sort_orders() {
        let runtime = sample_runtime();

        let by_priority = project(Some(&runtime), &view(FilterMode::All, "", SortMode::Priority, false), &[]);
        // Active first, then byte-wise game name
        assert_eq!(games(&by_priority), vec!["Mid", "alpha", "Beta", "Zeta"]);

        let by_name = project(Some(&runtime), &view(FilterMode::All, "", SortMode::Name, false), &[]);
        assert_eq!(games(&by_name), vec!["Beta", "Mid", "Zeta", "alpha"]);

        let by_progress = project(Some(&runtime), &view(FilterMode::All, "", SortMode::Progress, false), &[]);
        // Mid and Beta tie at 25% and keep snapshot order
        assert_eq!(games(&by_progress), vec!["alpha", "Mid", "Beta", "Zeta"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let runtime = runtime_with(vec![
            campaign("Same", "first", true, 0, vec![]),
            campaign("Same", "second", true, 0, vec![]),
            campaign("Same", "third", true, 0, vec![]),
        ]);
        for &sort in SortMode::all() {
            let projection = project(Some(&runtime), &view(FilterMode::All, "", sort, false), &[]);
            let names: Vec<&str> = projection.campaigns.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["first", "second", "third"], "sort {:?}", sort);
        }
    }

    #[test]
    fn test_search_matches_game_or_campaign_name() {
        let runtime = sample_runtime();
        let by_game = project(Some(&runtime), &view(FilterMode::All, "ALPH", SortMode::Name, false), &[]);
        assert_eq!(games(&by_game), vec!["alpha"]);

        let by_name = project(Some(&runtime), &view(FilterMode::All, "rust", SortMode::Name, false), &[]);
        assert_eq!(games(&by_name), vec!["Mid"]);
    }

    #[test]
    fn test_priority_filter_is_case_insensitive() {
        let runtime = sample_runtime();
        let priority = vec!["ZETA".to_string(), "beta".to_string()];
        let projection = project(Some(&runtime), &view(FilterMode::All, "", SortMode::Name, true), &priority);
        assert_eq!(games(&projection), vec!["Beta", "Zeta"]);
        assert!(projection.campaigns.iter().all(|c| c.is_priority));
    }

    #[test]
    fn test_mode_filters() {
        let runtime = sample_runtime();
        let active = project(Some(&runtime), &view(FilterMode::Active, "", SortMode::Name, false), &[]);
        assert_eq!(games(&active), vec!["Mid", "alpha"]);

        let progressing = project(Some(&runtime), &view(FilterMode::Progressing, "", SortMode::Name, false), &[]);
        assert_eq!(games(&progressing), vec!["Beta", "Mid"]);

        let claimed = project(Some(&runtime), &view(FilterMode::Claimed, "", SortMode::Name, false), &[]);
        assert_eq!(games(&claimed), vec!["Beta", "alpha"]);
    }

    #[test]
    fn test_filters_are_monotonic() {
        let runtime = sample_runtime();
        let priority = vec!["alpha".to_string(), "Mid".to_string()];

        for &filter in FilterMode::all() {
            for search in ["", "a", "mid", "nothing"] {
                for priority_only in [false, true] {
                    let base = view(filter, search, SortMode::Priority, priority_only);
                    let count = project(Some(&runtime), &base, &priority).visible_count;

                    let without_search = ViewState { search: String::new(), ..base.clone() };
                    let without_prio = ViewState { priority_only: false, ..base.clone() };
                    let without_mode = ViewState { filter: FilterMode::All, ..base.clone() };

                    for relaxed in [without_search, without_prio, without_mode] {
                        assert!(count <= project(Some(&runtime), &relaxed, &priority).visible_count);
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_states() {
        let none = project(None, &ViewState::default(), &[]);
        assert_eq!(none.empty, Some(EmptyState::NoCampaigns));
        assert_eq!(none.visible_count, 0);

        let empty = project(Some(&runtime_with(vec![])), &ViewState::default(), &[]);
        assert_eq!(empty.empty, Some(EmptyState::NoCampaigns));

        let filtered = project(
            Some(&sample_runtime()),
            &view(FilterMode::All, "no such game", SortMode::Priority, false),
            &[],
        );
        assert_eq!(filtered.empty, Some(EmptyState::NoMatches));
        assert_eq!(filtered.total_count, 4);
    }

    #[test]
    fn test_counters_are_server_reported() {
        // Drops say 1/1 complete, server says 0 claimed of 3
        let mut c = campaign("Foo", "C", true, 0, vec![drop_item("d", 60, 60, true)]);
        c.total_drops = 3;
        let projection = project(Some(&runtime_with(vec![c])), &ViewState::default(), &[]);
        let view = &projection.campaigns[0];
        assert_eq!((view.claimed_drops, view.total_drops), (0, 3));
        assert_eq!(view.drops.len(), 1);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let runtime = sample_runtime();
        let state = view(FilterMode::All, "a", SortMode::Progress, false);
        assert_eq!(project(Some(&runtime), &state, &[]), project(Some(&runtime), &state, &[]));
    }

    #[test]
    fn test_header_projection() {
        let mut runtime = runtime_with(vec![]);
        runtime.state = Some(AgentState::Mining);
        runtime.errors = (0..8).map(|i| format!("error {}", i)).collect();
        runtime.watching = Some(Channel {
            login: "streamer".into(),
            display_name: Some("Streamer".into()),
            game: Some("Foo".into()),
            ..Default::default()
        });
        runtime.journal = vec![
            JournalEntry { message: "untimed".into(), ..Default::default() },
            JournalEntry {
                time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
                message: "older".into(),
                ..Default::default()
            },
            JournalEntry {
                time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap()),
                message: "newer".into(),
                ..Default::default()
            },
        ];

        let header = project_header(Some(&runtime));
        assert!(header.active);
        assert_eq!(header.state_label, "Mining");
        assert_eq!(header.watching.as_deref(), Some("Streamer (Foo)"));
        assert_eq!(header.errors.len(), MAX_VISIBLE_ERRORS);
        assert_eq!(header.errors[0], "error 0");
        let messages: Vec<&str> = header.journal.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["newer", "older", "untimed"]);

        let idle = project_header(None);
        assert!(!idle.active);
        assert!(idle.watching.is_none());
    }
}
