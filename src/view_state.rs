//! Local view selection and its query-string form.
//!
//! `ViewState` holds the filter/search/sort/priority-only/tab selection. It
//! is never sent to the agent. `ViewStore` owns the live value and keeps the
//! view link (a query string such as `filter=active&sort=name`) in sync on
//! every mutation, so the link can be shared, persisted and restored.
//!
//! Encoding emits a parameter only when it differs from its default, which
//! makes the default link empty and the encoding canonical.

use url::form_urlencoded;

const PARAM_TAB: &str = "tab";
const PARAM_SEARCH: &str = "search";
const PARAM_FILTER: &str = "filter";
const PARAM_SORT: &str = "sort";
const PARAM_PRIO: &str = "prio";

const KNOWN_PARAMS: &[&str] = &[PARAM_TAB, PARAM_SEARCH, PARAM_FILTER, PARAM_SORT, PARAM_PRIO];

/// Campaign filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Progressing,
    Claimed,
}

impl FilterMode {
    pub fn all() -> &'static [FilterMode] {
        &[
            FilterMode::All,
            FilterMode::Active,
            FilterMode::Progressing,
            FilterMode::Claimed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Progressing => "progressing",
            FilterMode::Claimed => "claimed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::All => "All campaigns",
            FilterMode::Active => "Active",
            FilterMode::Progressing => "In progress",
            FilterMode::Claimed => "With claims",
        }
    }

    pub fn parse(value: &str) -> Option<FilterMode> {
        FilterMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Campaign sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Priority,
    Name,
    Progress,
}

impl SortMode {
    pub fn all() -> &'static [SortMode] {
        &[SortMode::Priority, SortMode::Name, SortMode::Progress]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Priority => "priority",
            SortMode::Name => "name",
            SortMode::Progress => "progress",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Priority => "Active first",
            SortMode::Name => "Game name",
            SortMode::Progress => "Progress",
        }
    }

    pub fn parse(value: &str) -> Option<SortMode> {
        SortMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Campaign list with filters
    #[default]
    Campaigns,
    /// Tracked channels and channel switching
    Channels,
    /// Error list and activity journal
    Activity,
    /// Agent settings form
    Settings,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Campaigns, Tab::Channels, Tab::Activity, Tab::Settings]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Campaigns => "campaigns",
            Tab::Channels => "channels",
            Tab::Activity => "activity",
            Tab::Settings => "settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Campaigns => "Campaigns",
            Tab::Channels => "Channels",
            Tab::Activity => "Activity",
            Tab::Settings => "Settings",
        }
    }

    pub fn parse(value: &str) -> Option<Tab> {
        Tab::all()
            .iter()
            .copied()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Local view selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub filter: FilterMode,
    /// Search text as typed; matching is case-insensitive
    pub search: String,
    pub sort: SortMode,
    pub priority_only: bool,
    pub tab: Tab,
}

impl ViewState {
    /// Canonical minimal query string (no leading `?`)
    #[cfg(test)]
    pub fn encode_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        append_state(&mut serializer, self);
        serializer.finish()
    }

    /// Decode a query string. Unknown keys and unparseable values are ignored.
    #[cfg(test)]
    pub fn decode_query(query: &str) -> Self {
        decode_parts(query).0
    }

    /// Search text folded for matching
    pub fn search_key(&self) -> String {
        self.search.to_lowercase()
    }
}

fn append_state(serializer: &mut form_urlencoded::Serializer<'_, String>, state: &ViewState) {
    if state.tab != Tab::default() {
        serializer.append_pair(PARAM_TAB, state.tab.as_str());
    }
    if !state.search.is_empty() {
        serializer.append_pair(PARAM_SEARCH, &state.search);
    }
    if state.filter != FilterMode::default() {
        serializer.append_pair(PARAM_FILTER, state.filter.as_str());
    }
    if state.sort != SortMode::default() {
        serializer.append_pair(PARAM_SORT, state.sort.as_str());
    }
    if state.priority_only {
        serializer.append_pair(PARAM_PRIO, "1");
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Split a query into the recognized view state and the unrecognized pairs
fn decode_parts(query: &str) -> (ViewState, Vec<(String, String)>) {
    let query = query.trim().trim_start_matches('?');
    let mut state = ViewState::default();
    let mut extras = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PARAM_TAB => state.tab = Tab::parse(&value).unwrap_or_default(),
            PARAM_SEARCH => state.search = value.into_owned(),
            PARAM_FILTER => state.filter = FilterMode::parse(&value).unwrap_or_default(),
            PARAM_SORT => state.sort = SortMode::parse(&value).unwrap_or_default(),
            PARAM_PRIO => state.priority_only = parse_flag(&value),
            _ => extras.push((key.into_owned(), value.into_owned())),
        }
    }

    (state, extras)
}

/// Owner of the live view state and its link
#[derive(Debug, Clone, Default)]
pub struct ViewStore {
    state: ViewState,
    /// Unrecognized parameters, kept so links from newer clients survive
    extras: Vec<(String, String)>,
    link: String,
}

impl ViewStore {
    /// Build the store from a startup link
    pub fn from_query(query: &str) -> Self {
        let (state, extras) = decode_parts(query);
        let mut store = Self {
            state,
            extras,
            link: String::new(),
        };
        store.link = store.encode();
        store
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Current view link, always consistent with `state()`
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Mutate the view state. Re-encodes the link immediately and returns
    /// whether anything changed.
    pub fn update(&mut self, mutate: impl FnOnce(&mut ViewState)) -> bool {
        let before = self.state.clone();
        mutate(&mut self.state);
        if self.state == before {
            return false;
        }
        self.link = self.encode();
        true
    }

    fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        append_state(&mut serializer, &self.state);
        for (key, value) in &self.extras {
            if !KNOWN_PARAMS.contains(&key.as_str()) {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}
