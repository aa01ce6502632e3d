//! Application state management for mintdash
//!
//! This module contains the main application state, handling keyboard input,
//! load bookkeeping, and state transitions between loading, dashboard and error
//! views.

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::aggregate::{FilterState, Record};
use crate::cli::StartupConfig;
use crate::data::{Dataset, Filters};
use crate::fetch::{CachePolicy, Loaded, Origin, RequestTracker};
use crate::loader::DatasetData;
use crate::present::{build_view, DashboardView};
use crate::refresh::{LoadMessage, LoadRequest};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the first load of the current dataset
    Loading,
    /// Data for the current dataset is on screen
    Dashboard,
    /// The current dataset failed to load and nothing is cached
    Error(String),
}

/// Latest data and load generation for one dataset
#[derive(Debug, Default)]
struct DatasetSlot {
    tracker: RequestTracker,
    loaded: Option<Loaded<DatasetData>>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Dataset shown in the active tab
    pub dataset: Dataset,
    /// Filters forwarded to the backend
    pub filters: Filters,
    /// Filters applied to loaded records
    pub view: FilterState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Whether keystrokes edit the search text
    pub search_mode: bool,
    /// First visible table row
    pub scroll_offset: usize,
    /// Timestamp of the last load that reached the screen
    pub last_refresh: Option<DateTime<Local>>,
    /// One-line notice shown under the dashboard
    pub status: Option<String>,
    slots: HashMap<Dataset, DatasetSlot>,
    pending: Vec<LoadRequest>,
}

impl App {
    /// Creates an App for the given startup configuration and queues the first load
    pub fn new(config: StartupConfig) -> Self {
        let mut app = Self {
            state: AppState::Loading,
            dataset: config.dataset,
            filters: config.filters,
            view: config.view,
            should_quit: false,
            show_help: false,
            search_mode: false,
            scroll_offset: 0,
            last_refresh: None,
            status: None,
            slots: HashMap::new(),
            pending: Vec::new(),
        };
        let policy = if config.refresh {
            CachePolicy::Refresh
        } else {
            CachePolicy::PreferCache
        };
        app.request_load(app.dataset, policy);
        app
    }

    /// Queues a load for `dataset`, superseding any load still in flight for it
    pub fn request_load(&mut self, dataset: Dataset, policy: CachePolicy) {
        let token = self.slots.entry(dataset).or_default().tracker.issue();
        debug!(dataset = %dataset, token = token.id(), ?policy, "Queueing load");
        self.pending.push(LoadRequest {
            dataset,
            filters: self.filters.clone(),
            policy,
            token,
        });
        if dataset == self.dataset && self.current().is_none() {
            self.state = AppState::Loading;
        }
    }

    /// Takes the loads queued since the last call
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Applies a finished load, dropping it if a newer load was issued since
    pub fn apply(&mut self, message: LoadMessage) {
        let dataset = message.dataset();
        let slot = self.slots.entry(dataset).or_default();

        match message {
            LoadMessage::Loaded { token, loaded, .. } => {
                let origin = loaded.origin;
                if !slot.tracker.commit(token, &mut slot.loaded, Some(loaded)) {
                    return;
                }
                if dataset == self.dataset {
                    self.state = AppState::Dashboard;
                    self.last_refresh = Some(Local::now());
                    self.status = match origin {
                        Origin::Fallback => {
                            Some("Backend unavailable, showing cached data".to_string())
                        }
                        Origin::Cache | Origin::Backend => None,
                    };
                }
            }
            LoadMessage::Failed { token, error, .. } => {
                if !slot.tracker.is_current(token) {
                    debug!(dataset = %dataset, token = token.id(), "Discarding stale failure");
                    return;
                }
                if dataset != self.dataset {
                    return;
                }
                if slot.loaded.is_some() {
                    self.status = Some(format!("{} (press r to retry)", error));
                } else {
                    self.state = AppState::Error(error);
                }
            }
        }
    }

    /// Data loaded for the active dataset
    pub fn current(&self) -> Option<&Loaded<DatasetData>> {
        self.slots
            .get(&self.dataset)
            .and_then(|slot| slot.loaded.as_ref())
    }

    /// Builds the page for the active dataset under the current filters
    pub fn current_view(&self) -> Option<DashboardView> {
        self.current()
            .map(|loaded| build_view(&loaded.data, &self.view, Utc::now(), &Local))
    }

    /// Chains present in the active dataset, ascending
    pub fn available_chains(&self) -> Vec<String> {
        let Some(loaded) = self.current() else {
            return Vec::new();
        };
        let chains: BTreeSet<String> = match &loaded.data {
            DatasetData::MintEditions(v) => v.iter().filter_map(Record::chain_key).collect(),
            DatasetData::SplitContracts(v) => v.iter().filter_map(Record::chain_key).collect(),
            DatasetData::Revenue(v) => v.iter().filter_map(Record::chain_key).collect(),
            DatasetData::Story(v) => v.iter().filter_map(Record::chain_key).collect(),
            DatasetData::Users(_) | DatasetData::Transactions(_) => BTreeSet::new(),
        };
        let mut chains: Vec<String> = chains.into_iter().collect();
        chains.sort_by_key(|c| c.parse::<u64>().unwrap_or(u64::MAX));
        chains
    }

    /// Switches the active tab, loading the dataset if it has never loaded
    pub fn switch_dataset(&mut self, dataset: Dataset) {
        if dataset == self.dataset {
            return;
        }
        self.dataset = dataset;
        self.scroll_offset = 0;
        self.view.chain = None;
        self.status = None;
        if self.current().is_some() {
            self.state = AppState::Dashboard;
        } else {
            self.request_load(dataset, CachePolicy::PreferCache);
        }
    }

    /// Reloads the active dataset from the backend
    pub fn refresh(&mut self) {
        self.status = None;
        self.request_load(self.dataset, CachePolicy::Refresh);
    }

    /// Cycles the date window through the presets
    pub fn cycle_window(&mut self) {
        self.view.window = self.view.window.next_preset();
        self.scroll_offset = 0;
    }

    /// Cycles the chain filter: all chains, then each chain present in the data
    pub fn cycle_chain(&mut self) {
        let chains = self.available_chains();
        self.view.chain = match &self.view.chain {
            None => chains.first().cloned(),
            Some(current) => chains
                .iter()
                .position(|c| c == current)
                .and_then(|i| chains.get(i + 1))
                .cloned(),
        };
        self.scroll_offset = 0;
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` / `Esc`: Quit the application
    /// - `Tab`/`l`/`Right`, `Shift-Tab`/`h`/`Left`: Next / previous dataset
    /// - `1`-`6`: Jump to a dataset
    /// - `r`: Refresh (or retry after an error)
    /// - `/`: Search, `d`: date range, `c`: chain (dashboard only)
    /// - `Up`/`k`, `Down`/`j`, `g`, `G`: Scroll the table
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        if self.search_mode {
            self.handle_search_key(key_event.code);
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.switch_dataset(self.dataset.next());
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.switch_dataset(self.dataset.prev());
            }
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.switch_dataset(Dataset::ALL[idx]);
            }
            KeyCode::Char('r') => {
                self.refresh();
            }
            code if self.state == AppState::Dashboard => self.handle_dashboard_key(code),
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('/') => {
                self.search_mode = true;
            }
            KeyCode::Char('d') => {
                self.cycle_window();
            }
            KeyCode::Char('c') => {
                self.cycle_chain();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_down();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_up();
            }
            KeyCode::Char('g') => {
                self.scroll_offset = 0;
            }
            KeyCode::Char('G') => {
                self.scroll_offset = self.max_scroll();
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                self.search_mode = false;
            }
            KeyCode::Esc => {
                self.view.search.clear();
                self.search_mode = false;
            }
            KeyCode::Backspace => {
                self.view.search.pop();
            }
            KeyCode::Char(c) => {
                self.view.search.push(c);
            }
            _ => {}
        }
        self.scroll_offset = 0;
    }

    fn max_scroll(&self) -> usize {
        self.current_view()
            .map(|v| v.rows.len().saturating_sub(1))
            .unwrap_or(0)
    }

    /// Scrolls the table down one row, stopping at the last row
    pub fn scroll_down(&mut self) {
        if self.scroll_offset < self.max_scroll() {
            self.scroll_offset += 1;
        }
    }

    /// Scrolls the table up one row, stopping at the first row
    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }
}
