//! Application search and launching.
//!
//! The launcher lists nothing until a query is typed.  Queries starting
//! with a special prefix are answered by the [query router](crate::query)
//! instead of application search.

use super::{Debouncer, Observer};
use crate::config::LauncherConfig;
use crate::list::{clamp_selection, step_clamped};
use crate::query::web_search::search_url;
use crate::query::{is_special_id, route_special_query, QueryAction};
use crate::search::fold;
use crate::traits::{AppEntry, AppRegistry, CommandRunner};
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Change notifications for the launcher panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherEvent {
    ItemsChanged,
    SelectionChanged(Option<usize>),
    QueryChanged(String),
    CloseRequested,
}

/// Secondary information about an application row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppDetails {
    pub description: String,
    pub generic_name: String,
    pub executable: String,
}

/// State behind the launcher panel.
pub struct LauncherService<A: AppRegistry, R: CommandRunner> {
    registry: A,
    runner: R,
    include_hidden: bool,
    web_search_url: String,
    apps: Vec<AppEntry>,
    /// `(id, display)` rows currently listed.
    items: Vec<(String, String)>,
    /// Row id → index into `apps`.
    app_ids: HashMap<String, usize>,
    actions: HashMap<String, QueryAction>,
    selected: Option<usize>,
    query: String,
    debounce: Debouncer,
    observer: Observer<LauncherEvent>,
}

impl<A: AppRegistry, R: CommandRunner> LauncherService<A, R> {
    /// Create the service and load the application list.
    pub fn new(registry: A, runner: R, config: &LauncherConfig) -> Self {
        let mut svc = Self {
            registry,
            runner,
            include_hidden: config.include_hidden,
            web_search_url: config.web_search_url.clone(),
            apps: Vec::new(),
            items: Vec::new(),
            app_ids: HashMap::new(),
            actions: HashMap::new(),
            selected: None,
            query: String::new(),
            debounce: Debouncer::new(Duration::from_millis(config.search_debounce_ms)),
            observer: Observer::default(),
        };
        svc.refresh_apps();
        svc
    }

    pub fn set_observer(&mut self, tx: mpsc::Sender<LauncherEvent>) {
        self.observer.set(tx);
    }

    pub fn items(&self) -> &[(String, String)] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Re-read the installed applications.
    pub fn refresh_apps(&mut self) {
        self.apps = match self.registry.applications(self.include_hidden) {
            Ok(apps) => apps,
            Err(e) => {
                error!("failed to enumerate desktop applications: {}", e);
                Vec::new()
            }
        };
        info!("launcher: {} applications", self.apps.len());
        self.rebuild_items();
    }

    //  Query

    /// Record typed text; applied by [`tick`](Self::tick) after the
    /// debounce delay.
    pub fn update_query_input(&mut self, text: &str, now: Instant) {
        self.debounce.push(text.trim().to_string(), now);
    }

    pub fn cancel_pending_query(&mut self) {
        self.debounce.cancel();
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.debounce.poll(now) {
            self.set_query(&text);
        }
    }

    /// Apply a query immediately.
    pub fn set_query(&mut self, text: &str) {
        let query = text.trim();
        if query == self.query {
            return;
        }
        self.query = query.to_string();
        self.observer.emit(LauncherEvent::QueryChanged(self.query.clone()));
        self.rebuild_items();
    }

    fn rebuild_items(&mut self) {
        let mut app_ids = HashMap::new();
        let mut actions = HashMap::new();
        let mut items = Vec::new();

        if !self.query.is_empty() {
            let routed = route_special_query(&self.query);
            if routed.consume {
                items = routed.items;
                actions = routed.actions;
            } else {
                let terms: Vec<String> = self
                    .query
                    .split_whitespace()
                    .map(fold)
                    .filter(|t| !t.is_empty())
                    .collect();
                let mut seen = HashMap::new();
                for (idx, app) in self.apps.iter().enumerate() {
                    let id = deduplicate_id(&base_id(app, idx), &mut seen);
                    let labels = search_labels(app);
                    if labels.is_empty() {
                        continue;
                    }
                    if !terms.iter().all(|t| labels.iter().any(|l| l.contains(t.as_str()))) {
                        continue;
                    }
                    items.push((id.clone(), display_name(app, &id)));
                    app_ids.insert(id, idx);
                }
            }
        }

        debug!("launcher: query {:?} matched {} rows", self.query, items.len());
        self.app_ids = app_ids;
        self.actions = actions;
        if items != self.items {
            self.items = items;
            self.observer.emit(LauncherEvent::ItemsChanged);
        }

        let selected = clamp_selection(self.selected, self.items.len());
        self.set_selected(selected);
    }

    //  Selection

    pub fn set_selected(&mut self, selected: Option<usize>) {
        if selected == self.selected {
            return;
        }
        self.selected = selected;
        self.observer.emit(LauncherEvent::SelectionChanged(selected));
    }

    /// Move the selection by `delta` rows without wrapping.  With no
    /// selection, moving down starts at the first row and moving up at
    /// the last.
    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = match self.selected {
            Some(i) => i,
            None if delta >= 0 => 0,
            None => self.items.len() - 1,
        };
        let next = step_clamped(current, delta, self.items.len());
        self.set_selected(Some(next));
    }

    //  Launching

    pub fn launch_selected(&mut self) {
        let Some((id, _)) = self.selected.and_then(|i| self.items.get(i)) else {
            return;
        };
        let id = id.clone();
        self.launch_by_id(&id);
    }

    /// Activate row `id`: run its special action or launch its
    /// application, then ask the panel to close.
    pub fn launch_by_id(&mut self, id: &str) {
        if is_special_id(id) {
            let Some(action) = self.actions.get(id).cloned() else {
                debug!("no action for special row {}", id);
                return;
            };
            if self.run_action(&action) {
                self.request_close();
            }
            return;
        }

        let Some(app) = self.app_ids.get(id).and_then(|&i| self.apps.get(i)) else {
            debug!("no application mapped for id {}", id);
            return;
        };
        match self.registry.launch(app) {
            Ok(()) => {
                info!("launched {}", app.display_name);
                self.request_close();
            }
            Err(e) => error!("failed to launch application {}: {}", id, e),
        }
    }

    fn run_action(&self, action: &QueryAction) -> bool {
        let result = match action {
            QueryAction::CalcResult { result, .. } => self.runner.run("wl-copy", &[], Some(result.as_bytes())),
            QueryAction::WebSearch { term } => {
                let url = search_url(&self.web_search_url, term);
                self.runner.spawn("xdg-open", &[url.as_str()])
            }
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                error!("launcher action {:?} failed: {}", action, e);
                false
            }
        }
    }

    //  Row details

    fn app(&self, id: &str) -> Option<&AppEntry> {
        self.app_ids.get(id).and_then(|&i| self.apps.get(i))
    }

    pub fn app_details(&self, id: &str) -> Option<AppDetails> {
        self.app(id).map(|app| AppDetails {
            description: app.description.clone().unwrap_or_default(),
            generic_name: app.generic_name.clone().unwrap_or_default(),
            executable: app.executable.clone(),
        })
    }

    /// Serialized icon of the application behind row `id`.
    pub fn icon_for(&self, id: &str) -> Option<&str> {
        self.app(id).and_then(|app| app.icon.as_deref())
    }

    pub fn request_close(&mut self) {
        self.observer.emit(LauncherEvent::CloseRequested);
    }
}

fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

fn base_id(app: &AppEntry, idx: usize) -> String {
    first_non_empty([
        Some(app.name.as_str()),
        app.command_line.as_deref(),
        Some(app.executable.as_str()),
        Some(app.display_name.as_str()),
    ])
    .map(str::to_string)
    .unwrap_or_else(|| format!("app-{}", idx))
}

fn display_name(app: &AppEntry, id: &str) -> String {
    first_non_empty([
        Some(app.display_name.as_str()),
        app.generic_name.as_deref(),
        Some(app.name.as_str()),
        Some(app.executable.as_str()),
        app.command_line.as_deref(),
    ])
    .unwrap_or(id)
    .to_string()
}

/// Folded labels searched for `app`: its names, or when it has none, its
/// generic name and command.
fn search_labels(app: &AppEntry) -> Vec<String> {
    let folded = |labels: &[Option<&str>]| -> Vec<String> {
        labels
            .iter()
            .flatten()
            .map(|l| fold(l))
            .filter(|l| !l.is_empty())
            .collect()
    };
    let primary = folded(&[Some(app.display_name.as_str()), Some(app.name.as_str())]);
    if !primary.is_empty() {
        return primary;
    }
    folded(&[
        app.generic_name.as_deref(),
        Some(app.executable.as_str()),
        app.command_line.as_deref(),
    ])
}

/// Make `base` unique among the ids handed out so far by appending
/// `-2`, `-3`, …
fn deduplicate_id(base: &str, seen: &mut HashMap<String, usize>) -> String {
    let candidate = if base.is_empty() { "app" } else { base };
    let Some(count) = seen.get_mut(candidate) else {
        seen.insert(candidate.to_string(), 1);
        return candidate.to_string();
    };
    *count += 1;
    let mut n = *count;
    let mut suffixed = format!("{}-{}", candidate, n);
    while seen.contains_key(&suffixed) {
        n += 1;
        suffixed = format!("{}-{}", candidate, n);
    }
    seen.insert(candidate.to_string(), n);
    seen.insert(suffixed.clone(), 1);
    suffixed
}
