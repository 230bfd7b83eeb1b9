//! Clipboard history state backed by `cliphist`.
//!
//! [`HistoryPoller`] runs `cliphist list` on a background thread; the
//! panel feeds each snapshot into [`ClipboardService::on_history_changed`],
//! which parses it into [`ClipEntry`]s and keeps the selection valid.
//! Pasting decodes the entry and pipes it into `wl-copy`.

use super::{Debouncer, Observer, DEFAULT_DEBOUNCE};
use crate::list::{clamp_selection, step_clamped};
use crate::search::{build_render_candidates, extract_terms, normalize_query, RenderCandidate};
use crate::traits::CommandRunner;
use log::{debug, error, info};
use std::sync::mpsc;
use std::time::{Duration, Instant};

const CLIPHIST: &str = "cliphist";
const WL_COPY: &str = "wl-copy";

/// One history entry as listed by `cliphist list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipEntry {
    pub id: String,
    pub preview: String,
}

impl ClipEntry {
    /// The `id<TAB>preview` line `cliphist` understands.
    pub fn line(&self) -> String {
        format!("{}\t{}", self.id, self.preview)
    }
}

/// Change notifications for the clipboard panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardEvent {
    ItemsChanged,
    SelectionChanged(Option<usize>),
    QueryChanged(String),
    CloseRequested,
}

/// Parse `cliphist list` output.  Blank lines are skipped; a line
/// without a tab becomes an entry with an empty preview.
pub fn parse_history(raw: &str) -> Vec<ClipEntry> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once('\t') {
            Some((id, preview)) => ClipEntry {
                id: id.to_string(),
                preview: preview.to_string(),
            },
            None => ClipEntry {
                id: line.to_string(),
                preview: String::new(),
            },
        })
        .collect()
}

/// State behind the clipboard panel.
pub struct ClipboardService<R: CommandRunner> {
    runner: R,
    items: Vec<ClipEntry>,
    selected: Option<usize>,
    query: String,
    last_raw: Option<String>,
    debounce: Debouncer,
    observer: Observer<ClipboardEvent>,
}

impl<R: CommandRunner> ClipboardService<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            items: Vec::new(),
            selected: None,
            query: String::new(),
            last_raw: None,
            debounce: Debouncer::new(DEFAULT_DEBOUNCE),
            observer: Observer::default(),
        }
    }

    /// Override the search debounce delay.
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = Debouncer::new(delay);
        self
    }

    pub fn set_observer(&mut self, tx: mpsc::Sender<ClipboardEvent>) {
        self.observer.set(tx);
    }

    pub fn items(&self) -> &[ClipEntry] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Normalised (trimmed, lowercased) active filter.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Entries matching the active filter, capped at `max_items`.
    pub fn candidates(&self, max_items: usize) -> Vec<RenderCandidate> {
        let terms = extract_terms(&self.query);
        build_render_candidates(
            self.items.iter().map(|e| (e.id.as_str(), e.preview.as_str())),
            &terms,
            max_items,
        )
    }

    fn set_items(&mut self, items: Vec<ClipEntry>) {
        if items == self.items {
            return;
        }
        self.items = items;
        self.observer.emit(ClipboardEvent::ItemsChanged);
    }

    /// Change the selection, notifying only on an actual change.
    pub fn set_selected(&mut self, selected: Option<usize>) {
        if selected == self.selected {
            return;
        }
        self.selected = selected;
        self.observer.emit(ClipboardEvent::SelectionChanged(selected));
    }

    fn fix_selection(&mut self) {
        let fixed = clamp_selection(self.selected, self.items.len());
        self.set_selected(fixed);
    }

    //  History

    /// Apply a new `cliphist list` snapshot.
    pub fn on_history_changed(&mut self, raw: &str) {
        let raw = raw.trim();
        if self.last_raw.as_deref() == Some(raw) {
            return;
        }
        self.last_raw = Some(raw.to_string());

        let parsed = parse_history(raw);
        if parsed != self.items {
            debug!("clipboard history: {} entries", parsed.len());
            self.set_items(parsed);
            self.fix_selection();
        }
    }

    //  Navigation

    pub fn move_left(&mut self) {
        self.step(-1);
    }

    pub fn move_right(&mut self) {
        self.step(1);
    }

    fn step(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = self.selected.unwrap_or(0);
        let next = step_clamped(current, delta, self.items.len());
        if next != current {
            self.set_selected(Some(next));
        }
    }

    //  Actions

    /// Paste the selected entry and ask the panel to close.
    pub fn activate(&mut self) {
        let Some(entry) = self.selected.and_then(|i| self.items.get(i)) else {
            return;
        };
        let id = entry.id.clone();
        self.paste_item(&id);
        self.request_close();
    }

    /// Select entry `index` and activate it.  Out-of-range indices are
    /// ignored.
    pub fn activate_index(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        self.set_selected(Some(index));
        self.activate();
    }

    /// Put entry `id` back on the clipboard.
    pub fn paste_item(&self, id: &str) {
        let result = self
            .runner
            .output(CLIPHIST, &["decode", id], None)
            .and_then(|data| self.runner.run(WL_COPY, &[], Some(data.as_slice())));
        match result {
            Ok(()) => info!("pasted clipboard entry {}", id),
            Err(e) => error!("failed to paste clipboard entry {}: {}", id, e),
        }
    }

    /// Raw bytes of entry `id`; empty when decoding fails.
    pub fn decode_item(&self, id: &str) -> Vec<u8> {
        decode(&self.runner, id)
    }

    /// Decode entry `id` on a background thread and send the bytes to
    /// `tx`.  Used for image previews.
    pub fn decode_in_background(&self, id: &str, tx: mpsc::Sender<(String, Vec<u8>)>) {
        let runner = self.runner.clone();
        let id = id.to_string();
        std::thread::spawn(move || {
            let data = decode(&runner, &id);
            let _ = tx.send((id, data));
        });
    }

    pub fn delete_current(&mut self) {
        let Some(entry) = self.selected.and_then(|i| self.items.get(i)).cloned() else {
            return;
        };
        self.delete_item(&entry);
    }

    /// Remove `entry` from the history.
    pub fn delete_item(&mut self, entry: &ClipEntry) {
        let line = format!("{}\n", entry.line());
        if let Err(e) = self.runner.run(CLIPHIST, &["delete"], Some(line.as_bytes())) {
            error!("failed to delete clipboard entry {}: {}", entry.id, e);
            return;
        }
        let remaining: Vec<ClipEntry> = self.items.iter().filter(|e| *e != entry).cloned().collect();
        self.set_items(remaining);
        self.fix_selection();
    }

    /// Drop the whole history.
    pub fn wipe_history(&mut self) {
        if let Err(e) = self.runner.run(CLIPHIST, &["wipe"], None) {
            error!("failed to wipe clipboard history: {}", e);
            return;
        }
        info!("clipboard history wiped");
        self.set_items(Vec::new());
        self.fix_selection();
    }

    //  Query

    /// Record typed search text; it is applied by [`tick`](Self::tick)
    /// once the debounce delay has passed.
    pub fn update_query_input(&mut self, text: &str, now: Instant) {
        self.debounce.push(text.to_string(), now);
    }

    /// Apply the filter immediately.
    pub fn set_query(&mut self, text: &str) {
        let query = normalize_query(text);
        if query == self.query {
            return;
        }
        self.query = query.clone();
        self.observer.emit(ClipboardEvent::QueryChanged(query));
    }

    pub fn cancel_pending_query(&mut self) {
        self.debounce.cancel();
    }

    /// Drive timers.  Call regularly from the UI loop.
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.debounce.poll(now) {
            self.set_query(&text);
        }
    }

    pub fn request_close(&mut self) {
        self.observer.emit(ClipboardEvent::CloseRequested);
    }
}

fn decode<R: CommandRunner>(runner: &R, id: &str) -> Vec<u8> {
    runner.output(CLIPHIST, &["decode", id], None).unwrap_or_else(|e| {
        debug!("failed to decode clipboard entry {}: {}", id, e);
        Vec::new()
    })
}

/// Polls `cliphist list` on a background thread.
///
/// The thread exits once the poller is dropped.
pub struct HistoryPoller {
    rx: mpsc::Receiver<String>,
}

impl HistoryPoller {
    pub fn start<R: CommandRunner>(runner: R, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || loop {
            let raw = match runner.output(CLIPHIST, &["list"], None) {
                Ok(out) => String::from_utf8_lossy(&out).trim().to_string(),
                Err(e) => {
                    debug!("cliphist list failed: {}", e);
                    String::new()
                }
            };
            if tx.send(raw).is_err() {
                debug!("history poller stopped");
                return;
            }
            std::thread::sleep(interval);
        });
        Self { rx }
    }

    /// Most recent snapshot received since the last call, if any.
    pub fn latest(&self) -> Option<String> {
        self.rx.try_iter().last()
    }
}
