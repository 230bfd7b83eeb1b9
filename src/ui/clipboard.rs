//! Clipboard history bar along the bottom screen edge.
//!
//! Cards are built incrementally: the first `initial_chunk` entries
//! synchronously, the rest from idle callbacks, reusing buttons from a
//! pool.  Image entries show a placeholder until their bytes arrive from
//! a background decode; they are scaled on the UI thread.

use super::layer::{every_frame, layer_window, on_key_pressed, PanelHandle};
use crate::config::ClipboardConfig;
use crate::preview::{fit_within, is_image_data, truncate_display, CARD_TEXT_LIMIT};
use crate::render::{
    adjust_selection_for_candidates, clamp_to_rendered, move_within, reselect_after_chunk, scroll_target,
    suggested_item_height, ChunkPlan,
};
use crate::search::{extract_terms, highlight_markup_multi, RenderCandidate};
use crate::services::clipboard::{ClipboardEvent, ClipboardService, HistoryPoller};
use crate::traits::CommandRunner;
use gtk4::prelude::*;
use gtk4::{gdk, gdk_pixbuf, glib};
use gtk4_layer_shell::Edge;
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::mpsc;
use std::time::{Duration, Instant};

const CARD_SPACING: i32 = 16;

/// A pooled card button.  `index` is the original history index the card
/// currently shows.
struct Card {
    button: gtk4::Button,
    index: Rc<Cell<Option<usize>>>,
}

struct ClipboardPanel<R: CommandRunner> {
    me: Weak<RefCell<ClipboardPanel<R>>>,
    service: ClipboardService<R>,
    events: mpsc::Receiver<ClipboardEvent>,
    poller: HistoryPoller,
    images_tx: mpsc::Sender<(String, Vec<u8>)>,
    images_rx: mpsc::Receiver<(String, Vec<u8>)>,
    config: ClipboardConfig,

    window: gtk4::Window,
    scroller: gtk4::ScrolledWindow,
    strip: gtk4::Box,
    empty: gtk4::Label,

    pool: Vec<Card>,
    /// `pool[..shown]` are attached to the strip, in display order.
    shown: usize,
    candidates: Vec<RenderCandidate>,
    terms: Vec<String>,
    plan: ChunkPlan,
    /// Original indices of the built cards, in display order.
    rendered: Vec<usize>,
    card_height: i32,
    idle: Option<glib::SourceId>,
    scroll_queued: Cell<bool>,
    /// Frames seen since the last selection or layout change.
    scroll_frames: Cell<u32>,

    waiting: HashMap<String, Vec<gtk4::Picture>>,
    textures: HashMap<String, gdk::Texture>,
}

impl<R: CommandRunner> ClipboardPanel<R> {
    /// Drive one frame.  Returns `true` when cards remain to be built
    /// from idle callbacks.
    fn tick(&mut self) -> bool {
        if let Some(raw) = self.poller.latest() {
            self.service.on_history_changed(&raw);
        }
        self.service.tick(Instant::now());

        let mut rerender = false;
        let events: Vec<ClipboardEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                ClipboardEvent::ItemsChanged | ClipboardEvent::QueryChanged(_) => rerender = true,
                ClipboardEvent::SelectionChanged(_) => self.sync_selection(),
                ClipboardEvent::CloseRequested => {
                    self.window.close();
                    return false;
                }
            }
        }

        self.apply_images();

        if rerender {
            self.rerender();
            return !self.plan.is_done();
        }
        false
    }

    //  Rendering

    fn rerender(&mut self) {
        if let Some(source) = self.idle.take() {
            source.remove();
        }
        for card in &self.pool[..self.shown] {
            self.strip.remove(&card.button);
            card.index.set(None);
            card.button.remove_css_class("selected");
        }
        self.shown = 0;
        self.rendered.clear();

        self.terms = extract_terms(self.service.query());
        self.candidates = self.service.candidates(self.config.max_items);
        self.card_height = suggested_item_height(
            &self.candidates,
            self.config.item_width,
            self.config.effective_item_height(),
        );
        self.scroller.set_min_content_height(self.card_height + 8);
        self.window
            .set_size_request(-1, self.config.bar_height.max(self.card_height + 16));

        if self.candidates.is_empty() {
            let text = if self.service.items().is_empty() {
                "(Clipboard empty)"
            } else {
                "(no results)"
            };
            self.empty.set_text(text);
            self.empty.set_visible(true);
            self.scroller.set_visible(false);
            self.plan = ChunkPlan::new(0, 1, 1);
            return;
        }
        self.empty.set_visible(false);
        self.scroller.set_visible(true);

        let selected = self.service.selected();
        let fixed = if self.terms.is_empty() {
            clamp_to_rendered(selected, self.candidates.len())
        } else {
            adjust_selection_for_candidates(selected, &self.candidates, true).filter(|&i| Some(i) != selected)
        };
        if let Some(index) = fixed {
            self.service.set_selected(Some(index));
        }

        self.plan = ChunkPlan::new(
            self.candidates.len(),
            self.config.initial_chunk,
            self.config.chunk_size,
        );
        self.render_next_batch();
    }

    /// Build the next batch of cards.  Returns `true` while more remain.
    fn render_next_batch(&mut self) -> bool {
        let Some(range) = self.plan.next_batch() else {
            return false;
        };
        let batch: Vec<RenderCandidate> = self.candidates[range].to_vec();
        for candidate in &batch {
            self.append_card(candidate);
        }
        debug!("clipboard: {}/{} cards built", self.plan.rendered(), self.plan.total());

        if !self.terms.is_empty() {
            if let Some(index) = reselect_after_chunk(self.service.selected(), &self.rendered) {
                self.service.set_selected(Some(index));
            }
        }
        self.sync_selection();
        !self.plan.is_done()
    }

    fn append_card(&mut self, candidate: &RenderCandidate) {
        if self.shown == self.pool.len() {
            let card = self.new_card();
            self.pool.push(card);
        }
        let (button, slot) = {
            let card = &self.pool[self.shown];
            (card.button.clone(), card.index.clone())
        };
        self.shown += 1;

        let width = self.config.item_width;
        if is_image_data(&candidate.content) {
            let picture = self.image_for(&candidate.id);
            button.set_child(Some(&picture));
            button.add_css_class("image");
            button.set_tooltip_text(Some("[image]"));
        } else {
            let display = truncate_display(&candidate.content, CARD_TEXT_LIMIT);
            let label = gtk4::Label::new(None);
            label.set_markup(&highlight_markup_multi(&display, &self.terms));
            label.set_wrap(true);
            label.set_wrap_mode(gtk4::pango::WrapMode::WordChar);
            label.set_xalign(0.0);
            label.set_yalign(0.0);
            label.set_valign(gtk4::Align::Start);
            label.set_size_request((width - 16).max(1), -1);
            button.set_child(Some(&label));
            button.remove_css_class("image");
            button.set_tooltip_text(Some(display.as_str()));
        }
        button.set_size_request(width, self.card_height);

        slot.set(Some(candidate.index));
        self.strip.append(&button);
        self.rendered.push(candidate.index);
    }

    fn new_card(&self) -> Card {
        let index = Rc::new(Cell::new(None));
        let button = gtk4::Button::new();
        button.add_css_class("clip-card");
        button.set_valign(gtk4::Align::Center);

        let me = self.me.clone();
        let slot = index.clone();
        button.connect_clicked(move |_| {
            let Some(panel) = me.upgrade() else { return };
            let Ok(mut p) = panel.try_borrow_mut() else { return };
            if let Some(index) = slot.get() {
                p.service.activate_index(index);
            }
        });
        Card { button, index }
    }

    //  Images

    /// Picture for entry `id`: the cached texture, or an empty picture
    /// filled in once the background decode finishes.
    fn image_for(&mut self, id: &str) -> gtk4::Picture {
        let picture = gtk4::Picture::new();
        picture.set_can_shrink(true);
        if let Some(texture) = self.textures.get(id) {
            picture.set_paintable(Some(texture));
            return picture;
        }
        let waiting = self.waiting.entry(id.to_string()).or_default();
        if waiting.is_empty() {
            self.service.decode_in_background(id, self.images_tx.clone());
        }
        waiting.push(picture.clone());
        picture
    }

    fn apply_images(&mut self) {
        let max_width = (self.config.item_width - 16).max(1);
        let max_height = (self.card_height - 48).max(1);
        let arrived: Vec<(String, Vec<u8>)> = self.images_rx.try_iter().collect();
        for (id, bytes) in arrived {
            let pictures = self.waiting.remove(&id).unwrap_or_default();
            match texture_from_bytes(&bytes, max_width, max_height) {
                Some(texture) => {
                    for picture in &pictures {
                        picture.set_paintable(Some(&texture));
                    }
                    self.textures.insert(id, texture);
                }
                None => debug!("no image preview for clipboard entry {}", id),
            }
        }
    }

    //  Selection

    fn navigate(&mut self, delta: isize) {
        if self.rendered.is_empty() {
            if delta < 0 {
                self.service.move_left();
            } else {
                self.service.move_right();
            }
            return;
        }
        let selected = self.service.selected();
        if let Some(index) = move_within(&self.rendered, selected, delta) {
            if Some(index) != selected {
                self.service.set_selected(Some(index));
            }
        }
    }

    fn sync_selection(&self) {
        let selected = self.service.selected();
        for card in &self.pool[..self.shown] {
            if selected.is_some() && card.index.get() == selected {
                card.button.add_css_class("selected");
            } else {
                card.button.remove_css_class("selected");
            }
        }
        self.queue_scroll();
    }

    fn selected_card(&self) -> Option<&gtk4::Button> {
        let selected = self.service.selected()?;
        self.pool[..self.shown]
            .iter()
            .find(|card| card.index.get() == Some(selected))
            .map(|card| &card.button)
    }

    /// Bring the selected card into view once the strip has been laid out
    /// again.  Allocations read right after appending cards are either
    /// empty or left over from the previous layout.
    fn queue_scroll(&self) {
        self.scroll_frames.set(0);
        if self.scroll_queued.replace(true) {
            return;
        }
        let me = self.me.clone();
        self.strip.add_tick_callback(move |_, _| {
            let Some(panel) = me.upgrade() else {
                return glib::ControlFlow::Break;
            };
            let Ok(p) = panel.try_borrow() else {
                return glib::ControlFlow::Continue;
            };
            let frames = p.scroll_frames.get() + 1;
            p.scroll_frames.set(frames);

            let Some(button) = p.selected_card() else {
                p.scroll_queued.set(false);
                return glib::ControlFlow::Break;
            };
            #[allow(deprecated)]
            let alloc = button.allocation();
            match scroll_step(frames, alloc.width()) {
                ScrollStep::Wait => glib::ControlFlow::Continue,
                ScrollStep::Scroll => {
                    p.scroll_to(alloc.x(), alloc.width());
                    p.scroll_queued.set(false);
                    glib::ControlFlow::Break
                }
                ScrollStep::GiveUp => {
                    debug!("selected clipboard card never got a size");
                    p.scroll_queued.set(false);
                    glib::ControlFlow::Break
                }
            }
        });
    }

    fn scroll_to(&self, x: i32, width: i32) {
        let adj = self.scroller.hadjustment();
        if let Some(value) = scroll_target(x as f64, width as f64, adj.value(), adj.page_size(), adj.upper()) {
            adj.set_value(value);
        }
    }
}

/// Frames to let pass after a change before card allocations are read.
const SETTLE_FRAMES: u32 = 2;
/// Frames after which a card that still has no size is not scrolled to.
const MAX_SCROLL_FRAMES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollStep {
    Wait,
    Scroll,
    GiveUp,
}

/// What a pending scroll does on the `frames`-th frame after the last
/// change, given the selected card's allocated width.
fn scroll_step(frames: u32, width: i32) -> ScrollStep {
    if frames < SETTLE_FRAMES {
        ScrollStep::Wait
    } else if width > 0 {
        ScrollStep::Scroll
    } else if frames >= MAX_SCROLL_FRAMES {
        ScrollStep::GiveUp
    } else {
        ScrollStep::Wait
    }
}

/// Decode image bytes and scale them to fit `max_width × max_height`.
fn texture_from_bytes(bytes: &[u8], max_width: i32, max_height: i32) -> Option<gdk::Texture> {
    if bytes.is_empty() {
        return None;
    }
    let loader = gdk_pixbuf::PixbufLoader::new();
    loader.write(bytes).ok()?;
    loader.close().ok()?;
    let pixbuf = loader.pixbuf()?;

    let (width, height) = (pixbuf.width(), pixbuf.height());
    let (fit_w, fit_h) = fit_within(width, height, max_width, max_height);
    let pixbuf = if (fit_w, fit_h) == (width, height) {
        pixbuf
    } else {
        pixbuf.scale_simple(fit_w, fit_h, gdk_pixbuf::InterpType::Bilinear)?
    };
    #[allow(deprecated)]
    let texture = gdk::Texture::for_pixbuf(&pixbuf);
    Some(texture)
}

/// Schedule the remaining batches from an idle callback.
fn schedule_chunks<R: CommandRunner>(panel: &Rc<RefCell<ClipboardPanel<R>>>) {
    let weak = Rc::downgrade(panel);
    let source = glib::idle_add_local(move || {
        let Some(panel) = weak.upgrade() else {
            return glib::ControlFlow::Break;
        };
        let Ok(mut p) = panel.try_borrow_mut() else {
            return glib::ControlFlow::Continue;
        };
        if p.render_next_batch() {
            glib::ControlFlow::Continue
        } else {
            p.idle = None;
            glib::ControlFlow::Break
        }
    });
    if let Ok(mut p) = panel.try_borrow_mut() {
        if let Some(previous) = p.idle.replace(source) {
            previous.remove();
        }
    }
}

/// Build the clipboard bar.
pub fn build<R: CommandRunner>(config: &ClipboardConfig, runner: R) -> PanelHandle {
    let window = layer_window(
        "lfn-shell-clipboard",
        &[Edge::Left, Edge::Bottom, Edge::Right],
        &[],
    );

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    container.add_css_class("clipboard-panel");
    window.set_child(Some(&container));

    let header = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    header.set_halign(gtk4::Align::Center);
    let entry = gtk4::Entry::new();
    entry.set_placeholder_text(Some("Search..."));
    entry.set_hexpand(true);
    header.append(&entry);
    let clear = gtk4::Button::from_icon_name("user-trash-symbolic");
    clear.set_tooltip_text(Some("Clear history"));
    header.append(&clear);
    container.append(&header);

    let strip = gtk4::Box::new(gtk4::Orientation::Horizontal, CARD_SPACING);
    let scroller = gtk4::ScrolledWindow::new();
    scroller.set_policy(gtk4::PolicyType::Automatic, gtk4::PolicyType::Never);
    scroller.set_hexpand(true);
    scroller.set_child(Some(&strip));
    container.append(&scroller);

    let empty = gtk4::Label::new(Some("(Clipboard empty)"));
    empty.add_css_class("empty-state");
    empty.set_size_request(config.item_width, config.effective_item_height());
    container.append(&empty);
    scroller.set_visible(false);

    let (tx, events) = mpsc::channel();
    let mut service = ClipboardService::new(runner.clone())
        .with_debounce(Duration::from_millis(config.search_debounce_ms));
    service.set_observer(tx);
    let poller = HistoryPoller::start(runner, Duration::from_millis(config.poll_interval_ms));
    let (images_tx, images_rx) = mpsc::channel();

    let panel = Rc::new_cyclic(|me| {
        RefCell::new(ClipboardPanel {
            me: me.clone(),
            service,
            events,
            poller,
            images_tx,
            images_rx,
            config: config.clone(),
            window: window.clone(),
            scroller,
            strip,
            empty,
            pool: Vec::new(),
            shown: 0,
            candidates: Vec::new(),
            terms: Vec::new(),
            plan: ChunkPlan::new(0, 1, 1),
            rendered: Vec::new(),
            card_height: config.effective_item_height(),
            idle: None,
            scroll_queued: Cell::new(false),
            scroll_frames: Cell::new(0),
            waiting: HashMap::new(),
            textures: HashMap::new(),
        })
    });

    {
        let panel = Rc::downgrade(&panel);
        entry.connect_changed(move |entry| {
            let Some(panel) = panel.upgrade() else { return };
            if let Ok(mut p) = panel.try_borrow_mut() {
                p.service.update_query_input(&entry.text(), Instant::now());
            };
        });
    }

    {
        let panel = Rc::downgrade(&panel);
        clear.connect_clicked(move |_| {
            let Some(panel) = panel.upgrade() else { return };
            if let Ok(mut p) = panel.try_borrow_mut() {
                p.service.wipe_history();
            };
        });
    }

    {
        let panel = Rc::downgrade(&panel);
        on_key_pressed(&window, move |key| {
            let Some(panel) = panel.upgrade() else {
                return glib::Propagation::Proceed;
            };
            let Ok(mut p) = panel.try_borrow_mut() else {
                return glib::Propagation::Proceed;
            };
            match key {
                gdk::Key::Left => p.navigate(-1),
                gdk::Key::Right => p.navigate(1),
                gdk::Key::Return | gdk::Key::KP_Enter => p.service.activate(),
                gdk::Key::Delete => p.service.delete_current(),
                gdk::Key::Escape => {
                    p.service.cancel_pending_query();
                    p.service.request_close();
                }
                _ => return glib::Propagation::Proceed,
            }
            glib::Propagation::Stop
        });
    }

    let handle = PanelHandle::new(window, Some(entry.upcast()));

    every_frame(handle.alive(), move || {
        let more = match panel.try_borrow_mut() {
            Ok(mut p) => p.tick(),
            Err(_) => false,
        };
        if more {
            schedule_chunks(&panel);
        }
    });

    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_waits_for_a_fresh_layout() {
        // A pooled card still carries its old allocation on the first frame.
        assert_eq!(scroll_step(1, 240), ScrollStep::Wait);
        assert_eq!(scroll_step(SETTLE_FRAMES, 240), ScrollStep::Scroll);
    }

    #[test]
    fn scroll_retries_until_the_card_is_sized() {
        assert_eq!(scroll_step(SETTLE_FRAMES, 0), ScrollStep::Wait);
        assert_eq!(scroll_step(MAX_SCROLL_FRAMES - 1, 0), ScrollStep::Wait);
        assert_eq!(scroll_step(MAX_SCROLL_FRAMES, 0), ScrollStep::GiveUp);
        assert_eq!(scroll_step(MAX_SCROLL_FRAMES, 1), ScrollStep::Scroll);
    }
}
