//! Toolkit-independent state behind each panel.
//!
//! A service owns the data a panel displays (items, selection, query)
//! and performs the side effects the panel asks for through the
//! [`CommandRunner`](crate::traits::CommandRunner) and
//! [`AppRegistry`](crate::traits::AppRegistry) seams.  Panels observe a
//! service through an [`mpsc`] channel of events and drive its timers by
//! calling `tick` from their frame callback, so everything here can be
//! tested without a display.

pub mod clipboard;
pub mod launcher;
pub mod power;

use log::debug;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Default quiet period before typed search text is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Optional event channel to a panel.
///
/// Sending never fails from the service's point of view: a panel that
/// went away simply stops receiving.
#[derive(Debug)]
pub(crate) struct Observer<E> {
    tx: Option<mpsc::Sender<E>>,
}

impl<E> Default for Observer<E> {
    fn default() -> Self {
        Self { tx: None }
    }
}

impl<E: std::fmt::Debug> Observer<E> {
    pub(crate) fn set(&mut self, tx: mpsc::Sender<E>) {
        self.tx = Some(tx);
    }

    pub(crate) fn emit(&mut self, event: E) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("observer gone, dropping events");
                self.tx = None;
            }
        }
    }
}

/// Delays a text input until it has been stable for a while.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Schedule `text`.  Re-submitting the text that is already pending
    /// keeps the original deadline.
    pub fn push(&mut self, text: String, now: Instant) {
        if let Some((pending, _)) = &self.pending {
            if *pending == text {
                return;
            }
        }
        self.pending = Some((text, now + self.delay));
    }

    /// Take the pending text once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
