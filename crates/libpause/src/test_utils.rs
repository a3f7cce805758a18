//! Shared helpers for tests of libpause and its consumers
use std::cell::RefCell;
use std::rc::Rc;

use crate::observer::{Event, Observer};

/// An ordered log shared between test doubles, so a test can assert the
/// order in which different collaborators were called.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&self, entry: S) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }
}

/// Keeps every observed event
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<Event>>,
}

impl RecordingObserver {
    pub fn warnings(&self) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.level() == tracing::Level::WARN)
            .cloned()
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: &Event) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Collects the display strings of an error and all of its sources
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }
    chain
}
