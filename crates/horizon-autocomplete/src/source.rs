//! Candidate enumeration contracts.
//!
//! The matching engine pulls candidate strings from a [`CandidateSource`], a
//! restartable forward enumerator. Providers hand the controller an opaque
//! [`CandidateObject`] at initialization; the controller probes it for a
//! string source and rejects objects that cannot enumerate strings.
//!
//! # Example
//!
//! ```ignore
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use horizon_autocomplete::source::StringListSource;
//!
//! let source = Rc::new(RefCell::new(StringListSource::from(vec![
//!     "cat", "car", "dog",
//! ])));
//! // `Rc<RefCell<StringListSource>>` is a `CandidateObject`, ready for init.
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A shared, restartable candidate enumerator.
pub type SharedCandidateSource = Rc<RefCell<dyn CandidateSource>>;

// ============================================================================
// Candidate Source Trait
// ============================================================================

/// A restartable forward enumerator over candidate strings.
///
/// The engine calls [`reset`](Self::reset) before every matching pass and
/// pulls with [`next`](Self::next) until `None`. A source may be restarted
/// any number of times; sources that cannot rewind may ignore `reset`, at
/// the cost of stale passes enumerating nothing.
pub trait CandidateSource {
    /// Rewind enumeration to the first candidate.
    fn reset(&mut self);

    /// Produce the next candidate, or `None` when exhausted.
    fn next(&mut self) -> Option<String>;
}

// ============================================================================
// Candidate Object Trait
// ============================================================================

/// An opaque provider object handed to controller initialization.
///
/// Providers expose their enumeration capability through
/// [`string_source`](Self::string_source); returning `None` means the object
/// cannot enumerate strings and initialization fails with
/// [`Error::UnsupportedSource`](crate::Error::UnsupportedSource).
pub trait CandidateObject {
    /// The provider's string enumerator, if it has one.
    fn string_source(&self) -> Option<SharedCandidateSource>;
}

impl<S: CandidateSource + 'static> CandidateObject for Rc<RefCell<S>> {
    fn string_source(&self) -> Option<SharedCandidateSource> {
        Some(Rc::clone(self) as SharedCandidateSource)
    }
}

impl CandidateObject for SharedCandidateSource {
    fn string_source(&self) -> Option<SharedCandidateSource> {
        Some(Rc::clone(self))
    }
}

// ============================================================================
// String List Source
// ============================================================================

/// A candidate source backed by a static list of strings.
///
/// This is the most common source for simple autocomplete scenarios where
/// the candidates are known ahead of time. Candidates are enumerated in
/// list order.
#[derive(Debug, Clone, Default)]
pub struct StringListSource {
    items: Vec<String>,
    cursor: usize,
}

impl StringListSource {
    /// Create a new string list source with the given items.
    pub fn new(items: Vec<String>) -> Self {
        Self { items, cursor: 0 }
    }

    /// Get a reference to the items.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Replace the items, rewinding enumeration.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.cursor = 0;
    }

    /// Add an item to the end of the list.
    pub fn add_item(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = 0;
    }
}

impl CandidateSource for StringListSource {
    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn next(&mut self) -> Option<String> {
        let item = self.items.get(self.cursor)?;
        self.cursor += 1;
        Some(item.clone())
    }
}

impl From<Vec<String>> for StringListSource {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl From<Vec<&str>> for StringListSource {
    fn from(items: Vec<&str>) -> Self {
        Self::new(items.into_iter().map(String::from).collect())
    }
}
