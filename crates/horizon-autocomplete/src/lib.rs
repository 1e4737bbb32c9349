//! Text-entry autocompletion for Horizon Lattice.
//!
//! This crate provides the completion machinery that shell text fields use
//! for path, history, and command entry:
//!
//! - **Controller**: per-field matching engine with inline append, the
//!   dropdown suggestion list, and Ctrl+Enter quick-complete templates
//! - **Registry**: field-to-controller binding, keep-alive ownership, and
//!   event routing
//! - **Candidate Sources**: resettable string enumerators behind shared
//!   handles, re-walked on every keystroke
//! - **Host Contract**: the traits an embedding shell implements for its
//!   text fields, dropdown views, and control storage
//! - **Key-Value Store**: layered user/system lookup for quick-complete
//!   templates, with an in-memory implementation
//!
//! Matching is a case-insensitive prefix test against the typed text. The
//! controller never edits the field on its own schedule; it reacts to key
//! releases after the field has processed the key natively, so the user's
//! editing always wins.
//!
//! # Source Example
//!
//! ```
//! use horizon_autocomplete::{CandidateSource, StringListSource};
//!
//! let mut source = StringListSource::from(vec!["alpha", "beta"]);
//! source.reset();
//! assert_eq!(source.next().as_deref(), Some("alpha"));
//! assert_eq!(source.next().as_deref(), Some("beta"));
//! assert_eq!(source.next(), None);
//! ```
//!
//! # Session Example
//!
//! ```ignore
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use horizon_autocomplete::{
//!     AutocompleteController, AutocompleteOptions, AutocompleteRegistry,
//!     ControlEvent, Key, KeyReleaseEvent, MemoryStore, StringListSource,
//! };
//!
//! // `host` implements AutocompleteHost over the shell's control storage.
//! let mut registry = AutocompleteRegistry::new();
//! let source = Rc::new(RefCell::new(StringListSource::from(vec![
//!     "documents", "downloads", "desktop",
//! ])));
//! let controller = Rc::new(RefCell::new(AutocompleteController::with_options(
//!     AutocompleteOptions::APPEND_SUGGEST,
//! )));
//! registry.init_controller(
//!     &mut host, controller, field_id, &source, None, None, &MemoryStore::new(),
//! )?;
//!
//! // The shell forwards its input stream after native processing.
//! registry.dispatch(
//!     &mut host, field_id,
//!     &ControlEvent::KeyRelease(KeyReleaseEvent::plain(Key::Char('d'))),
//! );
//! ```

pub mod controller;
mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod registry;
pub mod source;
pub mod store;
mod text;

#[cfg(test)]
mod test_support;

pub use controller::{AutocompleteController, AutocompleteOptions, InitOutcome};
pub use error::{Error, Result};
pub use events::{ControlEvent, DispatchResult, Key, KeyReleaseEvent, KeyboardModifiers};
pub use geometry::{Point, Rect, Size};
pub use host::{AutocompleteHost, ControlId, SuggestionListView, TextField};
pub use registry::AutocompleteRegistry;
pub use source::{CandidateObject, CandidateSource, SharedCandidateSource, StringListSource};
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreScope};
