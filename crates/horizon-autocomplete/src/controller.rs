//! The autocompletion controller: matching engine, list navigation, lifecycle.
//!
//! [`AutocompleteController`] owns the matching and interaction state machine
//! for one text field. It watches the field's key releases, enumerates a
//! [`CandidateSource`](crate::source::CandidateSource) for case-insensitive
//! prefix matches, appends the best match inline, and populates the dropdown
//! suggestion list. Binding a controller to a field goes through
//! [`AutocompleteRegistry::init_controller`](crate::registry::AutocompleteRegistry::init_controller),
//! which owns the routing table and the controller's keep-alive reference.
//!
//! # Example
//!
//! ```ignore
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use horizon_autocomplete::{
//!     AutocompleteController, AutocompleteOptions, AutocompleteRegistry,
//!     ControlEvent, Key, KeyReleaseEvent, MemoryStore, StringListSource,
//! };
//!
//! let mut registry = AutocompleteRegistry::new();
//! let source = Rc::new(RefCell::new(StringListSource::from(vec!["cat", "car"])));
//! let controller = Rc::new(RefCell::new(
//!     AutocompleteController::with_options(AutocompleteOptions::APPEND_SUGGEST),
//! ));
//!
//! registry.init_controller(
//!     &mut host, Rc::clone(&controller), field_id, &source,
//!     None, None, &MemoryStore::new(),
//! )?;
//!
//! // The host forwards its input stream; after the field processed a key,
//! // the release lands here and drives the matching pass.
//! registry.dispatch(
//!     &mut host, field_id,
//!     &ControlEvent::KeyRelease(KeyReleaseEvent::plain(Key::Char('c'))),
//! );
//! ```

use crate::error::{Error, Result};
use crate::events::{DispatchResult, Key, KeyReleaseEvent};
use crate::geometry::{Point, Rect};
use crate::host::{AutocompleteHost, ControlId, SuggestionListView};
use crate::source::{CandidateObject, SharedCandidateSource};
use crate::store::{KeyValueStore, StoreScope};
use crate::text;

/// Most rows the dropdown shows at once; taller result sets scroll.
const MAX_VISIBLE_ROWS: usize = 7;

// ============================================================================
// Options
// ============================================================================

/// Behavior flags for a controller, independently togglable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutocompleteOptions {
    /// Complete inline as the user types: the field text is extended with
    /// the best match's remainder, shown as a selected suffix.
    pub auto_append: bool,
    /// Show a dropdown list of every match below the field.
    pub auto_suggest: bool,
    /// Up/Down on an empty field opens the list with every candidate.
    pub arrow_key_drops_list: bool,
}

impl AutocompleteOptions {
    /// All behaviors off.
    pub const NONE: Self = Self {
        auto_append: false,
        auto_suggest: false,
        arrow_key_drops_list: false,
    };

    /// Inline append only.
    pub const APPEND: Self = Self {
        auto_append: true,
        auto_suggest: false,
        arrow_key_drops_list: false,
    };

    /// Dropdown list only.
    pub const SUGGEST: Self = Self {
        auto_append: false,
        auto_suggest: true,
        arrow_key_drops_list: false,
    };

    /// Inline append plus dropdown list.
    pub const APPEND_SUGGEST: Self = Self {
        auto_append: true,
        auto_suggest: true,
        arrow_key_drops_list: false,
    };
}

impl Default for AutocompleteOptions {
    /// Inline append starts enabled; everything else is opt-in.
    fn default() -> Self {
        Self::APPEND
    }
}

// ============================================================================
// Init Outcome
// ============================================================================

/// Successful initialization outcomes.
///
/// Binding can complete even when the quick-complete template could not be
/// copied into place; the controller then runs normally with quick complete
/// permanently absent. The distinction stays visible in the signature
/// instead of being folded into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Fully initialized.
    Ready,
    /// Initialized, but the quick-complete template was dropped because its
    /// buffer could not be reserved.
    QuickCompleteUnavailable,
}

// ============================================================================
// Controller
// ============================================================================

/// Text-entry autocompletion for one host text field.
///
/// Created detached, bound to a field once through the registry, and driven
/// entirely by host events from then on. All operations take the host `&mut`
/// and run synchronously on the thread owning the field's event loop.
pub struct AutocompleteController {
    options: AutocompleteOptions,
    enabled: bool,
    initialized: bool,
    /// Bound field; cleared when the field is destroyed.
    field: Option<ControlId>,
    /// Dropdown presentation, created lazily when `auto_suggest` turns on.
    list: Option<ControlId>,
    source: Option<SharedCandidateSource>,
    /// Resolved once at initialization, immutable afterwards.
    quick_complete: Option<String>,
    /// Query text recorded by the last matching pass; restored when
    /// navigation lands on "no selection".
    backup: String,
    /// Whether this instance owns the field's event hook. Cleared when a
    /// newer controller takes the field over.
    owns_hook: bool,
}

// Manual impl: `source` holds a `dyn CandidateSource`, which carries no
// `Debug` bound, so the field is shown opaquely.
impl std::fmt::Debug for AutocompleteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteController")
            .field("options", &self.options)
            .field("enabled", &self.enabled)
            .field("initialized", &self.initialized)
            .field("field", &self.field)
            .field("list", &self.list)
            .field("source", &self.source.as_ref().map(|_| "dyn CandidateSource"))
            .field("quick_complete", &self.quick_complete)
            .field("backup", &self.backup)
            .field("owns_hook", &self.owns_hook)
            .finish()
    }
}

impl Default for AutocompleteController {
    fn default() -> Self {
        Self::new()
    }
}

impl AutocompleteController {
    /// Create a detached controller with default options.
    pub fn new() -> Self {
        Self {
            options: AutocompleteOptions::default(),
            enabled: true,
            initialized: false,
            field: None,
            list: None,
            source: None,
            quick_complete: None,
            backup: String::new(),
            owns_hook: false,
        }
    }

    /// Create a detached controller with the given options.
    pub fn with_options(options: AutocompleteOptions) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Get the current options.
    pub fn options(&self) -> AutocompleteOptions {
        self.options
    }

    /// Replace the options.
    ///
    /// Turning `auto_suggest` on for a bound controller lazily creates the
    /// (hidden) dropdown; turning it off never destroys the dropdown.
    pub fn set_options(&mut self, host: &mut dyn AutocompleteHost, options: AutocompleteOptions) {
        self.options = options;
        if self.options.auto_suggest && self.field.is_some() && self.list.is_none() {
            self.ensure_suggestion_list(host);
        }
    }

    /// Check if the controller reacts to input events.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input handling.
    ///
    /// A disabled controller forwards every input event untouched. Toggling
    /// clears nothing; list contents and backup text survive. The field's
    /// destruction is processed regardless, so teardown cannot be missed.
    pub fn set_enabled(&mut self, enabled: bool) {
        tracing::trace!(
            target: "horizon_autocomplete::controller",
            enabled,
            "controller enablement changed"
        );
        self.enabled = enabled;
    }

    /// The field this controller is bound to, if still alive.
    pub fn bound_field(&self) -> Option<ControlId> {
        self.field
    }

    /// The dropdown view this controller drives, if one exists.
    pub fn list_view(&self) -> Option<ControlId> {
        self.list
    }

    /// Whether this instance owns its field's event hook.
    ///
    /// Exactly one controller owns the hook of a bound field at any time; a
    /// controller loses ownership when a newer one takes the field over.
    pub fn owns_hook(&self) -> bool {
        self.owns_hook
    }

    /// Whether the dropdown is visible and, if so, the selected row's text.
    pub fn dropdown_status(&self, host: &dyn AutocompleteHost) -> (bool, Option<String>) {
        let Some(list) = self.list.and_then(|id| host.suggestion_list(id)) else {
            return (false, None);
        };
        if !list.is_visible() {
            return (false, None);
        }
        let selected = list.selected();
        let text = (selected >= 0)
            .then(|| list.item_text(selected as usize))
            .flatten();
        (true, text)
    }

    // =========================================================================
    // Binding (driven by the registry)
    // =========================================================================

    /// Record the field binding and the enumerator, rejecting misuse.
    pub(crate) fn begin_binding(
        &mut self,
        field: ControlId,
        object: &dyn CandidateObject,
    ) -> Result<()> {
        if self.initialized {
            // The binding is exclusive and permanent; a controller whose
            // field died cannot be re-targeted either.
            return Err(if self.field.is_some() {
                Error::AlreadyInitialized
            } else {
                Error::StaleBinding
            });
        }
        let source = object
            .string_source()
            .ok_or(Error::UnsupportedSource)?;
        self.field = Some(field);
        self.source = Some(source);
        self.initialized = true;
        self.owns_hook = true;
        Ok(())
    }

    /// Resolve the quick-complete template from the store or the explicit
    /// value. Store failures fall through; only a failed buffer reservation
    /// degrades the outcome.
    pub(crate) fn resolve_quick_complete(
        &mut self,
        explicit: Option<&str>,
        lookup_key: Option<&str>,
        store: &dyn KeyValueStore,
    ) -> InitOutcome {
        let mut outcome = InitOutcome::Ready;

        if let Some(key) = lookup_key {
            if let Some((path, name)) = split_lookup_key(key) {
                let resolved = store
                    .lookup(StoreScope::User, path, name)
                    .or_else(|_| store.lookup(StoreScope::System, path, name));
                match resolved {
                    Ok(value) => match text::try_copy(&value) {
                        Ok(template) => self.quick_complete = Some(template),
                        Err(err) => {
                            tracing::warn!(
                                target: "horizon_autocomplete::controller",
                                %err,
                                "quick-complete template dropped"
                            );
                            outcome = InitOutcome::QuickCompleteUnavailable;
                        }
                    },
                    Err(err) => {
                        tracing::trace!(
                            target: "horizon_autocomplete::controller",
                            %err,
                            key,
                            "no stored quick-complete template"
                        );
                    }
                }
            }
        }

        if self.quick_complete.is_none() && outcome == InitOutcome::Ready {
            if let Some(explicit) = explicit {
                match text::try_copy(explicit) {
                    Ok(template) => self.quick_complete = Some(template),
                    Err(err) => {
                        tracing::warn!(
                            target: "horizon_autocomplete::controller",
                            %err,
                            "quick-complete template dropped"
                        );
                        outcome = InitOutcome::QuickCompleteUnavailable;
                    }
                }
            }
        }

        outcome
    }

    /// Create the hidden dropdown if the host can.
    pub(crate) fn ensure_suggestion_list(&mut self, host: &mut dyn AutocompleteHost) {
        if self.list.is_some() {
            return;
        }
        let Some(field) = self.field else { return };
        match host.create_suggestion_list(field) {
            Some(id) => {
                tracing::debug!(
                    target: "horizon_autocomplete::controller",
                    field = ?field,
                    list = ?id,
                    "created suggestion list"
                );
                self.list = Some(id);
            }
            None => {
                tracing::warn!(
                    target: "horizon_autocomplete::controller",
                    field = ?field,
                    "host declined suggestion list; running without a dropdown"
                );
            }
        }
    }

    /// Give up the field's hook and the dropdown presentation.
    ///
    /// Called when a newer controller takes over the field. The retired
    /// instance stays initialized (re-initializing it still fails) but no
    /// longer receives events.
    pub(crate) fn retire(&mut self, host: &mut dyn AutocompleteHost) {
        self.owns_hook = false;
        if let Some(list) = self.list.take() {
            host.destroy_suggestion_list(list);
        }
        tracing::debug!(
            target: "horizon_autocomplete::controller",
            field = ?self.field,
            "controller retired; field hook transferred"
        );
    }

    // =========================================================================
    // Keystroke Engine
    // =========================================================================

    /// React to a key release in the bound field.
    ///
    /// The field has already processed the key natively; this observes the
    /// result and runs the matching pass, navigation, or quick complete as
    /// appropriate. Runs only while enabled.
    pub fn handle_key_release(
        &mut self,
        host: &mut dyn AutocompleteHost,
        ev: KeyReleaseEvent,
    ) -> DispatchResult {
        if !self.enabled {
            return DispatchResult::Forward;
        }
        let Some(field_id) = self.field else {
            return DispatchResult::Forward;
        };
        let Some(field) = host.text_field(field_id) else {
            return DispatchResult::Forward;
        };

        // One snapshot drives the whole keystroke.
        let mut query = field.text();
        let mut display_all = false;

        match ev.key {
            Key::Enter => {
                if ev.modifiers.control {
                    self.apply_quick_complete(host, field_id, &query);
                }
                self.hide_list(host);
                return DispatchResult::Consumed;
            }

            Key::ArrowLeft | Key::ArrowRight => return DispatchResult::Consumed,

            Key::ArrowUp | Key::ArrowDown => {
                let browse = (self.options.auto_suggest || self.options.arrow_key_drops_list)
                    && !self.list_visible(host)
                    && query.is_empty();
                if !browse {
                    if self.list_visible(host) {
                        self.navigate(host, field_id, ev.key);
                    }
                    return DispatchResult::Consumed;
                }
                // Browse-all: the empty query matches every candidate.
                display_all = true;
            }

            Key::Backspace if ev.modifiers.control => {
                self.word_delete(host, field_id);
                return DispatchResult::Consumed;
            }

            Key::Backspace | Key::Delete => {
                if query.is_empty() && self.options.auto_suggest {
                    self.hide_list(host);
                    return DispatchResult::Forward;
                }
                if self.options.auto_append {
                    // The field already collapsed the appended remainder, so
                    // the delete must land on the typed text instead: shrink
                    // the query by the character before the caret.
                    let caret = host
                        .text_field(field_id)
                        .map(|f| f.selection().0)
                        .unwrap_or(0);
                    if caret > 1 {
                        query.truncate(text::byte_offset(&query, caret - 1));
                    } else {
                        query.clear();
                        if let Some(field) = host.text_field_mut(field_id) {
                            field.set_text("");
                            field.set_selection(0, 0);
                        }
                    }
                }
            }

            _ => {}
        }

        self.matching_pass(host, field_id, &query, display_all);
        DispatchResult::Consumed
    }

    /// Rebuild completions for `query`: reset the source, collect prefix
    /// matches in enumeration order, apply the inline append, then place or
    /// hide the dropdown.
    fn matching_pass(
        &mut self,
        host: &mut dyn AutocompleteHost,
        field_id: ControlId,
        query: &str,
        display_all: bool,
    ) {
        if let Some(list) = self.resolve_list_mut(host) {
            list.clear();
        }

        match text::try_copy(query) {
            Ok(backup) => self.backup = backup,
            Err(err) => {
                // Navigation falls back to an empty field this round.
                self.backup.clear();
                tracing::warn!(
                    target: "horizon_autocomplete::controller",
                    %err,
                    "text backup dropped"
                );
            }
        }

        if query.is_empty() && !display_all {
            return;
        }

        let Some(source) = self.source.as_ref().map(std::rc::Rc::clone) else {
            return;
        };
        let mut source = source.borrow_mut();
        source.reset();

        let query_chars = text::char_len(query);
        let mut listed = 0usize;

        while let Some(candidate) = source.next() {
            if !text::prefix_matches(&candidate, query) {
                continue;
            }

            if self.options.auto_append && !query.is_empty() {
                // Typed prefix keeps its casing, the remainder keeps the
                // candidate's. Later matches overwrite earlier ones while
                // the list keeps filling.
                let remainder = &candidate[text::byte_offset(&candidate, query_chars)..];
                match text::try_concat(query, remainder) {
                    Ok(appended) => {
                        let appended_chars = text::char_len(&appended);
                        if let Some(field) = host.text_field_mut(field_id) {
                            field.set_text(&appended);
                            field.set_selection(query_chars, appended_chars);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "horizon_autocomplete::controller",
                            %err,
                            "inline append skipped"
                        );
                    }
                }
                if !self.options.auto_suggest {
                    break;
                }
            }

            if self.options.auto_suggest {
                if let Some(list) = self.resolve_list_mut(host) {
                    list.add_string(&candidate);
                    listed += 1;
                }
            }
        }
        drop(source);

        tracing::trace!(
            target: "horizon_autocomplete::controller",
            query,
            listed,
            display_all,
            "matching pass complete"
        );

        if self.options.auto_suggest {
            let field_frame = host.text_field(field_id).map(|f| f.frame());
            if let Some(list) = self.resolve_list_mut(host) {
                if listed > 0 {
                    if let Some(frame) = field_frame {
                        let rows = listed.min(MAX_VISIBLE_ROWS);
                        let height = rows as f32 * list.row_height();
                        list.set_frame(Rect::new(
                            frame.left(),
                            frame.bottom(),
                            frame.width(),
                            height,
                        ));
                    }
                    list.show();
                } else {
                    list.hide();
                }
            }
        }
    }

    /// Substitute the current text into the quick-complete template and
    /// select the result in full.
    fn apply_quick_complete(
        &mut self,
        host: &mut dyn AutocompleteHost,
        field_id: ControlId,
        current: &str,
    ) {
        let Some(template) = self.quick_complete.as_deref() else {
            return;
        };
        match text::expand_template(template, current) {
            Ok(result) => {
                let result_chars = text::char_len(&result);
                if let Some(field) = host.text_field_mut(field_id) {
                    field.set_text(&result);
                    field.set_selection(0, result_chars);
                }
                tracing::debug!(
                    target: "horizon_autocomplete::controller",
                    "quick complete applied"
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "horizon_autocomplete::controller",
                    %err,
                    "quick complete skipped"
                );
            }
        }
    }

    // =========================================================================
    // List Navigation
    // =========================================================================

    /// Move the dropdown selection and mirror the landing into the field.
    ///
    /// Up from the top (or from no selection) wraps to the last row; down
    /// from the last row wraps to no selection, which restores the backup
    /// text. Never re-runs matching.
    fn navigate(&mut self, host: &mut dyn AutocompleteHost, field_id: ControlId, key: Key) {
        let landed = {
            let Some(list) = self.resolve_list_mut(host) else {
                return;
            };
            let count = list.count() as i32;
            let current = list.selected();
            let next = if key == Key::ArrowUp {
                if current - 1 < 0 { count - 1 } else { current - 1 }
            } else if current + 1 >= count {
                -1
            } else {
                current + 1
            };
            list.set_selected(next);
            tracing::trace!(
                target: "horizon_autocomplete::controller",
                from = current,
                to = next,
                "dropdown selection moved"
            );
            if next >= 0 {
                list.item_text(next as usize)
            } else {
                None
            }
        };

        let text = match landed {
            Some(text) => text,
            // Landing on "none": bring the typed query back.
            None => match text::try_copy(&self.backup) {
                Ok(text) => text,
                Err(_) => return,
            },
        };
        let caret = text::char_len(&text);
        if let Some(field) = host.text_field_mut(field_id) {
            field.set_text(&text);
            field.set_selection(caret, caret);
        }
    }

    // =========================================================================
    // Editing Helpers
    // =========================================================================

    /// Delete from the previous word boundary to the caret. Applies only
    /// when the selection is collapsed.
    fn word_delete(&mut self, host: &mut dyn AutocompleteHost, field_id: ControlId) {
        let Some(field) = host.text_field(field_id) else {
            return;
        };
        let (start, end) = field.selection();
        if start != end {
            return;
        }
        let current = field.text();
        if current.is_empty() || start == 0 {
            return;
        }

        let caret = start.min(text::char_len(&current));
        let boundary = text::word_start_before(&current, caret);
        let kept_head = &current[..text::byte_offset(&current, boundary)];
        let kept_tail = &current[text::byte_offset(&current, caret)..];
        let Ok(new_text) = text::try_concat(kept_head, kept_tail) else {
            return;
        };

        if let Some(field) = host.text_field_mut(field_id) {
            field.set_text(&new_text);
            field.set_selection(boundary, boundary);
        }
    }

    // =========================================================================
    // Pointer Interaction
    // =========================================================================

    /// Track the pointer over the dropdown: the highlighted row follows the
    /// cursor, clearing when no row is under it.
    pub fn handle_pointer_move(
        &mut self,
        host: &mut dyn AutocompleteHost,
        point: Point,
    ) -> DispatchResult {
        if !self.enabled {
            return DispatchResult::Forward;
        }
        let Some(list) = self.resolve_list_mut(host) else {
            return DispatchResult::Forward;
        };
        let hovered = list.item_at(point).map(|row| row as i32).unwrap_or(-1);
        list.set_selected(hovered);
        DispatchResult::Consumed
    }

    /// Commit the highlighted dropdown row: its text replaces the field
    /// text, fully selected, and the dropdown hides. Without a highlighted
    /// row the press does nothing.
    pub fn handle_pointer_press(&mut self, host: &mut dyn AutocompleteHost) -> DispatchResult {
        if !self.enabled {
            return DispatchResult::Forward;
        }
        let Some(field_id) = self.field else {
            return DispatchResult::Forward;
        };

        let committed = {
            let Some(list) = self.resolve_list_mut(host) else {
                return DispatchResult::Forward;
            };
            let selected = list.selected();
            if selected < 0 {
                return DispatchResult::Consumed;
            }
            let Some(text) = list.item_text(selected as usize) else {
                return DispatchResult::Consumed;
            };
            list.hide();
            text
        };

        let committed_chars = text::char_len(&committed);
        if let Some(field) = host.text_field_mut(field_id) {
            field.set_text(&committed);
            field.set_selection(0, committed_chars);
        }
        tracing::debug!(
            target: "horizon_autocomplete::controller",
            "dropdown row committed"
        );
        DispatchResult::Consumed
    }

    // =========================================================================
    // Focus & Teardown
    // =========================================================================

    /// The bound field lost keyboard focus.
    ///
    /// Hides the dropdown unless focus moved into it. Always forwarded so
    /// the field's native focus handling runs.
    pub fn handle_focus_lost(
        &mut self,
        host: &mut dyn AutocompleteHost,
        new_focus: Option<ControlId>,
    ) -> DispatchResult {
        if !self.enabled {
            return DispatchResult::Forward;
        }
        let moved_to_list = matches!((new_focus, self.list), (Some(f), Some(l)) if f == l);
        if self.options.auto_suggest && !moved_to_list {
            self.hide_list(host);
            tracing::trace!(
                target: "horizon_autocomplete::controller",
                "dropdown hidden on focus loss"
            );
        }
        DispatchResult::Forward
    }

    /// The bound field is being destroyed.
    ///
    /// Destroys the dropdown presentation and clears the binding. Runs even
    /// while disabled; the registry drops its keep-alive reference exactly
    /// once when this fires.
    pub fn handle_destroyed(&mut self, host: &mut dyn AutocompleteHost) -> DispatchResult {
        if let Some(list) = self.list.take() {
            host.destroy_suggestion_list(list);
        }
        tracing::debug!(
            target: "horizon_autocomplete::controller",
            field = ?self.field,
            "bound field destroyed; controller detached"
        );
        self.field = None;
        self.source = None;
        self.owns_hook = false;
        self.backup.clear();
        DispatchResult::Consumed
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn resolve_list_mut<'a>(
        &self,
        host: &'a mut dyn AutocompleteHost,
    ) -> Option<&'a mut dyn SuggestionListView> {
        host.suggestion_list_mut(self.list?)
    }

    fn list_visible(&self, host: &dyn AutocompleteHost) -> bool {
        self.list
            .and_then(|id| host.suggestion_list(id))
            .is_some_and(|list| list.is_visible())
    }

    fn hide_list(&mut self, host: &mut dyn AutocompleteHost) {
        if let Some(list) = self.resolve_list_mut(host) {
            list.hide();
        }
    }
}

/// Split a quick-complete lookup key into its path and value name at the
/// last separator.
fn split_lookup_key(key: &str) -> Option<(&str, &str)> {
    let at = key.rfind(['/', '\\'])?;
    Some((&key[..at], &key[at + 1..]))
}
