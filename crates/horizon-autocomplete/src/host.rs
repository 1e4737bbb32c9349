//! Host contracts: field access, suggestion-list presentation, control storage.
//!
//! The controller never owns windows or widgets. It reads and writes the
//! bound text field and drives the dropdown presentation through the traits
//! here, addressing both by [`ControlId`]. The host implements
//! [`AutocompleteHost`] over whatever control storage it has and passes it
//! `&mut` into every registry and controller operation.
//!
//! All text offsets crossing these contracts are character counts.

use slotmap::new_key_type;

use crate::geometry::{Point, Rect};

new_key_type! {
    /// A unique identifier for a host control.
    ///
    /// `ControlId`s are stable handles allocated by the host's control
    /// storage. They become invalid when the control is destroyed; resolving
    /// one through [`AutocompleteHost`] then yields `None`.
    pub struct ControlId;
}

// ============================================================================
// Text Field Contract
// ============================================================================

/// An editable text field the controller completes into.
///
/// The field processes keys natively before the controller sees them; the
/// controller only ever observes the post-edit text and rewrites text and
/// selection through this contract.
pub trait TextField {
    /// Current field text.
    fn text(&self) -> String;

    /// Replace the field text.
    ///
    /// The controller always follows this with
    /// [`set_selection`](Self::set_selection), so the field's own caret
    /// placement after a rewrite is irrelevant.
    fn set_text(&mut self, text: &str);

    /// Current selection as `(start, end)` character offsets.
    ///
    /// `start <= end`; a collapsed selection (`start == end`) is the caret.
    fn selection(&self) -> (usize, usize);

    /// Set the selection. The caret lands at `end`.
    fn set_selection(&mut self, start: usize, end: usize);

    /// Number of characters in the field.
    fn text_length(&self) -> usize {
        self.text().chars().count()
    }

    /// The field's frame, used to place the dropdown beneath it.
    fn frame(&self) -> Rect;
}

// ============================================================================
// Suggestion List Contract
// ============================================================================

/// The dropdown list presentation.
///
/// A dumb list of rows: the controller rebuilds the contents per keystroke
/// and drives selection and visibility; the view never initiates anything.
/// Selection uses `-1` for "no row selected".
pub trait SuggestionListView {
    /// The view's own control id, used to route pointer events and to
    /// recognise focus moving into the list.
    fn control_id(&self) -> ControlId;

    /// Append a row.
    fn add_string(&mut self, s: &str);

    /// Remove all rows and drop the highlight. Does not change visibility.
    fn clear(&mut self);

    /// Number of rows.
    fn count(&self) -> usize;

    /// Selected row index, `-1` when none.
    fn selected(&self) -> i32;

    /// Select a row (`-1` clears the selection).
    fn set_selected(&mut self, index: i32);

    /// Text of the row at `index`.
    fn item_text(&self, index: usize) -> Option<String>;

    /// Move and resize the view.
    fn set_frame(&mut self, frame: Rect);

    /// Make the view visible.
    fn show(&mut self);

    /// Hide the view. Contents and selection are untouched.
    fn hide(&mut self);

    /// Whether the view is currently visible.
    fn is_visible(&self) -> bool;

    /// Row under `point`, in the same coordinate space as
    /// [`set_frame`](Self::set_frame). `None` when the point misses every row.
    fn item_at(&self, point: Point) -> Option<usize>;

    /// Height of one row, used to size the dropdown.
    fn row_height(&self) -> f32;
}

// ============================================================================
// Host Storage Access
// ============================================================================

/// Trait for accessing host controls by their [`ControlId`].
///
/// Implement this trait for your control storage mechanism to use
/// [`AutocompleteRegistry`](crate::registry::AutocompleteRegistry). Lookups
/// return `None` for ids that never existed or whose control has been
/// destroyed; the controller treats both the same way.
pub trait AutocompleteHost {
    /// Get an immutable reference to a text field by its id.
    fn text_field(&self, id: ControlId) -> Option<&dyn TextField>;

    /// Get a mutable reference to a text field by its id.
    fn text_field_mut(&mut self, id: ControlId) -> Option<&mut dyn TextField>;

    /// Get an immutable reference to a suggestion list by its id.
    fn suggestion_list(&self, id: ControlId) -> Option<&dyn SuggestionListView>;

    /// Get a mutable reference to a suggestion list by its id.
    fn suggestion_list_mut(&mut self, id: ControlId) -> Option<&mut dyn SuggestionListView>;

    /// Create a hidden, empty suggestion list for `field`.
    ///
    /// Returns `None` when the host cannot create the presentation; the
    /// controller then runs without a dropdown.
    fn create_suggestion_list(&mut self, field: ControlId) -> Option<ControlId>;

    /// Destroy a suggestion list created by
    /// [`create_suggestion_list`](Self::create_suggestion_list).
    fn destroy_suggestion_list(&mut self, id: ControlId);
}
