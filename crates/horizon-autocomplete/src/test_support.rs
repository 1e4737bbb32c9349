//! Scripted host doubles shared by the controller and registry tests.
//!
//! [`StubHost`] stores fields and lists in one [`SlotMap`] and implements
//! [`AutocompleteHost`] over it. The `native_*` helpers mutate a stub field
//! the way a real text field would before the release event reaches the
//! controller.

use slotmap::SlotMap;

use crate::geometry::{Point, Rect};
use crate::host::{AutocompleteHost, ControlId, SuggestionListView, TextField};

/// Row height every stub list reports.
pub(crate) const ROW_HEIGHT: f32 = 24.0;

/// Frame every stub field is created with.
pub(crate) const FIELD_FRAME: Rect = Rect::new(10.0, 20.0, 200.0, 24.0);

// ============================================================================
// Field Double
// ============================================================================

pub(crate) struct StubField {
    pub(crate) text: String,
    pub(crate) selection: (usize, usize),
    pub(crate) frame: Rect,
}

impl StubField {
    fn new() -> Self {
        Self {
            text: String::new(),
            selection: (0, 0),
            frame: FIELD_FRAME,
        }
    }
}

impl TextField for StubField {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    fn selection(&self) -> (usize, usize) {
        self.selection
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        self.selection = (start, end);
    }

    fn frame(&self) -> Rect {
        self.frame
    }
}

// ============================================================================
// List Double
// ============================================================================

pub(crate) struct StubList {
    id: ControlId,
    pub(crate) rows: Vec<String>,
    pub(crate) selected: i32,
    pub(crate) visible: bool,
    pub(crate) frame: Rect,
}

impl SuggestionListView for StubList {
    fn control_id(&self) -> ControlId {
        self.id
    }

    fn add_string(&mut self, s: &str) {
        self.rows.push(s.to_owned());
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.selected = -1;
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn selected(&self) -> i32 {
        self.selected
    }

    fn set_selected(&mut self, index: i32) {
        self.selected = index;
    }

    fn item_text(&self, index: usize) -> Option<String> {
        self.rows.get(index).cloned()
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn item_at(&self, point: Point) -> Option<usize> {
        if !self.frame.contains(point) {
            return None;
        }
        let row = ((point.y - self.frame.top()) / ROW_HEIGHT) as usize;
        (row < self.rows.len()).then_some(row)
    }

    fn row_height(&self) -> f32 {
        ROW_HEIGHT
    }
}

// ============================================================================
// Host Double
// ============================================================================

enum StubControl {
    Field(StubField),
    List(StubList),
}

pub(crate) struct StubHost {
    controls: SlotMap<ControlId, StubControl>,
    /// Ids passed to `destroy_suggestion_list`, in order.
    pub(crate) destroyed: Vec<ControlId>,
    /// When set, `create_suggestion_list` refuses.
    pub(crate) deny_list_creation: bool,
}

impl StubHost {
    pub(crate) fn new() -> Self {
        Self {
            controls: SlotMap::with_key(),
            destroyed: Vec::new(),
            deny_list_creation: false,
        }
    }

    pub(crate) fn add_field(&mut self) -> ControlId {
        self.controls.insert(StubControl::Field(StubField::new()))
    }

    /// Drop a control outright, as the host does when a widget dies.
    pub(crate) fn remove_control(&mut self, id: ControlId) {
        self.controls.remove(id);
    }

    pub(crate) fn field(&self, id: ControlId) -> &StubField {
        match &self.controls[id] {
            StubControl::Field(field) => field,
            StubControl::List(_) => panic!("control {id:?} is a list, not a field"),
        }
    }

    pub(crate) fn field_mut(&mut self, id: ControlId) -> &mut StubField {
        match &mut self.controls[id] {
            StubControl::Field(field) => field,
            StubControl::List(_) => panic!("control {id:?} is a list, not a field"),
        }
    }

    pub(crate) fn list(&self, id: ControlId) -> &StubList {
        match &self.controls[id] {
            StubControl::List(list) => list,
            StubControl::Field(_) => panic!("control {id:?} is a field, not a list"),
        }
    }

    pub(crate) fn has_control(&self, id: ControlId) -> bool {
        self.controls.contains_key(id)
    }
}

impl AutocompleteHost for StubHost {
    fn text_field(&self, id: ControlId) -> Option<&dyn TextField> {
        match self.controls.get(id)? {
            StubControl::Field(field) => Some(field),
            StubControl::List(_) => None,
        }
    }

    fn text_field_mut(&mut self, id: ControlId) -> Option<&mut dyn TextField> {
        match self.controls.get_mut(id)? {
            StubControl::Field(field) => Some(field),
            StubControl::List(_) => None,
        }
    }

    fn suggestion_list(&self, id: ControlId) -> Option<&dyn SuggestionListView> {
        match self.controls.get(id)? {
            StubControl::List(list) => Some(list),
            StubControl::Field(_) => None,
        }
    }

    fn suggestion_list_mut(&mut self, id: ControlId) -> Option<&mut dyn SuggestionListView> {
        match self.controls.get_mut(id)? {
            StubControl::List(list) => Some(list),
            StubControl::Field(_) => None,
        }
    }

    fn create_suggestion_list(&mut self, field: ControlId) -> Option<ControlId> {
        if self.deny_list_creation || !self.controls.contains_key(field) {
            return None;
        }
        Some(self.controls.insert_with_key(|id| {
            StubControl::List(StubList {
                id,
                rows: Vec::new(),
                selected: -1,
                visible: false,
                frame: Rect::ZERO,
            })
        }))
    }

    fn destroy_suggestion_list(&mut self, id: ControlId) {
        self.controls.remove(id);
        self.destroyed.push(id);
    }
}

// ============================================================================
// Native Editing Helpers
// ============================================================================

/// Insert a character the way the field itself would: the selection is
/// replaced and the caret collapses after the inserted character.
pub(crate) fn native_type(host: &mut StubHost, field: ControlId, ch: char) {
    let field = host.field_mut(field);
    let (start, end) = field.selection;
    let head: String = field.text.chars().take(start).collect();
    let tail: String = field.text.chars().skip(end).collect();
    field.text = format!("{head}{ch}{tail}");
    field.selection = (start + 1, start + 1);
}

/// Apply Backspace the way the field itself would.
pub(crate) fn native_backspace(host: &mut StubHost, field: ControlId) {
    let field = host.field_mut(field);
    let (start, end) = field.selection;
    if start != end {
        let head: String = field.text.chars().take(start).collect();
        let tail: String = field.text.chars().skip(end).collect();
        field.text = format!("{head}{tail}");
        field.selection = (start, start);
    } else if start > 0 {
        let head: String = field.text.chars().take(start - 1).collect();
        let tail: String = field.text.chars().skip(start).collect();
        field.text = format!("{head}{tail}");
        field.selection = (start - 1, start - 1);
    }
}

/// Apply forward Delete the way the field itself would.
pub(crate) fn native_delete(host: &mut StubHost, field: ControlId) {
    let field = host.field_mut(field);
    let (start, end) = field.selection;
    if start != end {
        let head: String = field.text.chars().take(start).collect();
        let tail: String = field.text.chars().skip(end).collect();
        field.text = format!("{head}{tail}");
    } else {
        let head: String = field.text.chars().take(start).collect();
        let tail: String = field.text.chars().skip(start + 1).collect();
        field.text = format!("{head}{tail}");
    }
    field.selection = (start, start);
}

/// Put the field into a known state directly.
pub(crate) fn set_field(host: &mut StubHost, field: ControlId, text: &str, caret: (usize, usize)) {
    let field = host.field_mut(field);
    field.text = text.to_owned();
    field.selection = caret;
}
