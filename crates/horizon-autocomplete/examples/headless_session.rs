//! Headless Autocomplete Session
//!
//! Drives a complete autocompletion session against an in-memory host:
//! - Inline append and dropdown population while typing
//! - Arrow-key navigation with wrap-around and text restore
//! - Pointer hover and commit on the dropdown
//! - Ctrl+Enter quick complete from a stored template
//! - Field teardown through the registry
//!
//! Run with: cargo run -p horizon-autocomplete --example headless_session

use std::cell::RefCell;
use std::rc::Rc;

use horizon_autocomplete::{
    AutocompleteController, AutocompleteHost, AutocompleteOptions, AutocompleteRegistry,
    ControlEvent, ControlId, Key, KeyReleaseEvent, KeyboardModifiers, MemoryStore, Point, Rect,
    StoreScope, StringListSource, SuggestionListView, TextField,
};
use slotmap::SlotMap;

/// Row height the demo dropdown reports.
const ROW_HEIGHT: f32 = 24.0;

// ============================================================================
// Demo Host
// ============================================================================

struct DemoField {
    text: String,
    selection: (usize, usize),
    frame: Rect,
}

impl TextField for DemoField {
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

struct DemoList {
    id: ControlId,
    rows: Vec<String>,
    selected: i32,
    visible: bool,
    frame: Rect,
}

impl SuggestionListView for DemoList {
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

enum DemoControl {
    Field(DemoField),
    List(DemoList),
}

struct DemoHost {
    controls: SlotMap<ControlId, DemoControl>,
}

impl DemoHost {
    fn new() -> Self {
        Self {
            controls: SlotMap::with_key(),
        }
    }

    fn add_field(&mut self) -> ControlId {
        self.controls.insert(DemoControl::Field(DemoField {
            text: String::new(),
            selection: (0, 0),
            frame: Rect::new(8.0, 8.0, 240.0, 24.0),
        }))
    }

    fn field(&self, id: ControlId) -> &DemoField {
        match self.controls.get(id) {
            Some(DemoControl::Field(field)) => field,
            _ => panic!("demo field is gone"),
        }
    }

    fn field_mut(&mut self, id: ControlId) -> &mut DemoField {
        match self.controls.get_mut(id) {
            Some(DemoControl::Field(field)) => field,
            _ => panic!("demo field is gone"),
        }
    }

    fn drop_control(&mut self, id: ControlId) {
        self.controls.remove(id);
    }
}

impl AutocompleteHost for DemoHost {
    fn text_field(&self, id: ControlId) -> Option<&dyn TextField> {
        match self.controls.get(id)? {
            DemoControl::Field(field) => Some(field),
            DemoControl::List(_) => None,
        }
    }

    fn text_field_mut(&mut self, id: ControlId) -> Option<&mut dyn TextField> {
        match self.controls.get_mut(id)? {
            DemoControl::Field(field) => Some(field),
            DemoControl::List(_) => None,
        }
    }

    fn suggestion_list(&self, id: ControlId) -> Option<&dyn SuggestionListView> {
        match self.controls.get(id)? {
            DemoControl::List(list) => Some(list),
            DemoControl::Field(_) => None,
        }
    }

    fn suggestion_list_mut(&mut self, id: ControlId) -> Option<&mut dyn SuggestionListView> {
        match self.controls.get_mut(id)? {
            DemoControl::List(list) => Some(list),
            DemoControl::Field(_) => None,
        }
    }

    fn create_suggestion_list(&mut self, field: ControlId) -> Option<ControlId> {
        if !self.controls.contains_key(field) {
            return None;
        }
        Some(self.controls.insert_with_key(|id| {
            DemoControl::List(DemoList {
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
    }
}

// ============================================================================
// Session Script
// ============================================================================

/// Insert a character the way the field itself would, then hand the release
/// to the registry.
fn type_char(
    registry: &mut AutocompleteRegistry,
    host: &mut DemoHost,
    field: ControlId,
    ch: char,
) {
    {
        let field = host.field_mut(field);
        let (start, end) = field.selection;
        let head: String = field.text.chars().take(start).collect();
        let tail: String = field.text.chars().skip(end).collect();
        field.text = format!("{head}{ch}{tail}");
        field.selection = (start + 1, start + 1);
    }
    registry.dispatch(
        host,
        field,
        &ControlEvent::KeyRelease(KeyReleaseEvent::plain(Key::Char(ch))),
    );
}

fn report(
    step: &str,
    host: &DemoHost,
    field: ControlId,
    controller: &Rc<RefCell<AutocompleteController>>,
) {
    let f = host.field(field);
    let (open, highlighted) = controller.borrow().dropdown_status(host);
    println!(
        "  {step:<26} field={:?} selection={:?} dropdown={} highlight={:?}",
        f.text,
        f.selection,
        if open { "open" } else { "closed" },
        highlighted,
    );
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("╔═══════════════════════════════════════════════════════╗");
    println!("║        Horizon Autocomplete Headless Session          ║");
    println!("╠═══════════════════════════════════════════════════════╣");
    println!("║ Types into an in-memory field and walks the dropdown, ║");
    println!("║ then quick-completes and tears the binding down.      ║");
    println!("╚═══════════════════════════════════════════════════════╝");
    println!();

    let mut host = DemoHost::new();
    let field = host.add_field();

    let mut registry = AutocompleteRegistry::new();
    let source = Rc::new(RefCell::new(StringListSource::from(vec![
        "Desktop",
        "Documents",
        "Downloads",
        "Music",
        "Pictures",
    ])));
    let controller = Rc::new(RefCell::new(AutocompleteController::with_options(
        AutocompleteOptions::APPEND_SUGGEST,
    )));
    let store = MemoryStore::new().with_value(
        StoreScope::User,
        "shell/completion",
        "QuickComplete",
        "open %s",
    );

    registry
        .init_controller(
            &mut host,
            Rc::clone(&controller),
            field,
            &source,
            None,
            Some("shell/completion/QuickComplete"),
            &store,
        )
        .expect("the demo field resolves and the source enumerates strings");

    println!("typing:");
    type_char(&mut registry, &mut host, field, 'd');
    report("'d'", &host, field, &controller);
    type_char(&mut registry, &mut host, field, 'o');
    report("'o'", &host, field, &controller);

    println!("\nnavigating:");
    let down = ControlEvent::KeyRelease(KeyReleaseEvent::plain(Key::ArrowDown));
    registry.dispatch(&mut host, field, &down);
    report("Down", &host, field, &controller);
    registry.dispatch(&mut host, field, &down);
    report("Down", &host, field, &controller);
    // Off the end: the highlight clears and the typed text returns.
    registry.dispatch(&mut host, field, &down);
    report("Down (wrap)", &host, field, &controller);

    println!("\npointer:");
    let list = controller
        .borrow()
        .list_view()
        .expect("auto-suggest created the dropdown");
    registry.dispatch(
        &mut host,
        list,
        &ControlEvent::PointerMove(Point::new(20.0, 44.0)),
    );
    report("hover first row", &host, field, &controller);
    registry.dispatch(&mut host, list, &ControlEvent::PointerPress);
    report("press", &host, field, &controller);

    println!("\nquick complete:");
    let ctrl_enter =
        ControlEvent::KeyRelease(KeyReleaseEvent::new(Key::Enter, KeyboardModifiers::CTRL));
    registry.dispatch(&mut host, field, &ctrl_enter);
    report("Ctrl+Enter", &host, field, &controller);

    println!("\nteardown:");
    host.drop_control(field);
    registry.dispatch(&mut host, field, &ControlEvent::Destroyed);
    println!(
        "  field destroyed            bound={} controller_refs={}",
        registry.is_bound(field),
        Rc::strong_count(&controller),
    );
}
