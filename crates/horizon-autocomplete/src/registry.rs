//! Binding table and event routing for autocompletion controllers.
//!
//! The registry maps text fields to their controllers and carries each
//! controller's keep-alive reference. The host forwards every control event
//! through [`AutocompleteRegistry::dispatch`], which routes field events to
//! the field's controller and pointer events to the controller driving the
//! dropdown under the pointer.
//!
//! A field adopts at most one controller. Initializing a second controller
//! on an already-bound field retires the first: its hook ownership is
//! cleared, its dropdown presentation is destroyed, and its keep-alive
//! reference is dropped. The keep-alive of the bound controller is dropped
//! exactly once, when the field's destruction is dispatched.
//!
//! Host implementations must not call back into the registry from inside
//! [`AutocompleteHost`](crate::host::AutocompleteHost) methods; dispatch is
//! synchronous and not reentrant.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SecondaryMap;

use crate::controller::{AutocompleteController, InitOutcome};
use crate::error::{Error, Result};
use crate::events::{ControlEvent, DispatchResult};
use crate::host::{AutocompleteHost, ControlId};
use crate::source::CandidateObject;
use crate::store::KeyValueStore;

/// A field's registered controller, kept alive for the field's lifetime.
struct FieldBinding {
    controller: Rc<RefCell<AutocompleteController>>,
}

/// Routing table from text fields to their autocompletion controllers.
#[derive(Default)]
pub struct AutocompleteRegistry {
    bindings: SecondaryMap<ControlId, FieldBinding>,
}

impl AutocompleteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: SecondaryMap::new(),
        }
    }

    /// Bind `controller` to `field` and start routing the field's events
    /// to it.
    ///
    /// `object` is probed for its string source; an object without one is
    /// rejected. The quick-complete template resolves from the store under
    /// `lookup_key` (user scope first, then system), falling back to the
    /// explicit `quick_complete` value. A previously bound controller on
    /// the same field is retired.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `field` does not resolve in the
    /// host, [`Error::AlreadyInitialized`] or [`Error::StaleBinding`] when
    /// the controller was bound before, and [`Error::UnsupportedSource`]
    /// when `object` has no string source. A failed template buffer
    /// reservation is not an error; it reports
    /// [`InitOutcome::QuickCompleteUnavailable`].
    #[allow(clippy::too_many_arguments)]
    pub fn init_controller(
        &mut self,
        host: &mut dyn AutocompleteHost,
        controller: Rc<RefCell<AutocompleteController>>,
        field: ControlId,
        object: &dyn CandidateObject,
        quick_complete: Option<&str>,
        lookup_key: Option<&str>,
        store: &dyn KeyValueStore,
    ) -> Result<InitOutcome> {
        if host.text_field(field).is_none() {
            return Err(Error::InvalidArgument(field));
        }
        controller.borrow_mut().begin_binding(field, object)?;

        // The field adopts the new controller; the previous one loses the
        // hook and its keep-alive.
        if let Some(previous) = self.bindings.remove(field) {
            previous.controller.borrow_mut().retire(host);
        }

        let outcome = {
            let mut controller = controller.borrow_mut();
            if controller.options().auto_suggest {
                controller.ensure_suggestion_list(host);
            }
            controller.resolve_quick_complete(quick_complete, lookup_key, store)
        };

        tracing::debug!(
            target: "horizon_autocomplete::registry",
            ?field,
            ?outcome,
            "controller bound to text field"
        );
        self.bindings.insert(field, FieldBinding { controller });
        Ok(outcome)
    }

    /// Whether `field` currently has a bound controller.
    pub fn is_bound(&self, field: ControlId) -> bool {
        self.bindings.contains_key(field)
    }

    /// Route a control event to the controller responsible for it.
    ///
    /// Key, focus, and destruction events go to the controller bound to
    /// `control` as a field; pointer events go to the controller whose
    /// dropdown `control` is. Everything else is forwarded untouched.
    pub fn dispatch(
        &mut self,
        host: &mut dyn AutocompleteHost,
        control: ControlId,
        event: &ControlEvent,
    ) -> DispatchResult {
        if let Some(binding) = self.bindings.get(control) {
            let controller = Rc::clone(&binding.controller);
            return match *event {
                ControlEvent::KeyRelease(ev) => {
                    controller.borrow_mut().handle_key_release(host, ev)
                }
                ControlEvent::FocusLost { new_focus } => {
                    controller.borrow_mut().handle_focus_lost(host, new_focus)
                }
                ControlEvent::Destroyed => {
                    let result = controller.borrow_mut().handle_destroyed(host);
                    // Exactly one keep-alive release per binding.
                    self.bindings.remove(control);
                    tracing::debug!(
                        target: "horizon_autocomplete::registry",
                        field = ?control,
                        "binding released"
                    );
                    result
                }
                // The field's own pointer traffic is not ours to handle.
                ControlEvent::PointerMove(_) | ControlEvent::PointerPress => {
                    DispatchResult::Forward
                }
            };
        }

        // Dropdown traffic: find the controller driving this list view.
        let owner = self
            .bindings
            .values()
            .find(|binding| binding.controller.borrow().list_view() == Some(control))
            .map(|binding| Rc::clone(&binding.controller));
        if let Some(controller) = owner {
            return match *event {
                ControlEvent::PointerMove(point) => {
                    controller.borrow_mut().handle_pointer_move(host, point)
                }
                ControlEvent::PointerPress => controller.borrow_mut().handle_pointer_press(host),
                _ => DispatchResult::Forward,
            };
        }

        DispatchResult::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AutocompleteOptions;
    use crate::events::{Key, KeyReleaseEvent};
    use crate::geometry::Point;
    use crate::source::{SharedCandidateSource, StringListSource};
    use crate::store::{MemoryStore, StoreScope};
    use crate::test_support::{StubHost, native_type, set_field};

    fn new_controller(options: AutocompleteOptions) -> Rc<RefCell<AutocompleteController>> {
        Rc::new(RefCell::new(AutocompleteController::with_options(options)))
    }

    fn new_source(items: Vec<&str>) -> Rc<RefCell<StringListSource>> {
        Rc::new(RefCell::new(StringListSource::from(items)))
    }

    fn key_release(key: Key) -> ControlEvent {
        ControlEvent::KeyRelease(KeyReleaseEvent::plain(key))
    }

    struct NoSource;

    impl CandidateObject for NoSource {
        fn string_source(&self) -> Option<SharedCandidateSource> {
            None
        }
    }

    #[test]
    fn test_init_binds_and_keeps_controller_alive() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::APPEND_SUGGEST);
        let source = new_source(vec!["cat"]);

        let outcome = registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &source,
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();
        assert_eq!(outcome, InitOutcome::Ready);
        assert!(registry.is_bound(field));
        assert_eq!(Rc::strong_count(&controller), 2);
        // The dropdown exists, hidden, because auto-suggest is on.
        let list = controller.borrow().list_view().unwrap();
        assert!(!host.list(list).visible);
        assert!(controller.borrow().owns_hook());
    }

    #[test]
    fn test_init_rejects_unknown_field() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let controller = new_controller(AutocompleteOptions::APPEND);
        let source = new_source(vec!["cat"]);

        let err = registry
            .init_controller(
                &mut host,
                controller,
                ControlId::default(),
                &source,
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_init_rejects_double_init() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::APPEND);
        let source = new_source(vec!["cat"]);

        registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &source,
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();

        let err = registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &source,
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized));
        // The existing binding stays intact.
        assert!(registry.is_bound(field));
        assert_eq!(Rc::strong_count(&controller), 2);
    }

    #[test]
    fn test_init_rejects_sourceless_object() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::APPEND);

        let err = registry
            .init_controller(
                &mut host,
                controller,
                field,
                &NoSource,
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource));
        assert!(!registry.is_bound(field));
    }

    #[test]
    fn test_hook_transfer_retires_previous_controller() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();

        let first = new_controller(AutocompleteOptions::APPEND_SUGGEST);
        registry
            .init_controller(
                &mut host,
                Rc::clone(&first),
                field,
                &new_source(vec!["cat"]),
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();
        let first_list = first.borrow().list_view().unwrap();

        let second = new_controller(AutocompleteOptions::APPEND_SUGGEST);
        registry
            .init_controller(
                &mut host,
                Rc::clone(&second),
                field,
                &new_source(vec!["dog"]),
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();

        // The first controller lost the hook and its presentation.
        assert!(!first.borrow().owns_hook());
        assert!(first.borrow().list_view().is_none());
        assert!(host.destroyed.contains(&first_list));
        assert_eq!(Rc::strong_count(&first), 1);
        assert!(second.borrow().owns_hook());
        assert_eq!(Rc::strong_count(&second), 2);

        // Field events now drive the second controller's source.
        native_type(&mut host, field, 'd');
        let result = registry.dispatch(&mut host, field, &key_release(Key::Char('d')));
        assert!(result.was_consumed());
        assert_eq!(host.field(field).text, "dog");
    }

    #[test]
    fn test_destroy_releases_keep_alive_exactly_once() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::APPEND_SUGGEST);

        registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &new_source(vec!["cat"]),
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();
        let list = controller.borrow().list_view().unwrap();
        assert_eq!(Rc::strong_count(&controller), 2);

        host.remove_control(field);
        let result = registry.dispatch(&mut host, field, &ControlEvent::Destroyed);
        assert!(result.was_consumed());
        assert!(!registry.is_bound(field));
        assert_eq!(Rc::strong_count(&controller), 1);
        assert!(host.destroyed.contains(&list));

        // A second destruction notice finds no binding.
        let again = registry.dispatch(&mut host, field, &ControlEvent::Destroyed);
        assert!(!again.was_consumed());
        assert_eq!(Rc::strong_count(&controller), 1);
    }

    #[test]
    fn test_destroy_dispatched_while_disabled() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::APPEND_SUGGEST);

        registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &new_source(vec!["cat"]),
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();
        controller.borrow_mut().set_enabled(false);

        // Keystrokes are forwarded, destruction still tears down.
        let key = registry.dispatch(&mut host, field, &key_release(Key::Char('c')));
        assert!(!key.was_consumed());
        host.remove_control(field);
        let destroyed = registry.dispatch(&mut host, field, &ControlEvent::Destroyed);
        assert!(destroyed.was_consumed());
        assert!(!registry.is_bound(field));
        assert_eq!(Rc::strong_count(&controller), 1);
    }

    #[test]
    fn test_dispatch_unbound_control_forwards() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();

        let result = registry.dispatch(&mut host, field, &key_release(Key::Char('a')));
        assert!(!result.was_consumed());
    }

    #[test]
    fn test_dispatch_routes_dropdown_pointer_events() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::SUGGEST);

        registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &new_source(vec!["cat", "car", "dog"]),
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();
        registry.dispatch(&mut host, field, &key_release(Key::ArrowDown));
        let list = controller.borrow().list_view().unwrap();
        assert!(host.list(list).visible);

        // Hovering the second row through the registry highlights it.
        let moved = registry.dispatch(
            &mut host,
            list,
            &ControlEvent::PointerMove(Point::new(15.0, 69.0)),
        );
        assert!(moved.was_consumed());
        assert_eq!(host.list(list).selected, 1);

        let pressed = registry.dispatch(&mut host, list, &ControlEvent::PointerPress);
        assert!(pressed.was_consumed());
        assert_eq!(host.field(field).text, "car");
        assert!(!host.list(list).visible);

        // Key traffic aimed at the list itself is not field traffic.
        let key = registry.dispatch(&mut host, list, &key_release(Key::Char('x')));
        assert!(!key.was_consumed());
    }

    #[test]
    fn test_dispatch_forwards_field_pointer_events() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::SUGGEST);

        registry
            .init_controller(
                &mut host,
                controller,
                field,
                &new_source(vec!["cat"]),
                None,
                None,
                &MemoryStore::new(),
            )
            .unwrap();

        let moved = registry.dispatch(
            &mut host,
            field,
            &ControlEvent::PointerMove(Point::new(15.0, 21.0)),
        );
        assert!(!moved.was_consumed());
        let pressed = registry.dispatch(&mut host, field, &ControlEvent::PointerPress);
        assert!(!pressed.was_consumed());
    }

    #[test]
    fn test_init_resolves_quick_complete_from_store() {
        let mut host = StubHost::new();
        let mut registry = AutocompleteRegistry::new();
        let field = host.add_field();
        let controller = new_controller(AutocompleteOptions::APPEND);
        let store = MemoryStore::new().with_value(
            StoreScope::User,
            "shell/completion",
            "QuickComplete",
            "go %s",
        );

        let outcome = registry
            .init_controller(
                &mut host,
                Rc::clone(&controller),
                field,
                &new_source(vec!["cat"]),
                Some("fallback %s"),
                Some("shell/completion/QuickComplete"),
                &store,
            )
            .unwrap();
        assert_eq!(outcome, InitOutcome::Ready);

        set_field(&mut host, field, "north", (5, 5));
        let ev = ControlEvent::KeyRelease(KeyReleaseEvent::new(
            Key::Enter,
            crate::events::KeyboardModifiers::CTRL,
        ));
        registry.dispatch(&mut host, field, &ev);
        assert_eq!(host.field(field).text, "go north");
        assert_eq!(host.field(field).selection, (0, 8));
    }
}