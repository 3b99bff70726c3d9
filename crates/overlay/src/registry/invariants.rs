//! Invariant catalog for the overlay stack, with one proof per entry.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strata_dom::{Document, KeyCode, KeyboardEvent};

use super::{OverlayRegistry, Registration};
use crate::{DismissEvent, OverlayConfig, OverlayToken, TaskQueue};

fn registry() -> (Document, TaskQueue, OverlayRegistry) {
	let doc = Document::new();
	let queue = TaskQueue::new();
	let registry = OverlayRegistry::new(OverlayConfig::default(), queue.clone(), Rc::new(doc.clone()));
	(doc, queue, registry)
}

fn registration(doc: &Document, token: &OverlayToken, parent: &OverlayToken, z: &Rc<Cell<i32>>) -> Registration {
	let z = Rc::clone(z);
	let container = doc.create_element(token.label());
	doc.attach(container);
	Registration {
		token: token.clone(),
		parent: parent.clone(),
		container,
		set_z_index: Rc::new(move |value| z.set(value)),
		can_escape_key_close: true,
		can_outside_click_close: true,
		on_close: None,
	}
}

/// Must keep every live entry after its parent.
///
/// - Enforced in: `RegistryState::register`, `OrphanSet::release`
/// - Failure symptom: A child menu renders beneath the popover that opened it.
#[cfg_attr(test, test)]
pub(crate) fn test_parent_precedes_child() {
	let (doc, _queue, registry) = registry();
	let root = registry.root_token().clone();
	let z = Rc::new(Cell::new(0));
	let parent = OverlayToken::new("parent");
	let child = OverlayToken::new("child");

	let _child = registry.register(registration(&doc, &child, &parent, &z));
	let _parent = registry.register(registration(&doc, &parent, &root, &z));
	assert_eq!(registry.live_tokens(), vec![parent, child], "parent must precede child");
}

/// Must remove descendants together with their ancestor.
///
/// - Enforced in: `RegistryState::unregister`
/// - Failure symptom: A submenu outlives its menu and keeps swallowing escape.
#[cfg_attr(test, test)]
pub(crate) fn test_removal_is_transitive() {
	let (doc, _queue, registry) = registry();
	let root = registry.root_token().clone();
	let z = Rc::new(Cell::new(0));
	let menu = OverlayToken::new("menu");
	let submenu = OverlayToken::new("submenu");
	let waiting = OverlayToken::new("waiting");

	let unregister = registry.register(registration(&doc, &menu, &root, &z));
	let _submenu = registry.register(registration(&doc, &submenu, &menu, &z));
	let _waiting = registry.register(registration(&doc, &waiting, &OverlayToken::new("absent"), &z));
	unregister.unregister();

	assert!(!registry.contains(&submenu), "descendant must go with its ancestor");
	assert!(registry.contains(&waiting), "unrelated orphan chains are untouched");
}

/// Must assign z-order only from the deferred recompute.
///
/// - Enforced in: `OverlayRegistry::schedule_recompute`
/// - Failure symptom: Z-order thrashes while one re-render registers several overlays.
#[cfg_attr(test, test)]
pub(crate) fn test_z_order_is_batched() {
	let (doc, queue, registry) = registry();
	let root = registry.root_token().clone();
	let calls = Rc::new(RefCell::new(0));
	for label in ["a", "b", "c"] {
		let calls = Rc::clone(&calls);
		let mut reg = registration(&doc, &OverlayToken::new(label), &root, &Rc::new(Cell::new(0)));
		reg.set_z_index = Rc::new(move |_: i32| *calls.borrow_mut() += 1);
		let _unregister = registry.register(reg);
	}
	assert_eq!(*calls.borrow(), 0, "no synchronous z-order assignment");
	assert_eq!(queue.run_until_idle(), 1, "one coalesced recompute");
	assert_eq!(*calls.borrow(), 3);
}

/// Must walk the snapshot, not the live stack, when dispatching.
///
/// - Enforced in: `OverlayRegistry::cascade`
/// - Failure symptom: An overlay opened by the same re-render swallows the escape meant for its opener.
#[cfg_attr(test, test)]
pub(crate) fn test_dispatch_uses_snapshot() {
	let (doc, queue, registry) = registry();
	let root = registry.root_token().clone();
	let z = Rc::new(Cell::new(0));
	let closed = Rc::new(RefCell::new(Vec::new()));

	let mut old = registration(&doc, &OverlayToken::new("old"), &root, &z);
	let log = Rc::clone(&closed);
	old.on_close = Some(Rc::new(move |event: &DismissEvent| {
		log.borrow_mut().push("old");
		event.prevent_default();
	}));
	let _old = registry.register(old);
	queue.run_until_idle();

	let mut fresh = registration(&doc, &OverlayToken::new("fresh"), &root, &z);
	let log = Rc::clone(&closed);
	fresh.on_close = Some(Rc::new(move |event: &DismissEvent| {
		log.borrow_mut().push("fresh");
		event.prevent_default();
	}));
	let _fresh = registry.register(fresh);

	registry.dispatch_escape(Rc::new(KeyboardEvent::new(KeyCode::Escape)));
	assert_eq!(*closed.borrow(), vec!["old"], "fresh is not in the snapshot yet");
}
