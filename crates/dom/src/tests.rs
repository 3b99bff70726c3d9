use std::cell::RefCell;
use std::rc::Rc;

use super::*;

#[test]
fn contains_covers_self_and_descendants_only() {
	let doc = Document::new();
	let outer = doc.create_element("outer");
	let inner = doc.create_element("inner");
	let sibling = doc.create_element("sibling");
	assert!(doc.attach(outer));
	assert!(doc.append_child(outer, inner));
	assert!(doc.attach(sibling));

	assert!(doc.contains(outer, outer));
	assert!(doc.contains(outer, inner));
	assert!(!doc.contains(inner, outer));
	assert!(!doc.contains(outer, sibling));
}

#[test]
fn detached_subtree_is_not_attached() {
	let doc = Document::new();
	let mount = doc.create_element("mount");
	let content = doc.create_element("content");
	doc.append_child(mount, content);
	assert!(!doc.is_attached(content), "never attached");

	doc.attach(mount);
	assert!(doc.is_attached(content));

	assert!(doc.detach(mount));
	assert!(!doc.is_attached(mount));
	assert!(!doc.is_attached(content));
	assert!(doc.contains(mount, content), "detach keeps the subtree intact");
}

#[test]
fn append_child_rejects_cycles() {
	let doc = Document::new();
	let a = doc.create_element("a");
	let b = doc.create_element("b");
	assert!(doc.append_child(a, b));
	assert!(!doc.append_child(b, a));
	assert!(!doc.append_child(a, a));
	assert_eq!(doc.parent(b), Some(a));
}

#[test]
fn destroyed_handles_never_alias_new_nodes() {
	let doc = Document::new();
	let first = doc.create_element("first");
	doc.attach(first);
	assert!(doc.destroy(first));
	assert!(!doc.exists(first));

	let second = doc.create_element("second");
	doc.attach(second);
	assert_ne!(first, second);
	assert!(!doc.is_attached(first));
	assert!(!doc.contains(first, second));
	assert_eq!(doc.label(second).as_deref(), Some("second"));
}

#[test]
fn destroy_frees_subtree_and_clears_focus() {
	let doc = Document::new();
	let mount = doc.create_element("mount");
	let field = doc.create_element("field");
	doc.attach(mount);
	doc.append_child(mount, field);
	assert!(doc.focus(field));
	assert_eq!(doc.active_element(), Some(field));

	doc.destroy(mount);
	assert!(!doc.exists(field));
	assert_eq!(doc.active_element(), None);
	assert!(!doc.destroy(doc.body()), "body is permanent");
}

#[test]
fn focus_requires_attachment() {
	let doc = Document::new();
	let loose = doc.create_element("loose");
	assert!(!doc.focus(loose));
	doc.attach(loose);
	assert!(doc.focus(loose));
	doc.detach(loose);
	assert_eq!(doc.active_element(), None);
}

#[test]
fn click_runs_in_tree_handlers_before_document_listeners() {
	let doc = Document::new();
	let outer = doc.create_element("outer");
	let button = doc.create_element("button");
	doc.attach(outer);
	doc.append_child(outer, button);

	let log = Rc::new(RefCell::new(Vec::new()));
	let l = Rc::clone(&log);
	doc.add_click_listener(move |_| l.borrow_mut().push("document"));
	let l = Rc::clone(&log);
	doc.on_click(outer, move |_| l.borrow_mut().push("outer")).expect("outer exists");
	let l = Rc::clone(&log);
	doc.on_click(button, move |_| l.borrow_mut().push("button")).expect("button exists");

	let event = doc.dispatch_click(button);
	assert_eq!(event.target(), button);
	assert_eq!(*log.borrow(), vec!["button", "outer", "document"]);
}

#[test]
fn handlers_may_mutate_the_document_mid_dispatch() {
	let doc = Document::new();
	let mount = doc.create_element("mount");
	doc.attach(mount);

	let d = doc.clone();
	doc.on_click(mount, move |event| {
		d.destroy(event.target());
	});
	let seen_attached = Rc::new(RefCell::new(None));
	let d = doc.clone();
	let seen = Rc::clone(&seen_attached);
	doc.add_click_listener(move |event| {
		*seen.borrow_mut() = Some(d.is_attached(event.target()));
	});

	doc.dispatch_click(mount);
	assert_eq!(*seen_attached.borrow(), Some(false));
}

#[test]
fn removed_listeners_stop_receiving_events() {
	let doc = Document::new();
	let count = Rc::new(RefCell::new(0));
	let c = Rc::clone(&count);
	let id = doc.add_key_down_listener(move |event| {
		if event.code() == KeyCode::Escape {
			*c.borrow_mut() += 1;
		}
	});
	assert_eq!(doc.listener_count(), 1);

	doc.dispatch_key_down(KeyCode::Escape);
	doc.dispatch_key_down(KeyCode::Enter);
	assert!(doc.remove_listener(id));
	assert!(!doc.remove_listener(id));
	doc.dispatch_key_down(KeyCode::Escape);

	assert_eq!(*count.borrow(), 1);
	assert_eq!(doc.listener_count(), 0);
}

#[test]
fn prevent_default_is_visible_to_later_handlers() {
	let doc = Document::new();
	doc.add_key_down_listener(|event| event.prevent_default());
	let observed = Rc::new(RefCell::new(false));
	let o = Rc::clone(&observed);
	doc.add_key_down_listener(move |event| *o.borrow_mut() = event.is_default_prevented());

	let event = doc.dispatch_key_down(KeyCode::Char('q'));
	assert!(event.is_default_prevented());
	assert!(*observed.borrow());
}

#[test]
fn z_index_style_is_per_node() {
	let doc = Document::new();
	let a = doc.create_element("a");
	let b = doc.create_element("b");
	assert_eq!(doc.z_index(a), None);
	doc.set_z_index(a, 60);
	assert_eq!(doc.z_index(a), Some(60));
	assert_eq!(doc.z_index(b), None);
}

#[test]
fn key_codes_deserialize_from_kebab_case() {
	#[derive(serde::Deserialize)]
	struct Binding {
		key: KeyCode,
	}

	let parsed: Binding = toml::from_str(r#"key = "escape""#).expect("valid key");
	assert_eq!(parsed.key, KeyCode::Escape);
	let parsed: Binding = toml::from_str(r#"key = { char = "q" }"#).expect("valid key");
	assert_eq!(parsed.key, KeyCode::Char('q'));
}
