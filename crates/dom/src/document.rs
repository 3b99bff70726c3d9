use std::cell::RefCell;
use std::rc::Rc;

use slab::Slab;

use crate::{Containment, KeyCode, KeyboardEvent, MouseEvent, NodeId};

/// Document-level key-down listener.
pub type KeyListener = Rc<dyn Fn(&Rc<KeyboardEvent>)>;

/// Click handler, either document-level or attached to one node.
pub type ClickListener = Rc<dyn Fn(&Rc<MouseEvent>)>;

/// Handle returned by every listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Node {
	label: Box<str>,
	generation: u64,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	z_index: Option<i32>,
	click_handlers: Vec<(ListenerId, ClickListener)>,
}

struct Tree {
	nodes: Slab<Node>,
	next_generation: u64,
	body: NodeId,
	focused: Option<NodeId>,
}

impl Tree {
	fn new() -> Self {
		let mut tree = Self {
			nodes: Slab::new(),
			next_generation: 0,
			body: NodeId::new(0, 0),
			focused: None,
		};
		tree.body = tree.insert("body");
		tree
	}

	fn insert(&mut self, label: &str) -> NodeId {
		let generation = self.next_generation;
		self.next_generation = self.next_generation.wrapping_add(1);
		let slot = self.nodes.insert(Node {
			label: label.into(),
			generation,
			parent: None,
			children: Vec::new(),
			z_index: None,
			click_handlers: Vec::new(),
		});
		NodeId::new(slot, generation)
	}

	fn get(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id.slot).filter(|node| node.generation == id.generation)
	}

	fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.get_mut(id.slot).filter(|node| node.generation == id.generation)
	}

	fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut cursor = Some(node);
		while let Some(current) = cursor {
			if current == ancestor {
				return true;
			}
			cursor = self.get(current).and_then(|n| n.parent);
		}
		false
	}

	fn unlink(&mut self, id: NodeId) -> bool {
		let Some(parent) = self.get(id).and_then(|n| n.parent) else {
			return false;
		};
		if let Some(parent_node) = self.get_mut(parent) {
			parent_node.children.retain(|child| *child != id);
		}
		if let Some(node) = self.get_mut(id) {
			node.parent = None;
		}
		true
	}

	fn subtree(&self, root: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut pending = vec![root];
		while let Some(id) = pending.pop() {
			if let Some(node) = self.get(id) {
				out.push(id);
				pending.extend(node.children.iter().copied());
			}
		}
		out
	}
}

#[derive(Default)]
struct Listeners {
	next_id: u64,
	key_down: Vec<(ListenerId, KeyListener)>,
	click: Vec<(ListenerId, ClickListener)>,
}

impl Listeners {
	fn next_id(&mut self) -> ListenerId {
		let id = ListenerId(self.next_id);
		self.next_id = self.next_id.wrapping_add(1);
		id
	}
}

struct DocumentInner {
	tree: RefCell<Tree>,
	listeners: RefCell<Listeners>,
}

/// In-memory document: a mount tree rooted at `body` plus event streams.
///
/// Cloning yields another handle to the same document. All borrows are released
/// before handlers run, so handlers may create, attach, detach or destroy nodes
/// and add or remove listeners while an event is in flight.
#[derive(Clone)]
pub struct Document {
	inner: Rc<DocumentInner>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Document {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let tree = self.inner.tree.borrow();
		f.debug_struct("Document")
			.field("body", &tree.body)
			.field("nodes", &tree.nodes.len())
			.field("focused", &tree.focused)
			.finish()
	}
}

impl Document {
	pub fn new() -> Self {
		Self {
			inner: Rc::new(DocumentInner {
				tree: RefCell::new(Tree::new()),
				listeners: RefCell::new(Listeners::default()),
			}),
		}
	}

	pub fn body(&self) -> NodeId {
		self.inner.tree.borrow().body
	}

	/// Creates a detached node. It becomes part of the document once appended
	/// below the body.
	pub fn create_element(&self, label: &str) -> NodeId {
		self.inner.tree.borrow_mut().insert(label)
	}

	/// Returns true while `node` has not been destroyed.
	pub fn exists(&self, node: NodeId) -> bool {
		self.inner.tree.borrow().get(node).is_some()
	}

	pub fn label(&self, node: NodeId) -> Option<String> {
		self.inner.tree.borrow().get(node).map(|n| n.label.to_string())
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.inner.tree.borrow().get(node).and_then(|n| n.parent)
	}

	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.inner.tree.borrow().get(node).map(|n| n.children.clone()).unwrap_or_default()
	}

	/// Moves `child` under `parent`, detaching it from any previous parent.
	///
	/// Returns false if either node is gone or the move would create a cycle.
	pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
		let mut tree = self.inner.tree.borrow_mut();
		if tree.get(parent).is_none() || tree.get(child).is_none() || tree.is_ancestor_or_self(child, parent) {
			return false;
		}
		tree.unlink(child);
		if let Some(node) = tree.get_mut(parent) {
			node.children.push(child);
		}
		if let Some(node) = tree.get_mut(child) {
			node.parent = Some(parent);
		}
		true
	}

	/// Appends `node` to the body.
	pub fn attach(&self, node: NodeId) -> bool {
		let body = self.body();
		self.append_child(body, node)
	}

	/// Removes `node` from its parent. The subtree stays intact and can be
	/// attached again.
	pub fn detach(&self, node: NodeId) -> bool {
		let detached = self.inner.tree.borrow_mut().unlink(node);
		if detached {
			tracing::trace!(%node, "dom.detach");
		}
		detached
	}

	/// Detaches `node` and frees it together with its whole subtree.
	///
	/// The body cannot be destroyed.
	pub fn destroy(&self, node: NodeId) -> bool {
		let mut tree = self.inner.tree.borrow_mut();
		if node == tree.body || tree.get(node).is_none() {
			return false;
		}
		tree.unlink(node);
		let doomed = tree.subtree(node);
		if tree.focused.is_some_and(|focused| doomed.contains(&focused)) {
			tree.focused = None;
		}
		for id in &doomed {
			tree.nodes.remove(id.slot);
		}
		tracing::trace!(%node, freed = doomed.len(), "dom.destroy");
		true
	}

	pub fn set_z_index(&self, node: NodeId, z_index: i32) -> bool {
		match self.inner.tree.borrow_mut().get_mut(node) {
			Some(n) => {
				n.z_index = Some(z_index);
				true
			}
			None => false,
		}
	}

	pub fn z_index(&self, node: NodeId) -> Option<i32> {
		self.inner.tree.borrow().get(node).and_then(|n| n.z_index)
	}

	/// Moves focus to `node`. Only attached nodes can take focus.
	pub fn focus(&self, node: NodeId) -> bool {
		if !self.is_attached(node) {
			return false;
		}
		self.inner.tree.borrow_mut().focused = Some(node);
		true
	}

	/// Focused node, if it is still attached.
	pub fn active_element(&self) -> Option<NodeId> {
		let focused = self.inner.tree.borrow().focused?;
		self.is_attached(focused).then_some(focused)
	}

	pub fn add_key_down_listener(&self, listener: impl Fn(&Rc<KeyboardEvent>) + 'static) -> ListenerId {
		let mut listeners = self.inner.listeners.borrow_mut();
		let id = listeners.next_id();
		listeners.key_down.push((id, Rc::new(listener)));
		id
	}

	pub fn add_click_listener(&self, listener: impl Fn(&Rc<MouseEvent>) + 'static) -> ListenerId {
		let mut listeners = self.inner.listeners.borrow_mut();
		let id = listeners.next_id();
		listeners.click.push((id, Rc::new(listener)));
		id
	}

	/// Attaches an in-tree click handler to `node`. It runs when a click lands
	/// on `node` or anything below it, before document-level listeners.
	pub fn on_click(&self, node: NodeId, handler: impl Fn(&Rc<MouseEvent>) + 'static) -> Option<ListenerId> {
		let id = self.inner.listeners.borrow_mut().next_id();
		let mut tree = self.inner.tree.borrow_mut();
		let n = tree.get_mut(node)?;
		n.click_handlers.push((id, Rc::new(handler)));
		Some(id)
	}

	/// Removes a document-level listener or an in-tree click handler.
	pub fn remove_listener(&self, id: ListenerId) -> bool {
		{
			let mut listeners = self.inner.listeners.borrow_mut();
			let before = listeners.key_down.len() + listeners.click.len();
			listeners.key_down.retain(|(lid, _)| *lid != id);
			listeners.click.retain(|(lid, _)| *lid != id);
			if listeners.key_down.len() + listeners.click.len() != before {
				return true;
			}
		}
		let mut tree = self.inner.tree.borrow_mut();
		for (_, node) in tree.nodes.iter_mut() {
			let before = node.click_handlers.len();
			node.click_handlers.retain(|(lid, _)| *lid != id);
			if node.click_handlers.len() != before {
				return true;
			}
		}
		false
	}

	/// Number of document-level listeners currently installed.
	pub fn listener_count(&self) -> usize {
		let listeners = self.inner.listeners.borrow();
		listeners.key_down.len() + listeners.click.len()
	}

	/// Delivers a key-down to every document-level key listener.
	pub fn dispatch_key_down(&self, code: KeyCode) -> Rc<KeyboardEvent> {
		let event = Rc::new(KeyboardEvent::new(code));
		let listeners: Vec<KeyListener> = self.inner.listeners.borrow().key_down.iter().map(|(_, l)| Rc::clone(l)).collect();
		tracing::trace!(?code, listeners = listeners.len(), "dom.key_down");
		for listener in listeners {
			listener(&event);
		}
		event
	}

	/// Delivers a click on `target`: in-tree handlers from the target up to the
	/// root first, then document-level click listeners.
	pub fn dispatch_click(&self, target: NodeId) -> Rc<MouseEvent> {
		let event = Rc::new(MouseEvent::new(target));
		let in_tree: Vec<ClickListener> = {
			let tree = self.inner.tree.borrow();
			let mut handlers = Vec::new();
			let mut cursor = Some(target);
			while let Some(id) = cursor {
				let Some(node) = tree.get(id) else { break };
				handlers.extend(node.click_handlers.iter().map(|(_, h)| Rc::clone(h)));
				cursor = node.parent;
			}
			handlers
		};
		tracing::trace!(%target, handlers = in_tree.len(), "dom.click");
		for handler in in_tree {
			handler(&event);
		}
		let listeners: Vec<ClickListener> = self.inner.listeners.borrow().click.iter().map(|(_, l)| Rc::clone(l)).collect();
		for listener in listeners {
			listener(&event);
		}
		event
	}
}

impl Containment for Document {
	fn contains(&self, root: NodeId, target: NodeId) -> bool {
		let tree = self.inner.tree.borrow();
		tree.get(root).is_some() && tree.is_ancestor_or_self(root, target)
	}

	fn is_attached(&self, node: NodeId) -> bool {
		let tree = self.inner.tree.borrow();
		tree.get(node).is_some() && tree.is_ancestor_or_self(tree.body, node)
	}
}
