//! The overlay stack.
//!
//! The registry owns three structures:
//!
//! - the **live stack**, where every entry's parent is the root or an earlier
//!   entry, and position decides z-order;
//! - the **orphan set**, holding entries whose parent has not registered yet;
//! - the **snapshot**, a copy of the live stack taken by the last recompute.
//!   Dismissal cascades walk the snapshot so that registrations racing in
//!   during a re-render cannot reshuffle the stack under them.
//!
//! Entries are shared between the stack and the snapshot, so an in-place update
//! of an entry's options is visible to a cascade walking an older snapshot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashSet;
use strata_dom::{Containment, KeyboardEvent, MouseEvent, NodeId};

use crate::event::{CloseHandler, DismissEvent};
use crate::{OverlayConfig, OverlayToken, TaskQueue};

mod orphans;

use orphans::OrphanSet;

/// Receives z-index assignments for one entry.
pub type ZIndexHandler = Rc<dyn Fn(i32)>;

/// Everything the registry needs to know about one overlay.
#[derive(Clone)]
pub struct Registration {
	pub token: OverlayToken,
	pub parent: OverlayToken,
	/// Mount point outside clicks are tested against.
	pub container: NodeId,
	pub set_z_index: ZIndexHandler,
	pub can_escape_key_close: bool,
	pub can_outside_click_close: bool,
	pub on_close: Option<CloseHandler>,
}

impl fmt::Debug for Registration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registration")
			.field("token", &self.token)
			.field("parent", &self.parent)
			.field("container", &self.container)
			.field("can_escape_key_close", &self.can_escape_key_close)
			.field("can_outside_click_close", &self.can_outside_click_close)
			.field("on_close", &self.on_close.is_some())
			.finish_non_exhaustive()
	}
}

struct StackEntry {
	token: OverlayToken,
	parent: OverlayToken,
	container: NodeId,
	set_z_index: ZIndexHandler,
	can_escape_key_close: bool,
	can_outside_click_close: bool,
	on_close: Option<CloseHandler>,
	/// First-registration order, used to order orphans when they go live.
	seq: u64,
}

type EntryRef = Rc<RefCell<StackEntry>>;

impl StackEntry {
	fn new(registration: Registration, seq: u64) -> Self {
		Self {
			token: registration.token,
			parent: registration.parent,
			container: registration.container,
			set_z_index: registration.set_z_index,
			can_escape_key_close: registration.can_escape_key_close,
			can_outside_click_close: registration.can_outside_click_close,
			on_close: registration.on_close,
			seq,
		}
	}

	fn update(&mut self, registration: Registration) {
		if registration.parent != self.parent {
			tracing::warn!(
				token = %self.token,
				parent = %self.parent,
				requested = %registration.parent,
				"overlay parent is fixed at first registration; keeping the original"
			);
		}
		self.container = registration.container;
		self.set_z_index = registration.set_z_index;
		self.can_escape_key_close = registration.can_escape_key_close;
		self.can_outside_click_close = registration.can_outside_click_close;
		self.on_close = registration.on_close;
	}
}

#[derive(Default)]
struct RegistryState {
	stack: Vec<EntryRef>,
	snapshot: Vec<EntryRef>,
	orphans: OrphanSet,
	update_requested: bool,
	seq_next: u64,
}

/// What a registration did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegisterOutcome {
	/// Existing live entry updated in place.
	UpdatedLive,
	/// Existing orphaned entry updated in place.
	UpdatedOrphan,
	/// Appended to the live stack, along with `released` former orphans.
	Live { released: usize },
	/// Parked in the orphan set.
	Orphaned,
}

impl RegistryState {
	fn find_live(&self, token: &OverlayToken) -> Option<&EntryRef> {
		self.stack.iter().find(|entry| entry.borrow().token == *token)
	}

	fn is_live(&self, token: &OverlayToken) -> bool {
		self.find_live(token).is_some()
	}

	fn register(&mut self, root: &OverlayToken, registration: Registration) -> RegisterOutcome {
		if let Some(entry) = self.find_live(&registration.token) {
			entry.borrow_mut().update(registration);
			return RegisterOutcome::UpdatedLive;
		}
		if let Some(entry) = self.orphans.find(&registration.token) {
			entry.borrow_mut().update(registration);
			return RegisterOutcome::UpdatedOrphan;
		}

		let seq = self.seq_next;
		self.seq_next = self.seq_next.wrapping_add(1);
		let parent_live = registration.parent == *root || self.is_live(&registration.parent);
		let entry = Rc::new(RefCell::new(StackEntry::new(registration, seq)));

		if !parent_live {
			self.orphans.insert(entry);
			return RegisterOutcome::Orphaned;
		}

		self.stack.push(entry);
		if self.orphans.is_empty() {
			return RegisterOutcome::Live { released: 0 };
		}
		let mut live: FxHashSet<OverlayToken> = self.stack.iter().map(|e| e.borrow().token.clone()).collect();
		live.insert(root.clone());
		let released = self.orphans.release(&mut live);
		let count = released.len();
		self.stack.extend(released);
		RegisterOutcome::Live { released: count }
	}

	/// Removes `token` and all of its descendants, live or orphaned.
	fn unregister(&mut self, token: &OverlayToken) -> usize {
		let mut doomed = FxHashSet::default();
		doomed.insert(token.clone());
		loop {
			let before = doomed.len();
			for entry in self.stack.iter().chain(self.orphans.entries()) {
				let entry = entry.borrow();
				if doomed.contains(&entry.parent) {
					doomed.insert(entry.token.clone());
				}
			}
			if doomed.len() == before {
				break;
			}
		}

		let before = self.stack.len() + self.orphans.entry_count();
		self.stack.retain(|entry| !doomed.contains(&entry.borrow().token));
		self.orphans.remove(&doomed);
		before - (self.stack.len() + self.orphans.entry_count())
	}
}

struct RegistryInner {
	root: OverlayToken,
	config: OverlayConfig,
	queue: TaskQueue,
	host: Rc<dyn Containment>,
	state: RefCell<RegistryState>,
}

/// Ordered stack of live overlays for one root scope.
///
/// Cloning yields another handle to the same registry. Everything runs on one
/// thread; no internal borrow is held while a close or z-index callback runs,
/// so callbacks may register and unregister overlays re-entrantly.
#[derive(Clone)]
pub struct OverlayRegistry {
	inner: Rc<RegistryInner>,
}

impl fmt::Debug for OverlayRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("OverlayRegistry")
			.field("root", &self.inner.root)
			.field("live", &state.stack.len())
			.field("snapshot", &state.snapshot.len())
			.field("orphans", &state.orphans.entry_count())
			.field("update_requested", &state.update_requested)
			.finish()
	}
}

/// Removes one overlay and its descendants from the registry.
///
/// Holds a weak reference, so running it after the registry is gone is a no-op.
#[must_use = "dropping an Unregister leaves the overlay registered"]
pub struct Unregister {
	registry: Weak<RegistryInner>,
	token: OverlayToken,
}

impl fmt::Debug for Unregister {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Unregister").field("token", &self.token).finish_non_exhaustive()
	}
}

impl Unregister {
	pub fn token(&self) -> &OverlayToken {
		&self.token
	}

	pub fn unregister(self) {
		if let Some(inner) = self.registry.upgrade() {
			OverlayRegistry { inner }.remove(&self.token);
		}
	}
}

impl OverlayRegistry {
	pub fn new(config: OverlayConfig, queue: TaskQueue, host: Rc<dyn Containment>) -> Self {
		Self {
			inner: Rc::new(RegistryInner {
				root: OverlayToken::new("root"),
				config,
				queue,
				host,
				state: RefCell::new(RegistryState::default()),
			}),
		}
	}

	/// The implicit parent of top-level overlays. Never part of the stack.
	pub fn root_token(&self) -> &OverlayToken {
		&self.inner.root
	}

	pub fn config(&self) -> &OverlayConfig {
		&self.inner.config
	}

	pub fn queue(&self) -> &TaskQueue {
		&self.inner.queue
	}

	/// Provisional z-index for an overlay about to register.
	///
	/// Advisory only; the next recompute assigns the real value.
	pub fn next_z_index(&self) -> i32 {
		let len = self.inner.state.borrow().stack.len();
		i32::try_from(len).unwrap_or(i32::MAX).saturating_add(1)
	}

	/// True while a recompute is scheduled but has not run.
	pub fn has_changed(&self) -> bool {
		self.inner.state.borrow().update_requested
	}

	/// Registers a new overlay or updates an existing one in place.
	///
	/// - A token that already has an entry (live or orphaned) keeps its
	///   position; only its options change.
	/// - A new entry whose parent is the root or live is appended to the stack,
	///   and any orphans waiting on it follow.
	/// - Otherwise the entry waits in the orphan set until its parent goes live.
	pub fn register(&self, registration: Registration) -> Unregister {
		let token = registration.token.clone();
		let parent = registration.parent.clone();
		let outcome = self.inner.state.borrow_mut().register(&self.inner.root, registration);
		tracing::debug!(token = %token, parent = %parent, ?outcome, "overlay.register");
		match outcome {
			RegisterOutcome::UpdatedLive | RegisterOutcome::Live { .. } => self.schedule_recompute(),
			RegisterOutcome::UpdatedOrphan | RegisterOutcome::Orphaned => {}
		}
		Unregister {
			registry: Rc::downgrade(&self.inner),
			token,
		}
	}

	fn remove(&self, token: &OverlayToken) {
		let removed = self.inner.state.borrow_mut().unregister(token);
		tracing::debug!(token = %token, removed, "overlay.unregister");
		self.schedule_recompute();
	}

	/// Tokens of the live stack, bottom first.
	pub fn live_tokens(&self) -> Vec<OverlayToken> {
		self.inner.state.borrow().stack.iter().map(|e| e.borrow().token.clone()).collect()
	}

	/// Tokens of the dispatch snapshot, bottom first.
	pub fn snapshot_tokens(&self) -> Vec<OverlayToken> {
		self.inner.state.borrow().snapshot.iter().map(|e| e.borrow().token.clone()).collect()
	}

	pub fn is_live(&self, token: &OverlayToken) -> bool {
		self.inner.state.borrow().is_live(token)
	}

	/// True when `token` has an entry, live or orphaned.
	pub fn contains(&self, token: &OverlayToken) -> bool {
		let state = self.inner.state.borrow();
		state.is_live(token) || state.orphans.find(token).is_some()
	}

	/// Number of entries waiting for a parent.
	pub fn orphan_count(&self) -> usize {
		self.inner.state.borrow().orphans.entry_count()
	}

	/// Number of orphan chains.
	pub fn orphan_chain_count(&self) -> usize {
		self.inner.state.borrow().orphans.chain_count()
	}

	fn schedule_recompute(&self) {
		{
			let mut state = self.inner.state.borrow_mut();
			if state.update_requested {
				return;
			}
			state.update_requested = true;
		}
		let registry = Rc::downgrade(&self.inner);
		self.inner.queue.schedule("overlay.recompute", move || {
			if let Some(inner) = registry.upgrade() {
				OverlayRegistry { inner }.recompute();
			}
		});
	}

	/// Assigns z-order from stack position and refreshes the snapshot.
	fn recompute(&self) {
		let (assignments, orphans) = {
			let mut state = self.inner.state.borrow_mut();
			state.update_requested = false;
			let assignments: Vec<(ZIndexHandler, i32)> = state
				.stack
				.iter()
				.enumerate()
				.map(|(index, entry)| (Rc::clone(&entry.borrow().set_z_index), self.inner.config.z_index_at(index)))
				.collect();
			state.snapshot = state.stack.clone();
			(assignments, state.orphans.entry_count())
		};

		tracing::debug!(live = assignments.len(), orphans, "overlay.recompute");
		if orphans > 0 && self.inner.config.warn_on_orphans {
			tracing::warn!(orphans, "orphaned overlays remain after recompute; their parent never registered");
		}
		for (set_z_index, z_index) in assignments {
			set_z_index(z_index);
		}
	}

	/// Runs the escape-key cascade over the snapshot, topmost first.
	pub fn dispatch_escape(&self, event: Rc<KeyboardEvent>) {
		self.cascade(&DismissEvent::Key(event));
	}

	/// Schedules the outside-click cascade for the next turn.
	///
	/// By then any close-on-click handling inside the clicked overlay has run,
	/// and the cascade sees the snapshot as it stands at that later time.
	pub fn dispatch_document_click(&self, event: Rc<MouseEvent>) {
		let registry = Rc::downgrade(&self.inner);
		self.inner.queue.schedule("overlay.document_click", move || {
			if let Some(inner) = registry.upgrade() {
				OverlayRegistry { inner }.cascade(&DismissEvent::Click(event));
			}
		});
	}

	fn cascade(&self, event: &DismissEvent) {
		let snapshot = self.inner.state.borrow().snapshot.clone();
		let reason = event.reason();

		for entry in snapshot.iter().rev() {
			let (token, container, enabled, on_close) = {
				let entry = entry.borrow();
				let enabled = match event {
					DismissEvent::Key(_) => entry.can_escape_key_close,
					DismissEvent::Click(_) => entry.can_outside_click_close,
				};
				(entry.token.clone(), entry.container, enabled, entry.on_close.clone())
			};

			if let Some(target) = event.target() {
				if !self.inner.host.is_attached(target) {
					tracing::trace!(%target, "overlay.cascade.target_detached");
					return;
				}
				if self.inner.host.contains(container, target) {
					tracing::trace!(token = %token, %target, "overlay.cascade.inside_click");
					return;
				}
			}
			if !enabled {
				continue;
			}
			let Some(on_close) = on_close else {
				continue;
			};
			if self.has_changed() {
				let in_snapshot = snapshot.iter().any(|e| e.borrow().token == token);
				if in_snapshot != self.is_live(&token) {
					tracing::trace!(token = %token, %reason, "overlay.cascade.membership_changed");
					return;
				}
			}

			tracing::trace!(token = %token, %reason, "overlay.cascade.close");
			on_close(event);
			if event.is_default_prevented() {
				return;
			}
		}
	}
}

#[cfg(test)]
mod invariants;
