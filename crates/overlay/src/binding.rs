//! Per-overlay registration.
//!
//! An [`OverlayBinding`] is the overlay's membership in the registry: it
//! registers on mount, re-registers under the same token whenever a
//! registration-relevant option changes, and unregisters exactly once when
//! dropped, however the owner goes away.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use strata_dom::NodeId;

use crate::error::Result;
use crate::event::CloseHandler;
use crate::registry::{Registration, Unregister, ZIndexHandler};
use crate::{OverlayContext, OverlayRegistry, OverlayToken};

/// Options an overlay registers with.
#[derive(Clone)]
pub struct OverlayOptions {
	/// Label carried by the overlay's token, for logs only.
	pub debug_name: String,
	pub can_escape_key_close: bool,
	pub can_outside_click_close: bool,
	pub on_close: Option<CloseHandler>,
}

impl Default for OverlayOptions {
	fn default() -> Self {
		Self {
			debug_name: String::new(),
			can_escape_key_close: true,
			can_outside_click_close: true,
			on_close: None,
		}
	}
}

impl fmt::Debug for OverlayOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OverlayOptions")
			.field("debug_name", &self.debug_name)
			.field("can_escape_key_close", &self.can_escape_key_close)
			.field("can_outside_click_close", &self.can_outside_click_close)
			.field("on_close", &self.on_close.is_some())
			.finish()
	}
}

impl OverlayOptions {
	pub fn named(debug_name: impl Into<String>) -> Self {
		Self {
			debug_name: debug_name.into(),
			..Self::default()
		}
	}

	pub fn on_close(mut self, handler: impl Fn(&crate::DismissEvent) + 'static) -> Self {
		self.on_close = Some(Rc::new(handler));
		self
	}

	pub fn escape_key_close(mut self, enabled: bool) -> Self {
		self.can_escape_key_close = enabled;
		self
	}

	pub fn outside_click_close(mut self, enabled: bool) -> Self {
		self.can_outside_click_close = enabled;
		self
	}

	/// True when switching from `self` to `other` needs no re-registration.
	fn same_registration(&self, other: &Self) -> bool {
		let same_handler = match (&self.on_close, &other.on_close) {
			(Some(a), Some(b)) => Rc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		};
		same_handler
			&& self.can_escape_key_close == other.can_escape_key_close
			&& self.can_outside_click_close == other.can_outside_click_close
	}
}

/// Token and current z-index of a mounted overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayHandle {
	pub token: OverlayToken,
	pub z_index: i32,
}

#[derive(Default)]
struct ZIndexState {
	value: Cell<i32>,
	subscribers: RefCell<Vec<Rc<dyn Fn(i32)>>>,
}

impl ZIndexState {
	fn set(&self, value: i32) {
		if self.value.replace(value) == value {
			return;
		}
		let subscribers: Vec<_> = self.subscribers.borrow().iter().map(Rc::clone).collect();
		for subscriber in subscribers {
			subscriber(value);
		}
	}
}

/// Registry membership of one mounted overlay.
pub struct OverlayBinding {
	registry: OverlayRegistry,
	token: OverlayToken,
	parent: OverlayToken,
	container: NodeId,
	options: OverlayOptions,
	z_index: Rc<ZIndexState>,
	unregister: Option<Unregister>,
}

impl fmt::Debug for OverlayBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OverlayBinding")
			.field("token", &self.token)
			.field("parent", &self.parent)
			.field("container", &self.container)
			.field("z_index", &self.z_index.value.get())
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

impl OverlayBinding {
	/// Creates the overlay's token and registers it under the context's parent.
	///
	/// The z-index starts at the registry's provisional estimate and is
	/// replaced once the registry recomputes.
	pub fn mount(ctx: &OverlayContext, container: NodeId, options: OverlayOptions) -> Result<Self> {
		let registry = ctx.registry()?.clone();
		let parent = ctx.parent()?.clone();
		let token = OverlayToken::new(&options.debug_name);
		let z_index = Rc::new(ZIndexState::default());
		z_index.value.set(registry.next_z_index());

		let mut binding = Self {
			registry,
			token,
			parent,
			container,
			options,
			z_index,
			unregister: None,
		};
		binding.register();
		Ok(binding)
	}

	fn register(&mut self) {
		let z_index = Rc::downgrade(&self.z_index);
		let set_z_index: ZIndexHandler = Rc::new(move |value| {
			if let Some(state) = z_index.upgrade() {
				state.set(value);
			}
		});
		let unregister = self.registry.register(Registration {
			token: self.token.clone(),
			parent: self.parent.clone(),
			container: self.container,
			set_z_index,
			can_escape_key_close: self.options.can_escape_key_close,
			can_outside_click_close: self.options.can_outside_click_close,
			on_close: self.options.on_close.clone(),
		});
		self.unregister = Some(unregister);
	}

	/// Applies new options, re-registering only if a flag or the close handler
	/// changed. Returns whether it re-registered.
	pub fn update(&mut self, options: OverlayOptions) -> bool {
		let changed = !self.options.same_registration(&options);
		self.options = options;
		if changed {
			self.register();
		}
		changed
	}

	/// Points outside-click tests at a different mount point.
	pub fn set_container(&mut self, container: NodeId) {
		if self.container != container {
			self.container = container;
			self.register();
		}
	}

	pub fn token(&self) -> &OverlayToken {
		&self.token
	}

	pub fn parent(&self) -> &OverlayToken {
		&self.parent
	}

	pub fn container(&self) -> NodeId {
		self.container
	}

	pub fn options(&self) -> &OverlayOptions {
		&self.options
	}

	pub fn z_index(&self) -> i32 {
		self.z_index.value.get()
	}

	pub fn handle(&self) -> OverlayHandle {
		OverlayHandle {
			token: self.token.clone(),
			z_index: self.z_index(),
		}
	}

	/// Calls `subscriber` with every later z-index change.
	pub fn subscribe(&self, subscriber: impl Fn(i32) + 'static) {
		self.z_index.subscribers.borrow_mut().push(Rc::new(subscriber));
	}

	/// Context for overlays nested inside this one.
	pub fn child_context(&self) -> OverlayContext {
		OverlayContext::new(self.registry.clone(), self.token.clone())
	}
}

impl Drop for OverlayBinding {
	fn drop(&mut self) {
		if let Some(unregister) = self.unregister.take() {
			unregister.unregister();
		}
	}
}
