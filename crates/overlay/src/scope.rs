use std::fmt;
use std::rc::Rc;

use strata_dom::{Document, ListenerId};

use crate::{OverlayConfig, OverlayContext, OverlayRegistry, OverlayToken, TaskQueue};

/// One registry per UI root, fed by the document's key-down and click streams.
///
/// Creating the scope installs both listeners; dropping it removes them. Scopes
/// are independent: each has its own registry and root token, so several can
/// share a document without seeing each other's overlays.
pub struct RootScope {
	registry: OverlayRegistry,
	document: Document,
	key_listener: ListenerId,
	click_listener: ListenerId,
}

impl fmt::Debug for RootScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RootScope").field("registry", &self.registry).finish_non_exhaustive()
	}
}

impl RootScope {
	pub fn new(document: &Document, queue: &TaskQueue, config: OverlayConfig) -> Self {
		let registry = OverlayRegistry::new(config, queue.clone(), Rc::new(document.clone()));
		let dismiss_key = registry.config().dismiss_key;

		let key_listener = {
			let registry = registry.clone();
			document.add_key_down_listener(move |event| {
				if event.code() == dismiss_key {
					registry.dispatch_escape(Rc::clone(event));
				}
			})
		};
		let click_listener = {
			let registry = registry.clone();
			document.add_click_listener(move |event| registry.dispatch_document_click(Rc::clone(event)))
		};

		tracing::debug!(root = %registry.root_token(), ?dismiss_key, "overlay.scope.open");
		Self {
			registry,
			document: document.clone(),
			key_listener,
			click_listener,
		}
	}

	pub fn registry(&self) -> &OverlayRegistry {
		&self.registry
	}

	pub fn root_token(&self) -> &OverlayToken {
		self.registry.root_token()
	}

	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Context for top-level overlays: this scope's registry, root as parent.
	pub fn context(&self) -> OverlayContext {
		OverlayContext::new(self.registry.clone(), self.registry.root_token().clone())
	}
}

impl Drop for RootScope {
	fn drop(&mut self) {
		self.document.remove_listener(self.key_listener);
		self.document.remove_listener(self.click_listener);
		tracing::debug!(root = %self.registry.root_token(), "overlay.scope.close");
	}
}
