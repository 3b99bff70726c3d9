use crate::error::{OverlayError, Result};
use crate::{OverlayRegistry, OverlayToken};

/// What an overlay can see of its surroundings: the registry it belongs to and
/// the token of its nearest enclosing overlay (the root for top-level ones).
///
/// Passed down explicitly. A [`RootScope`](crate::RootScope) hands out the root
/// context; every mounted overlay hands its children a context naming itself
/// as the parent.
#[derive(Debug, Clone, Default)]
pub struct OverlayContext {
	registry: Option<OverlayRegistry>,
	parent: Option<OverlayToken>,
}

impl OverlayContext {
	/// Context outside any root scope. Every lookup on it fails.
	pub fn detached() -> Self {
		Self::default()
	}

	pub(crate) fn new(registry: OverlayRegistry, parent: OverlayToken) -> Self {
		Self {
			registry: Some(registry),
			parent: Some(parent),
		}
	}

	pub fn registry(&self) -> Result<&OverlayRegistry> {
		self.registry.as_ref().ok_or(OverlayError::MissingRegistry)
	}

	pub fn parent(&self) -> Result<&OverlayToken> {
		self.parent.as_ref().ok_or(OverlayError::MissingParent)
	}
}
