use std::fmt;

use strata_dom::{Document, NodeId};

use crate::error::Result;
use crate::{OverlayBinding, OverlayContext, OverlayHandle, OverlayOptions, OverlayToken, Portal};

/// Mount-time settings for an [`Overlay`].
#[derive(Debug, Clone, Default)]
pub struct OverlayProps {
	pub options: OverlayOptions,
	/// Focus the mount point once it is attached.
	pub auto_focus: bool,
}

/// A mounted overlay: a portal whose node is the registry container.
///
/// Z-index updates from the registry are written to the portal node. Dropping
/// the overlay unregisters it before its mount point is destroyed.
pub struct Overlay {
	// Field order is drop order.
	binding: OverlayBinding,
	portal: Portal,
}

impl fmt::Debug for Overlay {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Overlay").field("binding", &self.binding).field("portal", &self.portal).finish()
	}
}

impl Overlay {
	pub fn mount(ctx: &OverlayContext, document: &Document, props: OverlayProps) -> Result<Self> {
		let z_index = ctx.registry()?.next_z_index();
		ctx.parent()?;

		let portal = Portal::mount(document, &props.options.debug_name, z_index, props.auto_focus);
		let binding = OverlayBinding::mount(ctx, portal.node(), props.options)?;
		let (document, node) = (document.clone(), portal.node());
		binding.subscribe(move |z_index| {
			document.set_z_index(node, z_index);
		});
		Ok(Self { binding, portal })
	}

	pub fn update(&mut self, options: OverlayOptions) -> bool {
		self.binding.update(options)
	}

	pub fn token(&self) -> &OverlayToken {
		self.binding.token()
	}

	pub fn z_index(&self) -> i32 {
		self.binding.z_index()
	}

	pub fn handle(&self) -> OverlayHandle {
		self.binding.handle()
	}

	/// Mount point; overlay content is attached below it.
	pub fn node(&self) -> NodeId {
		self.portal.node()
	}

	pub fn binding(&self) -> &OverlayBinding {
		&self.binding
	}

	pub fn child_context(&self) -> OverlayContext {
		self.binding.child_context()
	}
}
