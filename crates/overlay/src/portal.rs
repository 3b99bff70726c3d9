use std::fmt;

use strata_dom::{Document, NodeId};

/// Mount point for overlay content, attached directly to the document body.
///
/// The node is attached on mount and destroyed on drop.
pub struct Portal {
	document: Document,
	node: NodeId,
}

impl fmt::Debug for Portal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Portal").field("node", &self.node).finish_non_exhaustive()
	}
}

impl Portal {
	/// Creates and attaches the mount point with its initial z-index, taking
	/// focus when `auto_focus` is set.
	pub fn mount(document: &Document, label: &str, z_index: i32, auto_focus: bool) -> Self {
		let node = document.create_element(label);
		document.attach(node);
		document.set_z_index(node, z_index);
		if auto_focus && !document.focus(node) {
			tracing::debug!(%node, "portal autofocus rejected");
		}
		Self {
			document: document.clone(),
			node,
		}
	}

	pub fn node(&self) -> NodeId {
		self.node
	}

	pub fn set_z_index(&self, z_index: i32) {
		self.document.set_z_index(self.node, z_index);
	}
}

impl Drop for Portal {
	fn drop(&mut self) {
		self.document.destroy(self.node);
	}
}
