//! Host document for overlay surfaces.
//!
//! Overlays render into mount points that live outside their logical parent.
//! This crate models the host side of that arrangement as an in-memory tree:
//! mount points are created, attached to the body and detached again, and the
//! overlay core asks the document two questions when it dispatches a click:
//! whether a node is still attached, and whether it sits inside a container.
//!
//! The document also owns the document-level key-down and click streams. Click
//! dispatch runs in-tree handlers from the target up to the root before any
//! document-level listener, matching the order a browser delivers events in.

/// Mount tree, listener hub and containment queries.
pub mod document;
/// Key vocabulary and the shared keyboard/mouse event types.
pub mod event;
/// Generational node handles.
pub mod node;

pub use document::{ClickListener, Document, KeyListener, ListenerId};
pub use event::{KeyCode, KeyboardEvent, MouseEvent};
pub use node::NodeId;

/// Containment predicates the overlay core evaluates clicks against.
pub trait Containment {
	/// Returns true when `target` is `root` or nested anywhere below it.
	fn contains(&self, root: NodeId, target: NodeId) -> bool;

	/// Returns true when `node` is reachable from the document body.
	fn is_attached(&self, node: NodeId) -> bool;
}

#[cfg(test)]
mod tests;
