use std::fmt;

/// Handle to one node of a [`Document`](crate::Document).
///
/// Slots are recycled once a node is destroyed, so every handle also carries
/// the generation it was issued with. A stale handle never resolves to the
/// node that later reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
	pub(crate) slot: usize,
	pub(crate) generation: u64,
}

impl NodeId {
	pub(crate) const fn new(slot: usize, generation: u64) -> Self {
		Self { slot, generation }
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node#{}v{}", self.slot, self.generation)
	}
}
