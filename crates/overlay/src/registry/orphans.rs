//! Orphan chains: entries registered before their parent is live.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::EntryRef;
use crate::OverlayToken;

/// Chains of entries waiting for a parent.
///
/// The head of each chain has a parent outside the chain that is not live yet.
/// Every other entry descends from the head.
#[derive(Default)]
pub(super) struct OrphanSet {
	chains: Vec<Vec<EntryRef>>,
}

impl OrphanSet {
	pub(super) fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}

	pub(super) fn chain_count(&self) -> usize {
		self.chains.len()
	}

	pub(super) fn entry_count(&self) -> usize {
		self.chains.iter().map(Vec::len).sum()
	}

	pub(super) fn entries(&self) -> impl Iterator<Item = &EntryRef> {
		self.chains.iter().flatten()
	}

	pub(super) fn find(&self, token: &OverlayToken) -> Option<&EntryRef> {
		self.entries().find(|entry| entry.borrow().token == *token)
	}

	/// Adds `entry` to the chain holding its parent, or starts a new chain.
	/// Chains hanging off the grown chain are absorbed into it.
	pub(super) fn insert(&mut self, entry: EntryRef) {
		let parent = entry.borrow().parent.clone();
		let mut chain = match self.chains.iter().position(|chain| chain.iter().any(|e| e.borrow().token == parent)) {
			Some(index) => self.chains.remove(index),
			None => Vec::new(),
		};
		chain.push(entry);
		self.absorb(&mut chain);
		self.chains.push(order_entries(chain));
	}

	/// Moves every chain whose head's parent lies inside `chain` into it, until
	/// no chain qualifies.
	fn absorb(&mut self, chain: &mut Vec<EntryRef>) {
		let mut members: FxHashSet<OverlayToken> = chain.iter().map(|e| e.borrow().token.clone()).collect();
		loop {
			let Some(index) = self.chains.iter().position(|other| members.contains(&head_parent(other))) else {
				break;
			};
			let other = self.chains.remove(index);
			members.extend(other.iter().map(|e| e.borrow().token.clone()));
			chain.extend(other);
		}
	}

	/// Removes every chain that can now go live and returns its entries in
	/// stack order.
	///
	/// `live` holds the tokens already placed (root included) and is extended
	/// with each released chain, so grandchildren waiting on a released child
	/// are released in the same pass.
	pub(super) fn release(&mut self, live: &mut FxHashSet<OverlayToken>) -> Vec<EntryRef> {
		let mut released = Vec::new();
		loop {
			let Some(index) = self.chains.iter().position(|chain| live.contains(&head_parent(chain))) else {
				break;
			};
			let chain = self.chains.remove(index);
			live.extend(chain.iter().map(|e| e.borrow().token.clone()));
			released.extend(chain);
		}
		order_entries(released)
	}

	/// Drops entries whose token is in `doomed`, and chains left empty.
	pub(super) fn remove(&mut self, doomed: &FxHashSet<OverlayToken>) {
		for chain in &mut self.chains {
			chain.retain(|entry| !doomed.contains(&entry.borrow().token));
		}
		self.chains.retain(|chain| !chain.is_empty());
	}
}

fn head_parent(chain: &[EntryRef]) -> OverlayToken {
	chain[0].borrow().parent.clone()
}

/// Orders entries ancestors-first, otherwise by first-registration sequence.
///
/// Among the entries whose parent has already been emitted (or lies outside the
/// batch), the one registered earliest goes next. Children registered before
/// their parent therefore land exactly where a parent-first registration would
/// have put them.
pub(super) fn order_entries(entries: Vec<EntryRef>) -> Vec<EntryRef> {
	let index: FxHashMap<OverlayToken, usize> = entries.iter().enumerate().map(|(i, e)| (e.borrow().token.clone(), i)).collect();
	let mut children = vec![Vec::new(); entries.len()];
	let mut ready = BinaryHeap::new();
	for (i, entry) in entries.iter().enumerate() {
		let entry = entry.borrow();
		match index.get(&entry.parent) {
			Some(&parent) if parent != i => children[parent].push(i),
			_ => ready.push(Reverse((entry.seq, i))),
		}
	}

	let mut slots: Vec<Option<EntryRef>> = entries.into_iter().map(Some).collect();
	let mut ordered = Vec::with_capacity(slots.len());
	while let Some(Reverse((_, i))) = ready.pop() {
		let Some(entry) = slots[i].take() else { continue };
		ordered.push(entry);
		for &child in &children[i] {
			if let Some(entry) = &slots[child] {
				ready.push(Reverse((entry.borrow().seq, child)));
			}
		}
	}
	// Unreachable for well-formed input; parents are fixed per token.
	ordered.extend(slots.into_iter().flatten());
	ordered
}
