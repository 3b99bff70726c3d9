use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one overlay instance, or of a registry's root.
///
/// Equality and hashing use only the process-wide unique id; the label exists
/// for logs. There is no way to build a token from a raw id, so a token can
/// only be obtained from [`OverlayToken::new`] or by cloning one.
#[derive(Clone)]
pub struct OverlayToken {
	id: u64,
	label: Arc<str>,
}

impl OverlayToken {
	pub fn new(label: &str) -> Self {
		Self {
			id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
			label: label.into(),
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}
}

impl PartialEq for OverlayToken {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for OverlayToken {}

impl Hash for OverlayToken {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for OverlayToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "OverlayToken({self})")
	}
}

impl fmt::Display for OverlayToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.label.is_empty() {
			write!(f, "overlay#{}", self.id)
		} else {
			write!(f, "overlay#{}:{}", self.id, self.label)
		}
	}
}

#[cfg(test)]
mod tests {
	use rustc_hash::FxHashSet;

	use super::OverlayToken;

	#[test]
	fn same_label_still_yields_distinct_tokens() {
		let a = OverlayToken::new("menu");
		let b = OverlayToken::new("menu");
		assert_ne!(a, b);
		assert_eq!(a, a.clone());

		let set: FxHashSet<_> = [a.clone(), b, a].into_iter().collect();
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn display_includes_label_when_present() {
		let named = OverlayToken::new("picker");
		let anonymous = OverlayToken::new("");
		assert!(named.to_string().ends_with(":picker"));
		assert!(!anonymous.to_string().contains(':'));
	}
}
