use std::rc::Rc;

use strata_dom::{KeyboardEvent, MouseEvent, NodeId};

/// Close callback stored in a stack entry.
pub type CloseHandler = Rc<dyn Fn(&DismissEvent)>;

/// Why a dismissal cascade is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DismissReason {
	EscapeKey,
	OutsideClick,
}

/// Host event delivered to close callbacks.
///
/// A callback marks the event handled with [`DismissEvent::prevent_default`];
/// the cascade then stops instead of moving on to the next overlay down.
#[derive(Debug, Clone)]
pub enum DismissEvent {
	Key(Rc<KeyboardEvent>),
	Click(Rc<MouseEvent>),
}

impl DismissEvent {
	pub fn reason(&self) -> DismissReason {
		match self {
			Self::Key(_) => DismissReason::EscapeKey,
			Self::Click(_) => DismissReason::OutsideClick,
		}
	}

	pub fn prevent_default(&self) {
		match self {
			Self::Key(event) => event.prevent_default(),
			Self::Click(event) => event.prevent_default(),
		}
	}

	pub fn is_default_prevented(&self) -> bool {
		match self {
			Self::Key(event) => event.is_default_prevented(),
			Self::Click(event) => event.is_default_prevented(),
		}
	}

	/// Click target, for click events.
	pub fn target(&self) -> Option<NodeId> {
		match self {
			Self::Key(_) => None,
			Self::Click(event) => Some(event.target()),
		}
	}
}
