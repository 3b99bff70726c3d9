use std::cell::Cell;

use serde::Deserialize;

use crate::NodeId;

/// Keys the host reports on its key-down stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyCode {
	Escape,
	Enter,
	Tab,
	Backspace,
	/// Printable character.
	Char(char),
	/// Function key `F1`..`F24`.
	F(u8),
}

/// Key-down event shared between every handler of one dispatch.
#[derive(Debug)]
pub struct KeyboardEvent {
	code: KeyCode,
	default_prevented: Cell<bool>,
}

impl KeyboardEvent {
	pub fn new(code: KeyCode) -> Self {
		Self {
			code,
			default_prevented: Cell::new(false),
		}
	}

	pub const fn code(&self) -> KeyCode {
		self.code
	}

	/// Marks the event handled. Handlers later in the chain can observe it.
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

/// Click event shared between every handler of one dispatch.
#[derive(Debug)]
pub struct MouseEvent {
	target: NodeId,
	default_prevented: Cell<bool>,
}

impl MouseEvent {
	pub fn new(target: NodeId) -> Self {
		Self {
			target,
			default_prevented: Cell::new(false),
		}
	}

	/// Node the click landed on.
	pub const fn target(&self) -> NodeId {
		self.target
	}

	/// Marks the event handled. Handlers later in the chain can observe it.
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}
