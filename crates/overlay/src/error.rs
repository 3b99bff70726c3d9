//! Error types for overlay wiring and configuration.

use thiserror::Error;

/// Wiring mistakes surfaced to the integrator.
///
/// Both variants mean an overlay was constructed outside the context it needs;
/// they are not runtime conditions to recover from.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OverlayError {
	/// Context lookup happened outside any [`RootScope`](crate::RootScope).
	#[error("no overlay registry in scope; mount overlays below a RootScope")]
	MissingRegistry,

	/// No parent token in scope, so the overlay cannot be placed in the stack.
	#[error("no parent overlay in scope; mount overlays below a RootScope")]
	MissingParent,
}

/// Errors that can occur when loading [`OverlayConfig`](crate::OverlayConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// TOML syntax or schema error.
	#[error("overlay config parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// The z-index step must be positive or z-order would not follow stack order.
	#[error("invalid z_index_step {0} (expected a positive integer)")]
	InvalidStep(i32),
}

/// Result type for overlay context lookups.
pub type Result<T> = std::result::Result<T, OverlayError>;
