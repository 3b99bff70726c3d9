//! Registry configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! base_z_index = 50
//! z_index_step = 10
//! dismiss_key = "escape"
//! warn_on_orphans = true
//! ```

use serde::Deserialize;
use strata_dom::KeyCode;

use crate::error::ConfigError;

/// Z-order policy and dismissal key for one registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
	/// Z-index of the bottom-most stack entry.
	pub base_z_index: i32,
	/// Distance between adjacent stack entries.
	pub z_index_step: i32,
	/// The one key forwarded to escape dispatch.
	pub dismiss_key: KeyCode,
	/// Warn when a recompute finds orphan chains still waiting for a parent.
	pub warn_on_orphans: bool,
}

impl Default for OverlayConfig {
	fn default() -> Self {
		Self {
			base_z_index: 50,
			z_index_step: 10,
			dismiss_key: KeyCode::Escape,
			warn_on_orphans: true,
		}
	}
}

impl OverlayConfig {
	/// Parses and validates a TOML configuration document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.z_index_step <= 0 {
			return Err(ConfigError::InvalidStep(self.z_index_step));
		}
		Ok(())
	}

	/// Z-index for the entry at `index` in the live stack.
	pub fn z_index_at(&self, index: usize) -> i32 {
		let index = i32::try_from(index).unwrap_or(i32::MAX);
		self.base_z_index.saturating_add(index.saturating_mul(self.z_index_step))
	}
}

#[cfg(test)]
mod tests {
	use strata_dom::KeyCode;

	use super::OverlayConfig;
	use crate::ConfigError;

	#[test]
	fn empty_document_yields_defaults() {
		let config = OverlayConfig::from_toml_str("").expect("empty config is valid");
		assert_eq!(config, OverlayConfig::default());
		assert_eq!(config.z_index_at(0), 50);
		assert_eq!(config.z_index_at(3), 80);
	}

	#[test]
	fn fields_override_defaults() {
		let config = OverlayConfig::from_toml_str(
			r#"
base_z_index = 1000
z_index_step = 2
dismiss_key = { char = "q" }
warn_on_orphans = false
"#,
		)
		.expect("valid config");
		assert_eq!(config.z_index_at(2), 1004);
		assert_eq!(config.dismiss_key, KeyCode::Char('q'));
		assert!(!config.warn_on_orphans);
	}

	#[test]
	fn non_positive_step_is_rejected() {
		let err = OverlayConfig::from_toml_str("z_index_step = 0").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidStep(0)));
	}

	#[test]
	fn unknown_fields_are_rejected() {
		let err = OverlayConfig::from_toml_str("zindex = 3").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
