//! Overlay stack management.
//!
//! Overlays (modals, popovers, menus) render into mount points outside their
//! logical parent, so stacking order and dismissal cannot be derived from the
//! host tree. This crate keeps the ordered stack of live overlays in an
//! [`OverlayRegistry`], assigns z-order from stack position, and runs the two
//! dismissal cascades: escape key and outside click.
//!
//! # Lifecycle
//!
//! - A [`RootScope`] owns one registry and forwards the document's key-down and
//!   click streams into it.
//! - Each overlay holds an [`OverlayBinding`] that registers on mount,
//!   re-registers when its options change and unregisters when dropped.
//! - Registration and unregistration never assign z-order directly. They
//!   schedule one coalesced recompute on the [`TaskQueue`], which also refreshes
//!   the snapshot the dismissal cascades walk.
//!
//! Children may register before their parent; they wait in orphan chains and
//! are spliced onto the stack once the parent goes live.

pub mod binding;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod overlay;
pub mod portal;
pub mod registry;
pub mod scheduler;
pub mod scope;
pub mod token;

pub use binding::{OverlayBinding, OverlayHandle, OverlayOptions};
pub use config::OverlayConfig;
pub use context::OverlayContext;
pub use error::{ConfigError, OverlayError, Result};
pub use event::{CloseHandler, DismissEvent, DismissReason};
pub use overlay::{Overlay, OverlayProps};
pub use portal::Portal;
pub use registry::{OverlayRegistry, Registration, Unregister, ZIndexHandler};
pub use scheduler::TaskQueue;
pub use scope::RootScope;
pub use token::OverlayToken;
