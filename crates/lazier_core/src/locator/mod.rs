//! Locator descriptors and contracts.
//!
//! # Responsibility
//! - Resolve related objects lazily through caller-provided accessors.
//! - Define the credential lookup seam.

pub mod capability;
pub mod credential;
