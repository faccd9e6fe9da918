//! Lazy attribute descriptors, cache slots and validation.
//!
//! # Responsibility
//! - Compute an attribute on first read and keep it on the owning instance.
//! - Validate or convert values before they are cached.
//!
//! # Invariants
//! - Descriptors are shared per owner type; slots are owned per instance.
//! - Nothing that fails validation is cached.

pub mod descriptor;
pub mod registry;
pub mod slot;
pub mod validate;
