//! Lazily computed, per-instance cached attributes.
//!
//! A [`LazyAttr`] is declared once per owner type and computes its value the
//! first time it is read on an instance, storing it in that instance's
//! [`LazySlot`]. Later reads return the stored value until the slot is
//! cleared.
//!
//! ```
//! use lazier_core::{LazyAttr, LazySlot, Produced};
//!
//! struct Doc {
//!     title: LazySlot<String>,
//! }
//!
//! let title = LazyAttr::new("title", |_: &Doc| Produced::Cache("x".to_string()))
//!     .expect("valid descriptor");
//! let doc = Doc { title: LazySlot::new() };
//! assert_eq!(*title.get(&doc, &doc.title).expect("read"), "x");
//! assert!(doc.title.is_set());
//! ```

pub mod attr;
pub mod error;
pub mod locator;
pub mod logging;

pub use attr::descriptor::{
    is_valid_attribute_name, AttrInfo, LazyAttr, LazyAttrBuilder, SourceKind,
};
pub use attr::registry::AttrTable;
pub use attr::slot::{Fetched, LazySlot, Produced};
pub use attr::validate::{dynamic, Conversion, DynValue, Dynamic, Requirement, RequirementKind};
pub use error::{LazyError, LazyResult};
pub use locator::capability::CapabilityLocator;
pub use locator::credential::CredentialLocator;
pub use logging::{
    default_log_level, init_logging, logging_status, LoggingConfig, LoggingError, LoggingResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
