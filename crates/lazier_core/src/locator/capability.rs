//! Capability locator: a lazily resolved, cached related object.
//!
//! # Responsibility
//! - Resolve an object providing capability `C` through a caller accessor.
//! - Cache the resolved object in the owner's slot.
//!
//! # Invariants
//! - The accessor runs only while the slot is empty.
//! - A missing capability is an error and is never cached.
//! - The slot name is either bound explicitly or generated once per locator.

use crate::attr::descriptor::{validate_name, AttrInfo, SourceKind};
use crate::attr::slot::LazySlot;
use crate::error::{LazyError, LazyResult};
use log::{debug, trace, warn};
use once_cell::sync::OnceCell;
use std::any::type_name;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use uuid::Uuid;

type AccessorFn<O, C> = Box<dyn Fn(&O) -> Option<Arc<C>> + Send + Sync>;

/// Locates and caches an object providing capability `C` for owner `O`.
///
/// `C` is usually a trait object such as `dyn Greeter`.
pub struct CapabilityLocator<O: ?Sized, C: ?Sized> {
    capability: String,
    accessor_kind: SourceKind,
    accessor_name: String,
    accessor: AccessorFn<O, C>,
    bound_name: Option<String>,
    fallback_name: OnceCell<String>,
}

impl<O: ?Sized + 'static, C: ?Sized + 'static> CapabilityLocator<O, C> {
    /// Locator reading the object from method `method_name`.
    pub fn from_method(
        method_name: &str,
        accessor: impl Fn(&O) -> Option<Arc<C>> + Send + Sync + 'static,
    ) -> LazyResult<Self> {
        Self::with_accessor(SourceKind::Method, method_name, accessor)
    }

    /// Locator reading the object from property `property_name`.
    pub fn from_property(
        property_name: &str,
        accessor: impl Fn(&O) -> Option<Arc<C>> + Send + Sync + 'static,
    ) -> LazyResult<Self> {
        Self::with_accessor(SourceKind::Property, property_name, accessor)
    }

    fn with_accessor(
        kind: SourceKind,
        accessor_name: &str,
        accessor: impl Fn(&O) -> Option<Arc<C>> + Send + Sync + 'static,
    ) -> LazyResult<Self> {
        let accessor_name = validate_name("accessor", accessor_name)?;
        Ok(Self {
            capability: capability_name::<C>(),
            accessor_kind: kind,
            accessor_name,
            accessor: Box::new(accessor),
            bound_name: None,
            fallback_name: OnceCell::new(),
        })
    }
}

impl<O: ?Sized, C: ?Sized> CapabilityLocator<O, C> {
    /// Binds the slot name used for this locator.
    pub fn bind(mut self, name: &str) -> LazyResult<Self> {
        self.bound_name = Some(validate_name("slot", name)?);
        Ok(self)
    }

    /// Short name of the required capability.
    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn is_bound(&self) -> bool {
        self.bound_name.is_some()
    }

    /// Bound slot name, or `<Capability>_<id>` generated on first use.
    pub fn slot_name(&self) -> &str {
        match &self.bound_name {
            Some(name) => name,
            None => self.fallback_name.get_or_init(|| {
                format!("{}_{}", self.capability, Uuid::new_v4().simple())
            }),
        }
    }

    /// Locator metadata for attribute tables.
    pub fn info(&self) -> AttrInfo {
        AttrInfo {
            name: self.slot_name().to_string(),
            source: self.accessor_kind,
            source_name: self.accessor_name.clone(),
            is_abstract: false,
            doc: None,
            requirement: Some(self.capability.clone()),
            conversion: None,
        }
    }

    /// Returns the cached object, resolving it through the accessor first.
    ///
    /// # Errors
    /// - `LazyError::TypeMismatch` when the accessor yields no object.
    pub fn locate(&self, owner: &O, slot: &LazySlot<Arc<C>>) -> LazyResult<Arc<C>> {
        if let Some(found) = slot.get() {
            trace!(
                "event=capability_locate module=locator slot={} status=hit",
                self.slot_name()
            );
            return Ok(Arc::clone(found));
        }

        let Some(found) = (self.accessor)(owner) else {
            warn!(
                "event=capability_locate module=locator slot={} status=error capability={} accessor={}",
                self.slot_name(),
                self.capability,
                self.accessor_name
            );
            return Err(LazyError::TypeMismatch {
                value: "None".to_string(),
                expected: self.capability.clone(),
            });
        };

        debug!(
            "event=capability_locate module=locator slot={} status=resolved capability={}",
            self.slot_name(),
            self.capability
        );
        Ok(Arc::clone(slot.fill(found)))
    }
}

impl<O: ?Sized, C: ?Sized> Debug for CapabilityLocator<O, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityLocator")
            .field("capability", &self.capability)
            .field("accessor", &self.accessor_name)
            .field("bound_name", &self.bound_name)
            .finish_non_exhaustive()
    }
}

/// Strips `dyn`, auto-trait bounds and module paths from a type name.
fn capability_name<C: ?Sized>() -> String {
    let full = type_name::<C>();
    let head = full.strip_prefix("dyn ").unwrap_or(full);
    let head = head.split(" + ").next().unwrap_or(head);
    let (path, generics) = head.split_at(head.find('<').unwrap_or(head.len()));
    let short = path.rsplit("::").next().unwrap_or(path);
    format!("{short}{generics}")
}
