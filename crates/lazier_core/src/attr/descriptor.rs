//! Lazy attribute descriptors.
//!
//! # Responsibility
//! - Describe one lazily computed attribute of an owner type.
//! - Compute, validate and cache the value on first read per instance.
//!
//! # Invariants
//! - A descriptor is immutable once built and shared by all owners.
//! - A cached value is returned as-is; the source is not called again until
//!   the owner's slot is cleared.
//! - `Produced::Volatile` results are never stored.

use crate::attr::slot::{Fetched, LazySlot, Produced};
use crate::attr::validate::{Conversion, Requirement};
use crate::error::{LazyError, LazyResult};
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{Debug, Formatter};

static ATTRIBUTE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid attribute name regex"));

/// Where a lazy value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Direct call of the decorated function.
    Function,
    /// Call of an overridable method on the owner.
    Method,
    /// Read of a property on the owner.
    Property,
}

/// Introspection metadata of one lazy attribute.
///
/// Reading metadata never triggers computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttrInfo {
    /// Attribute (slot) name.
    pub name: String,
    pub source: SourceKind,
    /// Function, method or property name the value is read from.
    pub source_name: String,
    /// Producing method must be provided by implementors.
    pub is_abstract: bool,
    pub doc: Option<String>,
    /// Predicate name or expected type, when a requirement is attached.
    pub requirement: Option<String>,
    /// Conversion target, when the cached value is converted.
    pub conversion: Option<String>,
}

/// Returns whether `name` can be used as an attribute, method or slot name.
pub fn is_valid_attribute_name(name: &str) -> bool {
    ATTRIBUTE_NAME_RE.is_match(name)
}

pub(crate) fn validate_name(role: &str, name: &str) -> LazyResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LazyError::configuration(format!("{role} name must not be empty")));
    }
    if !is_valid_attribute_name(trimmed) {
        return Err(LazyError::configuration(format!(
            "{role} name `{trimmed}` is not a valid identifier"
        )));
    }
    Ok(trimmed.to_string())
}

type SourceFn<O, S> = Box<dyn Fn(&O) -> Produced<S> + Send + Sync>;

/// Lazily computed attribute of owner type `O`.
///
/// `S` is the produced type and `T` the cached type (equal unless a
/// conversion is attached).
pub struct LazyAttr<O: ?Sized, S, T = S> {
    info: AttrInfo,
    source: SourceFn<O, S>,
    requirement: Option<Requirement<S>>,
    conversion: Conversion<S, T>,
}

impl<O: ?Sized + 'static, S: 'static> LazyAttr<O, S, S> {
    /// Descriptor named after its producing function.
    pub fn new(
        name: &str,
        source: impl Fn(&O) -> Produced<S> + Send + Sync + 'static,
    ) -> LazyResult<Self> {
        Self::named(name).function(name, source).build()
    }

    /// Starts a descriptor bound to attribute `name`.
    pub fn named(name: &str) -> LazyAttrBuilder<O, S, S> {
        LazyAttrBuilder {
            name: name.to_string(),
            doc: None,
            is_abstract: false,
            source: None,
            requirement: None,
            conversion: Conversion::identity(),
        }
    }
}

impl<O: ?Sized, S, T> LazyAttr<O, S, T> {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Descriptor metadata; never computes.
    pub fn info(&self) -> &AttrInfo {
        &self.info
    }

    /// Reads the attribute for `owner`, caching into `slot`.
    ///
    /// # Errors
    /// - Returns the requirement or conversion error of the produced value.
    pub fn get<'a>(&self, owner: &O, slot: &'a LazySlot<T>) -> LazyResult<Fetched<'a, T>> {
        if let Some(value) = slot.get() {
            trace!("event=lazy_read module=attr attr={} status=hit", self.info.name);
            return Ok(Fetched::Cached(value));
        }

        match self.compute(owner)? {
            Produced::Cache(value) => {
                debug!(
                    "event=lazy_read module=attr attr={} status=computed cached=true",
                    self.info.name
                );
                Ok(Fetched::Cached(slot.fill(value)))
            }
            Produced::Volatile(value) => {
                debug!(
                    "event=lazy_read module=attr attr={} status=computed cached=false",
                    self.info.name
                );
                Ok(Fetched::Volatile(value))
            }
        }
    }

    /// Like [`LazyAttr::get`] but returns an owned value.
    pub fn get_cloned(&self, owner: &O, slot: &LazySlot<T>) -> LazyResult<T>
    where
        T: Clone,
    {
        self.get(owner, slot).map(Fetched::into_owned)
    }

    /// Runs source, requirement and conversion without touching any slot.
    pub fn compute(&self, owner: &O) -> LazyResult<Produced<T>> {
        let produced = (self.source)(owner);
        let result = produced.try_map(|value| {
            if let Some(requirement) = &self.requirement {
                requirement.check(&value)?;
            }
            self.conversion.apply(value)
        });

        if let Err(err) = &result {
            warn!(
                "event=lazy_compute module=attr attr={} status=error kind={}",
                self.info.name,
                err.kind()
            );
        }
        result
    }
}

impl<O: ?Sized, S, T> Debug for LazyAttr<O, S, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyAttr")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`LazyAttr::named`].
pub struct LazyAttrBuilder<O: ?Sized, S, T = S> {
    name: String,
    doc: Option<String>,
    is_abstract: bool,
    source: Option<(SourceKind, String, SourceFn<O, S>)>,
    requirement: Option<Requirement<S>>,
    conversion: Conversion<S, T>,
}

impl<O: ?Sized + 'static, S: 'static, T> LazyAttrBuilder<O, S, T> {
    /// Reads the value by calling `source` directly.
    ///
    /// `function_name` names the original function, which stays callable and
    /// uncached on its own.
    pub fn function(
        self,
        function_name: &str,
        source: impl Fn(&O) -> Produced<S> + Send + Sync + 'static,
    ) -> Self {
        self.with_source(SourceKind::Function, function_name, source)
    }

    /// Reads the value through the overridable method `method_name`.
    ///
    /// `call` dispatches to the method, typically `|o: &dyn Trait| o.method()`,
    /// so implementors overriding it change what is computed.
    pub fn method(
        self,
        method_name: &str,
        call: impl Fn(&O) -> Produced<S> + Send + Sync + 'static,
    ) -> Self {
        self.with_source(SourceKind::Method, method_name, call)
    }

    /// [`LazyAttrBuilder::method`] with the method named like the attribute.
    pub fn method_self(self, call: impl Fn(&O) -> Produced<S> + Send + Sync + 'static) -> Self {
        let method_name = self.name.clone();
        self.with_source(SourceKind::Method, &method_name, call)
    }

    fn with_source(
        mut self,
        kind: SourceKind,
        source_name: &str,
        source: impl Fn(&O) -> Produced<S> + Send + Sync + 'static,
    ) -> Self {
        self.source = Some((kind, source_name.to_string(), Box::new(source)));
        self
    }
}

impl<O: ?Sized, S, T> LazyAttrBuilder<O, S, T> {
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Marks the producing method as required-to-override.
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Attaches a requirement checked before conversion and caching.
    pub fn require(mut self, requirement: Requirement<S>) -> Self {
        self.requirement = Some(requirement);
        self
    }

    /// Replaces the conversion applied before caching.
    pub fn into<U>(self, conversion: Conversion<S, U>) -> LazyAttrBuilder<O, S, U> {
        LazyAttrBuilder {
            name: self.name,
            doc: self.doc,
            is_abstract: self.is_abstract,
            source: self.source,
            requirement: self.requirement,
            conversion,
        }
    }

    /// Validates names and finalizes the descriptor.
    ///
    /// # Errors
    /// - `LazyError::Configuration` when a name is invalid or no source was
    ///   given.
    pub fn build(self) -> LazyResult<LazyAttr<O, S, T>> {
        let name = validate_name("attribute", &self.name)?;
        let Some((kind, source_name, source)) = self.source else {
            return Err(LazyError::configuration(format!(
                "attribute `{name}` has no producing function or method"
            )));
        };
        let source_name = validate_name("source", &source_name)?;

        let info = AttrInfo {
            name,
            source: kind,
            source_name,
            is_abstract: self.is_abstract,
            doc: self.doc,
            requirement: self
                .requirement
                .as_ref()
                .map(|requirement| requirement.label().to_string()),
            conversion: (!self.conversion.is_identity())
                .then(|| self.conversion.target().to_string()),
        };
        debug!(
            "event=attr_build module=attr attr={} source={:?} status=ok",
            info.name, info.source
        );

        Ok(LazyAttr {
            info,
            source,
            requirement: self.requirement,
            conversion: self.conversion,
        })
    }
}
