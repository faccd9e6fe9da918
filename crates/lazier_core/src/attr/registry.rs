//! Per-owner-type table of lazy attribute metadata.
//!
//! # Responsibility
//! - Answer "which lazy attributes does this type declare" without computing.
//! - Let derived owner types start from the table of their base.
//!
//! # Invariants
//! - At most one descriptor is registered per attribute name.
//! - Entries are sorted by name.

use crate::attr::descriptor::{validate_name, AttrInfo, LazyAttr};
use crate::error::{LazyError, LazyResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata table for one owner type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttrTable {
    owner: String,
    entries: BTreeMap<String, AttrInfo>,
}

impl AttrTable {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Copies the base table for a derived owner type.
    ///
    /// Entries may then be replaced with [`AttrTable::override_info`].
    pub fn inherit(&self, owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: self.entries.clone(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Registers one descriptor.
    pub fn register<O: ?Sized, S, T>(&mut self, attr: &LazyAttr<O, S, T>) -> LazyResult<()> {
        self.register_info(attr.info().clone())
    }

    /// Registers raw metadata, e.g. from a capability locator.
    ///
    /// # Errors
    /// - `LazyError::Configuration` when the name is invalid or taken.
    pub fn register_info(&mut self, info: AttrInfo) -> LazyResult<()> {
        let name = validate_name("attribute", &info.name)?;
        if self.entries.contains_key(name.as_str()) {
            return Err(LazyError::configuration(format!(
                "attribute `{name}` already declared on `{}`",
                self.owner
            )));
        }
        self.entries.insert(name, info);
        Ok(())
    }

    /// Replaces the entry of an inherited attribute.
    ///
    /// # Errors
    /// - `LazyError::Configuration` when no such attribute exists.
    pub fn override_info(&mut self, info: AttrInfo) -> LazyResult<Option<AttrInfo>> {
        if !self.entries.contains_key(info.name.as_str()) {
            return Err(LazyError::configuration(format!(
                "attribute `{}` is not declared on `{}`",
                info.name, self.owner
            )));
        }
        Ok(self.entries.insert(info.name.clone(), info))
    }

    /// Returns the descriptor metadata for `name`.
    pub fn describe(&self, name: &str) -> Option<&AttrInfo> {
        self.entries.get(name.trim())
    }

    /// Returns sorted attribute names.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Attributes whose producing method implementors must provide.
    pub fn abstract_attrs(&self) -> Vec<&AttrInfo> {
        self.entries
            .values()
            .filter(|info| info.is_abstract)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
