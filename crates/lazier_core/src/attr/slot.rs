//! Per-instance cache cells for lazy attributes.
//!
//! # Responsibility
//! - Hold at most one computed value per (owner, attribute) pair.
//! - Distinguish cacheable results from volatile ones.
//!
//! # Invariants
//! - A filled slot is never overwritten; only `clear` empties it.
//! - Slots are `!Sync`, so "compute once" cannot race across threads.

use once_cell::unsync::OnceCell;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;

/// Result of one producing-function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Produced<T> {
    /// Store the value in the slot.
    Cache(T),
    /// Hand the value back without storing it.
    Volatile(T),
}

impl<T> Produced<T> {
    /// Returns whether this value may be stored.
    pub fn is_volatile(&self) -> bool {
        matches!(self, Self::Volatile(_))
    }

    /// Unwraps the produced value regardless of tag.
    pub fn into_inner(self) -> T {
        match self {
            Self::Cache(value) | Self::Volatile(value) => value,
        }
    }

    /// Maps the inner value and keeps the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Produced<U> {
        match self {
            Self::Cache(value) => Produced::Cache(f(value)),
            Self::Volatile(value) => Produced::Volatile(f(value)),
        }
    }

    /// Fallible variant of [`Produced::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Produced<U>, E> {
        Ok(match self {
            Self::Cache(value) => Produced::Cache(f(value)?),
            Self::Volatile(value) => Produced::Volatile(f(value)?),
        })
    }
}

impl<T> From<T> for Produced<T> {
    fn from(value: T) -> Self {
        Self::Cache(value)
    }
}

/// Value returned by a lazy read.
pub enum Fetched<'a, T> {
    /// Borrowed from the owner's slot.
    Cached(&'a T),
    /// Freshly computed and not stored.
    Volatile(T),
}

impl<T> Fetched<'_, T> {
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

impl<T: Clone> Fetched<'_, T> {
    /// Returns an owned copy of the value.
    pub fn into_owned(self) -> T {
        match self {
            Self::Cached(value) => value.clone(),
            Self::Volatile(value) => value,
        }
    }
}

impl<T> Deref for Fetched<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Self::Cached(value) => *value,
            Self::Volatile(value) => value,
        }
    }
}

impl<T: Debug> Debug for Fetched<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cached(value) => f.debug_tuple("Cached").field(value).finish(),
            Self::Volatile(value) => f.debug_tuple("Volatile").field(value).finish(),
        }
    }
}

impl<T: PartialEq> PartialEq<T> for Fetched<'_, T> {
    fn eq(&self, other: &T) -> bool {
        **self == *other
    }
}

/// Owned cache cell embedded in an owner struct, one per lazy attribute.
pub struct LazySlot<T> {
    cell: OnceCell<T>,
}

impl<T> LazySlot<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the cached value, if any.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Stores `value` unless the slot is already filled.
    ///
    /// Returns the value that ends up cached; the first stored value wins.
    pub fn fill(&self, value: T) -> &T {
        match self.cell.try_insert(value) {
            Ok(stored) => stored,
            Err((existing, _rejected)) => existing,
        }
    }

    /// Empties the slot so the next read recomputes.
    pub fn clear(&mut self) -> Option<T> {
        self.cell.take()
    }

    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }
}

impl<T> Default for LazySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for LazySlot<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: Debug> Debug for LazySlot<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazySlot").field(value).finish(),
            None => f.write_str("LazySlot(<unset>)"),
        }
    }
}
