//! Post-computation requirement checks and conversions.
//!
//! # Responsibility
//! - Reject produced values that fail a type or predicate requirement.
//! - Convert accepted values into their cached representation.
//!
//! # Invariants
//! - Requirement checks run before conversion.
//! - Errors render the rejected value with `Debug`.

use crate::error::{LazyError, LazyResult};
use std::any::{type_name, Any};
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// Dynamically typed value that can still be rendered in error messages.
pub trait DynValue: Any + Debug {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn value_type_name(&self) -> &'static str;
}

impl<T: Any + Debug> DynValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Boxed dynamic value, the input of `instance_of` checks and downcasts.
pub type Dynamic = Box<dyn DynValue>;

/// Boxes `value` as a [`Dynamic`].
pub fn dynamic<T: Any + Debug>(value: T) -> Dynamic {
    Box::new(value)
}

// Goes through the trait object so the blanket impl on `Box` itself is skipped.
fn inner_any(value: &Dynamic) -> &dyn Any {
    let inner: &dyn DynValue = &**value;
    inner.as_any()
}

/// Kind of requirement attached to a lazy attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Type,
    Predicate,
}

type CheckFn<S> = Box<dyn Fn(&S) -> LazyResult<()> + Send + Sync>;

/// Requirement a produced value must satisfy before it is cached.
pub struct Requirement<S> {
    kind: RequirementKind,
    label: String,
    check: CheckFn<S>,
}

impl<S: Debug + 'static> Requirement<S> {
    /// Named predicate; a `false` result fails with `LazyError::Validation`.
    pub fn predicate(
        name: impl Into<String>,
        test: impl Fn(&S) -> bool + Send + Sync + 'static,
    ) -> Self {
        let label = name.into();
        let predicate = label.clone();
        Self {
            kind: RequirementKind::Predicate,
            label,
            check: Box::new(move |value: &S| {
                if test(value) {
                    Ok(())
                } else {
                    Err(LazyError::Validation {
                        value: format!("{value:?}"),
                        predicate: predicate.clone(),
                    })
                }
            }),
        }
    }

    /// Type-like test named `expected`; failure is `LazyError::TypeMismatch`.
    ///
    /// Used for statically typed values whose "type" is a variant or shape,
    /// e.g. `matches!(value, Json::Number(_))`.
    pub fn kind_of(
        expected: impl Into<String>,
        test: impl Fn(&S) -> bool + Send + Sync + 'static,
    ) -> Self {
        let label = expected.into();
        let expected = label.clone();
        Self {
            kind: RequirementKind::Type,
            label,
            check: Box::new(move |value: &S| {
                if test(value) {
                    Ok(())
                } else {
                    Err(LazyError::TypeMismatch {
                        value: format!("{value:?}"),
                        expected: expected.clone(),
                    })
                }
            }),
        }
    }
}

impl Requirement<Dynamic> {
    /// Requires the dynamic value to be a `U`.
    pub fn instance_of<U: Any>() -> Self {
        Self::kind_of(type_name::<U>(), |value: &Dynamic| inner_any(value).is::<U>())
    }
}

impl<S> Requirement<S> {
    pub fn kind(&self) -> RequirementKind {
        self.kind
    }

    /// Predicate name or expected type name.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self, value: &S) -> LazyResult<()> {
        (self.check)(value)
    }
}

type ConvertFn<S, T> = Box<dyn Fn(S) -> LazyResult<T> + Send + Sync>;

/// Conversion from the produced value into the cached value.
pub struct Conversion<S, T> {
    target: String,
    identity: bool,
    convert: ConvertFn<S, T>,
}

impl<S: 'static> Conversion<S, S> {
    /// Caches the produced value unchanged.
    pub fn identity() -> Self {
        Self {
            target: type_name::<S>().to_string(),
            identity: true,
            convert: Box::new(Ok),
        }
    }
}

impl<S: 'static, T: 'static> Conversion<S, T> {
    /// Infallible conversion named `target`.
    pub fn from_fn(
        target: impl Into<String>,
        convert: impl Fn(S) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            target: target.into(),
            identity: false,
            convert: Box::new(move |value: S| Ok(convert(value))),
        }
    }

    /// Fallible conversion named `target`.
    pub fn try_from_fn<E: Display>(
        target: impl Into<String>,
        convert: impl Fn(S) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self
    where
        S: Debug,
    {
        let target = target.into();
        let failure_target = target.clone();
        Self {
            target,
            identity: false,
            convert: Box::new(move |value: S| {
                // The value is consumed by `convert`; render it up front.
                let rendered = format!("{value:?}");
                convert(value).map_err(|err| LazyError::Conversion {
                    value: rendered,
                    target: failure_target.clone(),
                    reason: err.to_string(),
                })
            }),
        }
    }
}

impl<S, T> Conversion<S, T> {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn apply(&self, value: S) -> LazyResult<T> {
        (self.convert)(value)
    }
}

impl<S, T> Conversion<S, T>
where
    S: AsRef<str> + Debug + 'static,
    T: FromStr + 'static,
    T::Err: Display,
{
    /// Parses a string-like value with `FromStr`.
    pub fn parse() -> Self {
        let target = type_name::<T>();
        Self {
            target: target.to_string(),
            identity: false,
            convert: Box::new(move |value: S| {
                value
                    .as_ref()
                    .trim()
                    .parse::<T>()
                    .map_err(|err| LazyError::Conversion {
                        value: format!("{value:?}"),
                        target: target.to_string(),
                        reason: err.to_string(),
                    })
            }),
        }
    }
}

impl<U: Any> Conversion<Dynamic, U> {
    /// Unboxes a dynamic value into `U`.
    pub fn downcast() -> Self {
        let target = type_name::<U>();
        Self {
            target: target.to_string(),
            identity: false,
            convert: Box::new(move |value: Dynamic| {
                if !inner_any(&value).is::<U>() {
                    let inner: &dyn DynValue = &*value;
                    return Err(LazyError::Conversion {
                        value: format!("{value:?}"),
                        target: target.to_string(),
                        reason: format!("value is a {}", inner.value_type_name()),
                    });
                }
                <dyn DynValue as DynValue>::into_any(value)
                    .downcast::<U>()
                    .map(|boxed| *boxed)
                    .map_err(|_| LazyError::Conversion {
                        value: "<dynamic>".to_string(),
                        target: target.to_string(),
                        reason: "downcast failed".to_string(),
                    })
            }),
        }
    }
}
