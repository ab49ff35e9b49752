// vim: tw=80
//! Type-erased argument and return values.

use downcast::{downcast, Any};
use std::{
    any::{self, TypeId},
    fmt,
    sync::Arc
};

/// A value that can travel through the engine as a method argument or a
/// return value.
///
/// Implemented for every `'static` type that is `Debug`, `PartialEq`, `Send`
/// and `Sync`.  Equality across different concrete types is always `false`.
pub trait Value: Any + fmt::Debug + Send + Sync {
    /// Compare with another, possibly differently typed, value.
    fn eq_value(&self, other: &dyn Value) -> bool;

    /// The concrete runtime type of this value.
    fn type_info(&self) -> TypeInfo;
}
downcast!(dyn Value);

impl<T> Value for T
    where T: Any + fmt::Debug + PartialEq + Send + Sync
{
    fn eq_value(&self, other: &dyn Value) -> bool {
        other.downcast_ref::<T>()
            .map_or(false, |o| self == o)
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// Wrap a concrete value for use as an argument or return value.
pub fn value<T: Value>(t: T) -> Arc<dyn Value> {
    Arc::new(t)
}

/// The null argument.
///
/// Matched by [`is_null`](crate::matcher::is_null) and by
/// [`anything`](crate::matcher::anything), but never by a typed wildcard.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Null;

impl fmt::Debug for Null {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null")
    }
}

/// Identity and name of a Rust type.
///
/// Two `TypeInfo`s are equal iff they describe the same type.
#[derive(Clone, Copy, Debug, Eq)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>()
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, like `alloc::string::String`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path, like `String`.
    pub fn simple_name(&self) -> &'static str {
        // Generic arguments may contain paths of their own
        let base = self.name.split('<').next().unwrap_or(self.name);
        // Tuples, arrays, slices and references are left alone
        if base.starts_with(['(', '[', '&', '*']) {
            return self.name;
        }
        match base.rfind("::") {
            Some(i) => &self.name[i + 2..],
            None => self.name
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Anything that may be handed to
/// [`Session::mocking_details`](crate::Session::mocking_details).
///
/// Implemented for every `'static` type, so that the facade can name the
/// runtime type of objects that turn out not to be mocks.
pub trait Inspect: Any {
    fn runtime_type(&self) -> TypeInfo;
}
downcast!(dyn Inspect);

impl<T: Any> Inspect for T {
    fn runtime_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// Build an argument list from plain values.
///
/// # Examples
/// ```
/// # use mockit::*;
/// let a = args![10i32, "x", Null];
/// assert_eq!(3, a.len());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<::std::sync::Arc<dyn $crate::Value>>::new()
    };
    ($($a:expr),+ $(,)?) => {
        ::std::vec![$($crate::value($a)),+]
    };
}
