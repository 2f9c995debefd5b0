//! Marker for values an action or responder is not allowed to return.

use std::any::type_name;
use std::fmt;

/// A return value outside the allowed result types.
///
/// Only the type name survives; the executor stages use it to tell the
/// developer what came back instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unexpected {
    type_name: &'static str,
}

impl Unexpected {
    /// Records that a value of type `T` was returned.
    pub fn of<T: ?Sized>() -> Self {
        Self { type_name: type_name::<T>() }
    }

    /// Same as [`Unexpected::of`], inferring `T` from a value.
    pub fn value<T: ?Sized>(_: &T) -> Self {
        Self::of::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for Unexpected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Implements `From<$source>` for an output enum by recording the source
/// type as its `Unexpected` variant.
macro_rules! unexpected_output {
    ($target:ty: $($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for $target {
                fn from(value: $source) -> Self {
                    Self::Unexpected($crate::output::Unexpected::value(&value))
                }
            }
        )+
    };
}

pub(crate) use unexpected_output;
