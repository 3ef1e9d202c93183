//! Newtyped identifiers so dictionary ids, predicate ids, and per-query
//! variable slots can never be confused with one another or with a bare
//! `u32`.

use std::fmt;

/// Id 0 is reserved as "no entry"; real ids start at 1.
pub const NONE_ID: u32 = 0;

macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: Self = Self(NONE_ID);

            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }
    };
}

id_newtype!(EntityId, "Id of an interned subject/object term.");
id_newtype!(PredId, "Id of an interned predicate term.");
id_newtype!(VarId, "Per-query id of a SPARQL variable, distinct from EntityId.");
