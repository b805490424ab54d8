//! Runtime support for keywise-generated types.
//!
//! The attribute macros re-exported at the crate root synthesize keyed
//! smart enums, value objects and unions. Everything else in this crate is
//! the surface those generated implementations bind against: the trait
//! contracts, the duplicate-checked item lookup, the process-wide kind
//! registry and the serialization delegation helpers.

pub mod codec;
pub mod comparer;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod traits;

pub use keywise_derive::{smart_enum, union_type, value_object};

///
/// Prelude
///

pub mod prelude {
    pub use crate::error::{DuplicateItemError, UnknownKeyError, ValidationError};
    pub use crate::traits::{EnumItems, KeyFactory, Keyed, Validatable};
    pub use keywise_derive::{smart_enum, union_type, value_object};
}

///
/// __reexports
///
/// Crates referenced by generated code. Generated token streams only ever
/// name paths below `::keywise`, so downstream users need a single
/// dependency.
///

pub mod __reexports {
    #[cfg(feature = "candid")]
    pub use candid;
    pub use ctor;
    pub use serde;
}
