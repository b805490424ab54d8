//! Attribute macros for keywise.
//!
//! Each macro parses its declarative payload with darling, lowers it into
//! the core symbol model and splices the rendered implementation back into
//! the annotated item. All generation decisions live in `keywise-core`;
//! this crate is the host boundary.

use proc_macro::TokenStream;

mod expand;
mod lower;
mod meta;

/// Declare a keyed smart enum.
///
/// ```ignore
/// #[smart_enum(
///     key(ty = "text"),
///     item(ident = "Red", key = "red", args(0xFF0000)),
///     item(ident = "Green", key = "green", args(0x00FF00)),
///     member(ident = "rgb", ty = "u32"),
///     serde,
/// )]
/// pub struct Color;
/// ```
#[proc_macro_attribute]
pub fn smart_enum(args: TokenStream, input: TokenStream) -> TokenStream {
    expand::smart_enum(args.into(), input.into()).into()
}

/// Declare a value object: keyed when exactly one member is declared,
/// complex otherwise, a marker with none.
#[proc_macro_attribute]
pub fn value_object(args: TokenStream, input: TokenStream) -> TokenStream {
    expand::value_object(args.into(), input.into()).into()
}

/// Declare a union over a closed set of payload types.
#[proc_macro_attribute]
pub fn union_type(args: TokenStream, input: TokenStream) -> TokenStream {
    expand::union_type(args.into(), input.into()).into()
}
