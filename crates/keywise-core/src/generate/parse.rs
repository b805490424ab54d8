use crate::generate::{FragmentStrategy, Generate, ParseFragmentState};
use crate::prelude::*;

///
/// ParseFragment
///
/// `FromStr`: parse the key, then rebuild through the key factory so the
/// type's validation runs on every parse path.
///

pub struct ParseFragment {}

impl Generate<ParseFragmentState> for ParseFragment {
    fn strategy(state: &ParseFragmentState) -> Option<FragmentStrategy> {
        let ident = state.ty.ident_tokens();
        let name = &state.ty.ident;
        let key_ty = state.key_ty.type_tokens();

        Some(FragmentStrategy::from_body(quote! {
            impl ::std::str::FromStr for #ident {
                type Err = ::keywise::error::ValidationError;

                fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                    let key: #key_ty = ::std::str::FromStr::from_str(s).map_err(|err| {
                        ::keywise::error::ValidationError::new(
                            #name,
                            ::std::string::ToString::to_string(&err),
                        )
                    })?;

                    ::keywise::traits::KeyFactory::try_from_key(key)
                }
            }
        }))
    }
}

///
/// SpanParseFragment
///
/// `TryFrom<&[u8]>` on top of string parsing, generated only when span
/// parsing was requested for the target.
///

pub struct SpanParseFragment {}

impl Generate<ParseFragmentState> for SpanParseFragment {
    fn strategy(state: &ParseFragmentState) -> Option<FragmentStrategy> {
        if !state.span_requested {
            return None;
        }

        let ident = state.ty.ident_tokens();
        let name = &state.ty.ident;

        Some(FragmentStrategy::from_body(quote! {
            impl ::std::convert::TryFrom<&[u8]> for #ident {
                type Error = ::keywise::error::ValidationError;

                fn try_from(bytes: &[u8]) -> ::std::result::Result<Self, Self::Error> {
                    let text = ::std::str::from_utf8(bytes).map_err(|err| {
                        ::keywise::error::ValidationError::new(
                            #name,
                            ::std::string::ToString::to_string(&err),
                        )
                    })?;

                    <Self as ::std::str::FromStr>::from_str(text)
                }
            }
        }))
    }
}

///
/// TESTS
///
