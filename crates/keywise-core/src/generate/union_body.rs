use crate::generate::{FragmentStrategy, Generate};
use crate::prelude::*;
use crate::state::{UnionEntityState, argument_name};
use convert_case::{Case, Casing};

///
/// UnionBody
///
/// The primary union generator: a Rust enum with one variant per declared
/// payload, `From` impls for uniquely-typed payloads, and per-variant
/// accessors.
///

pub struct UnionBody {}

/// The enum definition the fragments attach to.
#[must_use]
pub fn union_type_part(state: &UnionEntityState) -> TokenStream {
    let ident = format_ident!("{}", state.ident);
    let variants = state.variants.iter().map(|variant| {
        let variant_ident = format_ident!("{}", variant.ident);
        let ty = variant.ty.type_tokens();
        quote!(#variant_ident(#ty))
    });

    quote! {
        pub enum #ident {
            #(#variants),*
        }
    }
}

impl Generate<UnionEntityState> for UnionBody {
    fn strategy(state: &UnionEntityState) -> Option<FragmentStrategy> {
        let ident = format_ident!("{}", state.ident);

        let mut derives = vec![
            quote!(::std::clone::Clone),
            quote!(::std::fmt::Debug),
            quote!(::std::cmp::PartialEq),
        ];
        if state.is_copy {
            derives.push(quote!(::std::marker::Copy));
        }

        // Float payloads only order partially; Eq and Hash are withheld.
        let total = state.variants.iter().all(|variant| {
            !matches!(
                variant.ty.special,
                Some(crate::symbol::SpecialType::F32 | crate::symbol::SpecialType::F64)
            )
        });
        if total {
            derives.push(quote!(::std::cmp::Eq));
            derives.push(quote!(::std::hash::Hash));
        }

        let from_impls = state.uniquely_typed_variants().into_iter().map(|variant| {
            let variant_ident = format_ident!("{}", variant.ident);
            let ty = variant.ty.type_tokens();
            quote! {
                impl ::std::convert::From<#ty> for #ident {
                    fn from(value: #ty) -> Self {
                        Self::#variant_ident(value)
                    }
                }
            }
        });

        let accessors = state.variants.iter().map(|variant| {
            let variant_ident = format_ident!("{}", variant.ident);
            let is_fn = format_ident!("is_{}", argument_name(&variant.ident));
            let as_fn = format_ident!("as_{}", argument_name(&variant.ident));
            let ty = variant.ty.type_tokens();

            quote! {
                #[must_use]
                pub const fn #is_fn(&self) -> bool {
                    ::std::matches!(self, Self::#variant_ident(_))
                }

                #[must_use]
                pub const fn #as_fn(&self) -> ::std::option::Option<&#ty> {
                    match self {
                        Self::#variant_ident(value) => ::std::option::Option::Some(value),
                        _ => ::std::option::Option::None,
                    }
                }
            }
        });

        let body = quote! {
            #(#from_impls)*

            impl #ident {
                #(#accessors)*
            }
        };

        Some(FragmentStrategy {
            derives,
            attrs: Vec::new(),
            body,
        })
    }
}

/// Registration of the union's metadata record at program start.
#[must_use]
pub fn union_registration(state: &UnionEntityState) -> Option<FragmentStrategy> {
    let name = &state.ident;
    let register_fn = format_ident!("__keywise_register_{}", state.ident.to_case(Case::Snake));

    Some(FragmentStrategy::from_body(quote! {
        #[::keywise::__reexports::ctor::ctor(unsafe, anonymous, crate_path = ::keywise::__reexports::ctor)]
        fn #register_fn() {
            ::keywise::registry::register(::keywise::registry::KindMetadata {
                type_path: ::std::concat!(::std::module_path!(), "::", #name),
                kind: ::keywise::registry::KindTag::Union,
                key_type_path: "",
                validatable: false,
                item_keys: ::std::vec::Vec::new,
            });
        }
    }))
}

///
/// TESTS
///
