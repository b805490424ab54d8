use crate::generate::{
    ComplexMemberView, FragmentStrategy, Framework, Generate, MemberView, SerializerFragmentState,
    SerializerShape,
};
use crate::prelude::*;

///
/// SerializerFragment
///
/// Serialization glue. Keyed shapes delegate through the runtime's generic
/// converters (`serialize_keyed` / `deserialize_keyed` and friends) and
/// never implement conversion logic; complex value objects contribute the
/// serde derives, or a member-wise byte codec in ordinal order.
///

pub struct SerializerFragment {}

impl Generate<SerializerFragmentState> for SerializerFragment {
    fn strategy(state: &SerializerFragmentState) -> Option<FragmentStrategy> {
        match (&state.framework, &state.shape) {
            (Framework::Serde, SerializerShape::Keyed(_)) => Some(keyed_serde(state)),
            (Framework::Serde, SerializerShape::Complex(_)) => Some(complex_serde()),
            (Framework::Candid, SerializerShape::Keyed(key)) => Some(keyed_candid(state, key)),
            (Framework::Candid, SerializerShape::Complex(_)) => None,
            (Framework::Storable, SerializerShape::Keyed(_)) => Some(keyed_storable(state)),
            (Framework::Storable, SerializerShape::Complex(members)) => {
                Some(complex_storable(state, members))
            }
        }
    }
}

fn keyed_serde(state: &SerializerFragmentState) -> FragmentStrategy {
    let ident = state.ty.ident_tokens();

    FragmentStrategy::from_body(quote! {
        impl ::keywise::__reexports::serde::Serialize for #ident {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::keywise::__reexports::serde::Serializer,
            {
                ::keywise::codec::serialize_keyed(self, serializer)
            }
        }

        impl<'de> ::keywise::__reexports::serde::Deserialize<'de> for #ident {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::keywise::__reexports::serde::Deserializer<'de>,
            {
                ::keywise::codec::deserialize_keyed(deserializer)
            }
        }
    })
}

fn complex_serde() -> FragmentStrategy {
    FragmentStrategy::from_derives(vec![
        quote!(::keywise::__reexports::serde::Serialize),
        quote!(::keywise::__reexports::serde::Deserialize),
    ])
    .with_attr(quote!(#[serde(crate = "::keywise::__reexports::serde")]))
}

fn keyed_candid(state: &SerializerFragmentState, key: &MemberView) -> FragmentStrategy {
    let ident = state.ty.ident_tokens();
    let key_ty = key.ty.type_tokens();

    FragmentStrategy::from_body(quote! {
        impl ::keywise::__reexports::candid::CandidType for #ident {
            fn _ty() -> ::keywise::__reexports::candid::types::Type {
                <#key_ty as ::keywise::__reexports::candid::CandidType>::_ty()
            }

            fn idl_serialize<S>(&self, serializer: S) -> ::std::result::Result<(), S::Error>
            where
                S: ::keywise::__reexports::candid::types::Serializer,
            {
                ::keywise::codec::idl_serialize_keyed(self, serializer)
            }
        }
    })
}

fn keyed_storable(state: &SerializerFragmentState) -> FragmentStrategy {
    let ident = state.ty.ident_tokens();

    FragmentStrategy::from_body(quote! {
        impl ::keywise::codec::Storable for #ident {
            fn to_bytes(&self) -> ::std::vec::Vec<u8> {
                ::keywise::codec::store_keyed(self)
            }

            fn try_from_bytes(
                bytes: &[u8],
            ) -> ::std::result::Result<Self, ::keywise::codec::StorableError> {
                ::keywise::codec::restore_keyed(bytes)
            }
        }
    })
}

fn complex_storable(
    state: &SerializerFragmentState,
    members: &[ComplexMemberView],
) -> FragmentStrategy {
    let ident = state.ty.ident_tokens();

    let writes = members.iter().map(|member| {
        let field = format_ident!("{}", member.field);
        quote! {
            ::keywise::codec::write_field(
                &mut out,
                &::keywise::codec::Storable::to_bytes(&self.#field),
            );
        }
    });

    let reads = members.iter().map(|member| {
        let field = format_ident!("{}", member.field);
        quote! {
            let #field = ::keywise::codec::Storable::try_from_bytes(fields.next_field()?)?;
        }
    });

    let field_names = members.iter().map(|member| format_ident!("{}", member.field));

    FragmentStrategy::from_body(quote! {
        impl ::keywise::codec::Storable for #ident {
            fn to_bytes(&self) -> ::std::vec::Vec<u8> {
                let mut out = ::std::vec::Vec::new();
                #(#writes)*

                out
            }

            fn try_from_bytes(
                bytes: &[u8],
            ) -> ::std::result::Result<Self, ::keywise::codec::StorableError> {
                let mut fields = ::keywise::codec::FieldReader::new(bytes);
                #(#reads)*
                fields.finish()?;

                ::std::result::Result::Ok(Self { #(#field_names),* })
            }
        }
    })
}

///
/// TESTS
///
