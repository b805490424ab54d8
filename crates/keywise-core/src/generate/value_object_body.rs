use crate::generate::{FragmentStrategy, Generate};
use crate::helper::{accessor_tokens, path_tokens};
use crate::prelude::*;
use crate::state::{SkipCondition, ValueObjectEntityState};
use convert_case::{Case, Casing};
use proc_macro2::Ident;

///
/// ValueObjectBody
///
/// The primary value-object generator: the factory surface, member
/// accessors, key conversions for keyed shapes and the runtime trait
/// impls. Marker types (zero members) still generate.
///

pub struct ValueObjectBody {}

/// Whether the complex-shape serde derives apply, mirroring the serde
/// glue fragment's selection.
fn complex_serde(state: &ValueObjectEntityState) -> bool {
    state.settings.frameworks.serde && !state.has_custom_serde && !state.has_key_member
}

fn default_helper(state: &ValueObjectEntityState) -> Ident {
    format_ident!("__{}_is_default", state.ident.to_case(Case::Snake))
}

/// The struct definition the fragments attach to, including per-member
/// serde attributes for the complex serialization shape.
#[must_use]
pub fn value_object_type_part(state: &ValueObjectEntityState) -> TokenStream {
    let ident = format_ident!("{}", state.ident);
    let serde_attrs = complex_serde(state);
    let helper = default_helper(state).to_string();

    let fields = state.assignable_members.iter().map(|member| {
        let field = format_ident!("{}", member.argument_name);
        let ty = member.ty.type_tokens();

        let attr = match (serde_attrs, member.skip_condition) {
            (true, Some(SkipCondition::Always)) => quote!(#[serde(skip)]),
            (true, Some(SkipCondition::WhenNone)) => {
                quote!(#[serde(skip_serializing_if = "Option::is_none")])
            }
            (true, Some(SkipCondition::WhenDefault)) => {
                quote!(#[serde(default, skip_serializing_if = #helper)])
            }
            _ => quote!(),
        };

        quote! {
            #attr
            #field: #ty
        }
    });

    quote! {
        pub struct #ident {
            #(#fields),*
        }
    }
}

impl Generate<ValueObjectEntityState> for ValueObjectBody {
    fn strategy(state: &ValueObjectEntityState) -> Option<FragmentStrategy> {
        let mut derives = vec![quote!(::std::clone::Clone), quote!(::std::fmt::Debug)];
        if state.is_copy {
            derives.push(quote!(::std::marker::Copy));
        }

        let mut attrs = Vec::new();
        if state.has_key_member && !state.has_layout_attr {
            attrs.push(quote!(#[repr(transparent)]));
        }

        let mut body = TokenStream::new();
        body.extend(inherent_impl(state));
        body.extend(keyed_impls(state));
        body.extend(default_helper_fn(state));

        Some(FragmentStrategy {
            derives,
            attrs,
            body,
        })
    }
}

fn validate_hook(state: &ValueObjectEntityState, candidate: &TokenStream) -> TokenStream {
    let name = &state.ident;

    state.settings.validate_with.as_ref().map_or_else(
        || quote!(),
        |hook| {
            let hook = path_tokens(hook);
            quote! {
                if let ::std::result::Result::Err(message) = #hook(#candidate) {
                    return ::std::result::Result::Err(
                        ::keywise::error::ValidationError::new(#name, message),
                    );
                }
            }
        },
    )
}

fn inherent_impl(state: &ValueObjectEntityState) -> TokenStream {
    let ident = format_ident!("{}", state.ident);

    let accessors = state.assignable_members.iter().map(|member| {
        let field = format_ident!("{}", member.argument_name);
        let (ret, expr) = accessor_tokens(&field, &member.ty);
        quote! {
            #[must_use]
            pub fn #field(&self) -> #ret {
                #expr
            }
        }
    });

    let factory = factory_fns(state);
    let unwrap = unwrap_fn(state);

    quote! {
        impl #ident {
            #factory

            #(#accessors)*

            #unwrap
        }
    }
}

fn factory_fns(state: &ValueObjectEntityState) -> TokenStream {
    if state.settings.skip_factory {
        return quote!();
    }

    if let Some(key) = state.key_member() {
        let key_arg = format_ident!("{}", key.argument_name);
        let key_ty = key.ty.type_tokens();

        let optional_factory = state.settings.null_propagation.then(|| {
            quote! {
                /// `None` propagates; `Some` validates like `try_create`.
                pub fn try_create_opt(
                    #key_arg: ::std::option::Option<#key_ty>,
                ) -> ::std::result::Result<
                    ::std::option::Option<Self>,
                    ::keywise::error::ValidationError,
                > {
                    match #key_arg {
                        ::std::option::Option::Some(value) => {
                            Self::try_create(value).map(::std::option::Option::Some)
                        }
                        ::std::option::Option::None => {
                            ::std::result::Result::Ok(::std::option::Option::None)
                        }
                    }
                }
            }
        });

        return quote! {
            /// Validating factory.
            pub fn try_create(
                #key_arg: #key_ty,
            ) -> ::std::result::Result<Self, ::keywise::error::ValidationError> {
                ::keywise::traits::KeyFactory::try_from_key(#key_arg)
            }

            #optional_factory
        };
    }

    // Complex and marker shapes construct from all members in declaration
    // order, then run the validation hook over the candidate.
    let params = state.assignable_members.iter().map(|member| {
        let field = format_ident!("{}", member.argument_name);
        let ty = member.ty.type_tokens();
        quote!(#field: #ty)
    });
    let field_names = state
        .assignable_members
        .iter()
        .map(|member| format_ident!("{}", member.argument_name));
    let hook = validate_hook(state, &quote!(&candidate));

    quote! {
        /// Validating factory.
        pub fn try_create(
            #(#params),*
        ) -> ::std::result::Result<Self, ::keywise::error::ValidationError> {
            let candidate = Self { #(#field_names),* };
            #hook

            ::std::result::Result::Ok(candidate)
        }
    }
}

fn unwrap_fn(state: &ValueObjectEntityState) -> TokenStream {
    let Some(key) = state.key_member() else {
        return quote!();
    };

    let field = format_ident!("{}", key.argument_name);
    let key_ty = key.ty.type_tokens();

    quote! {
        /// Unwrap back into the key type.
        #[must_use]
        pub fn into_key(self) -> #key_ty {
            self.#field
        }
    }
}

fn keyed_impls(state: &ValueObjectEntityState) -> TokenStream {
    let Some(key) = state.key_member() else {
        return quote!();
    };

    let ident = format_ident!("{}", state.ident);
    let name = &state.ident;
    let field = format_ident!("{}", key.argument_name);
    let key_ty = key.ty.type_tokens();
    let hook = validate_hook(state, &quote!(&key));

    quote! {
        impl ::keywise::traits::Keyed for #ident {
            type Key = #key_ty;

            fn key(&self) -> &Self::Key {
                &self.#field
            }
        }

        impl ::keywise::traits::KeyFactory for #ident {
            const TYPE_NAME: &'static str = #name;

            fn try_from_key(
                key: Self::Key,
            ) -> ::std::result::Result<Self, ::keywise::error::ValidationError> {
                #hook

                ::std::result::Result::Ok(Self { #field: key })
            }
        }

        impl ::std::convert::From<#ident> for #key_ty {
            fn from(value: #ident) -> Self {
                value.into_key()
            }
        }

        impl ::std::convert::TryFrom<#key_ty> for #ident {
            type Error = ::keywise::error::ValidationError;

            fn try_from(value: #key_ty) -> ::std::result::Result<Self, Self::Error> {
                ::keywise::traits::KeyFactory::try_from_key(value)
            }
        }
    }
}

fn default_helper_fn(state: &ValueObjectEntityState) -> TokenStream {
    let needs_helper = complex_serde(state)
        && state
            .assignable_members
            .iter()
            .any(|member| matches!(member.skip_condition, Some(SkipCondition::WhenDefault)));
    if !needs_helper {
        return quote!();
    }

    let helper = default_helper(state);

    quote! {
        fn #helper<T: ::std::default::Default + ::std::cmp::PartialEq>(value: &T) -> bool {
            *value == T::default()
        }
    }
}

/// Registration of the value object's metadata record at program start.
#[must_use]
pub fn value_object_registration(state: &ValueObjectEntityState) -> Option<FragmentStrategy> {
    let name = &state.ident;
    let register_fn = format_ident!("__keywise_register_{}", state.ident.to_case(Case::Snake));
    let key_path = state
        .key_member()
        .map(|key| key.ty.path_with_option.clone())
        .unwrap_or_default();

    Some(FragmentStrategy::from_body(quote! {
        #[::keywise::__reexports::ctor::ctor(unsafe, anonymous, crate_path = ::keywise::__reexports::ctor)]
        fn #register_fn() {
            ::keywise::registry::register(::keywise::registry::KindMetadata {
                type_path: ::std::concat!(::std::module_path!(), "::", #name),
                kind: ::keywise::registry::KindTag::ValueObject,
                key_type_path: #key_path,
                validatable: false,
                item_keys: ::std::vec::Vec::new,
            });
        }
    }))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{
        AttrBag, AttrValue, Location, MemberDecl, MemberKind, SpecialType, TypeDecl, TypeMarker,
        TypeRef, Visibility,
    };

    fn member(name: &str, special: SpecialType) -> MemberDecl {
        MemberDecl {
            name: name.to_string(),
            ty: TypeRef::Special(special),
            kind: MemberKind::Field,
            visibility: Visibility::Private,
            is_static: false,
            is_readonly: true,
            attrs: AttrBag::default(),
            location: Location::default(),
        }
    }

    fn decl(members: Vec<MemberDecl>) -> TypeDecl {
        TypeDecl {
            path: "crate::Amount".to_string(),
            ident: "Amount".to_string(),
            marker: Some(TypeMarker::ValueObject),
            is_partial: true,
            generic_params: 0,
            is_abstract: false,
            has_layout_attr: false,
            has_custom_serde: false,
            has_custom_candid: false,
            has_custom_storable: false,
            members,
            key_type: None,
            attrs: AttrBag::default(),
            base_enum: None,
            location: Location::default(),
        }
    }

    fn keyed_state() -> ValueObjectEntityState {
        ValueObjectEntityState::build(&decl(vec![member("value", SpecialType::U64)]))
            .unwrap()
            .0
    }

    #[test]
    fn keyed_shape_is_transparent_with_conversions() {
        let strategy = ValueObjectBody::strategy(&keyed_state()).unwrap();

        let attrs: Vec<String> = strategy.attrs.iter().map(ToString::to_string).collect();
        assert!(attrs.iter().any(|attr| attr.contains("transparent")));

        let body = strategy.body.to_string();
        assert!(body.contains("try_create"));
        assert!(body.contains("into_key"));
        assert!(body.contains("TryFrom < u64 >"));
        assert!(body.contains("From < Amount > for u64"));
    }

    #[test]
    fn null_propagation_adds_the_optional_factory() {
        let mut decl = decl(vec![member("value", SpecialType::U64)]);
        decl.attrs.set("null_propagation", AttrValue::Bool(true));
        let state = ValueObjectEntityState::build(&decl).unwrap().0;

        let body = ValueObjectBody::strategy(&state).unwrap().body.to_string();
        assert!(body.contains("try_create_opt"));
    }

    #[test]
    fn complex_shape_constructs_from_all_members() {
        let state = ValueObjectEntityState::build(&decl(vec![
            member("amount", SpecialType::U64),
            member("currency", SpecialType::Text),
        ]))
        .unwrap()
        .0;

        let strategy = ValueObjectBody::strategy(&state).unwrap();
        assert!(strategy.attrs.is_empty()); // no repr(transparent)

        let body = strategy.body.to_string();
        assert!(body.contains("amount : u64"));
        assert!(body.contains("currency : :: std :: string :: String"));
        assert!(!body.contains("Keyed"));
    }

    #[test]
    fn marker_shape_still_generates_a_factory() {
        let state = ValueObjectEntityState::build(&decl(Vec::new())).unwrap().0;

        let body = ValueObjectBody::strategy(&state).unwrap().body.to_string();
        assert!(body.contains("try_create"));
    }

    #[test]
    fn when_default_skip_condition_emits_the_helper() {
        let mut skipped = member("note", SpecialType::Text);
        skipped
            .attrs
            .set("skip_if", AttrValue::Str("when_default".to_string()));

        let mut with_serde = decl(vec![member("amount", SpecialType::U64), skipped]);
        with_serde.attrs.set("serde", AttrValue::Bool(true));
        let state = ValueObjectEntityState::build(&with_serde).unwrap().0;

        let body = ValueObjectBody::strategy(&state).unwrap().body.to_string();
        assert!(body.contains("__amount_is_default"));

        let type_part = value_object_type_part(&state).to_string();
        assert!(type_part.contains("skip_serializing_if"));
    }
}
