use crate::generate::{FragmentStrategy, Generate};
use crate::helper::{accessor_tokens, comparer_tokens, literal_tokens, path_tokens};
use crate::prelude::*;
use crate::state::{EnumEntityState, EnumItemState, argument_name};
use convert_case::{Case, Casing};
use proc_macro2::Ident;
use std::collections::HashSet;

///
/// EnumBody
///
/// The primary smart-enum generator: the item table and its
/// duplicate-checked lookup, item accessors, the validating factory
/// surface and the runtime trait impls. Inherited base items come first,
/// either inlined from a sibling snapshot or converted through the base's
/// public surface.
///

pub struct EnumBody {}

/// The struct definition the fragments attach to.
#[must_use]
pub fn enum_type_part(state: &EnumEntityState) -> TokenStream {
    let ident = ident_of(state);
    let key_field = key_field(state);
    let key_ty = state.key.ty.type_tokens();

    let member_fields = state.assignable_members.iter().map(|member| {
        let field = format_ident!("{}", member.argument_name);
        let ty = member.ty.type_tokens();
        quote!(#field: #ty)
    });

    let validity_field = state
        .settings
        .validatable
        .then(|| quote!(is_valid: bool));

    let fields = std::iter::once(quote!(#key_field: #key_ty))
        .chain(member_fields)
        .chain(validity_field);

    quote! {
        pub struct #ident {
            #(#fields),*
        }
    }
}

impl Generate<EnumEntityState> for EnumBody {
    fn strategy(state: &EnumEntityState) -> Option<FragmentStrategy> {
        let mut derives = vec![quote!(::std::clone::Clone), quote!(::std::fmt::Debug)];
        if state.is_copy {
            derives.push(quote!(::std::marker::Copy));
        }

        let mut body = TokenStream::new();
        body.extend(statics(state));
        body.extend(inherent_impl(state));
        body.extend(trait_impls(state));

        Some(FragmentStrategy {
            derives,
            attrs: Vec::new(),
            body,
        })
    }
}

fn ident_of(state: &EnumEntityState) -> Ident {
    format_ident!("{}", state.ident)
}

fn key_field(state: &EnumEntityState) -> Ident {
    format_ident!("{}", state.key.argument_name)
}

fn items_static(state: &EnumEntityState) -> Ident {
    format_ident!("__{}_ITEMS", state.ident.to_case(Case::UpperSnake))
}

fn lookup_static(state: &EnumEntityState) -> Ident {
    format_ident!("__{}_LOOKUP", state.ident.to_case(Case::UpperSnake))
}

/// Accessor idents for every visible item, base items first. Names are
/// disambiguated against the factory surface and member accessors.
fn item_accessors(state: &EnumEntityState) -> Vec<Ident> {
    let mut reserved: HashSet<String> =
        ["items", "get", "try_get", "new", "cmp_opt", "into_key"]
            .into_iter()
            .map(ToString::to_string)
            .collect();
    reserved.insert(state.key.argument_name.clone());
    for member in &state.assignable_members {
        reserved.insert(member.argument_name.clone());
    }

    state
        .all_items()
        .iter()
        .map(|item| {
            let name = argument_name(&item.ident);
            if reserved.contains(&name) {
                format_ident!("{name}_item")
            } else {
                format_ident!("{name}")
            }
        })
        .collect()
}

fn describe_expr(state: &EnumEntityState, key: TokenStream) -> TokenStream {
    if state.key.ty.capabilities.formattable {
        quote!(::std::string::ToString::to_string(#key))
    } else {
        let _ = key;
        quote!(::std::string::String::from("<key>"))
    }
}

fn ctor_call(state: &EnumEntityState, item: &EnumItemState) -> TokenStream {
    let ident = ident_of(state);
    let key_literal = literal_tokens(&item.key, &state.key.ty);
    let args = item
        .args
        .iter()
        .zip(&state.assignable_members)
        .map(|(arg, member)| literal_tokens(arg, &member.ty));

    quote!(#ident::new(#key_literal #(, #args)*))
}

fn statics(state: &EnumEntityState) -> TokenStream {
    let ident = ident_of(state);
    let items_static = items_static(state);
    let lookup_static = lookup_static(state);
    let name = &state.ident;
    let comparer = comparer_tokens(state.settings.key_comparer.as_deref(), &state.key.ty);
    let describe = if state.key.ty.capabilities.formattable {
        quote!(|key| ::std::string::ToString::to_string(key))
    } else {
        quote!(|_| ::std::string::String::from("<key>"))
    };

    let own_ctors = state.items.iter().map(|item| ctor_call(state, item));

    let items_init = match &state.base {
        // Same-compilation base: the sibling snapshot is known, its items
        // are inlined as direct constructor calls.
        Some(base) if matches!(base.origin, BaseOrigin::SameCompilation) => {
            let base_ctors = base.items.iter().map(|item| ctor_call(state, item));
            quote! {
                ::std::vec![#(#base_ctors,)* #(#own_ctors),*]
            }
        }
        // External base: only the metadata surface is available, items are
        // converted through the base's public trait surface at startup.
        Some(base) => {
            let base_path = path_tokens(&base.path);
            quote! {{
                let mut items: ::std::vec::Vec<#ident> =
                    <#base_path as ::keywise::traits::EnumItems>::items()
                        .iter()
                        .map(#ident::__from_base)
                        .collect();
                items.extend([#(#own_ctors),*]);
                items
            }}
        }
        None => quote!(::std::vec![#(#own_ctors),*]),
    };

    quote! {
        static #items_static: ::std::sync::LazyLock<::std::vec::Vec<#ident>> =
            ::std::sync::LazyLock::new(|| #items_init);

        static #lookup_static: ::std::sync::LazyLock<
            ::keywise::lookup::ItemLookup<#ident, #comparer>,
        > = ::std::sync::LazyLock::new(|| {
            ::keywise::lookup::ItemLookup::try_new(
                #name,
                ::std::sync::LazyLock::force(&#items_static).as_slice(),
                #comparer,
                #describe,
            )
            .unwrap_or_else(|err| ::std::panic!("{err}"))
        });
    }
}

fn inherent_impl(state: &EnumEntityState) -> TokenStream {
    let ident = ident_of(state);
    let items_static = items_static(state);
    let key_field = key_field(state);
    let key_ty = state.key.ty.type_tokens();

    let accessors = item_accessors(state);
    let item_fns = accessors.iter().enumerate().map(|(index, accessor)| {
        quote! {
            #[must_use]
            pub fn #accessor() -> &'static Self {
                &Self::items()[#index]
            }
        }
    });

    let (key_ret, key_expr) = accessor_tokens(&key_field, &state.key.ty);
    let member_accessors = state.assignable_members.iter().map(|member| {
        let field = format_ident!("{}", member.argument_name);
        let (ret, expr) = accessor_tokens(&field, &member.ty);
        quote! {
            #[must_use]
            pub fn #field(&self) -> #ret {
                #expr
            }
        }
    });

    let ctor_params = std::iter::once(quote!(#key_field: #key_ty)).chain(
        state.assignable_members.iter().map(|member| {
            let field = format_ident!("{}", member.argument_name);
            let ty = member.ty.type_tokens();
            quote!(#field: #ty)
        }),
    );
    let ctor_fields = std::iter::once(quote!(#key_field)).chain(
        state
            .assignable_members
            .iter()
            .map(|member| {
                let field = format_ident!("{}", member.argument_name);
                quote!(#field)
            }),
    );
    let validity_init = state.settings.validatable.then(|| quote!(, is_valid: true));

    let get_fn = get_fn(state);
    let from_base_fn = from_base_fn(state);

    quote! {
        impl #ident {
            /// All items in declaration order, inherited items first.
            #[must_use]
            pub fn items() -> &'static [Self] {
                ::std::sync::LazyLock::force(&#items_static).as_slice()
            }

            #(#item_fns)*

            #get_fn

            #[must_use]
            pub fn #key_field(&self) -> #key_ret {
                #key_expr
            }

            #(#member_accessors)*

            fn new(#(#ctor_params),*) -> Self {
                Self { #(#ctor_fields),* #validity_init }
            }

            #from_base_fn
        }
    }
}

fn get_fn(state: &EnumEntityState) -> TokenStream {
    let key_ty = state.key.ty.type_tokens();
    let name = &state.ident;
    let describe = describe_expr(state, quote!(key));

    if state.settings.validatable {
        quote! {
            /// Resolve a key, falling back to an invalid instance for an
            /// unknown one.
            #[must_use]
            pub fn get(key: &#key_ty) -> Self {
                match <Self as ::keywise::traits::EnumItems>::lookup(key) {
                    ::std::option::Option::Some(item) => ::std::clone::Clone::clone(item),
                    ::std::option::Option::None => {
                        <Self as ::keywise::traits::Validatable>::invalid(
                            ::std::clone::Clone::clone(key),
                        )
                    }
                }
            }

            #[must_use]
            pub fn try_get(key: &#key_ty) -> ::std::option::Option<&'static Self> {
                <Self as ::keywise::traits::EnumItems>::lookup(key)
            }
        }
    } else {
        quote! {
            /// Resolve a key against the item table.
            pub fn get(
                key: &#key_ty,
            ) -> ::std::result::Result<&'static Self, ::keywise::error::UnknownKeyError> {
                <Self as ::keywise::traits::EnumItems>::lookup(key).ok_or_else(|| {
                    ::keywise::error::UnknownKeyError::new(#name, #describe)
                })
            }
        }
    }
}

fn from_base_fn(state: &EnumEntityState) -> TokenStream {
    let Some(base) = &state.base else {
        return quote!();
    };
    if matches!(base.origin, BaseOrigin::SameCompilation) {
        return quote!();
    }

    let base_path = path_tokens(&base.path);
    let key_expr = if state.key.ty.is_copy {
        quote!(*::keywise::traits::Keyed::key(base))
    } else {
        quote!(::std::clone::Clone::clone(::keywise::traits::Keyed::key(base)))
    };

    let member_exprs = state.assignable_members.iter().map(|member| {
        let accessor = format_ident!("{}", argument_name(member.base_accessor()));
        if member.ty.is_copy {
            quote!(base.#accessor())
        } else {
            quote!(::std::clone::Clone::clone(base.#accessor()))
        }
    });

    quote! {
        fn __from_base(base: &#base_path) -> Self {
            Self::new(#key_expr #(, #member_exprs)*)
        }
    }
}

fn trait_impls(state: &EnumEntityState) -> TokenStream {
    let ident = ident_of(state);
    let key_field = key_field(state);
    let key_ty = state.key.ty.type_tokens();
    let lookup_static = lookup_static(state);
    let name = &state.ident;

    let mut tokens = quote! {
        impl ::keywise::traits::Keyed for #ident {
            type Key = #key_ty;

            fn key(&self) -> &Self::Key {
                &self.#key_field
            }
        }

        impl ::keywise::traits::EnumItems for #ident {
            fn items() -> &'static [Self] {
                Self::items()
            }

            fn lookup(key: &Self::Key) -> ::std::option::Option<&'static Self> {
                #lookup_static.get(key)
            }
        }
    };

    let validate_hook = state.settings.validate_with.as_ref().map(|hook| {
        let hook = path_tokens(hook);
        quote! {
            if let ::std::result::Result::Err(message) = #hook(&key) {
                return ::std::result::Result::Err(
                    ::keywise::error::ValidationError::new(#name, message),
                );
            }
        }
    });

    let factory_body = if state.settings.validatable {
        quote! {
            #validate_hook
            ::std::result::Result::Ok(Self::get(&key))
        }
    } else {
        quote! {
            #validate_hook
            Self::get(&key)
                .map(::std::clone::Clone::clone)
                .map_err(::std::convert::Into::into)
        }
    };

    tokens.extend(quote! {
        impl ::keywise::traits::KeyFactory for #ident {
            const TYPE_NAME: &'static str = #name;

            fn try_from_key(
                key: Self::Key,
            ) -> ::std::result::Result<Self, ::keywise::error::ValidationError> {
                #factory_body
            }
        }
    });

    if state.settings.validatable {
        let invalid_body = if let Some(factory) = &state.settings.invalid_factory {
            let factory = path_tokens(factory);
            quote! {
                let item = #factory(key);
                ::std::assert!(
                    !item.is_valid,
                    "invalid item factory for `{}` must return an invalid instance",
                    #name,
                );
                item
            }
        } else {
            let member_defaults = state.assignable_members.iter().map(|member| {
                let field = format_ident!("{}", member.argument_name);
                quote!(#field: ::std::default::Default::default())
            });
            quote! {
                Self {
                    #key_field: key,
                    #(#member_defaults,)*
                    is_valid: false,
                }
            }
        };

        tokens.extend(quote! {
            impl ::keywise::traits::Validatable for #ident {
                fn is_valid(&self) -> bool {
                    self.is_valid
                }

                fn invalid(key: #key_ty) -> Self {
                    #invalid_body
                }
            }
        });
    }

    if let Some(default_item) = &state.settings.default_item {
        let all = state.all_items();
        let accessors = item_accessors(state);
        if let Some(position) = all.iter().position(|item| &item.ident == default_item) {
            let accessor = &accessors[position];
            tokens.extend(quote! {
                impl ::std::default::Default for #ident {
                    fn default() -> Self {
                        ::std::clone::Clone::clone(Self::#accessor())
                    }
                }
            });
        }
    }

    tokens
}

/// Registration of the enum's metadata record at program start.
#[must_use]
pub fn enum_registration(state: &EnumEntityState) -> Option<FragmentStrategy> {
    let ident = ident_of(state);
    let name = &state.ident;
    let register_fn = format_ident!("__keywise_register_{}", state.ident.to_case(Case::Snake));
    let key_path = &state.key.ty.path_with_option;
    let validatable = state.settings.validatable;

    let item_keys = if state.key.ty.capabilities.formattable {
        quote! {
            || {
                #ident::items()
                    .iter()
                    .map(|item| {
                        ::std::string::ToString::to_string(::keywise::traits::Keyed::key(item))
                    })
                    .collect()
            }
        }
    } else {
        quote!(::std::vec::Vec::new)
    };

    Some(FragmentStrategy::from_body(quote! {
        #[::keywise::__reexports::ctor::ctor(unsafe, anonymous, crate_path = ::keywise::__reexports::ctor)]
        fn #register_fn() {
            ::keywise::registry::register(::keywise::registry::KindMetadata {
                type_path: ::std::concat!(::std::module_path!(), "::", #name),
                kind: ::keywise::registry::KindTag::SmartEnum,
                key_type_path: #key_path,
                validatable: #validatable,
                item_keys: #item_keys,
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

    fn item(name: &str, key: &str, arg: i128) -> MemberDecl {
        let mut attrs = AttrBag::default();
        attrs.set("key", AttrValue::Str(key.to_string()));
        attrs.set("args", AttrValue::List(vec![AttrValue::Int(arg)]));

        MemberDecl {
            name: name.to_string(),
            ty: TypeRef::SelfType,
            kind: MemberKind::Field,
            visibility: Visibility::Public,
            is_static: true,
            is_readonly: true,
            attrs,
            location: Location::default(),
        }
    }

    fn decl() -> TypeDecl {
        TypeDecl {
            path: "crate::Color".to_string(),
            ident: "Color".to_string(),
            marker: Some(TypeMarker::SmartEnum),
            is_partial: true,
            generic_params: 0,
            is_abstract: false,
            has_layout_attr: false,
            has_custom_serde: false,
            has_custom_candid: false,
            has_custom_storable: false,
            members: vec![
                item("Red", "red", 0xFF_00_00),
                item("Green", "green", 0x00_FF_00),
                MemberDecl {
                    name: "rgb".to_string(),
                    ty: TypeRef::Special(SpecialType::U32),
                    kind: MemberKind::Field,
                    visibility: Visibility::Private,
                    is_static: false,
                    is_readonly: true,
                    attrs: AttrBag::default(),
                    location: Location::default(),
                },
            ],
            key_type: Some(TypeRef::Special(SpecialType::Text)),
            attrs: AttrBag::default(),
            base_enum: None,
            location: Location::default(),
        }
    }

    fn state() -> EnumEntityState {
        EnumEntityState::build(&decl()).unwrap().0
    }

    #[test]
    fn type_part_has_key_and_member_fields() {
        let rendered = enum_type_part(&state()).to_string();

        assert!(rendered.contains("pub struct Color"));
        assert!(rendered.contains("key : :: std :: string :: String"));
        assert!(rendered.contains("rgb : u32"));
        assert!(!rendered.contains("is_valid"));
    }

    #[test]
    fn validatable_enums_carry_a_validity_field() {
        let mut decl = decl();
        decl.attrs.set("validatable", AttrValue::Bool(true));
        let state = EnumEntityState::build(&decl).unwrap().0;

        assert!(enum_type_part(&state).to_string().contains("is_valid : bool"));

        let body = EnumBody::strategy(&state).unwrap().body.to_string();
        assert!(body.contains("Validatable"));
        assert!(body.contains("is_valid : false"));
    }

    #[test]
    fn body_builds_the_duplicate_checked_lookup() {
        let body = EnumBody::strategy(&state()).unwrap().body.to_string();

        assert!(body.contains("__COLOR_ITEMS"));
        assert!(body.contains("ItemLookup"));
        assert!(body.contains("try_new"));
        assert!(body.contains("AsciiCaseInsensitive"));
    }

    #[test]
    fn item_accessors_are_snake_cased() {
        let body = EnumBody::strategy(&state()).unwrap().body.to_string();

        assert!(body.contains("pub fn red ()"));
        assert!(body.contains("pub fn green ()"));
    }

    #[test]
    fn item_accessor_colliding_with_a_member_is_disambiguated() {
        let mut decl = decl();
        decl.members.push(item("Rgb", "rgb-item", 0));
        let state = EnumEntityState::build(&decl).unwrap().0;

        let body = EnumBody::strategy(&state).unwrap().body.to_string();
        assert!(body.contains("pub fn rgb_item ()"));
    }

    #[test]
    fn external_base_items_convert_through_the_trait_surface() {
        let mut decl = decl();
        decl.base_enum = Some(crate::symbol::BaseEnumDecl {
            path: "::palette::Color".to_string(),
            minimal: "Color".to_string(),
            origin: BaseOrigin::External,
            nullable: false,
            items: Vec::new(),
            ctor_args: vec![
                crate::symbol::BaseCtorArg {
                    name: "key".to_string(),
                    ty: TypeRef::Special(SpecialType::Text),
                    maps_to: None,
                },
                crate::symbol::BaseCtorArg {
                    name: "rgb".to_string(),
                    ty: TypeRef::Special(SpecialType::U32),
                    maps_to: None,
                },
            ],
        });
        let state = EnumEntityState::build(&decl).unwrap().0;

        let body = EnumBody::strategy(&state).unwrap().body.to_string();
        assert!(body.contains("__from_base"));
        assert!(body.contains(":: palette :: Color as :: keywise :: traits :: EnumItems"));
    }
}
