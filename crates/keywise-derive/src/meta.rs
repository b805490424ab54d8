//! Darling payload structs for the three marker attributes.

use darling::ast::NestedMeta;
use darling::util::Override;
use darling::{Error as DarlingError, FromMeta};
use keywise_core::symbol::AttrValue;
use quote::ToTokens;

///
/// TypeSpec
///
/// A member or key type spelling: a well-known shape name (`"text"`,
/// `"u32"`, ...), optionally suffixed with `?` for `Option`, or a path to
/// a declared type.
///

#[derive(Clone, Debug)]
pub struct TypeSpec(pub String);

impl FromMeta for TypeSpec {
    fn from_string(value: &str) -> Result<Self, DarlingError> {
        if value.trim().is_empty() {
            return Err(DarlingError::custom("type spelling must not be empty"));
        }

        Ok(Self(value.trim().to_string()))
    }
}

///
/// ArgListMeta
///
/// Positional constructor arguments of one item: literals or paths,
/// retained as typed attribute values.
///

#[derive(Clone, Debug, Default)]
pub struct ArgListMeta(pub Vec<AttrValue>);

impl FromMeta for ArgListMeta {
    fn from_list(items: &[NestedMeta]) -> Result<Self, DarlingError> {
        let mut args = Vec::with_capacity(items.len());

        for item in items {
            args.push(nested_to_value(item)?);
        }

        Ok(Self(args))
    }
}

pub fn nested_to_value(item: &NestedMeta) -> Result<AttrValue, DarlingError> {
    match item {
        NestedMeta::Lit(lit) => lit_to_value(lit),
        NestedMeta::Meta(syn::Meta::Path(path)) => {
            Ok(AttrValue::Expr(path.to_token_stream().to_string()))
        }
        NestedMeta::Meta(other) => Err(DarlingError::custom(format!(
            "expected literal or path argument, got {}",
            other.to_token_stream()
        ))),
    }
}

pub fn lit_to_value(lit: &syn::Lit) -> Result<AttrValue, DarlingError> {
    match lit {
        syn::Lit::Str(value) => Ok(AttrValue::Str(value.value())),
        syn::Lit::Int(value) => value
            .base10_parse::<i128>()
            .map(AttrValue::Int)
            .map_err(|err| DarlingError::custom(err).with_span(lit)),
        syn::Lit::Bool(value) => Ok(AttrValue::Bool(value.value)),
        other => Ok(AttrValue::Expr(other.to_token_stream().to_string())),
    }
}

///
/// ArgNamesMeta
///
/// The ordered constructor-argument name list.
///

#[derive(Clone, Debug, Default)]
pub struct ArgNamesMeta(pub Vec<String>);

impl FromMeta for ArgNamesMeta {
    fn from_list(items: &[NestedMeta]) -> Result<Self, DarlingError> {
        let mut names = Vec::with_capacity(items.len());

        for item in items {
            match item {
                NestedMeta::Lit(syn::Lit::Str(name)) => names.push(name.value()),
                other => {
                    return Err(DarlingError::custom("expected a quoted argument name")
                        .with_span(other));
                }
            }
        }

        Ok(Self(names))
    }
}

///
/// ImplsMeta
///
/// Declared trait impls of a custom member type, used for the structural
/// capability scan. Operator families are taken as bound to `Self`.
///

#[derive(Clone, Debug, Default)]
pub struct ImplsMeta(pub Vec<String>);

impl FromMeta for ImplsMeta {
    fn from_list(items: &[NestedMeta]) -> Result<Self, DarlingError> {
        let mut impls = Vec::with_capacity(items.len());

        for item in items {
            match item {
                NestedMeta::Meta(syn::Meta::Path(path)) => {
                    impls.push(path.to_token_stream().to_string().replace(' ', ""));
                }
                other => {
                    return Err(
                        DarlingError::custom("expected a bare trait name").with_span(other)
                    );
                }
            }
        }

        Ok(Self(impls))
    }
}

///
/// KeyMeta
///

#[derive(Clone, Debug, FromMeta)]
pub struct KeyMeta {
    pub ty: TypeSpec,

    #[darling(default)]
    pub name: Option<String>,
}

///
/// ItemMeta
///

#[derive(Clone, Debug, FromMeta)]
pub struct ItemMeta {
    pub ident: syn::Ident,
    pub key: syn::Lit,

    #[darling(default)]
    pub args: Option<ArgListMeta>,
}

///
/// EqualityMeta
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct EqualityMeta {
    #[darling(default)]
    pub comparer: Option<syn::Path>,

    #[darling(default)]
    pub equality_comparer: Option<syn::Path>,
}

///
/// MemberMeta
///

#[derive(Clone, Debug, FromMeta)]
pub struct MemberMeta {
    pub ident: syn::Ident,
    pub ty: TypeSpec,

    #[darling(default)]
    pub impls: Option<ImplsMeta>,

    #[darling(default)]
    pub copy: bool,

    #[darling(default)]
    pub equality: Option<Override<EqualityMeta>>,

    #[darling(default)]
    pub ignore: bool,

    #[darling(default)]
    pub ordinal: Option<u32>,

    #[darling(default)]
    pub skip_if: Option<String>,

    #[darling(default)]
    pub maps_to: Option<String>,

    #[darling(default)]
    pub no_default: bool,

    /// Declares the member as mutable; rejected with a diagnostic, kept
    /// here so the violation can be reported.
    #[darling(default)]
    pub mutable: bool,
}

///
/// CtorArgMeta
///

#[derive(Clone, Debug, FromMeta)]
pub struct CtorArgMeta {
    pub name: String,
    pub ty: TypeSpec,

    #[darling(default)]
    pub maps_to: Option<String>,
}

///
/// BaseItemMeta
///

#[derive(Clone, Debug, FromMeta)]
pub struct BaseItemMeta {
    pub ident: syn::Ident,
    pub key: syn::Lit,

    #[darling(default)]
    pub args: Option<ArgListMeta>,
}

///
/// BaseMeta
///
/// A base enum in another crate, described from metadata because its
/// source is unavailable to the macro.
///

#[derive(Clone, Debug, FromMeta)]
pub struct BaseMeta {
    pub path: syn::Path,

    #[darling(multiple, rename = "ctor_arg")]
    pub ctor_args: Vec<CtorArgMeta>,

    #[darling(multiple, rename = "item")]
    pub items: Vec<BaseItemMeta>,
}

///
/// CustomImplsMeta
///
/// User-authored serializer impls the glue fragments must not duplicate.
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct CustomImplsMeta {
    #[darling(default)]
    pub serde: bool,

    #[darling(default)]
    pub candid: bool,

    #[darling(default)]
    pub storable: bool,
}

///
/// SmartEnumArgs
///

#[derive(Clone, Debug, FromMeta)]
pub struct SmartEnumArgs {
    pub key: KeyMeta,

    #[darling(multiple, rename = "item")]
    pub items: Vec<ItemMeta>,

    #[darling(multiple, rename = "member")]
    pub members: Vec<MemberMeta>,

    #[darling(default)]
    pub base: Option<BaseMeta>,

    #[darling(default)]
    pub ctor_args: Option<ArgNamesMeta>,

    #[darling(default)]
    pub validatable: bool,

    #[darling(default)]
    pub extensible: bool,

    #[darling(default)]
    pub operators: Option<String>,

    #[darling(default)]
    pub comparer: Option<syn::Path>,

    #[darling(default)]
    pub default_item: Option<String>,

    #[darling(default)]
    pub invalid_factory: Option<syn::Path>,

    #[darling(default)]
    pub validate_with: Option<syn::Path>,

    #[darling(default)]
    pub skip_format: bool,

    #[darling(default)]
    pub skip_parse: bool,

    #[darling(default)]
    pub skip_compare: bool,

    #[darling(default)]
    pub span_parse: bool,

    #[darling(default)]
    pub serde: bool,

    #[darling(default)]
    pub candid: bool,

    #[darling(default)]
    pub storable: bool,

    #[darling(default)]
    pub custom: Option<CustomImplsMeta>,
}

///
/// ValueObjectArgs
///

#[derive(Clone, Debug, FromMeta)]
pub struct ValueObjectArgs {
    #[darling(multiple, rename = "member")]
    pub members: Vec<MemberMeta>,

    #[darling(default)]
    pub operators: Option<String>,

    #[darling(default)]
    pub arithmetic: Option<String>,

    #[darling(default)]
    pub validate_with: Option<syn::Path>,

    #[darling(default)]
    pub null_propagation: bool,

    #[darling(default)]
    pub skip_factory: bool,

    #[darling(default)]
    pub skip_format: bool,

    #[darling(default)]
    pub skip_parse: bool,

    #[darling(default)]
    pub skip_compare: bool,

    #[darling(default)]
    pub span_parse: bool,

    #[darling(default)]
    pub serde: bool,

    #[darling(default)]
    pub candid: bool,

    #[darling(default)]
    pub storable: bool,

    #[darling(default)]
    pub layout: bool,

    #[darling(default)]
    pub custom: Option<CustomImplsMeta>,
}

///
/// UnionArgs
///

#[derive(Clone, Debug, FromMeta)]
pub struct UnionArgs {
    #[darling(multiple, rename = "variant")]
    pub variants: Vec<MemberMeta>,

    #[darling(default)]
    pub skip_format: bool,

    #[darling(default)]
    pub serde: bool,

    #[darling(default)]
    pub candid: bool,

    #[darling(default)]
    pub storable: bool,
}
