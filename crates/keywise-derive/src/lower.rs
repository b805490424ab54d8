//! Lowering of darling payloads into the core symbol model.

use crate::meta::{
    BaseMeta, ItemMeta, MemberMeta, SmartEnumArgs, TypeSpec, UnionArgs, ValueObjectArgs,
    lit_to_value,
};
use darling::util::Override;
use keywise_core::symbol::{
    AttrBag, AttrValue, BaseCtorArg, BaseEnumDecl, BaseItemDecl, BaseOrigin, DeclaredType,
    Location, MemberDecl, MemberKind, SpecialType, TraitBound, TypeDecl, TypeMarker, TypeRef,
    Visibility,
};
use quote::ToTokens;

fn path_to_string(path: &syn::Path) -> String {
    path.to_token_stream().to_string().replace(' ', "")
}

fn special_of(name: &str) -> Option<SpecialType> {
    match name {
        "bool" => Some(SpecialType::Bool),
        "char" => Some(SpecialType::Char),
        "text" | "string" => Some(SpecialType::Text),
        "duration" => Some(SpecialType::Duration),
        "timestamp" => Some(SpecialType::Timestamp),
        "u8" => Some(SpecialType::U8),
        "u16" => Some(SpecialType::U16),
        "u32" => Some(SpecialType::U32),
        "u64" => Some(SpecialType::U64),
        "u128" => Some(SpecialType::U128),
        "i8" => Some(SpecialType::I8),
        "i16" => Some(SpecialType::I16),
        "i32" => Some(SpecialType::I32),
        "i64" => Some(SpecialType::I64),
        "i128" => Some(SpecialType::I128),
        "f32" => Some(SpecialType::F32),
        "f64" => Some(SpecialType::F64),
        _ => None,
    }
}

// Operator families whose right-hand side binds to the declaring type.
const SELF_BINARY_TRAITS: [&str; 5] = ["Add", "Sub", "Mul", "Div", "PartialOrd"];

/// Resolve a type spelling into a symbol-graph type reference.
pub fn type_spec_to_ref(spec: &TypeSpec, meta: Option<&MemberMeta>) -> TypeRef {
    let spelling = spec.0.as_str();
    let (spelling, optional) = match spelling.strip_suffix('?') {
        Some(inner) => (inner.trim_end(), true),
        None => (spelling, false),
    };

    let inner = special_of(spelling).map_or_else(
        || {
            let impls = meta
                .and_then(|meta| meta.impls.as_ref())
                .map(|impls| {
                    impls
                        .0
                        .iter()
                        .map(|name| {
                            if SELF_BINARY_TRAITS.contains(&name.as_str()) {
                                TraitBound::with_self(name)
                            } else {
                                TraitBound::plain(name)
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();

            TypeRef::Declared(DeclaredType {
                path: spelling.to_string(),
                minimal: spelling
                    .rsplit("::")
                    .next()
                    .unwrap_or(spelling)
                    .to_string(),
                is_copy: meta.is_some_and(|meta| meta.copy),
                impls,
            })
        },
        TypeRef::Special,
    );

    if optional {
        TypeRef::Option(Box::new(inner))
    } else {
        inner
    }
}

fn member_to_decl(meta: &MemberMeta) -> MemberDecl {
    let mut attrs = AttrBag::default();

    if let Some(equality) = &meta.equality {
        attrs.set("equality", AttrValue::Bool(true));
        if let Override::Explicit(equality) = equality {
            if let Some(comparer) = &equality.comparer {
                attrs.set("comparer", AttrValue::Path(path_to_string(comparer)));
            }
            if let Some(comparer) = &equality.equality_comparer {
                attrs.set(
                    "equality_comparer",
                    AttrValue::Path(path_to_string(comparer)),
                );
            }
        }
    }
    if meta.ignore {
        attrs.set("ignore", AttrValue::Bool(true));
    }
    if let Some(ordinal) = meta.ordinal {
        attrs.set("ordinal", AttrValue::Int(i128::from(ordinal)));
    }
    if let Some(skip_if) = &meta.skip_if {
        attrs.set("skip_if", AttrValue::Str(skip_if.clone()));
    }
    if let Some(maps_to) = &meta.maps_to {
        attrs.set("maps_to", AttrValue::Str(maps_to.clone()));
    }
    if meta.no_default {
        attrs.set("no_default", AttrValue::Bool(true));
    }

    MemberDecl {
        name: meta.ident.to_string(),
        ty: type_spec_to_ref(&meta.ty, Some(meta)),
        kind: MemberKind::Field,
        visibility: Visibility::Private,
        is_static: false,
        is_readonly: !meta.mutable,
        attrs,
        location: Location::default(),
    }
}

fn item_to_decl(meta: &ItemMeta) -> Result<MemberDecl, darling::Error> {
    let mut attrs = AttrBag::default();
    attrs.set("key", lit_to_value(&meta.key)?);
    attrs.set(
        "args",
        AttrValue::List(meta.args.clone().unwrap_or_default().0),
    );

    Ok(MemberDecl {
        name: meta.ident.to_string(),
        ty: TypeRef::SelfType,
        kind: MemberKind::Field,
        visibility: Visibility::Public,
        is_static: true,
        is_readonly: true,
        attrs,
        location: Location::default(),
    })
}

fn base_to_decl(meta: &BaseMeta) -> Result<BaseEnumDecl, darling::Error> {
    let mut items = Vec::with_capacity(meta.items.len());
    for item in &meta.items {
        items.push(BaseItemDecl {
            ident: item.ident.to_string(),
            key: lit_to_value(&item.key)?,
            args: item.args.clone().unwrap_or_default().0,
        });
    }

    let path = path_to_string(&meta.path);

    Ok(BaseEnumDecl {
        minimal: path.rsplit("::").next().unwrap_or(&path).to_string(),
        path,
        // The macro cannot see sibling sources; every base binds through
        // its public surface.
        origin: BaseOrigin::External,
        nullable: false,
        items,
        ctor_args: meta
            .ctor_args
            .iter()
            .map(|arg| BaseCtorArg {
                name: arg.name.clone(),
                ty: type_spec_to_ref(&arg.ty, None),
                maps_to: arg.maps_to.clone(),
            })
            .collect(),
    })
}

fn empty_decl(ident: &syn::Ident, generic_params: usize, is_partial: bool) -> TypeDecl {
    TypeDecl {
        path: ident.to_string(),
        ident: ident.to_string(),
        marker: None,
        is_partial,
        generic_params,
        is_abstract: false,
        has_layout_attr: false,
        has_custom_serde: false,
        has_custom_candid: false,
        has_custom_storable: false,
        members: Vec::new(),
        key_type: None,
        attrs: AttrBag::default(),
        base_enum: None,
        location: Location::default(),
    }
}

fn set_flag(attrs: &mut AttrBag, name: &str, value: bool) {
    if value {
        attrs.set(name, AttrValue::Bool(true));
    }
}

fn set_path(attrs: &mut AttrBag, name: &str, value: Option<&syn::Path>) {
    if let Some(path) = value {
        attrs.set(name, AttrValue::Path(path_to_string(path)));
    }
}

fn set_str(attrs: &mut AttrBag, name: &str, value: Option<&String>) {
    if let Some(value) = value {
        attrs.set(name, AttrValue::Str(value.clone()));
    }
}

pub fn smart_enum_decl(
    ident: &syn::Ident,
    generic_params: usize,
    is_partial: bool,
    args: &SmartEnumArgs,
) -> Result<TypeDecl, darling::Error> {
    let mut decl = empty_decl(ident, generic_params, is_partial);
    decl.marker = Some(TypeMarker::SmartEnum);
    decl.key_type = Some(type_spec_to_ref(&args.key.ty, None));
    decl.is_abstract = args.extensible;

    for item in &args.items {
        decl.members.push(item_to_decl(item)?);
    }
    for member in &args.members {
        decl.members.push(member_to_decl(member));
    }

    if let Some(base) = &args.base {
        decl.base_enum = Some(base_to_decl(base)?);
    }

    let attrs = &mut decl.attrs;
    set_str(attrs, "key_name", args.key.name.as_ref());
    set_flag(attrs, "validatable", args.validatable);
    set_flag(attrs, "extensible", args.extensible);
    set_str(attrs, "operators", args.operators.as_ref());
    set_path(attrs, "comparer", args.comparer.as_ref());
    set_str(attrs, "default_item", args.default_item.as_ref());
    set_path(attrs, "invalid_factory", args.invalid_factory.as_ref());
    set_path(attrs, "validate_with", args.validate_with.as_ref());
    set_flag(attrs, "skip_format", args.skip_format);
    set_flag(attrs, "skip_parse", args.skip_parse);
    set_flag(attrs, "skip_compare", args.skip_compare);
    set_flag(attrs, "span_parse", args.span_parse);
    set_flag(attrs, "serde", args.serde);
    set_flag(attrs, "candid", args.candid);
    set_flag(attrs, "storable", args.storable);

    if let Some(names) = &args.ctor_args {
        attrs.set(
            "ctor_args",
            AttrValue::List(names.0.iter().cloned().map(AttrValue::Str).collect()),
        );
    }

    if let Some(custom) = &args.custom {
        decl.has_custom_serde = custom.serde;
        decl.has_custom_candid = custom.candid;
        decl.has_custom_storable = custom.storable;
    }

    Ok(decl)
}

pub fn value_object_decl(
    ident: &syn::Ident,
    generic_params: usize,
    is_partial: bool,
    args: &ValueObjectArgs,
) -> TypeDecl {
    let mut decl = empty_decl(ident, generic_params, is_partial);
    decl.marker = Some(TypeMarker::ValueObject);
    decl.has_layout_attr = args.layout;

    for member in &args.members {
        decl.members.push(member_to_decl(member));
    }

    let attrs = &mut decl.attrs;
    set_str(attrs, "operators", args.operators.as_ref());
    set_str(attrs, "arithmetic", args.arithmetic.as_ref());
    set_path(attrs, "validate_with", args.validate_with.as_ref());
    set_flag(attrs, "null_propagation", args.null_propagation);
    set_flag(attrs, "skip_factory", args.skip_factory);
    set_flag(attrs, "skip_format", args.skip_format);
    set_flag(attrs, "skip_parse", args.skip_parse);
    set_flag(attrs, "skip_compare", args.skip_compare);
    set_flag(attrs, "span_parse", args.span_parse);
    set_flag(attrs, "serde", args.serde);
    set_flag(attrs, "candid", args.candid);
    set_flag(attrs, "storable", args.storable);

    if let Some(custom) = &args.custom {
        decl.has_custom_serde = custom.serde;
        decl.has_custom_candid = custom.candid;
        decl.has_custom_storable = custom.storable;
    }

    decl
}

pub fn union_decl(
    ident: &syn::Ident,
    generic_params: usize,
    is_partial: bool,
    args: &UnionArgs,
) -> TypeDecl {
    let mut decl = empty_decl(ident, generic_params, is_partial);
    decl.marker = Some(TypeMarker::Union);

    for variant in &args.variants {
        decl.members.push(member_to_decl(variant));
    }

    let attrs = &mut decl.attrs;
    set_flag(attrs, "skip_format", args.skip_format);
    set_flag(attrs, "serde", args.serde);
    set_flag(attrs, "candid", args.candid);
    set_flag(attrs, "storable", args.storable);

    decl
}
