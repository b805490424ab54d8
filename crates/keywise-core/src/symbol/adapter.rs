//! Query layer over the symbol graph.
//!
//! Pure reads: candidacy checks, declaration-shape validation and typed
//! extraction of attribute arguments. Malformed payloads surface as
//! [`SymbolError`]s tied to the declaration; the orchestration converts
//! them into diagnostics so sibling types keep generating.

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::symbol::{AttrValue, MemberDecl, SymbolError, TypeDecl, TypeMarker, TypeRef};

/// The key property name that is always rejected, case-insensitively.
const FORBIDDEN_KEY_NAME: &str = "item";

/// Default name of the generated key member.
pub const DEFAULT_KEY_NAME: &str = "key";

#[must_use]
pub const fn is_candidate(decl: &TypeDecl) -> bool {
    decl.marker.is_some()
}

#[must_use]
pub fn is_enum_candidate(decl: &TypeDecl) -> bool {
    matches!(decl.marker, Some(TypeMarker::SmartEnum)) && is_well_shaped(decl)
}

#[must_use]
pub fn is_value_object_candidate(decl: &TypeDecl) -> bool {
    matches!(decl.marker, Some(TypeMarker::ValueObject)) && is_well_shaped(decl)
}

#[must_use]
pub fn is_union_candidate(decl: &TypeDecl) -> bool {
    matches!(decl.marker, Some(TypeMarker::Union)) && is_well_shaped(decl)
}

fn is_well_shaped(decl: &TypeDecl) -> bool {
    decl.is_partial && decl.generic_params == 0
}

/// Declaration-shape violations that disqualify the type outright.
#[must_use]
pub fn shape_violations(decl: &TypeDecl) -> Vec<Diagnostic> {
    let mut violations = Vec::new();

    if !decl.is_partial {
        violations.push(Diagnostic::error(
            DiagnosticCode::NotPartial,
            format!(
                "`{}` must leave its body empty; members are declared in the marker attribute",
                decl.path
            ),
            decl.location.clone(),
        ));
    }

    if decl.generic_params > 0 {
        violations.push(Diagnostic::error(
            DiagnosticCode::GenericNotSupported,
            format!("`{}` must not be generic", decl.path),
            decl.location.clone(),
        ));
    }

    violations
}

/// The declared key type of a smart enum.
pub fn enum_key_type(decl: &TypeDecl) -> Result<TypeRef, SymbolError> {
    decl.key_type
        .clone()
        .ok_or_else(|| SymbolError::MissingArgument {
            type_path: decl.path.clone(),
            name: "key".to_string(),
        })
}

/// The configured key property name, defaulting to [`DEFAULT_KEY_NAME`].
pub fn key_property_name(decl: &TypeDecl) -> Result<String, SymbolError> {
    let name = match decl.attrs.str("key_name") {
        Some(name) => name.to_string(),
        None => return Ok(DEFAULT_KEY_NAME.to_string()),
    };

    if name.eq_ignore_ascii_case(FORBIDDEN_KEY_NAME) {
        return Err(SymbolError::ReservedKeyName {
            type_path: decl.path.clone(),
            name,
        });
    }

    Ok(name)
}

/// A string-valued argument that must be a string when present.
pub fn opt_str(decl: &TypeDecl, name: &str) -> Result<Option<String>, SymbolError> {
    match decl.attrs.get(name) {
        None => Ok(None),
        Some(AttrValue::Str(value)) => Ok(Some(value.clone())),
        Some(other) => Err(malformed(decl, name, format!("expected string, got {other:?}"))),
    }
}

/// A path-valued argument (comparer accessors, validation hooks).
pub fn opt_path(decl: &TypeDecl, name: &str) -> Result<Option<String>, SymbolError> {
    match decl.attrs.get(name) {
        None => Ok(None),
        Some(AttrValue::Path(value) | AttrValue::Str(value)) => Ok(Some(value.clone())),
        Some(other) => Err(malformed(decl, name, format!("expected path, got {other:?}"))),
    }
}

/// The ordered constructor-argument name list, when declared.
pub fn ctor_arg_names(decl: &TypeDecl) -> Result<Option<Vec<String>>, SymbolError> {
    let Some(value) = decl.attrs.get("ctor_args") else {
        return Ok(None);
    };

    let AttrValue::List(entries) = value else {
        return Err(malformed(
            decl,
            "ctor_args",
            format!("expected list of names, got {value:?}"),
        ));
    };

    let mut names = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            AttrValue::Str(name) => names.push(name.clone()),
            other => {
                return Err(malformed(
                    decl,
                    "ctor_args",
                    format!("expected name entry, got {other:?}"),
                ));
            }
        }
    }

    Ok(Some(names))
}

// Per-member attribute queries.

#[must_use]
pub fn member_is_ignored(member: &MemberDecl) -> bool {
    member.attrs.flag("ignore")
}

#[must_use]
pub fn member_explicit_equality(member: &MemberDecl) -> bool {
    member.attrs.flag("equality")
        || member.attrs.get("comparer").is_some()
        || member.attrs.get("equality_comparer").is_some()
}

#[must_use]
pub fn member_comparer(member: &MemberDecl) -> Option<String> {
    match member.attrs.get("comparer") {
        Some(AttrValue::Path(path) | AttrValue::Str(path)) => Some(path.clone()),
        _ => None,
    }
}

#[must_use]
pub fn member_equality_comparer(member: &MemberDecl) -> Option<String> {
    match member.attrs.get("equality_comparer") {
        Some(AttrValue::Path(path) | AttrValue::Str(path)) => Some(path.clone()),
        _ => None,
    }
}

#[must_use]
pub fn member_maps_to(member: &MemberDecl) -> Option<String> {
    match member.attrs.get("maps_to") {
        Some(AttrValue::Str(name)) => Some(name.clone()),
        _ => None,
    }
}

/// The explicit serialization ordinal of a member, bounds-checked.
pub fn member_ordinal(decl: &TypeDecl, member: &MemberDecl) -> Result<Option<u32>, SymbolError> {
    match member.attrs.get("ordinal") {
        None => Ok(None),
        Some(AttrValue::Int(value)) => {
            u32::try_from(*value).map(Some).map_err(|_| {
                malformed(decl, "ordinal", format!("`{value}` is out of range for u32"))
            })
        }
        Some(other) => Err(malformed(
            decl,
            "ordinal",
            format!("expected integer, got {other:?}"),
        )),
    }
}

fn malformed(decl: &TypeDecl, name: &str, detail: String) -> SymbolError {
    SymbolError::MalformedArgument {
        type_path: decl.path.clone(),
        name: name.to_string(),
        detail,
    }
}

///
/// TESTS
///
