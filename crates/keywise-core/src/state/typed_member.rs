use crate::prelude::*;
use crate::symbol::{BoundArg, DeclaredType, SpecialType, TraitBound};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, RwLock};

///
/// Capabilities
///
/// Structural facts about a member's type, derived once from its declared
/// trait-impl list. Never guessed, never defaulted.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Capabilities {
    pub formattable: bool,
    pub comparable: bool,
    pub parsable: bool,
    pub comparison_ops: bool,
    pub addition: bool,
    pub subtraction: bool,
    pub multiplication: bool,
    pub division: bool,
}

impl Capabilities {
    #[must_use]
    pub const fn any_arithmetic(&self) -> bool {
        self.addition || self.subtraction || self.multiplication || self.division
    }

    #[must_use]
    pub const fn all_arithmetic(&self) -> bool {
        self.addition && self.subtraction && self.multiplication && self.division
    }
}

///
/// TypedMemberState
///
/// Canonical description of one type usage. Two instances are equal iff
/// the option-qualified path, special tag, copyability and all capability
/// flags match; `minimal` is presentation-only and excluded.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypedMemberState {
    /// Fully-qualified path without the option wrapper.
    pub path: String,
    /// Fully-qualified path with `Option<...>` applied when optional.
    pub path_with_option: String,
    /// Minimally-qualified spelling for messages.
    pub minimal: String,
    pub special: Option<SpecialType>,
    pub is_copy: bool,
    pub is_option: bool,
    pub capabilities: Capabilities,
}

impl PartialEq for TypedMemberState {
    fn eq(&self, other: &Self) -> bool {
        self.path_with_option == other.path_with_option
            && self.special == other.special
            && self.is_copy == other.is_copy
            && self.is_option == other.is_option
            && self.capabilities == other.capabilities
    }
}

impl Eq for TypedMemberState {}

impl Hash for TypedMemberState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path_with_option.hash(state);
        self.special.hash(state);
        self.is_copy.hash(state);
        self.is_option.hash(state);
        self.capabilities.hash(state);
    }
}

impl TypedMemberState {
    /// Tokens of the member type as it appears in generated code.
    #[must_use]
    pub fn type_tokens(&self) -> TokenStream {
        self.path_with_option
            .parse()
            .expect("typed-member path must be valid tokens")
    }

    /// Tokens of the unwrapped (non-optional) type.
    #[must_use]
    pub fn inner_type_tokens(&self) -> TokenStream {
        self.path
            .parse()
            .expect("typed-member path must be valid tokens")
    }
}

impl SpecialType {
    #[must_use]
    #[remain::check]
    pub const fn rust_path(self) -> &'static str {
        #[remain::sorted]
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Duration => "::core::time::Duration",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Text => "::std::string::String",
            Self::Timestamp => "::std::time::SystemTime",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
        }
    }

    #[must_use]
    pub const fn minimal_name(self) -> &'static str {
        match self {
            Self::Text => "String",
            Self::Duration => "Duration",
            Self::Timestamp => "SystemTime",
            other => other.rust_path(),
        }
    }

    #[must_use]
    pub const fn is_copy(self) -> bool {
        !matches!(self, Self::Text)
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::U128
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::I128
        )
    }

    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Bool | Self::Char => Capabilities {
                formattable: true,
                comparable: true,
                parsable: true,
                comparison_ops: true,
                addition: false,
                subtraction: false,
                multiplication: false,
                division: false,
            },
            Self::Text => Capabilities {
                formattable: true,
                comparable: true,
                parsable: true,
                comparison_ops: true,
                addition: false,
                subtraction: false,
                multiplication: false,
                division: false,
            },
            // f32/f64 order partially: `Ord` is absent, `PartialOrd` is not.
            Self::F32 | Self::F64 => Capabilities {
                formattable: true,
                comparable: false,
                parsable: true,
                comparison_ops: true,
                addition: true,
                subtraction: true,
                multiplication: true,
                division: true,
            },
            // Duration multiplies by scalars only; `Mul<Self>` is absent.
            Self::Duration => Capabilities {
                formattable: false,
                comparable: true,
                parsable: false,
                comparison_ops: true,
                addition: true,
                subtraction: true,
                multiplication: false,
                division: false,
            },
            Self::Timestamp => Capabilities {
                formattable: false,
                comparable: true,
                parsable: false,
                comparison_ops: true,
                addition: false,
                subtraction: false,
                multiplication: false,
                division: false,
            },
            _ => Capabilities {
                formattable: true,
                comparable: true,
                parsable: true,
                comparison_ops: true,
                addition: true,
                subtraction: true,
                multiplication: true,
                division: true,
            },
        }
    }
}

///
/// SPECIAL_STATES
///
/// Process-wide interning of the well-known shapes, two variants each
/// (plain and optional). Insert-if-absent: a lost race recomputes an
/// identical value and only one instance is retained.
///

static SPECIAL_STATES: LazyLock<RwLock<HashMap<(SpecialType, bool), Arc<TypedMemberState>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn interned(special: SpecialType, optional: bool) -> Arc<TypedMemberState> {
    {
        let cache = SPECIAL_STATES
            .read()
            .expect("typed-member cache RwLock poisoned while reading");
        if let Some(state) = cache.get(&(special, optional)) {
            return Arc::clone(state);
        }
    }

    let mut cache = SPECIAL_STATES
        .write()
        .expect("typed-member cache RwLock poisoned while writing");

    Arc::clone(
        cache
            .entry((special, optional))
            .or_insert_with(|| Arc::new(build_special(special, optional))),
    )
}

fn build_special(special: SpecialType, optional: bool) -> TypedMemberState {
    let path = special.rust_path().to_string();
    let capabilities = if optional {
        option_capabilities(special.capabilities())
    } else {
        special.capabilities()
    };

    TypedMemberState {
        path_with_option: wrap_option(&path, optional),
        minimal: special.minimal_name().to_string(),
        path,
        special: Some(special),
        is_copy: special.is_copy(),
        is_option: optional,
        capabilities,
    }
}

/// `Option<T>` keeps order-related capabilities and loses the rest:
/// it neither formats, parses nor supports the arithmetic families.
const fn option_capabilities(inner: Capabilities) -> Capabilities {
    Capabilities {
        formattable: false,
        comparable: inner.comparable,
        parsable: false,
        comparison_ops: inner.comparison_ops,
        addition: false,
        subtraction: false,
        multiplication: false,
        division: false,
    }
}

fn wrap_option(path: &str, optional: bool) -> String {
    if optional {
        format!("::core::option::Option<{path}>")
    } else {
        path.to_string()
    }
}

/// Resolve a type reference into its canonical typed-member state.
///
/// Referentially stable for the well-known shapes (the same `Arc` is
/// returned for repeat calls); value-stable for everything else.
#[must_use]
pub fn resolve(ty: &TypeRef) -> Arc<TypedMemberState> {
    match ty {
        TypeRef::Special(special) => interned(*special, false),
        TypeRef::Option(inner) => match inner.as_ref() {
            TypeRef::Special(special) => interned(*special, true),
            other => Arc::new(build_optional(other)),
        },
        TypeRef::Declared(declared) => Arc::new(build_declared(declared, false)),
        TypeRef::SelfType => Arc::new(TypedMemberState {
            path: "Self".to_string(),
            path_with_option: "Self".to_string(),
            minimal: "Self".to_string(),
            special: None,
            is_copy: false,
            is_option: false,
            capabilities: Capabilities::default(),
        }),
        TypeRef::Error => Arc::new(error_state()),
    }
}

fn build_optional(inner: &TypeRef) -> TypedMemberState {
    match inner {
        TypeRef::Declared(declared) => build_declared(declared, true),
        // Nested options and error shapes degrade to the error state
        // rather than panicking.
        _ => error_state(),
    }
}

fn build_declared(declared: &DeclaredType, optional: bool) -> TypedMemberState {
    let capabilities = scan_capabilities(&declared.impls);
    let capabilities = if optional {
        option_capabilities(capabilities)
    } else {
        capabilities
    };

    TypedMemberState {
        path_with_option: wrap_option(&declared.path, optional),
        path: declared.path.clone(),
        minimal: declared.minimal.clone(),
        special: None,
        is_copy: declared.is_copy,
        is_option: optional,
        capabilities,
    }
}

fn error_state() -> TypedMemberState {
    TypedMemberState {
        path: "::core::convert::Infallible".to_string(),
        path_with_option: "::core::convert::Infallible".to_string(),
        minimal: "<error>".to_string(),
        special: None,
        is_copy: false,
        is_option: false,
        capabilities: Capabilities::default(),
    }
}

/// Structural capability scan over a declared trait-impl list.
///
/// A binary-operator family counts only when its right-hand side is bound
/// to the type itself (or defaulted, which amounts to the same).
fn scan_capabilities(impls: &[TraitBound]) -> Capabilities {
    let has_plain = |name: &str| {
        impls
            .iter()
            .any(|bound| bound.name == name && bound.args.is_empty())
    };
    let has_self_binary = |name: &str| {
        impls.iter().any(|bound| {
            bound.name == name
                && (bound.args.is_empty() || bound.args == [BoundArg::SelfTy])
        })
    };

    Capabilities {
        formattable: has_plain("Display"),
        comparable: has_plain("Ord"),
        parsable: has_plain("FromStr"),
        comparison_ops: has_self_binary("PartialOrd"),
        addition: has_self_binary("Add"),
        subtraction: has_self_binary("Sub"),
        multiplication: has_self_binary("Mul"),
        division: has_self_binary("Div"),
    }
}

///
/// TESTS
///
