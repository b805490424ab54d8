//! Declarative symbol graph.
//!
//! The core never talks to a compiler frontend directly; hosts lower their
//! view of a candidate declaration into this read-only model. The batch
//! pipeline consumes a whole [`Compilation`], the derive front end lowers a
//! single attribute payload into one [`TypeDecl`].

pub mod adapter;

use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Location
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

///
/// SpecialType
///
/// The well-known shapes whose typed-member states are interned
/// process-wide.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum SpecialType {
    Bool,
    Char,
    Duration,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    I128,
    Text,
    Timestamp,
    U8,
    U16,
    U32,
    U64,
    U128,
}

///
/// TraitBound
///
/// One entry in a declared type's implemented-trait list, with generic
/// arguments resolved against the declaring type. Capability detection
/// matches these structurally; it never consults an allow-list of known
/// type names.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TraitBound {
    pub name: String,
    pub args: Vec<BoundArg>,
}

impl TraitBound {
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_self(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: vec![BoundArg::SelfTy],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BoundArg {
    /// The generic argument is the declaring type itself.
    SelfTy,
    Named(String),
}

///
/// DeclaredType
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DeclaredType {
    /// Fully-qualified path, leading `::` included for external crates.
    pub path: String,
    /// Minimally-qualified spelling used in messages.
    pub minimal: String,
    /// Whether the type is a plain copyable value.
    pub is_copy: bool,
    /// Implemented traits, as declared by the host.
    pub impls: Vec<TraitBound>,
}

///
/// TypeRef
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TypeRef {
    Special(SpecialType),
    Option(Box<TypeRef>),
    Declared(DeclaredType),
    /// The declaring type itself; the type of declared enum items.
    SelfType,
    /// An unresolved or error type. Carries no capabilities and must never
    /// make state construction panic.
    Error,
}

impl TypeRef {
    #[must_use]
    pub const fn is_option(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    #[must_use]
    pub const fn is_self(&self) -> bool {
        matches!(self, Self::SelfType)
    }
}

///
/// AttrValue
///
/// A typed attribute argument. Expressions that are not plain literals are
/// retained as canonical token text so attribute payloads stay equatable
/// and hashable.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AttrValue {
    Bool(bool),
    Int(i128),
    Str(String),
    Path(String),
    Expr(String),
    List(Vec<AttrValue>),
}

///
/// AttrBag
///
/// Named arguments of one marker attribute, ordered for determinism.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub struct AttrBag {
    pub values: BTreeMap<String, AttrValue>,
}

impl AttrBag {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        self.values.insert(name.into(), value);
    }

    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(AttrValue::Bool(true)))
    }

    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(AttrValue::Str(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}

///
/// MemberKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MemberKind {
    Field,
    Property,
}

///
/// Visibility
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Visibility {
    Public,
    Crate,
    #[default]
    Private,
}

///
/// MemberDecl
///
/// One field or property of a candidate declaration. Enum items surface as
/// static members of the declaring type; everything else is an instance
/// member.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeRef,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub attrs: AttrBag,
    pub location: Location,
}

impl MemberDecl {
    /// True when this static member is shaped like a declared enum item.
    #[must_use]
    pub const fn is_item_shaped(&self) -> bool {
        self.is_static && self.ty.is_self()
    }
}

///
/// TypeMarker
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TypeMarker {
    SmartEnum,
    Union,
    ValueObject,
}

///
/// BaseOrigin
///
/// Whether a base enum lives in the current compilation (the generator can
/// statically bind to its sibling output) or in an external one (only the
/// metadata surface is available).
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BaseOrigin {
    SameCompilation,
    External,
}

///
/// BaseItemDecl
///
/// An item of an external base enum, described from attribute metadata
/// because its source is unavailable.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BaseItemDecl {
    pub ident: String,
    pub key: AttrValue,
    pub args: Vec<AttrValue>,
}

///
/// BaseCtorArg
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BaseCtorArg {
    pub name: String,
    pub ty: TypeRef,
    /// Accessor on the base type when it differs from `name`.
    pub maps_to: Option<String>,
}

///
/// BaseEnumDecl
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BaseEnumDecl {
    pub path: String,
    pub minimal: String,
    pub origin: BaseOrigin,
    pub nullable: bool,
    pub items: Vec<BaseItemDecl>,
    pub ctor_args: Vec<BaseCtorArg>,
}

///
/// TypeDecl
///
/// The host's read-only view of one candidate declaration.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TypeDecl {
    /// Fully-qualified path of the declaration.
    pub path: String,
    /// Simple name.
    pub ident: String,
    pub marker: Option<TypeMarker>,
    /// Whether the declaration left its body open for generation.
    pub is_partial: bool,
    /// Number of generic parameters; candidates must have none.
    pub generic_params: usize,
    pub is_abstract: bool,
    pub has_layout_attr: bool,
    pub has_custom_serde: bool,
    pub has_custom_candid: bool,
    pub has_custom_storable: bool,
    pub members: Vec<MemberDecl>,
    /// Declared key type; required for smart enums, absent elsewhere.
    pub key_type: Option<TypeRef>,
    /// Marker attribute payload (settings, ctor names).
    pub attrs: AttrBag,
    pub base_enum: Option<BaseEnumDecl>,
    pub location: Location,
}

impl TypeDecl {
    pub fn instance_members(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members.iter().filter(|member| !member.is_static)
    }

    pub fn static_members(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members.iter().filter(|member| member.is_static)
    }
}

///
/// Compilation
///
/// The batch input: every candidate declaration of one generation pass, in
/// source order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Compilation {
    pub types: Vec<TypeDecl>,
}

impl Compilation {
    #[must_use]
    pub fn new(types: Vec<TypeDecl>) -> Self {
        Self { types }
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.path == path)
    }
}

///
/// SymbolError
///
/// Structured failure raised while reading a declaration's attribute
/// surface. Callers convert these into diagnostics; one malformed type
/// must never block generation for unrelated types.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SymbolError {
    #[error("missing required attribute argument `{name}` on `{type_path}`")]
    MissingArgument { type_path: String, name: String },

    #[error("attribute argument `{name}` on `{type_path}` is malformed: {detail}")]
    MalformedArgument {
        type_path: String,
        name: String,
        detail: String,
    },

    #[error(
        "constructor argument names on `{type_path}` expect {expected} entries, found {found}"
    )]
    CtorArityMismatch {
        type_path: String,
        expected: usize,
        found: usize,
    },

    #[error("key property name `{name}` on `{type_path}` is reserved")]
    ReservedKeyName { type_path: String, name: String },
}
