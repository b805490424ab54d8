//! Generator-facing adapter states.
//!
//! Each fragment consumes a minimal, independently hashable view of the
//! entity snapshot it renders. Every field here is derived from entity
//! state fields the fragment actually reads, so adapter equality is never
//! finer than entity equality, and fragment regeneration is decoupled from
//! unrelated entity changes.
//!
//! The `from_*` constructors double as the selection predicates: returning
//! `None` means the fragment does not run for that snapshot.

use crate::prelude::*;
use crate::state::{
    Capabilities, EnumEntityState, MemberState, OperatorsMode, SkipCondition, TypedMemberState,
    UnionEntityState, ValueObjectEntityState,
};
use crate::symbol::SpecialType;
use proc_macro2::Ident;

///
/// TypeInfo
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TypeInfo {
    pub ident: String,
    pub is_copy: bool,
}

impl TypeInfo {
    fn new(ident: &str, is_copy: bool) -> Self {
        Self {
            ident: ident.to_string(),
            is_copy,
        }
    }

    #[must_use]
    pub fn ident_tokens(&self) -> Ident {
        format_ident!("{}", self.ident)
    }
}

///
/// MemberView
///
/// One member as a fragment sees it: the generated field ident, the typed
/// member state, and an explicit comparer when one was configured.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MemberView {
    pub field: String,
    pub ty: Arc<TypedMemberState>,
    pub comparer: Option<String>,
}

impl MemberView {
    #[must_use]
    pub fn from_member(member: &MemberState) -> Self {
        Self {
            field: member.argument_name.clone(),
            ty: Arc::clone(&member.ty),
            comparer: member
                .equality_comparer
                .clone()
                .or_else(|| member.comparer.clone()),
        }
    }

    fn enum_key(state: &EnumEntityState) -> Self {
        Self {
            field: state.key.argument_name.clone(),
            ty: Arc::clone(&state.key.ty),
            comparer: state.settings.key_comparer.clone(),
        }
    }

    #[must_use]
    pub fn field_ident(&self) -> Ident {
        format_ident!("{}", self.field)
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self.ty.special, Some(SpecialType::F32 | SpecialType::F64))
    }
}

///
/// EqualityFragmentState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EqualityFragmentState {
    pub ty: TypeInfo,
    pub members: Vec<MemberView>,
    /// Zero members: equality degenerates to type identity.
    pub degenerate: bool,
    /// Emit `Eq` and `Hash` in addition to `PartialEq`.
    pub total: bool,
}

impl EqualityFragmentState {
    #[must_use]
    pub fn from_enum(state: &EnumEntityState) -> Option<Self> {
        let key = MemberView::enum_key(state);
        let total = !key.is_float();

        Some(Self {
            ty: TypeInfo::new(&state.ident, state.is_copy),
            members: vec![key],
            degenerate: false,
            total,
        })
    }

    #[must_use]
    pub fn from_value_object(state: &ValueObjectEntityState) -> Option<Self> {
        let members: Vec<MemberView> = state
            .equality_members
            .iter()
            .map(MemberView::from_member)
            .collect();
        let total = members.iter().all(|member| !member.is_float());

        Some(Self {
            ty: TypeInfo::new(&state.ident, state.is_copy),
            degenerate: members.is_empty(),
            members,
            total,
        })
    }
}

///
/// ComparisonFragmentState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ComparisonFragmentState {
    pub ty: TypeInfo,
    pub key: MemberView,
    pub mode: OperatorsMode,
    /// A total order is available: the key is `Ord` or a comparer is
    /// configured. Otherwise only `PartialOrd` is emitted.
    pub total: bool,
}

impl ComparisonFragmentState {
    fn select(
        ty: TypeInfo,
        key: MemberView,
        mode: OperatorsMode,
        skip: bool,
    ) -> Option<Self> {
        if skip || !mode.is_enabled() {
            return None;
        }

        let has_comparer = key.comparer.is_some();
        if !has_comparer && !key.ty.capabilities.comparison_ops && !key.ty.capabilities.comparable
        {
            return None;
        }

        let total = has_comparer || key.ty.capabilities.comparable;

        Some(Self {
            ty,
            key,
            mode,
            total,
        })
    }

    #[must_use]
    pub fn from_enum(state: &EnumEntityState) -> Option<Self> {
        Self::select(
            TypeInfo::new(&state.ident, state.is_copy),
            MemberView::enum_key(state),
            state.settings.comparison_operators,
            state.settings.skip_compare,
        )
    }

    #[must_use]
    pub fn from_value_object(state: &ValueObjectEntityState) -> Option<Self> {
        let key = state.key_member()?;

        Self::select(
            TypeInfo::new(&state.ident, state.is_copy),
            MemberView::from_member(key),
            state.settings.comparison_operators,
            state.settings.skip_compare,
        )
    }
}

///
/// FormatFragmentState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FormatStyle {
    /// Delegate to the key member.
    Keyed(MemberView),
    /// `{ member = value, ... }` rendering for complex value objects.
    Members(Vec<MemberView>),
    /// The bare type name; used for marker value objects.
    Bare,
    /// Match over union variants, delegating per payload.
    Variants(Vec<String>),
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FormatFragmentState {
    pub ty: TypeInfo,
    pub style: FormatStyle,
}

impl FormatFragmentState {
    #[must_use]
    pub fn from_enum(state: &EnumEntityState) -> Option<Self> {
        if state.settings.skip_format || !state.key.ty.capabilities.formattable {
            return None;
        }

        Some(Self {
            ty: TypeInfo::new(&state.ident, state.is_copy),
            style: FormatStyle::Keyed(MemberView::enum_key(state)),
        })
    }

    #[must_use]
    pub fn from_value_object(state: &ValueObjectEntityState) -> Option<Self> {
        if state.settings.skip_format {
            return None;
        }

        let ty = TypeInfo::new(&state.ident, state.is_copy);

        if let Some(key) = state.key_member() {
            if !key.ty.capabilities.formattable {
                return None;
            }
            return Some(Self {
                ty,
                style: FormatStyle::Keyed(MemberView::from_member(key)),
            });
        }

        if state.is_marker() {
            return Some(Self {
                ty,
                style: FormatStyle::Bare,
            });
        }

        let members: Vec<MemberView> = state
            .assignable_members
            .iter()
            .map(MemberView::from_member)
            .collect();
        if members.iter().any(|member| !member.ty.capabilities.formattable) {
            return None;
        }

        Some(Self {
            ty,
            style: FormatStyle::Members(members),
        })
    }

    #[must_use]
    pub fn from_union(state: &UnionEntityState) -> Option<Self> {
        if state.settings.skip_format {
            return None;
        }
        if state
            .variants
            .iter()
            .any(|variant| !variant.ty.capabilities.formattable)
        {
            return None;
        }

        Some(Self {
            ty: TypeInfo::new(&state.ident, state.is_copy),
            style: FormatStyle::Variants(
                state
                    .variants
                    .iter()
                    .map(|variant| variant.ident.clone())
                    .collect(),
            ),
        })
    }
}

///
/// ParseFragmentState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ParseFragmentState {
    pub ty: TypeInfo,
    pub key_ty: Arc<TypedMemberState>,
    /// Span parsing was requested on top of string parsing.
    pub span_requested: bool,
}

impl ParseFragmentState {
    #[must_use]
    pub fn from_enum(state: &EnumEntityState) -> Option<Self> {
        Self::select(
            TypeInfo::new(&state.ident, state.is_copy),
            &state.key.ty,
            state.settings.skip_parse,
            state.settings.span_parse,
        )
    }

    #[must_use]
    pub fn from_value_object(state: &ValueObjectEntityState) -> Option<Self> {
        let key = state.key_member()?;

        Self::select(
            TypeInfo::new(&state.ident, state.is_copy),
            &key.ty,
            state.settings.skip_parse,
            state.settings.span_parse,
        )
    }

    fn select(
        ty: TypeInfo,
        key_ty: &Arc<TypedMemberState>,
        skip: bool,
        span_requested: bool,
    ) -> Option<Self> {
        if skip || !key_ty.capabilities.parsable {
            return None;
        }

        Some(Self {
            ty,
            key_ty: Arc::clone(key_ty),
            span_requested,
        })
    }
}

///
/// ArithmeticFragmentState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ArithmeticFragmentState {
    pub ty: TypeInfo,
    pub key: MemberView,
    pub mode: OperatorsMode,
    pub capabilities: Capabilities,
}

impl ArithmeticFragmentState {
    #[must_use]
    pub fn from_value_object(state: &ValueObjectEntityState) -> Option<Self> {
        let mode = state.settings.arithmetic_operators;
        let key = state.key_member()?;

        if !mode.is_enabled() || !key.ty.capabilities.any_arithmetic() {
            return None;
        }

        Some(Self {
            ty: TypeInfo::new(&state.ident, state.is_copy),
            key: MemberView::from_member(key),
            mode,
            capabilities: key.ty.capabilities,
        })
    }
}

///
/// SerializerFragmentState
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Framework {
    Serde,
    Candid,
    Storable,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ComplexMemberView {
    pub field: String,
    pub ordinal: Option<u32>,
    pub skip: Option<SkipCondition>,
    pub ty: Arc<TypedMemberState>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SerializerShape {
    /// Delegate through the key member and the key factory.
    Keyed(MemberView),
    /// Member-wise handling for complex value objects.
    Complex(Vec<ComplexMemberView>),
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SerializerFragmentState {
    pub ty: TypeInfo,
    pub framework: Framework,
    pub shape: SerializerShape,
}

impl SerializerFragmentState {
    #[must_use]
    pub fn from_enum(state: &EnumEntityState, framework: Framework) -> Option<Self> {
        let (requested, has_custom) = match framework {
            Framework::Serde => (state.settings.frameworks.serde, state.has_custom_serde),
            Framework::Candid => (state.settings.frameworks.candid, state.has_custom_candid),
            Framework::Storable => {
                (state.settings.frameworks.storable, state.has_custom_storable)
            }
        };
        if !requested || has_custom {
            return None;
        }

        Some(Self {
            ty: TypeInfo::new(&state.ident, state.is_copy),
            framework,
            shape: SerializerShape::Keyed(MemberView::enum_key(state)),
        })
    }

    #[must_use]
    pub fn from_value_object(
        state: &ValueObjectEntityState,
        framework: Framework,
    ) -> Option<Self> {
        let (requested, has_custom) = match framework {
            Framework::Serde => (state.settings.frameworks.serde, state.has_custom_serde),
            Framework::Candid => (state.settings.frameworks.candid, state.has_custom_candid),
            Framework::Storable => {
                (state.settings.frameworks.storable, state.has_custom_storable)
            }
        };
        if !requested || has_custom {
            return None;
        }

        let ty = TypeInfo::new(&state.ident, state.is_copy);

        if let Some(key) = state.key_member() {
            return Some(Self {
                ty,
                framework,
                shape: SerializerShape::Keyed(MemberView::from_member(key)),
            });
        }

        // Complex shapes: candid glue needs a key member and does not run.
        if matches!(framework, Framework::Candid) {
            return None;
        }

        let mut members: Vec<(usize, ComplexMemberView)> = state
            .assignable_members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                (
                    index,
                    ComplexMemberView {
                        field: member.argument_name.clone(),
                        ordinal: member.ordinal,
                        skip: member.skip_condition,
                        ty: Arc::clone(&member.ty),
                    },
                )
            })
            .collect();

        // Explicit ordinals first, declaration order as the tie break.
        members.sort_by_key(|(index, member)| (member.ordinal.unwrap_or(u32::MAX), *index));

        Some(Self {
            ty,
            framework,
            shape: SerializerShape::Complex(
                members.into_iter().map(|(_, member)| member).collect(),
            ),
        })
    }
}
