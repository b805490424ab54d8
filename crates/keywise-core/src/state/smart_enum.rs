use crate::prelude::*;
use crate::state::{EnumSettings, MemberState, TypedMemberState, resolve};
use crate::symbol::{BaseEnumDecl, adapter};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

///
/// EnumItemState
///
/// One declared item, retained verbatim in declaration order. Key
/// uniqueness (including inherited items) is enforced at the generated
/// lookup's construction, not here.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct EnumItemState {
    pub ident: String,
    pub key: AttrValue,
    pub args: Vec<AttrValue>,
}

///
/// BaseCtorArgState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BaseCtorArgState {
    pub name: String,
    /// Accessor on the base type; differs from `name` under aliasing.
    pub accessor: String,
    pub ty: Arc<TypedMemberState>,
}

///
/// BaseEnumState
///
/// The lightweight snapshot of a base enum: its visible surface only.
/// A same-compilation base is described from the sibling's full state so
/// the generator can bind statically; an external base is described from
/// attribute metadata alone.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BaseEnumState {
    pub path: String,
    pub minimal: String,
    pub nullable: bool,
    pub origin: BaseOrigin,
    pub items: Vec<EnumItemState>,
    pub ctor_args: Vec<BaseCtorArgState>,
}

impl BaseEnumState {
    fn from_decl(decl: &BaseEnumDecl) -> Self {
        Self {
            path: decl.path.clone(),
            minimal: decl.minimal.clone(),
            nullable: decl.nullable,
            origin: decl.origin,
            items: decl
                .items
                .iter()
                .map(|item| EnumItemState {
                    ident: item.ident.clone(),
                    key: item.key.clone(),
                    args: item.args.clone(),
                })
                .collect(),
            ctor_args: decl
                .ctor_args
                .iter()
                .map(|arg| BaseCtorArgState {
                    name: arg.name.clone(),
                    accessor: arg.maps_to.clone().unwrap_or_else(|| arg.name.clone()),
                    ty: resolve(&arg.ty),
                })
                .collect(),
        }
    }
}

///
/// EnumEntityState
///
/// The immutable snapshot of one smart-enum declaration. Constructed per
/// declaration during discovery; linking a base produces a *new* snapshot,
/// it never mutates in place.
///

#[derive(Clone, Debug)]
pub struct EnumEntityState {
    pub path: String,
    pub ident: String,
    pub minimal: String,
    pub is_copy: bool,
    pub is_abstract: bool,
    pub has_layout_attr: bool,
    pub has_custom_serde: bool,
    pub has_custom_candid: bool,
    pub has_custom_storable: bool,
    /// Own items, declaration order, duplicates retained.
    pub items: Vec<EnumItemState>,
    pub key: MemberState,
    /// Assignable instance members, key excluded.
    pub assignable_members: Vec<MemberState>,
    pub derived_types: Vec<String>,
    pub settings: EnumSettings,
    pub base: Option<BaseEnumState>,
    /// Same-compilation base path awaiting linkage.
    pub pending_base: Option<String>,
    /// Excluded from equality and hashing; diagnostics only.
    pub location: Location,
}

impl PartialEq for EnumEntityState {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.ident == other.ident
            && self.minimal == other.minimal
            && self.is_copy == other.is_copy
            && self.is_abstract == other.is_abstract
            && self.has_layout_attr == other.has_layout_attr
            && self.has_custom_serde == other.has_custom_serde
            && self.has_custom_candid == other.has_custom_candid
            && self.has_custom_storable == other.has_custom_storable
            && self.items == other.items
            && self.key == other.key
            && self.assignable_members == other.assignable_members
            && self.derived_types == other.derived_types
            && self.settings == other.settings
            && self.base == other.base
            && self.pending_base == other.pending_base
    }
}

impl Eq for EnumEntityState {}

impl Hash for EnumEntityState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.ident.hash(state);
        self.minimal.hash(state);
        self.is_copy.hash(state);
        self.is_abstract.hash(state);
        self.has_layout_attr.hash(state);
        self.has_custom_serde.hash(state);
        self.has_custom_candid.hash(state);
        self.has_custom_storable.hash(state);
        self.items.hash(state);
        self.key.hash(state);
        self.assignable_members.hash(state);
        self.derived_types.hash(state);
        self.settings.hash(state);
        self.base.hash(state);
        self.pending_base.hash(state);
    }
}

impl EnumEntityState {
    /// Lower a declaration into its snapshot, accumulating every
    /// member-level violation instead of stopping at the first.
    pub fn build(decl: &TypeDecl) -> Result<(Self, Vec<Diagnostic>), SymbolError> {
        let mut diagnostics = Vec::new();

        let settings = EnumSettings::from_attrs(decl)?;
        let key_ty = resolve(&adapter::enum_key_type(decl)?);
        let key = MemberState::key(&settings.key_name, Arc::clone(&key_ty));

        let items = collect_items(decl, &mut diagnostics)?;
        let assignable_members = collect_assignable(decl, &settings, &mut diagnostics)?;

        check_ctor_args(decl, &assignable_members)?;
        for item in &items {
            if item.args.len() != assignable_members.len() {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::CtorArgsArityMismatch,
                    format!(
                        "item `{}` on `{}` supplies {} constructor arguments, expected {}",
                        item.ident,
                        decl.path,
                        item.args.len(),
                        assignable_members.len()
                    ),
                    decl.location.clone(),
                ));
            }
        }
        check_default_item(decl, &settings, &items, &mut diagnostics);
        check_validatable_defaults(decl, &settings, &assignable_members, &mut diagnostics);
        check_comparison_request(decl, &settings, &key, &mut diagnostics);

        if items.is_empty() && decl.base_enum.is_none() {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCode::NoItems,
                format!("`{}` declares no items", decl.path),
                decl.location.clone(),
            ));
        }

        let (base, pending_base) = match &decl.base_enum {
            None => (None, None),
            Some(base) if matches!(base.origin, BaseOrigin::External) => {
                (Some(BaseEnumState::from_decl(base)), None)
            }
            Some(base) => (None, Some(base.path.clone())),
        };

        if let Some(base) = &base
            && base.ctor_args.len() != assignable_members.len() + 1
        {
            return Err(SymbolError::CtorArityMismatch {
                type_path: decl.path.clone(),
                expected: assignable_members.len() + 1,
                found: base.ctor_args.len(),
            });
        }

        let is_copy =
            key.ty.is_copy && assignable_members.iter().all(|member| member.ty.is_copy);

        let state = Self {
            path: decl.path.clone(),
            ident: decl.ident.clone(),
            minimal: decl.ident.clone(),
            is_copy,
            is_abstract: decl.is_abstract,
            has_layout_attr: decl.has_layout_attr,
            has_custom_serde: decl.has_custom_serde,
            has_custom_candid: decl.has_custom_candid,
            has_custom_storable: decl.has_custom_storable,
            items,
            key,
            assignable_members,
            derived_types: Vec::new(),
            settings,
            base,
            pending_base,
            location: decl.location.clone(),
        };

        Ok((state, diagnostics))
    }

    /// All items visible on this enum: inherited base items first, own
    /// items after, declaration order preserved within each tier.
    #[must_use]
    pub fn all_items(&self) -> Vec<EnumItemState> {
        let mut all = self
            .base
            .as_ref()
            .map(|base| base.items.clone())
            .unwrap_or_default();
        all.extend(self.items.iter().cloned());

        all
    }

    #[must_use]
    pub const fn has_pending_base(&self) -> bool {
        self.pending_base.is_some()
    }

    /// Attach a same-compilation base, producing a new linked snapshot.
    /// The child is never mutated in place.
    pub fn resolve_base(&self, base: &Self) -> Result<Self, SymbolError> {
        let mut ctor_args = Vec::with_capacity(base.assignable_members.len() + 1);
        ctor_args.push(BaseCtorArgState {
            name: base.key.name.clone(),
            accessor: base.key.name.clone(),
            ty: Arc::clone(&base.key.ty),
        });
        for member in &base.assignable_members {
            ctor_args.push(BaseCtorArgState {
                name: member.name.clone(),
                accessor: member.name.clone(),
                ty: Arc::clone(&member.ty),
            });
        }

        if ctor_args.len() != self.assignable_members.len() + 1 {
            return Err(SymbolError::CtorArityMismatch {
                type_path: self.path.clone(),
                expected: self.assignable_members.len() + 1,
                found: ctor_args.len(),
            });
        }

        let mut linked = self.clone();
        linked.base = Some(BaseEnumState {
            path: base.path.clone(),
            minimal: base.minimal.clone(),
            nullable: false,
            origin: BaseOrigin::SameCompilation,
            items: base.all_items(),
            ctor_args,
        });
        linked.pending_base = None;

        Ok(linked)
    }

    /// Record the fully-qualified names of derived types, producing a new
    /// snapshot.
    #[must_use]
    pub fn with_derived(&self, derived_types: Vec<String>) -> Self {
        let mut next = self.clone();
        next.derived_types = derived_types;

        next
    }
}

fn collect_items(
    decl: &TypeDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<EnumItemState>, SymbolError> {
    let mut items = Vec::new();

    for member in decl.static_members() {
        if !member.is_item_shaped() {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCode::StaticMemberNotItem,
                format!(
                    "static member `{}` on `{}` is not of the enum's own type and is not counted as an item",
                    member.name, decl.path
                ),
                member.location.clone(),
            ));
            continue;
        }

        if !member.is_readonly {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::NonReadonlyMember,
                format!(
                    "item `{}` on `{}` must be readonly",
                    member.name, decl.path
                ),
                member.location.clone(),
            ));
            // Retained so every violation is reported in one pass.
        }

        let key = member
            .attrs
            .get("key")
            .cloned()
            .ok_or_else(|| SymbolError::MissingArgument {
                type_path: decl.path.clone(),
                name: format!("item `{}`: key", member.name),
            })?;

        let args = match member.attrs.get("args") {
            Some(AttrValue::List(args)) => args.clone(),
            Some(other) => {
                return Err(SymbolError::MalformedArgument {
                    type_path: decl.path.clone(),
                    name: format!("item `{}`: args", member.name),
                    detail: format!("expected list, got {other:?}"),
                });
            }
            None => Vec::new(),
        };

        items.push(EnumItemState {
            ident: member.name.clone(),
            key,
            args,
        });
    }

    Ok(items)
}

fn collect_assignable(
    decl: &TypeDecl,
    settings: &EnumSettings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<MemberState>, SymbolError> {
    let mut members = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for member in decl.instance_members() {
        if adapter::member_is_ignored(member) {
            continue;
        }

        if member.name == settings.key_name {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::KeyNameCollision,
                format!(
                    "member `{}` on `{}` collides with the key property name",
                    member.name, decl.path
                ),
                member.location.clone(),
            ));
            continue;
        }

        if !seen.insert(member.name.as_str()) {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::DuplicateMemberName,
                format!(
                    "member `{}` is declared more than once on `{}`",
                    member.name, decl.path
                ),
                member.location.clone(),
            ));
        }

        if !member.is_readonly {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::NonReadonlyMember,
                format!(
                    "member `{}` on `{}` must be readonly",
                    member.name, decl.path
                ),
                member.location.clone(),
            ));
        }

        members.push(MemberState::from_decl(decl, member)?);
    }

    Ok(members)
}

fn check_ctor_args(decl: &TypeDecl, assignable: &[MemberState]) -> Result<(), SymbolError> {
    if let Some(names) = adapter::ctor_arg_names(decl)? {
        let expected = assignable.len() + 1;
        if names.len() != expected {
            return Err(SymbolError::CtorArityMismatch {
                type_path: decl.path.clone(),
                expected,
                found: names.len(),
            });
        }
    }

    Ok(())
}

fn check_default_item(
    decl: &TypeDecl,
    settings: &EnumSettings,
    items: &[EnumItemState],
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Some(default_item) = &settings.default_item
        && !items.iter().any(|item| &item.ident == default_item)
    {
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::InvalidDefaultItem,
            format!(
                "default item `{default_item}` is not declared on `{}`",
                decl.path
            ),
            decl.location.clone(),
        ));
    }
}

fn check_validatable_defaults(
    decl: &TypeDecl,
    settings: &EnumSettings,
    assignable: &[MemberState],
    diagnostics: &mut Vec<Diagnostic>,
) {
    if !settings.validatable || settings.invalid_factory.is_some() {
        return;
    }

    for member in assignable {
        if member.disallows_default {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::DefaultDisallowed,
                format!(
                    "validatable enum `{}` needs a default for member `{}`, but its type disallows one; supply an invalid_factory",
                    decl.path, member.name
                ),
                decl.location.clone(),
            ));
        }
    }
}

fn check_comparison_request(
    decl: &TypeDecl,
    settings: &EnumSettings,
    key: &MemberState,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let explicitly_requested = decl.attrs.get("operators").is_some();

    if explicitly_requested
        && settings.comparison_operators.is_enabled()
        && !key.ty.capabilities.comparison_ops
        && settings.key_comparer.is_none()
    {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::ComparisonNotSupported,
            format!(
                "`{}` requested comparison operators, but key type `{}` has none and no comparer is configured",
                decl.path, key.ty.minimal
            ),
            decl.location.clone(),
        ));
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{AttrBag, MemberKind, SpecialType, TypeMarker, Visibility};

    fn item_member(name: &str, key: &str) -> MemberDecl {
        let mut attrs = AttrBag::default();
        attrs.set("key", AttrValue::Str(key.to_string()));
        attrs.set("args", AttrValue::List(vec![AttrValue::Int(0)]));

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

    fn instance_member(name: &str, special: SpecialType) -> MemberDecl {
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

    fn color_decl() -> TypeDecl {
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
                item_member("Red", "red"),
                item_member("Green", "green"),
                instance_member("rgb", SpecialType::U32),
            ],
            key_type: Some(TypeRef::Special(SpecialType::Text)),
            attrs: AttrBag::default(),
            base_enum: None,
            location: Location::default(),
        }
    }

    #[test]
    fn items_keep_declaration_order() {
        let (state, diagnostics) = EnumEntityState::build(&color_decl()).unwrap();

        assert!(diagnostics.is_empty());
        let idents: Vec<&str> = state.items.iter().map(|i| i.ident.as_str()).collect();
        assert_eq!(idents, ["Red", "Green"]);
        assert_eq!(state.assignable_members.len(), 1);
        assert_eq!(state.key.name, "key");
        assert!(!state.is_copy); // text key
    }

    #[test]
    fn identical_declarations_build_equal_states() {
        let (a, _) = EnumEntityState::build(&color_decl()).unwrap();
        let (b, _) = EnumEntityState::build(&color_decl()).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn member_change_breaks_equality() {
        let (a, _) = EnumEntityState::build(&color_decl()).unwrap();

        let mut changed = color_decl();
        changed.members[2] = instance_member("rgb", SpecialType::U64);
        let (b, _) = EnumEntityState::build(&changed).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn non_readonly_member_is_reported_but_retained() {
        let mut decl = color_decl();
        decl.members[2].is_readonly = false;

        let (state, diagnostics) = EnumEntityState::build(&decl).unwrap();
        assert_eq!(state.assignable_members.len(), 1);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::NonReadonlyMember));
    }

    #[test]
    fn off_type_static_member_is_warned_and_not_counted() {
        let mut decl = color_decl();
        let mut stray = instance_member("LOOKS_LIKE_ITEM", SpecialType::U32);
        stray.is_static = true;
        decl.members.push(stray);

        let (state, diagnostics) = EnumEntityState::build(&decl).unwrap();
        assert_eq!(state.items.len(), 2);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::StaticMemberNotItem));
    }

    #[test]
    fn ctor_args_arity_mismatch_is_fatal_for_this_type() {
        let mut decl = color_decl();
        decl.attrs.set(
            "ctor_args",
            AttrValue::List(vec![AttrValue::Str("key".to_string())]),
        );

        assert!(matches!(
            EnumEntityState::build(&decl),
            Err(SymbolError::CtorArityMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn resolving_a_base_produces_a_new_linked_snapshot() {
        let mut base_decl = color_decl();
        base_decl.attrs.set("extensible", AttrValue::Bool(true));
        let (base, _) = EnumEntityState::build(&base_decl).unwrap();

        let mut derived_decl = color_decl();
        derived_decl.path = "crate::ExtendedColor".to_string();
        derived_decl.ident = "ExtendedColor".to_string();
        derived_decl.members[0] = item_member("Blue", "blue");
        derived_decl.members.remove(1);
        derived_decl.base_enum = Some(BaseEnumDecl {
            path: "crate::Color".to_string(),
            minimal: "Color".to_string(),
            origin: BaseOrigin::SameCompilation,
            nullable: false,
            items: Vec::new(),
            ctor_args: Vec::new(),
        });

        let (derived, _) = EnumEntityState::build(&derived_decl).unwrap();
        assert!(derived.has_pending_base());

        let linked = derived.resolve_base(&base).unwrap();
        assert!(!linked.has_pending_base());
        assert!(derived.has_pending_base()); // original untouched

        let base_state = linked.base.as_ref().unwrap();
        assert_eq!(base_state.items.len(), 2);
        assert_eq!(base_state.ctor_args.len(), 2); // key + rgb

        let items = linked.all_items();
        let all: Vec<&str> = items.iter().map(|i| i.ident.as_str()).collect();
        assert_eq!(all, ["Red", "Green", "Blue"]);
    }
}
