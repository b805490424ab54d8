use crate::prelude::*;
use crate::state::{MemberState, ValueObjectSettings};
use crate::symbol::adapter;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

///
/// ValueObjectEntityState
///
/// Snapshot of a value-object declaration. The key member is a purely
/// structural fact: it exists iff exactly one assignable member is also
/// the sole equality member. Attributes never decide it.
///

#[derive(Clone, Debug)]
pub struct ValueObjectEntityState {
    pub path: String,
    pub ident: String,
    pub minimal: String,
    pub is_copy: bool,
    pub has_layout_attr: bool,
    pub has_custom_serde: bool,
    pub has_custom_candid: bool,
    pub has_custom_storable: bool,
    pub assignable_members: Vec<MemberState>,
    /// The explicitly tagged subset, or all assignable members when
    /// nothing is tagged. All-or-nothing: tagging one member changes the
    /// semantics of the whole type.
    pub equality_members: Vec<MemberState>,
    pub has_key_member: bool,
    pub settings: ValueObjectSettings,
    /// Excluded from equality and hashing; diagnostics only.
    pub location: Location,
}

impl PartialEq for ValueObjectEntityState {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.ident == other.ident
            && self.minimal == other.minimal
            && self.is_copy == other.is_copy
            && self.has_layout_attr == other.has_layout_attr
            && self.has_custom_serde == other.has_custom_serde
            && self.has_custom_candid == other.has_custom_candid
            && self.has_custom_storable == other.has_custom_storable
            && self.assignable_members == other.assignable_members
            && self.equality_members == other.equality_members
            && self.has_key_member == other.has_key_member
            && self.settings == other.settings
    }
}

impl Eq for ValueObjectEntityState {}

impl Hash for ValueObjectEntityState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.ident.hash(state);
        self.minimal.hash(state);
        self.is_copy.hash(state);
        self.has_layout_attr.hash(state);
        self.has_custom_serde.hash(state);
        self.has_custom_candid.hash(state);
        self.has_custom_storable.hash(state);
        self.assignable_members.hash(state);
        self.equality_members.hash(state);
        self.has_key_member.hash(state);
        self.settings.hash(state);
    }
}

impl ValueObjectEntityState {
    pub fn build(decl: &TypeDecl) -> Result<(Self, Vec<Diagnostic>), SymbolError> {
        let mut diagnostics = Vec::new();

        let settings = ValueObjectSettings::from_attrs(decl)?;
        let assignable_members = collect_members(decl, &mut diagnostics)?;

        let explicit: Vec<MemberState> = assignable_members
            .iter()
            .filter(|member| member.explicit_equality)
            .cloned()
            .collect();

        let equality_members = if explicit.is_empty() {
            assignable_members.clone()
        } else {
            explicit
        };

        let has_key_member = assignable_members.len() == 1
            && equality_members.len() == 1
            && assignable_members[0].name == equality_members[0].name;

        let is_copy = assignable_members.iter().all(|member| member.ty.is_copy);

        let state = Self {
            path: decl.path.clone(),
            ident: decl.ident.clone(),
            minimal: decl.ident.clone(),
            is_copy,
            has_layout_attr: decl.has_layout_attr,
            has_custom_serde: decl.has_custom_serde,
            has_custom_candid: decl.has_custom_candid,
            has_custom_storable: decl.has_custom_storable,
            assignable_members,
            equality_members,
            has_key_member,
            settings,
            location: decl.location.clone(),
        };

        Ok((state, diagnostics))
    }

    /// The key member, when the structure has one.
    #[must_use]
    pub fn key_member(&self) -> Option<&MemberState> {
        self.has_key_member.then(|| &self.assignable_members[0])
    }

    /// A value object with no members is valid: a marker whose equality
    /// degenerates to type identity.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        self.assignable_members.is_empty()
    }
}

fn collect_members(
    decl: &TypeDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<MemberState>, SymbolError> {
    let mut members = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for member in decl.instance_members() {
        if adapter::member_is_ignored(member) {
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

///
/// TESTS
///
