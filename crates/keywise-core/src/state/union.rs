use crate::prelude::*;
use crate::state::{TypedMemberState, UnionSettings, argument_name, resolve};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

///
/// UnionVariantState
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnionVariantState {
    pub ident: String,
    pub argument_name: String,
    pub ty: Arc<TypedMemberState>,
}

///
/// UnionEntityState
///
/// Snapshot of a union declaration: an ordered variant list over the same
/// state machinery as enums and value objects.
///

#[derive(Clone, Debug)]
pub struct UnionEntityState {
    pub path: String,
    pub ident: String,
    pub minimal: String,
    pub is_copy: bool,
    pub variants: Vec<UnionVariantState>,
    pub settings: UnionSettings,
    /// Excluded from equality and hashing; diagnostics only.
    pub location: Location,
}

impl PartialEq for UnionEntityState {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.ident == other.ident
            && self.minimal == other.minimal
            && self.is_copy == other.is_copy
            && self.variants == other.variants
            && self.settings == other.settings
    }
}

impl Eq for UnionEntityState {}

impl Hash for UnionEntityState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.ident.hash(state);
        self.minimal.hash(state);
        self.is_copy.hash(state);
        self.variants.hash(state);
        self.settings.hash(state);
    }
}

impl UnionEntityState {
    pub fn build(decl: &TypeDecl) -> Result<(Self, Vec<Diagnostic>), SymbolError> {
        let mut diagnostics = Vec::new();
        let settings = UnionSettings::from_attrs(decl)?;

        let mut variants = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for member in decl.instance_members() {
            if !seen.insert(member.name.as_str()) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateMemberName,
                    format!(
                        "variant `{}` is declared more than once on `{}`",
                        member.name, decl.path
                    ),
                    member.location.clone(),
                ));
            }

            variants.push(UnionVariantState {
                ident: member.name.clone(),
                argument_name: argument_name(&member.name),
                ty: resolve(&member.ty),
            });
        }

        let is_copy = variants.iter().all(|variant| variant.ty.is_copy);

        let state = Self {
            path: decl.path.clone(),
            ident: decl.ident.clone(),
            minimal: decl.ident.clone(),
            is_copy,
            variants,
            settings,
            location: decl.location.clone(),
        };

        Ok((state, diagnostics))
    }

    /// Variant types that occur exactly once; only these get `From` impls,
    /// duplicated payload types would make the impls ambiguous.
    #[must_use]
    pub fn uniquely_typed_variants(&self) -> Vec<&UnionVariantState> {
        self.variants
            .iter()
            .filter(|variant| {
                self.variants
                    .iter()
                    .filter(|other| other.ty == variant.ty)
                    .count()
                    == 1
            })
            .collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{AttrBag, MemberKind, SpecialType, TypeMarker, Visibility};

    fn variant(name: &str, special: SpecialType) -> MemberDecl {
        MemberDecl {
            name: name.to_string(),
            ty: TypeRef::Special(special),
            kind: MemberKind::Field,
            visibility: Visibility::Public,
            is_static: false,
            is_readonly: true,
            attrs: AttrBag::default(),
            location: Location::default(),
        }
    }

    fn decl(members: Vec<MemberDecl>) -> TypeDecl {
        TypeDecl {
            path: "crate::TextOrNumber".to_string(),
            ident: "TextOrNumber".to_string(),
            marker: Some(TypeMarker::Union),
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

    #[test]
    fn variants_keep_declaration_order() {
        let (state, _) = UnionEntityState::build(&decl(vec![
            variant("Text", SpecialType::Text),
            variant("Number", SpecialType::U64),
        ]))
        .unwrap();

        let idents: Vec<&str> = state.variants.iter().map(|v| v.ident.as_str()).collect();
        assert_eq!(idents, ["Text", "Number"]);
        assert!(!state.is_copy);
    }

    #[test]
    fn duplicated_payload_types_lose_their_from_impls() {
        let (state, _) = UnionEntityState::build(&decl(vec![
            variant("First", SpecialType::Text),
            variant("Second", SpecialType::Text),
            variant("Number", SpecialType::U64),
        ]))
        .unwrap();

        let unique: Vec<&str> = state
            .uniquely_typed_variants()
            .iter()
            .map(|v| v.ident.as_str())
            .collect();
        assert_eq!(unique, ["Number"]);
    }
}
