use crate::prelude::*;
use crate::state::TypedMemberState;
use crate::symbol::adapter;
use convert_case::{Case, Casing};
use std::collections::HashSet;
use std::sync::LazyLock;

///
/// SkipCondition
///
/// Per-member ignore condition for the text serialization format.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SkipCondition {
    Always,
    WhenDefault,
    WhenNone,
}

impl SkipCondition {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "always" => Some(Self::Always),
            "when_default" => Some(Self::WhenDefault),
            "when_none" => Some(Self::WhenNone),
            _ => None,
        }
    }
}

///
/// MemberState
///
/// A named, owned typed-member state plus everything generation needs to
/// know about one member. Rebuilt whenever the owning entity state is
/// rebuilt; never shared across entities.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MemberState {
    pub name: String,
    /// Parameter-safe snake_case form of `name`; a pure function of it.
    pub argument_name: String,
    pub ty: Arc<TypedMemberState>,
    pub is_static: bool,
    pub is_readonly: bool,
    pub comparer: Option<String>,
    pub equality_comparer: Option<String>,
    pub explicit_equality: bool,
    /// True when the member's own type forbids its default value,
    /// propagated transitively from the member type's declaration.
    pub disallows_default: bool,
    pub ordinal: Option<u32>,
    pub skip_condition: Option<SkipCondition>,
    /// Base-type accessor this member corresponds to, when renamed.
    pub maps_to: Option<String>,
}

impl MemberState {
    /// Build a member state from a declaration, resolving its type through
    /// the typed-member cache.
    pub fn from_decl(decl: &TypeDecl, member: &MemberDecl) -> Result<Self, SymbolError> {
        let skip_condition = member
            .attrs
            .str("skip_if")
            .and_then(SkipCondition::parse);

        Ok(Self {
            argument_name: argument_name(&member.name),
            name: member.name.clone(),
            ty: crate::state::resolve(&member.ty),
            is_static: member.is_static,
            is_readonly: member.is_readonly,
            comparer: adapter::member_comparer(member),
            equality_comparer: adapter::member_equality_comparer(member),
            explicit_equality: adapter::member_explicit_equality(member),
            disallows_default: member.attrs.flag("no_default"),
            ordinal: adapter::member_ordinal(decl, member)?,
            skip_condition,
            maps_to: adapter::member_maps_to(member),
        })
    }

    /// Synthesize the key member from the configured key name and type.
    #[must_use]
    pub fn key(name: &str, ty: Arc<TypedMemberState>) -> Self {
        Self {
            name: name.to_string(),
            argument_name: argument_name(name),
            ty,
            is_static: false,
            is_readonly: true,
            comparer: None,
            equality_comparer: None,
            explicit_equality: false,
            disallows_default: false,
            ordinal: None,
            skip_condition: None,
            maps_to: None,
        }
    }

    /// The base-type accessor used when converting inherited items.
    #[must_use]
    pub fn base_accessor(&self) -> &str {
        self.maps_to.as_deref().unwrap_or(&self.name)
    }
}

// Keywords that cannot be raw identifiers.
const UNESCAPABLE: [&str; 4] = ["self", "Self", "super", "crate"];

// https://doc.rust-lang.org/reference/keywords.html
static KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
        "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
        "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
        "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box",
        "do", "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
    ]
    .into_iter()
    .collect()
});

/// Derive the parameter-safe argument name for a member.
///
/// Deterministic and collision-free against reserved words: keywords are
/// raw-escaped, the few that cannot be raw get an underscore suffix.
#[must_use]
pub fn argument_name(name: &str) -> String {
    let snake = name.to_case(Case::Snake);

    if UNESCAPABLE.contains(&snake.as_str()) {
        format!("{snake}_")
    } else if KEYWORDS.contains(snake.as_str()) {
        format!("r#{snake}")
    } else {
        snake
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_name_is_snake_cased() {
        assert_eq!(argument_name("RequestedBy"), "requested_by");
        assert_eq!(argument_name("rgb"), "rgb");
    }

    #[test]
    fn keywords_are_raw_escaped() {
        assert_eq!(argument_name("type"), "r#type");
        assert_eq!(argument_name("Loop"), "r#loop");
    }

    #[test]
    fn unescapable_keywords_get_a_suffix() {
        assert_eq!(argument_name("self"), "self_");
        assert_eq!(argument_name("crate"), "crate_");
    }
}
