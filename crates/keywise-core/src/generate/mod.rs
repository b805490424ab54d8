//! Fragment generators and their composition.
//!
//! Each fragment is a pure function from one generator-facing state to a
//! [`FragmentStrategy`]: the derives/attributes it contributes to the type
//! header and the impl blocks it appends. The composer emits the header
//! with every contributed derive (deduplicated), then every body in the
//! fixed [`FRAGMENT_ORDER`]. Fragments never read each other's output and
//! are order-independent with respect to one another.

mod comparison;
mod enum_body;
mod equality;
mod format;
mod ops;
mod parse;
mod serializer;
mod state;
mod union_body;
mod value_object_body;

pub use self::comparison::*;
pub use self::enum_body::*;
pub use self::equality::*;
pub use self::format::*;
pub use self::ops::*;
pub use self::parse::*;
pub use self::serializer::*;
pub use self::state::*;
pub use self::union_body::*;
pub use self::value_object_body::*;

use crate::cache::EntityState;
use crate::prelude::*;
use crate::state::{EnumEntityState, UnionEntityState, ValueObjectEntityState};
use std::collections::HashSet;

///
/// FragmentKind
///
/// Every fragment the composer knows about, in emission order.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FragmentKind {
    Body,
    Equality,
    Comparison,
    Format,
    Parse,
    SpanParse,
    Arithmetic,
    SerdeGlue,
    CandidGlue,
    StorableGlue,
    Registration,
}

/// Fixed emission order; must not vary run to run.
pub const FRAGMENT_ORDER: [FragmentKind; 11] = [
    FragmentKind::Body,
    FragmentKind::Equality,
    FragmentKind::Comparison,
    FragmentKind::Format,
    FragmentKind::Parse,
    FragmentKind::SpanParse,
    FragmentKind::Arithmetic,
    FragmentKind::SerdeGlue,
    FragmentKind::CandidGlue,
    FragmentKind::StorableGlue,
    FragmentKind::Registration,
];

///
/// FragmentStrategy
///
/// What one fragment contributes: derive paths and attributes for the type
/// header, and impl blocks for the body.
///

#[derive(Debug, Default)]
pub struct FragmentStrategy {
    pub derives: Vec<TokenStream>,
    pub attrs: Vec<TokenStream>,
    pub body: TokenStream,
}

impl FragmentStrategy {
    #[must_use]
    pub fn from_body(body: TokenStream) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_derives(derives: Vec<TokenStream>) -> Self {
        Self {
            derives,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, attr: TokenStream) -> Self {
        self.attrs.push(attr);
        self
    }

    #[must_use]
    pub fn with_derive(mut self, derive: TokenStream) -> Self {
        self.derives.push(derive);
        self
    }
}

///
/// Generate
///
/// The capability interface every fragment implements: given its minimal
/// state, either contribute to the output or opt out with `None`.
///

pub trait Generate<S> {
    fn strategy(state: &S) -> Option<FragmentStrategy>;
}

/// Compose a type definition and the selected fragment strategies into the
/// final token stream.
fn compose(
    type_part: TokenStream,
    strategies: impl Iterator<Item = FragmentStrategy>,
) -> TokenStream {
    let mut derives: Vec<TokenStream> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut attrs: Vec<TokenStream> = Vec::new();
    let mut impls = TokenStream::new();

    for strategy in strategies {
        for derive in strategy.derives {
            if seen.insert(derive.to_string()) {
                derives.push(derive);
            }
        }
        attrs.extend(strategy.attrs);
        impls.extend(strategy.body);
    }

    let derive_attr = if derives.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#derives),*)])
    };

    quote! {
        #derive_attr
        #(#attrs)*
        #type_part

        #impls
    }
}

/// Render the complete output for any entity snapshot.
#[must_use]
pub fn entity_tokens(state: &EntityState) -> TokenStream {
    match state {
        EntityState::Enum(state) => enum_tokens(state),
        EntityState::Union(state) => union_tokens(state),
        EntityState::ValueObject(state) => value_object_tokens(state),
    }
}

/// Render a smart enum.
#[must_use]
pub fn enum_tokens(state: &EnumEntityState) -> TokenStream {
    let fragments = FRAGMENT_ORDER.iter().filter_map(|kind| match kind {
        FragmentKind::Body => EnumBody::strategy(state),
        FragmentKind::Equality => {
            EqualityFragmentState::from_enum(state).and_then(|s| EqualityFragment::strategy(&s))
        }
        FragmentKind::Comparison => ComparisonFragmentState::from_enum(state)
            .and_then(|s| ComparisonFragment::strategy(&s)),
        FragmentKind::Format => {
            FormatFragmentState::from_enum(state).and_then(|s| FormatFragment::strategy(&s))
        }
        FragmentKind::Parse => {
            ParseFragmentState::from_enum(state).and_then(|s| ParseFragment::strategy(&s))
        }
        FragmentKind::SpanParse => {
            ParseFragmentState::from_enum(state).and_then(|s| SpanParseFragment::strategy(&s))
        }
        FragmentKind::Arithmetic => None,
        FragmentKind::SerdeGlue => SerializerFragmentState::from_enum(state, Framework::Serde)
            .and_then(|s| SerializerFragment::strategy(&s)),
        FragmentKind::CandidGlue => SerializerFragmentState::from_enum(state, Framework::Candid)
            .and_then(|s| SerializerFragment::strategy(&s)),
        FragmentKind::StorableGlue => {
            SerializerFragmentState::from_enum(state, Framework::Storable)
                .and_then(|s| SerializerFragment::strategy(&s))
        }
        FragmentKind::Registration => enum_registration(state),
    });

    compose(enum_type_part(state), fragments)
}

/// Render a value object.
#[must_use]
pub fn value_object_tokens(state: &ValueObjectEntityState) -> TokenStream {
    let fragments = FRAGMENT_ORDER.iter().filter_map(|kind| match kind {
        FragmentKind::Body => ValueObjectBody::strategy(state),
        FragmentKind::Equality => EqualityFragmentState::from_value_object(state)
            .and_then(|s| EqualityFragment::strategy(&s)),
        FragmentKind::Comparison => ComparisonFragmentState::from_value_object(state)
            .and_then(|s| ComparisonFragment::strategy(&s)),
        FragmentKind::Format => FormatFragmentState::from_value_object(state)
            .and_then(|s| FormatFragment::strategy(&s)),
        FragmentKind::Parse => {
            ParseFragmentState::from_value_object(state).and_then(|s| ParseFragment::strategy(&s))
        }
        FragmentKind::SpanParse => ParseFragmentState::from_value_object(state)
            .and_then(|s| SpanParseFragment::strategy(&s)),
        FragmentKind::Arithmetic => ArithmeticFragmentState::from_value_object(state)
            .and_then(|s| ArithmeticFragment::strategy(&s)),
        FragmentKind::SerdeGlue => {
            SerializerFragmentState::from_value_object(state, Framework::Serde)
                .and_then(|s| SerializerFragment::strategy(&s))
        }
        FragmentKind::CandidGlue => {
            SerializerFragmentState::from_value_object(state, Framework::Candid)
                .and_then(|s| SerializerFragment::strategy(&s))
        }
        FragmentKind::StorableGlue => {
            SerializerFragmentState::from_value_object(state, Framework::Storable)
                .and_then(|s| SerializerFragment::strategy(&s))
        }
        FragmentKind::Registration => value_object_registration(state),
    });

    compose(value_object_type_part(state), fragments)
}

/// Render a union.
#[must_use]
pub fn union_tokens(state: &UnionEntityState) -> TokenStream {
    let fragments = FRAGMENT_ORDER.iter().filter_map(|kind| match kind {
        FragmentKind::Body => UnionBody::strategy(state),
        FragmentKind::Format => {
            FormatFragmentState::from_union(state).and_then(|s| FormatFragment::strategy(&s))
        }
        FragmentKind::Registration => union_registration(state),
        _ => None,
    });

    compose(union_type_part(state), fragments)
}
