use crate::generate::{EqualityFragmentState, FragmentStrategy, Generate, MemberView};
use crate::helper::comparer_tokens;
use crate::prelude::*;

///
/// EqualityFragment
///
/// `PartialEq` (+ `Eq` and `Hash` when a total equality exists) over the
/// equality members. Per member: the explicit comparer when configured,
/// the ordinal-ignore-case default for strings, the plain operator
/// otherwise. Hashing routes through the same comparer so `eq` and `hash`
/// can never disagree.
///

pub struct EqualityFragment {}

impl Generate<EqualityFragmentState> for EqualityFragment {
    fn strategy(state: &EqualityFragmentState) -> Option<FragmentStrategy> {
        let ident = state.ty.ident_tokens();

        let eq_expr = if state.degenerate {
            // Marker type: same declared type implies equal.
            quote!(true)
        } else {
            let terms = state.members.iter().map(eq_term);
            quote!(#(#terms)&&*)
        };

        let mut body = quote! {
            impl ::std::cmp::PartialEq for #ident {
                fn eq(&self, other: &Self) -> bool {
                    #eq_expr
                }
            }
        };

        if state.total {
            let hash_stmts = hash_statements(state);

            body.extend(quote! {
                impl ::std::cmp::Eq for #ident {}

                impl ::std::hash::Hash for #ident {
                    fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                        #hash_stmts
                    }
                }
            });
        }

        Some(FragmentStrategy::from_body(body))
    }
}

fn eq_term(member: &MemberView) -> TokenStream {
    let field = member.field_ident();

    if needs_comparer(member) {
        let comparer = comparer_tokens(member.comparer.as_deref(), &member.ty);
        quote! {
            ::keywise::comparer::KeyComparer::eq(&#comparer, &self.#field, &other.#field)
        }
    } else {
        quote!(self.#field == other.#field)
    }
}

fn hash_statements(state: &EqualityFragmentState) -> TokenStream {
    if state.degenerate {
        let name = &state.ty.ident;
        return quote! {
            ::std::hash::Hash::hash(#name, state);
        };
    }

    let any_comparer = state.members.iter().any(needs_comparer);

    if any_comparer {
        // Comparer-aware accumulation, member by member.
        let stmts = state.members.iter().map(|member| {
            let field = member.field_ident();
            if needs_comparer(member) {
                let comparer = comparer_tokens(member.comparer.as_deref(), &member.ty);
                quote! {
                    ::keywise::comparer::KeyComparer::hash_one(&#comparer, &self.#field, state);
                }
            } else {
                quote!(::std::hash::Hash::hash(&self.#field, state);)
            }
        });
        quote!(#(#stmts)*)
    } else {
        // Plain fixed sequence over the members.
        let fields = state.members.iter().map(MemberView::field_ident);
        quote!(#(::std::hash::Hash::hash(&self.#fields, state);)*)
    }
}

fn needs_comparer(member: &MemberView) -> bool {
    member.comparer.is_some() || matches!(member.ty.special, Some(crate::symbol::SpecialType::Text))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::TypeInfo;
    use crate::state::resolve;
    use crate::symbol::{SpecialType, TypeRef};

    fn view(field: &str, special: SpecialType, comparer: Option<&str>) -> MemberView {
        MemberView {
            field: field.to_string(),
            ty: resolve(&TypeRef::Special(special)),
            comparer: comparer.map(ToString::to_string),
        }
    }

    fn ty() -> TypeInfo {
        TypeInfo {
            ident: "Money".to_string(),
            is_copy: false,
        }
    }

    #[test]
    fn strings_route_through_the_case_insensitive_default() {
        let state = EqualityFragmentState {
            ty: ty(),
            members: vec![view("currency", SpecialType::Text, None)],
            degenerate: false,
            total: true,
        };

        let rendered = EqualityFragment::strategy(&state).unwrap().body.to_string();
        assert!(rendered.contains("AsciiCaseInsensitive"));
        assert!(rendered.contains("hash_one"));
    }

    #[test]
    fn plain_members_compare_directly() {
        let state = EqualityFragmentState {
            ty: ty(),
            members: vec![view("amount", SpecialType::U64, None)],
            degenerate: false,
            total: true,
        };

        let rendered = EqualityFragment::strategy(&state).unwrap().body.to_string();
        assert!(rendered.contains("self . amount == other . amount"));
        assert!(rendered.contains("impl :: std :: cmp :: Eq"));
    }

    #[test]
    fn partial_members_suppress_eq_and_hash() {
        let state = EqualityFragmentState {
            ty: ty(),
            members: vec![view("ratio", SpecialType::F64, None)],
            degenerate: false,
            total: false,
        };

        let rendered = EqualityFragment::strategy(&state).unwrap().body.to_string();
        assert!(!rendered.contains("Hash"));
        assert!(!rendered.contains(":: cmp :: Eq"));
    }

    #[test]
    fn marker_equality_degenerates_to_type_identity() {
        let state = EqualityFragmentState {
            ty: ty(),
            members: Vec::new(),
            degenerate: true,
            total: true,
        };

        let rendered = EqualityFragment::strategy(&state).unwrap().body.to_string();
        assert!(rendered.contains("true"));
    }
}
