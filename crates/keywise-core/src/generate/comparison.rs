use crate::generate::{ComparisonFragmentState, FragmentStrategy, Generate};
use crate::helper::comparer_tokens;
use crate::prelude::*;

///
/// ComparisonFragment
///
/// Ordering over the key member. With a total order (`Ord` key or a
/// configured comparer) this emits `Ord` + `PartialOrd` + the optional
/// right-hand-side helper; a partially-ordered key gets `PartialOrd`
/// alone. Key-type overloads are added on request.
///

pub struct ComparisonFragment {}

impl Generate<ComparisonFragmentState> for ComparisonFragment {
    fn strategy(state: &ComparisonFragmentState) -> Option<FragmentStrategy> {
        let ident = state.ty.ident_tokens();
        let field = state.key.field_ident();
        let key_ty = state.key.ty.type_tokens();

        let mut body = TokenStream::new();

        if state.total {
            let cmp_expr = if state.key.comparer.is_some()
                || matches!(state.key.ty.special, Some(crate::symbol::SpecialType::Text))
            {
                let comparer = comparer_tokens(state.key.comparer.as_deref(), &state.key.ty);
                quote! {
                    ::keywise::comparer::KeyComparer::compare(&#comparer, &self.#field, &other.#field)
                }
            } else {
                quote!(::std::cmp::Ord::cmp(&self.#field, &other.#field))
            };

            body.extend(quote! {
                impl ::std::cmp::Ord for #ident {
                    fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                        #cmp_expr
                    }
                }

                impl ::std::cmp::PartialOrd for #ident {
                    fn partial_cmp(&self, other: &Self) -> ::std::option::Option<::std::cmp::Ordering> {
                        ::std::option::Option::Some(::std::cmp::Ord::cmp(self, other))
                    }
                }

                impl #ident {
                    /// Compare against an optional right-hand side; a missing
                    /// value compares less than any present one.
                    #[must_use]
                    pub fn cmp_opt(&self, other: ::std::option::Option<&Self>) -> ::std::cmp::Ordering {
                        match other {
                            ::std::option::Option::Some(other) => ::std::cmp::Ord::cmp(self, other),
                            ::std::option::Option::None => ::std::cmp::Ordering::Greater,
                        }
                    }
                }
            });
        } else {
            body.extend(quote! {
                impl ::std::cmp::PartialOrd for #ident {
                    fn partial_cmp(&self, other: &Self) -> ::std::option::Option<::std::cmp::Ordering> {
                        ::std::cmp::PartialOrd::partial_cmp(&self.#field, &other.#field)
                    }
                }
            });
        }

        if state.mode.key_overloads() {
            let key_eq = if state.key.comparer.is_some()
                || matches!(state.key.ty.special, Some(crate::symbol::SpecialType::Text))
            {
                let comparer = comparer_tokens(state.key.comparer.as_deref(), &state.key.ty);
                quote!(::keywise::comparer::KeyComparer::eq(&#comparer, &self.#field, other))
            } else {
                quote!(self.#field == *other)
            };

            let key_cmp = if state.total {
                if state.key.comparer.is_some()
                    || matches!(state.key.ty.special, Some(crate::symbol::SpecialType::Text))
                {
                    let comparer =
                        comparer_tokens(state.key.comparer.as_deref(), &state.key.ty);
                    quote! {
                        ::std::option::Option::Some(
                            ::keywise::comparer::KeyComparer::compare(&#comparer, &self.#field, other),
                        )
                    }
                } else {
                    quote! {
                        ::std::option::Option::Some(::std::cmp::Ord::cmp(&self.#field, other))
                    }
                }
            } else {
                quote!(::std::cmp::PartialOrd::partial_cmp(&self.#field, other))
            };

            body.extend(quote! {
                impl ::std::cmp::PartialEq<#key_ty> for #ident {
                    fn eq(&self, other: &#key_ty) -> bool {
                        #key_eq
                    }
                }

                impl ::std::cmp::PartialOrd<#key_ty> for #ident {
                    fn partial_cmp(&self, other: &#key_ty) -> ::std::option::Option<::std::cmp::Ordering> {
                        #key_cmp
                    }
                }
            });
        }

        Some(FragmentStrategy::from_body(body))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{MemberView, TypeInfo};
    use crate::state::{OperatorsMode, resolve};
    use crate::symbol::{SpecialType, TypeRef};

    fn state(special: SpecialType, mode: OperatorsMode) -> ComparisonFragmentState {
        ComparisonFragmentState {
            ty: TypeInfo {
                ident: "Amount".to_string(),
                is_copy: true,
            },
            key: MemberView {
                field: "value".to_string(),
                ty: resolve(&TypeRef::Special(special)),
                comparer: None,
            },
            mode,
            total: !matches!(special, SpecialType::F32 | SpecialType::F64),
        }
    }

    #[test]
    fn total_orders_emit_ord_and_the_optional_helper() {
        let rendered = ComparisonFragment::strategy(&state(SpecialType::U64, OperatorsMode::Default))
            .unwrap()
            .body
            .to_string();

        assert!(rendered.contains("impl :: std :: cmp :: Ord"));
        assert!(rendered.contains("cmp_opt"));
        assert!(rendered.contains("Ordering :: Greater"));
    }

    #[test]
    fn partial_keys_only_get_partial_ord() {
        let rendered = ComparisonFragment::strategy(&state(SpecialType::F64, OperatorsMode::Default))
            .unwrap()
            .body
            .to_string();

        assert!(!rendered.contains("impl :: std :: cmp :: Ord"));
        assert!(rendered.contains("partial_cmp"));
    }

    #[test]
    fn key_overloads_compare_against_the_bare_key() {
        let rendered = ComparisonFragment::strategy(&state(
            SpecialType::U64,
            OperatorsMode::WithKeyOverloads,
        ))
        .unwrap()
        .body
        .to_string();

        assert!(rendered.contains("PartialEq < u64 >"));
        assert!(rendered.contains("PartialOrd < u64 >"));
    }
}
