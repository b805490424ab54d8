use crate::generate::{ArithmeticFragmentState, FragmentStrategy, Generate};
use crate::prelude::*;

///
/// ArithmeticFragment
///
/// Operator impls for keyed value objects whose key supports an arithmetic
/// family. Construction bypasses validation: arithmetic on two valid
/// instances stays within the key domain. Key-type overloads mirror the
/// `Self op Key` and `Key op Self` forms.
///

pub struct ArithmeticFragment {}

///
/// OpSpec
///

struct OpSpec {
    enabled: bool,
    trait_name: &'static str,
    method: &'static str,
}

impl Generate<ArithmeticFragmentState> for ArithmeticFragment {
    fn strategy(state: &ArithmeticFragmentState) -> Option<FragmentStrategy> {
        let specs = [
            OpSpec {
                enabled: state.capabilities.addition,
                trait_name: "Add",
                method: "add",
            },
            OpSpec {
                enabled: state.capabilities.subtraction,
                trait_name: "Sub",
                method: "sub",
            },
            OpSpec {
                enabled: state.capabilities.multiplication,
                trait_name: "Mul",
                method: "mul",
            },
            OpSpec {
                enabled: state.capabilities.division,
                trait_name: "Div",
                method: "div",
            },
        ];

        let mut body = TokenStream::new();
        for spec in specs.iter().filter(|spec| spec.enabled) {
            body.extend(expand_op(state, spec));
        }

        if body.is_empty() {
            return None;
        }

        Some(FragmentStrategy::from_body(body))
    }
}

fn expand_op(state: &ArithmeticFragmentState, spec: &OpSpec) -> TokenStream {
    let ident = state.ty.ident_tokens();
    let field = state.key.field_ident();
    let key_ty = state.key.ty.type_tokens();
    let trait_path = {
        let trait_ident = format_ident!("{}", spec.trait_name);
        quote!(::std::ops::#trait_ident)
    };
    let method = format_ident!("{}", spec.method);

    let mut tokens = quote! {
        impl #trait_path<Self> for #ident {
            type Output = Self;

            fn #method(self, other: Self) -> Self::Output {
                Self {
                    #field: #trait_path::#method(self.#field, other.#field),
                }
            }
        }
    };

    if state.mode.key_overloads() {
        tokens.extend(quote! {
            impl #trait_path<#key_ty> for #ident {
                type Output = Self;

                fn #method(self, other: #key_ty) -> Self::Output {
                    Self {
                        #field: #trait_path::#method(self.#field, other),
                    }
                }
            }

            impl #trait_path<#ident> for #key_ty {
                type Output = #ident;

                fn #method(self, other: #ident) -> Self::Output {
                    #ident {
                        #field: #trait_path::#method(self, other.#field),
                    }
                }
            }
        });
    }

    tokens
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

    fn state(special: SpecialType, mode: OperatorsMode) -> ArithmeticFragmentState {
        let ty = resolve(&TypeRef::Special(special));

        ArithmeticFragmentState {
            ty: TypeInfo {
                ident: "Amount".to_string(),
                is_copy: true,
            },
            key: MemberView {
                field: "value".to_string(),
                ty: Arc::clone(&ty),
                comparer: None,
            },
            mode,
            capabilities: ty.capabilities,
        }
    }

    #[test]
    fn integer_keys_get_all_four_families() {
        let rendered = ArithmeticFragment::strategy(&state(SpecialType::U64, OperatorsMode::Default))
            .unwrap()
            .body
            .to_string();

        for op in ["Add", "Sub", "Mul", "Div"] {
            assert!(rendered.contains(op), "missing {op}");
        }
    }

    #[test]
    fn duration_keys_only_add_and_subtract() {
        let rendered = ArithmeticFragment::strategy(&state(
            SpecialType::Duration,
            OperatorsMode::Default,
        ))
        .unwrap()
        .body
        .to_string();

        assert!(rendered.contains("Add"));
        assert!(rendered.contains("Sub"));
        assert!(!rendered.contains("Mul"));
        assert!(!rendered.contains("Div"));
    }

    #[test]
    fn key_overloads_include_the_reverse_form() {
        let rendered = ArithmeticFragment::strategy(&state(
            SpecialType::U64,
            OperatorsMode::WithKeyOverloads,
        ))
        .unwrap()
        .body
        .to_string();

        assert!(rendered.contains("Add < u64 > for Amount"));
        assert!(rendered.contains("Add < Amount > for u64"));
    }
}
