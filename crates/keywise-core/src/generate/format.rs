use crate::generate::{FormatFragmentState, FormatStyle, FragmentStrategy, Generate, MemberView};
use crate::prelude::*;

///
/// FormatFragment
///
/// `Display` in one of four shapes: key delegation for keyed types, a
/// `{ member = value, ... }` rendering for complex value objects, the bare
/// type name for markers, and per-variant delegation for unions.
///

pub struct FormatFragment {}

impl Generate<FormatFragmentState> for FormatFragment {
    fn strategy(state: &FormatFragmentState) -> Option<FragmentStrategy> {
        let ident = state.ty.ident_tokens();

        let fmt_body = match &state.style {
            FormatStyle::Keyed(key) => {
                let field = key.field_ident();
                quote!(::std::fmt::Display::fmt(&self.#field, f))
            }
            FormatStyle::Members(members) => members_body(members),
            FormatStyle::Bare => {
                let name = &state.ty.ident;
                quote!(f.write_str(#name))
            }
            FormatStyle::Variants(variants) => {
                let arms = variants.iter().map(|variant| {
                    let variant = format_ident!("{variant}");
                    quote!(Self::#variant(value) => ::std::fmt::Display::fmt(value, f))
                });
                quote! {
                    match self {
                        #(#arms),*
                    }
                }
            }
        };

        Some(FragmentStrategy::from_body(quote! {
            impl ::std::fmt::Display for #ident {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    #fmt_body
                }
            }
        }))
    }
}

fn members_body(members: &[MemberView]) -> TokenStream {
    let template = format!(
        "{{{{ {} }}}}",
        members
            .iter()
            .map(|member| format!("{} = {{}}", member.field))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let fields = members.iter().map(MemberView::field_ident);

    quote!(::std::write!(f, #template, #(self.#fields),*))
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

    fn ty() -> TypeInfo {
        TypeInfo {
            ident: "Money".to_string(),
            is_copy: false,
        }
    }

    fn view(field: &str, special: SpecialType) -> MemberView {
        MemberView {
            field: field.to_string(),
            ty: resolve(&TypeRef::Special(special)),
            comparer: None,
        }
    }

    #[test]
    fn complex_rendering_names_each_member() {
        let state = FormatFragmentState {
            ty: ty(),
            style: FormatStyle::Members(vec![
                view("amount", SpecialType::U64),
                view("currency", SpecialType::Text),
            ]),
        };

        let rendered = FormatFragment::strategy(&state).unwrap().body.to_string();
        assert!(rendered.contains("amount = {}"));
        assert!(rendered.contains("currency = {}"));
    }

    #[test]
    fn marker_rendering_is_the_bare_type_name() {
        let state = FormatFragmentState {
            ty: ty(),
            style: FormatStyle::Bare,
        };

        let rendered = FormatFragment::strategy(&state).unwrap().body.to_string();
        assert!(rendered.contains("write_str (\"Money\")"));
    }
}
