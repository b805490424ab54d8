use crate::state::TypedMemberState;
use crate::symbol::{AttrValue, SpecialType};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

// Quoting helpers

/// Parse a stored path or type spelling back into tokens.
pub fn path_tokens(path: &str) -> TokenStream {
    path.parse()
        .expect("stored path must be valid tokens")
}

/// Render an attribute value as a typed literal expression. String values
/// become owned `String`s when the target type is text.
pub fn literal_tokens(value: &AttrValue, ty: &TypedMemberState) -> TokenStream {
    match value {
        AttrValue::Bool(value) => quote!(#value),
        AttrValue::Int(value) => {
            let literal = Literal::i128_unsuffixed(*value);
            quote!(#literal)
        }
        AttrValue::Str(value) => {
            if matches!(ty.special, Some(SpecialType::Text)) {
                quote!(::std::string::String::from(#value))
            } else {
                quote!(#value)
            }
        }
        AttrValue::Path(path) | AttrValue::Expr(path) => path_tokens(path),
        AttrValue::List(values) => {
            let entries = values.iter().map(|entry| literal_tokens(entry, ty));
            quote!((#(#entries),*))
        }
    }
}

/// The comparer expression for a key or member: the explicit accessor when
/// configured, the ordinal-ignore-case default for strings, the plain
/// `Eq`/`Ord`/`Hash` delegate otherwise.
pub fn comparer_tokens(explicit: Option<&str>, ty: &TypedMemberState) -> TokenStream {
    if let Some(path) = explicit {
        return path_tokens(path);
    }

    if matches!(ty.special, Some(SpecialType::Text)) {
        quote!(::keywise::comparer::AsciiCaseInsensitive)
    } else {
        quote!(::keywise::comparer::DefaultComparer)
    }
}

/// A `fn(&Key) -> String` describing a key in runtime error messages.
pub fn describe_key_tokens(ty: &TypedMemberState) -> TokenStream {
    if ty.capabilities.formattable {
        quote!(|key| ::std::string::ToString::to_string(key))
    } else {
        quote!(|_| ::std::string::String::from("<key>"))
    }
}

/// Accessor return style: copyable member types are returned by value,
/// everything else by reference.
pub fn accessor_tokens(
    field: &proc_macro2::Ident,
    ty: &TypedMemberState,
) -> (TokenStream, TokenStream) {
    let member_ty = ty.type_tokens();

    if ty.is_copy {
        (quote!(#member_ty), quote!(self.#field))
    } else {
        (quote!(&#member_ty), quote!(&self.#field))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::resolve;
    use crate::symbol::TypeRef;

    #[test]
    fn string_literals_become_owned_for_text_targets() {
        let text = resolve(&TypeRef::Special(SpecialType::Text));
        let rendered = literal_tokens(&AttrValue::Str("red".to_string()), &text).to_string();

        assert!(rendered.contains("String :: from"));
    }

    #[test]
    fn int_literals_stay_unsuffixed() {
        let u32_ty = resolve(&TypeRef::Special(SpecialType::U32));
        let rendered = literal_tokens(&AttrValue::Int(16_711_680), &u32_ty).to_string();

        assert_eq!(rendered, "16711680");
    }

    #[test]
    fn string_keys_default_to_case_insensitive_comparer() {
        let text = resolve(&TypeRef::Special(SpecialType::Text));
        assert!(comparer_tokens(None, &text)
            .to_string()
            .contains("AsciiCaseInsensitive"));

        let number = resolve(&TypeRef::Special(SpecialType::U64));
        assert!(comparer_tokens(None, &number)
            .to_string()
            .contains("DefaultComparer"));

        assert!(comparer_tokens(Some("crate::CMP"), &text)
            .to_string()
            .contains("CMP"));
    }
}
