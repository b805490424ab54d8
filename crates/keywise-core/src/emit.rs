use proc_macro2::TokenStream;
use serde::{Deserialize, Serialize};

/// Fixed banner prefixed to every emitted file.
pub const GENERATED_BANNER: &str = "// @generated by keywise. Do not edit.\n";

/// Lint header following the banner; emitted files are rendered token
/// streams, not rustfmt output.
pub const LINT_HEADER: &str = "#![allow(clippy::all, clippy::pedantic, clippy::nursery)]\n";

///
/// GeneratedFile
///
/// One virtual output file handed to the emission collaborator.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub text: String,
}

/// Deterministic output file name for a type.
#[must_use]
pub fn file_name(ident: &str) -> String {
    format!("{ident}.g.rs")
}

/// Render tokens into the final file text: banner, lint header, content.
#[must_use]
pub fn render_text(tokens: &TokenStream) -> String {
    let mut text = String::from(GENERATED_BANNER);
    text.push_str(LINT_HEADER);
    text.push('\n');
    text.push_str(&tokens.to_string());
    text.push('\n');

    text
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn file_names_are_deterministic() {
        assert_eq!(file_name("Color"), "Color.g.rs");
    }

    #[test]
    fn text_starts_with_the_banner() {
        let text = render_text(&quote!(struct Color;));

        assert!(text.starts_with(GENERATED_BANNER));
        assert!(text.contains("struct Color"));
    }
}
