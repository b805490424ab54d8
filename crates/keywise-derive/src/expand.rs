//! Macro expansion: payload parsing, lowering and error conversion.

use crate::lower;
use crate::meta::{SmartEnumArgs, UnionArgs, ValueObjectArgs};
use darling::FromMeta;
use darling::ast::NestedMeta;
use keywise_core::diagnostic::Diagnostic;
use keywise_core::pipeline;
use keywise_core::symbol::TypeDecl;
use proc_macro2::TokenStream;
use quote::quote;

pub fn smart_enum(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(args, input, |item, attr_args| {
        let meta = SmartEnumArgs::from_list(attr_args)?;
        lower::smart_enum_decl(&item.ident, item.generics.params.len(), is_partial(item), &meta)
    })
}

pub fn value_object(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(args, input, |item, attr_args| {
        let meta = ValueObjectArgs::from_list(attr_args)?;
        Ok(lower::value_object_decl(
            &item.ident,
            item.generics.params.len(),
            is_partial(item),
            &meta,
        ))
    })
}

pub fn union_type(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(args, input, |item, attr_args| {
        let meta = UnionArgs::from_list(attr_args)?;
        Ok(lower::union_decl(
            &item.ident,
            item.generics.params.len(),
            is_partial(item),
            &meta,
        ))
    })
}

/// The declaration must leave its body empty for generation.
fn is_partial(item: &syn::ItemStruct) -> bool {
    item.fields.iter().next().is_none()
}

fn expand(
    args: TokenStream,
    input: TokenStream,
    to_decl: impl FnOnce(&syn::ItemStruct, &[NestedMeta]) -> Result<TypeDecl, darling::Error>,
) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(args) {
        Ok(attr_args) => attr_args,
        Err(err) => return darling::Error::from(err).write_errors(),
    };

    let item = match syn::parse2::<syn::ItemStruct>(input) {
        Ok(item) => item,
        Err(err) => return err.to_compile_error(),
    };

    let decl = match to_decl(&item, &attr_args) {
        Ok(decl) => decl,
        Err(err) => return err.write_errors(),
    };

    match pipeline::render_declaration(&decl) {
        Ok((tokens, _warnings)) => {
            // Doc comments and unrelated attributes on the declaration are
            // carried over onto the generated type.
            let attrs = &item.attrs;
            quote! {
                #(#attrs)*
                #tokens
            }
        }
        Err(diagnostics) => diagnostics_to_error(&item, &diagnostics),
    }
}

/// Convert error diagnostics into compile errors at the item's span.
fn diagnostics_to_error(item: &syn::ItemStruct, diagnostics: &[Diagnostic]) -> TokenStream {
    let mut combined: Option<syn::Error> = None;

    for diagnostic in diagnostics.iter().filter(|d| d.is_error()) {
        let err = syn::Error::new_spanned(
            &item.ident,
            format!("[{}] {}", diagnostic.code.as_str(), diagnostic.message),
        );

        match &mut combined {
            Some(combined) => combined.combine(err),
            None => combined = Some(err),
        }
    }

    combined
        .map(|err| err.to_compile_error())
        .unwrap_or_default()
}
