pub(crate) use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub(crate) use crate::symbol::{
    AttrValue, BaseOrigin, Location, MemberDecl, SymbolError, TypeDecl, TypeRef,
};
pub(crate) use proc_macro2::TokenStream;
pub(crate) use quote::{ToTokens, format_ident, quote};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use std::sync::Arc;
