//! Batch orchestration.
//!
//! Discovery, state construction, base-type linkage, fragment selection and
//! text emission over a whole [`Compilation`]. Every per-type failure,
//! including panics out of state construction, becomes a diagnostic tied to
//! the declaration; one malformed type never aborts the batch. For a fixed
//! input the emitted file set is byte-identical across runs.

use crate::cache::{self, EntityState, TypeIdentity};
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::emit::{self, GeneratedFile};
use crate::generate;
use crate::state::{EnumEntityState, UnionEntityState, ValueObjectEntityState};
use crate::symbol::{Compilation, SymbolError, TypeDecl, TypeMarker, adapter};
use proc_macro2::TokenStream;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

///
/// CancelToken
///
/// Cooperative cancellation, checked once per candidate type. The
/// in-flight type is discarded; completed output stands.
///

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

///
/// PipelineOptions
///

#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Consult the process-wide render cache before regenerating.
    pub use_render_cache: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            use_render_cache: true,
        }
    }
}

///
/// PipelineOutput
///

#[derive(Clone, Debug, Default)]
pub struct PipelineOutput {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

struct Entry {
    state: EntityState,
    has_error: bool,
}

/// Run the full pipeline over a compilation.
#[must_use]
pub fn run(
    compilation: &Compilation,
    options: &PipelineOptions,
    cancel: &CancelToken,
) -> PipelineOutput {
    let mut output = PipelineOutput::default();
    let mut entries = build_states(compilation, cancel, &mut output.diagnostics);

    link_bases(&mut entries, &mut output.diagnostics);
    attach_derived(&mut entries);

    for entry in &entries {
        if cancel.is_cancelled() {
            break;
        }
        if entry.has_error {
            continue;
        }

        let text = if options.use_render_cache {
            let cache = cache::global();
            cache.lookup(&entry.state).unwrap_or_else(|| {
                let rendered: Arc<str> =
                    Arc::from(emit::render_text(&generate::entity_tokens(&entry.state)));
                cache.insert(&entry.state, rendered)
            })
        } else {
            Arc::from(emit::render_text(&generate::entity_tokens(&entry.state)))
        };

        output.files.push(GeneratedFile {
            name: emit::file_name(entry.state.ident()),
            text: text.to_string(),
        });
    }

    output
}

/// Render a single declaration to tokens; the entry point of the derive
/// front end. Warnings ride along with success; errors replace the output.
pub fn render_declaration(
    decl: &TypeDecl,
) -> Result<(TokenStream, Vec<Diagnostic>), Vec<Diagnostic>> {
    let violations = adapter::shape_violations(decl);
    if !violations.is_empty() {
        return Err(violations);
    }

    let (state, diagnostics) = match build_one(decl) {
        Ok(built) => built,
        Err(err) => return Err(vec![diagnostic_for(decl, &err)]),
    };

    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(diagnostics);
    }

    Ok((generate::entity_tokens(&state), diagnostics))
}

fn build_states(
    compilation: &Compilation,
    cancel: &CancelToken,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Entry> {
    let mut entries = Vec::new();

    for decl in &compilation.types {
        if cancel.is_cancelled() {
            break;
        }
        if !adapter::is_candidate(decl) {
            continue;
        }

        let violations = adapter::shape_violations(decl);
        if !violations.is_empty() {
            diagnostics.extend(violations);
            continue;
        }

        // Unexpected failures while walking one type are contained here.
        let built = catch_unwind(AssertUnwindSafe(|| build_one(decl)));

        match built {
            Ok(Ok((state, mut type_diagnostics))) => {
                let has_error = type_diagnostics.iter().any(Diagnostic::is_error);
                diagnostics.append(&mut type_diagnostics);
                entries.push(Entry { state, has_error });
            }
            Ok(Err(err)) => {
                diagnostics.push(diagnostic_for(decl, &err));
            }
            Err(payload) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::InternalError,
                    format!(
                        "error during code analysis of `{}`: {}",
                        decl.path,
                        panic_message(payload.as_ref())
                    ),
                    decl.location.clone(),
                ));
            }
        }
    }

    entries
}

fn build_one(decl: &TypeDecl) -> Result<(EntityState, Vec<Diagnostic>), SymbolError> {
    match decl.marker {
        Some(TypeMarker::SmartEnum) => {
            let (state, diagnostics) = EnumEntityState::build(decl)?;
            Ok((EntityState::Enum(state), diagnostics))
        }
        Some(TypeMarker::ValueObject) => {
            let (state, diagnostics) = ValueObjectEntityState::build(decl)?;
            Ok((EntityState::ValueObject(state), diagnostics))
        }
        Some(TypeMarker::Union) => {
            let (state, diagnostics) = UnionEntityState::build(decl)?;
            Ok((EntityState::Union(state), diagnostics))
        }
        None => unreachable!("non-candidates are filtered before state construction"),
    }
}

/// Link same-compilation base enums through the type-identity comparator.
/// Chains resolve over multiple passes; deeper-first ordering is not
/// required of the input.
fn link_bases(entries: &mut [Entry], diagnostics: &mut Vec<Diagnostic>) {
    loop {
        let mut progressed = false;

        // Snapshot of resolvable bases: error-free enums with no pending
        // link of their own.
        let resolved: HashMap<TypeIdentity, EnumEntityState> = entries
            .iter()
            .filter_map(|entry| match &entry.state {
                EntityState::Enum(state) if !entry.has_error && !state.has_pending_base() => {
                    Some((TypeIdentity::from(state), state.clone()))
                }
                _ => None,
            })
            .collect();

        for entry in entries.iter_mut() {
            let EntityState::Enum(state) = &entry.state else {
                continue;
            };
            let Some(pending) = state.pending_base.clone() else {
                continue;
            };
            let Some(base) = resolved.get(&TypeIdentity(pending)) else {
                continue;
            };

            if !base.settings.extensible {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::NonExtensibleBase,
                    format!(
                        "`{}` derives from `{}`, which is not marked extensible",
                        state.path, base.path
                    ),
                    state.location.clone(),
                ));
            }

            match state.resolve_base(base) {
                Ok(linked) => {
                    entry.state = EntityState::Enum(linked);
                    progressed = true;
                }
                Err(err) => {
                    diagnostics.push(Diagnostic::error(
                        symbol_error_code(&err),
                        err.to_string(),
                        state.location.clone(),
                    ));
                    entry.has_error = true;
                }
            }
        }

        if !progressed {
            break;
        }
    }

    // Whatever is still pending has no resolvable base in this batch.
    for entry in entries.iter_mut() {
        let EntityState::Enum(state) = &entry.state else {
            continue;
        };
        if let Some(pending) = &state.pending_base
            && !entry.has_error
        {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::UnknownBaseEnum,
                format!("`{}` declares unknown base enum `{pending}`", state.path),
                state.location.clone(),
            ));
            entry.has_error = true;
        }
    }
}

/// Record derived-type names on base snapshots, input order preserved.
fn attach_derived(entries: &mut [Entry]) {
    let mut derived_by_base: HashMap<String, Vec<String>> = HashMap::new();

    for entry in entries.iter() {
        if let EntityState::Enum(state) = &entry.state
            && let Some(base) = &state.base
        {
            derived_by_base
                .entry(base.path.clone())
                .or_default()
                .push(state.path.clone());
        }
    }

    for entry in entries.iter_mut() {
        if let EntityState::Enum(state) = &entry.state
            && let Some(derived) = derived_by_base.get(&state.path)
        {
            entry.state = EntityState::Enum(state.with_derived(derived.clone()));
        }
    }
}

fn diagnostic_for(decl: &TypeDecl, err: &SymbolError) -> Diagnostic {
    Diagnostic::error(symbol_error_code(err), err.to_string(), decl.location.clone())
}

const fn symbol_error_code(err: &SymbolError) -> DiagnosticCode {
    match err {
        SymbolError::MissingArgument { .. } => DiagnosticCode::MissingKeyType,
        SymbolError::MalformedArgument { .. } => DiagnosticCode::MalformedAttribute,
        SymbolError::CtorArityMismatch { .. } => DiagnosticCode::CtorArgsArityMismatch,
        SymbolError::ReservedKeyName { .. } => DiagnosticCode::InvalidKeyName,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "unknown panic".to_string())
        },
        |message| (*message).to_string(),
    )
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{
        AttrBag, AttrValue, BaseEnumDecl, BaseOrigin, Location, MemberDecl, MemberKind,
        SpecialType, TypeRef, Visibility,
    };

    fn item(name: &str, key: &str) -> MemberDecl {
        let mut attrs = AttrBag::default();
        attrs.set("key", AttrValue::Str(key.to_string()));
        attrs.set("args", AttrValue::List(Vec::new()));

        MemberDecl {
            name: name.to_string(),
            ty: TypeRef::SelfType,
            kind: MemberKind::Field,
            visibility: Visibility::Public,
            is_static: true,
            is_readonly: true,
            attrs,
            location: Location::default(),
        }
    }

    fn enum_decl(path: &str, ident: &str, items: Vec<MemberDecl>) -> TypeDecl {
        TypeDecl {
            path: path.to_string(),
            ident: ident.to_string(),
            marker: Some(TypeMarker::SmartEnum),
            is_partial: true,
            generic_params: 0,
            is_abstract: false,
            has_layout_attr: false,
            has_custom_serde: false,
            has_custom_candid: false,
            has_custom_storable: false,
            members: items,
            key_type: Some(TypeRef::Special(SpecialType::Text)),
            attrs: AttrBag::default(),
            base_enum: None,
            location: Location::new("src/colors.rs", 1, 1),
        }
    }

    fn compilation() -> Compilation {
        let mut base = enum_decl(
            "crate::Color",
            "Color",
            vec![item("Red", "red"), item("Green", "green")],
        );
        base.attrs.set("extensible", AttrValue::Bool(true));

        let mut derived = enum_decl("crate::ExtendedColor", "ExtendedColor", vec![item("Blue", "blue")]);
        derived.base_enum = Some(BaseEnumDecl {
            path: "crate::Color".to_string(),
            minimal: "Color".to_string(),
            origin: BaseOrigin::SameCompilation,
            nullable: false,
            items: Vec::new(),
            ctor_args: Vec::new(),
        });

        Compilation::new(vec![base, derived])
    }

    #[test]
    fn run_is_deterministic() {
        let options = PipelineOptions {
            use_render_cache: false,
        };

        let first = run(&compilation(), &options, &CancelToken::new());
        let second = run(&compilation(), &options, &CancelToken::new());

        assert_eq!(first.files, second.files);
        assert_eq!(first.diagnostics, second.diagnostics);
        assert_eq!(first.files.len(), 2);
    }

    #[test]
    fn declaration_order_does_not_change_per_type_output() {
        let options = PipelineOptions {
            use_render_cache: false,
        };

        let forward = run(&compilation(), &options, &CancelToken::new());

        let mut reversed_input = compilation();
        reversed_input.types.reverse();
        let reversed = run(&reversed_input, &options, &CancelToken::new());

        let find = |output: &PipelineOutput, name: &str| {
            output
                .files
                .iter()
                .find(|file| file.name == name)
                .map(|file| file.text.clone())
        };

        assert_eq!(
            find(&forward, "ExtendedColor.g.rs"),
            find(&reversed, "ExtendedColor.g.rs")
        );
    }

    #[test]
    fn derived_enum_inlines_base_items() {
        let options = PipelineOptions {
            use_render_cache: false,
        };
        let output = run(&compilation(), &options, &CancelToken::new());

        let derived = output
            .files
            .iter()
            .find(|file| file.name == "ExtendedColor.g.rs")
            .unwrap();
        assert!(derived.text.contains("\"red\""));
        assert!(derived.text.contains("\"blue\""));
    }

    #[test]
    fn unknown_base_is_a_diagnostic_not_an_abort() {
        let mut orphan = enum_decl("crate::Orphan", "Orphan", vec![item("A", "a")]);
        orphan.base_enum = Some(BaseEnumDecl {
            path: "crate::DoesNotExist".to_string(),
            minimal: "DoesNotExist".to_string(),
            origin: BaseOrigin::SameCompilation,
            nullable: false,
            items: Vec::new(),
            ctor_args: Vec::new(),
        });
        let healthy = enum_decl("crate::Healthy", "Healthy", vec![item("B", "b")]);

        let output = run(
            &Compilation::new(vec![orphan, healthy]),
            &PipelineOptions {
                use_render_cache: false,
            },
            &CancelToken::new(),
        );

        assert!(output
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::UnknownBaseEnum));
        assert_eq!(output.files.len(), 1);
        assert_eq!(output.files[0].name, "Healthy.g.rs");
    }

    #[test]
    fn malformed_sibling_does_not_block_generation() {
        let mut malformed = enum_decl("crate::Broken", "Broken", vec![item("A", "a")]);
        malformed
            .attrs
            .set("operators", AttrValue::Str("sideways".to_string()));
        let healthy = enum_decl("crate::Healthy", "Healthy", vec![item("B", "b")]);

        let output = run(
            &Compilation::new(vec![malformed, healthy]),
            &PipelineOptions {
                use_render_cache: false,
            },
            &CancelToken::new(),
        );

        assert!(output
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MalformedAttribute));
        assert_eq!(output.files.len(), 1);
    }

    #[test]
    fn cancellation_discards_remaining_types() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let output = run(
            &compilation(),
            &PipelineOptions {
                use_render_cache: false,
            },
            &cancel,
        );

        assert!(output.files.is_empty());
    }

    #[test]
    fn unchanged_snapshots_reuse_the_cached_render() {
        let options = PipelineOptions {
            use_render_cache: true,
        };

        let first = run(&compilation(), &options, &CancelToken::new());
        let second = run(&compilation(), &options, &CancelToken::new());

        // Idempotent regeneration: textually identical output.
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn shape_violations_surface_with_the_declaration_location() {
        let mut generic = enum_decl("crate::Bad", "Bad", vec![item("A", "a")]);
        generic.generic_params = 2;

        let output = run(
            &Compilation::new(vec![generic]),
            &PipelineOptions {
                use_render_cache: false,
            },
            &CancelToken::new(),
        );

        let diag = &output.diagnostics[0];
        assert_eq!(diag.code, DiagnosticCode::GenericNotSupported);
        assert_eq!(diag.location.file, "src/colors.rs");
    }
}
