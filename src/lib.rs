//! # UXML Bindings Generator
//!
//! Turns UI markup documents into strongly-typed C# partial classes. For an
//! owner class `LoginView` next to `LoginView.uxml`, every named element in
//! the markup becomes a typed property, plus a root-container property and
//! an initializer method that looks each element up by its original name.
//!
//! ## Pipeline
//!
//! 1. **Discovery** (`discovery`): find partial classes implementing the
//!    marker interface and record their enclosing scopes.
//! 2. **Parse** (`parse`): read the sibling markup file into a
//!    `MarkupDocument` tree.
//! 3. **Synthesize** (`transform`): resolve widget types, normalize names,
//!    reject duplicates and reserved names, build the `BindingSet`.
//! 4. **Emit** (`codegen`): render the compilation unit in the owner's
//!    namespace (`scope`).
//! 5. **Finalize** (`finalize`): collect per-document outcomes and write
//!    changed outputs.
//!
//! ## Guarantees
//!
//! - Output is deterministic for identical input.
//! - Documents are independent: a failure in one never blocks another.
//! - Elements whose widget type is unknown are skipped with a warning,
//!   never emitted with a guessed type.

mod codegen;
mod config;
mod discovery;
mod document;
mod finalize;
mod generate;
mod normalize;
mod parse;
mod scope;
mod transform;
mod validate;
mod widgets;


pub use codegen::{emit, generate_script_stub, string_literal};
pub use config::{GeneratorConfig, NamingConfig};
pub use discovery::{
    marker_naming, scan_declarations, scan_source, DeclarationKind, OwnerDeclaration, OwnerSource,
    ProjectScanner, TypeDeclaration,
};
pub use document::{DocumentAsset, MarkupDocument, MarkupElement};
pub use finalize::{
    write_if_changed, BatchReport, DocumentOutcome, DocumentStatus, DocumentSummary, WriteStatus,
};
pub use generate::{generate_batch, generate_document, generate_for_owner, GenerationResult, OwnerContext};
pub use normalize::to_pascal_case;
pub use parse::{parse_document_file, parse_markup};
pub use scope::{resolve_namespace, Scope, ScopeChain};
pub use transform::{
    resolve_properties, synthesize, Assignment, Binding, BindingSet, Initializer, ResolvedProperty,
    RootProperty, SetterAccess,
};
pub use validate::*;
pub use widgets::{resolve_widget_type, ROOT_CONTAINER_TYPE, WIDGET_NAMESPACE};
