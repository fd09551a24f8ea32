//! Pipeline entry points.
//!
//! `generate_document` is the pure core: synthesize, resolve the namespace,
//! emit. `generate_for_owner` adds the sibling-file I/O and
//! `generate_batch` fans a set of owners out over a thread pool. Every
//! document gets its own `Result`; one failure never affects its siblings.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::codegen::emit;
use crate::config::{GeneratorConfig, NamingConfig};
use crate::discovery::OwnerDeclaration;
use crate::document::{DocumentAsset, MarkupDocument};
use crate::finalize::{BatchReport, DocumentOutcome};
use crate::parse::parse_document_file;
use crate::scope::{resolve_namespace, ScopeChain};
use crate::transform::synthesize;
use crate::validate::{Diagnostic, GenerationError};

/// Everything the pipeline needs to know about the class receiving bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    pub class_name: String,
    pub scope_chain: ScopeChain,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub source_text: String,
    /// Sibling output file, when the result came from an owner on disk.
    pub output_path: Option<PathBuf>,
    /// Name a compiler host registers the source under, e.g. `LoginView.g`.
    pub hint_name: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate bindings for an already parsed document. No I/O.
pub fn generate_document(
    owner: &OwnerContext,
    document: &MarkupDocument,
) -> Result<GenerationResult, GenerationError> {
    let bindings = synthesize(document, &owner.naming)?;
    let namespace = resolve_namespace(&owner.scope_chain);
    let source_text = emit(&owner.class_name, &namespace, &bindings)?;

    debug!(
        owner = %owner.class_name,
        namespace = %namespace,
        properties = bindings.properties.len(),
        "generated bindings"
    );

    Ok(GenerationResult {
        source_text,
        output_path: None,
        hint_name: format!("{}.g", owner.class_name),
        diagnostics: bindings.diagnostics,
    })
}

/// Generate bindings for a discovered owner, reading its sibling markup file.
pub fn generate_for_owner(
    owner: &OwnerDeclaration,
    config: &GeneratorConfig,
    naming: &NamingConfig,
) -> Result<GenerationResult, GenerationError> {
    let asset = DocumentAsset::for_owner(&owner.source_path, config)?;
    let document = parse_document_file(&asset.markup_path)?;

    let context = owner.context(naming.clone());
    let mut result = generate_document(&context, &document)?;
    result.output_path = Some(asset.output_path);
    Ok(result)
}

/// Generate bindings for every owner.
///
/// The configuration is validated first; a configuration error fails the
/// whole batch before any document is touched. After that, each owner is
/// processed independently and in parallel, and the report lists outcomes
/// in input order.
pub fn generate_batch(
    owners: &[OwnerDeclaration],
    config: &GeneratorConfig,
) -> Result<BatchReport, GenerationError> {
    let naming = config.validate()?;

    let outcomes: Vec<DocumentOutcome> = owners
        .par_iter()
        .map(|owner| {
            let result = generate_for_owner(owner, config, &naming);
            if let Err(e) = &result {
                warn!(owner = %owner.class_name, path = %owner.source_path.display(), error = %e, "binding generation failed");
            }
            DocumentOutcome {
                owner: owner.class_name.clone(),
                source_path: owner.source_path.clone(),
                result,
            }
        })
        .collect();

    let report = BatchReport { outcomes };
    info!(
        succeeded = report.succeeded().count(),
        failed = report.failed().count(),
        "binding generation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MarkupElement;
    use crate::scope::Scope;

    fn owner(namespaces: &[&str]) -> OwnerContext {
        OwnerContext {
            class_name: "LoginView".to_string(),
            scope_chain: ScopeChain::from_outermost(
                namespaces.iter().map(|n| Scope::Namespace(n.to_string())).collect(),
            ),
            naming: NamingConfig::new("Root", "Bind").unwrap(),
        }
    }

    fn document() -> MarkupDocument {
        MarkupDocument {
            name: "LoginView".to_string(),
            path: "LoginView.uxml".to_string(),
            root: MarkupElement::new("VisualElement").with_children(vec![
                MarkupElement::named("Button", "SubmitButton"),
                MarkupElement::named("MyWidget", "Extra"),
            ]),
        }
    }

    #[test]
    fn test_generate_document() {
        let result = generate_document(&owner(&["App", "UI"]), &document()).unwrap();
        assert!(result.source_text.contains("namespace App.UI"));
        assert!(result.source_text.contains("SubmitButton"));
        assert!(!result.source_text.contains("Extra"));
        assert_eq!(result.hint_name, "LoginView.g");
        assert_eq!(result.output_path, None);
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_generate_document_propagates_duplicates() {
        let mut doc = document();
        doc.root.children.push(MarkupElement::named("Label", "submit-button"));
        let err = generate_document(&owner(&[]), &doc).unwrap_err();
        assert!(matches!(err, GenerationError::DuplicateBinding { .. }));
    }

    #[test]
    fn test_batch_rejects_bad_configuration_up_front() {
        let owners = vec![OwnerDeclaration {
            class_name: "LoginView".to_string(),
            source_path: PathBuf::from("does/not/exist/LoginView.cs"),
            scope_chain: ScopeChain::new(),
        }];
        let err = generate_batch(&owners, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let owners = vec![OwnerDeclaration {
            class_name: "LoginView".to_string(),
            source_path: PathBuf::from("does/not/exist/LoginView.cs"),
            scope_chain: ScopeChain::new(),
        }];
        let report = generate_batch(&owners, &GeneratorConfig::with_naming("Root", "Bind")).unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.has_errors());
        assert!(matches!(
            report.outcomes[0].result,
            Err(GenerationError::Read { .. })
        ));
    }
}
