//! # Markup Document Model
//!
//! A parsed markup document is a tree of [`MarkupElement`]s under a single
//! root. Only two facts are kept per element: its tag (widget kind) and its
//! optional declared `name`. Elements without a name are structural only and
//! never produce bindings.
//!
//! Every owner class is paired with exactly one document by the sibling-file
//! convention: `Views/LoginView.cs` ↔ `Views/LoginView.uxml`. Generated code
//! for that owner goes to `Views/LoginView.g.cs`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::validate::GenerationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupElement {
    /// Widget type name as written in markup, without namespace prefix.
    pub tag: String,
    pub declared_name: Option<String>,
    pub children: Vec<MarkupElement>,
}

impl MarkupElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            declared_name: None,
            children: Vec::new(),
        }
    }

    pub fn named(tag: &str, name: &str) -> Self {
        Self {
            declared_name: Some(name.to_string()),
            ..Self::new(tag)
        }
    }

    pub fn with_children(mut self, children: Vec<MarkupElement>) -> Self {
        self.children = children;
        self
    }

    /// All elements beneath this one, in document (pre-)order.
    /// The element itself is not included.
    pub fn descendants(&self) -> Vec<&MarkupElement> {
        fn collect<'a>(element: &'a MarkupElement, out: &mut Vec<&'a MarkupElement>) {
            for child in &element.children {
                out.push(child);
                collect(child, out);
            }
        }

        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupDocument {
    /// File base name, e.g. `LoginView` for `LoginView.uxml`.
    pub name: String,
    pub path: String,
    pub root: MarkupElement,
}

impl MarkupDocument {
    /// Named descendants of the root, in document order. These are the
    /// candidates for binding; the root is handled separately.
    pub fn named_descendants(&self) -> impl Iterator<Item = (&MarkupElement, &str)> {
        self.root
            .descendants()
            .into_iter()
            .filter_map(|el| el.declared_name.as_deref().map(|name| (el, name)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIBLING FILES
// ═══════════════════════════════════════════════════════════════════════════════

/// Paths that belong to one owner source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAsset {
    /// Document name (the owner file's base name).
    pub name: String,
    pub source_path: PathBuf,
    pub markup_path: PathBuf,
    pub output_path: PathBuf,
}

impl DocumentAsset {
    /// Derive the sibling markup and output paths for an owner source file.
    ///
    /// Fails with `InvalidArgument` when the path does not carry the
    /// configured source extension, i.e. is not a realized script on disk.
    pub fn for_owner(source_path: &Path, config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let has_source_ext = source_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == config.source_extension)
            .unwrap_or(false);
        if !has_source_ext {
            return Err(GenerationError::InvalidArgument {
                argument: "source_path",
                reason: format!(
                    "'{}' must be a .{} script on disk",
                    source_path.display(),
                    config.source_extension
                ),
            });
        }

        let name = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .ok_or_else(|| GenerationError::InvalidArgument {
                argument: "source_path",
                reason: format!("'{}' has no file name", source_path.display()),
            })?;

        let markup_path = source_path.with_extension(&config.markup_extension);
        let output_path = source_path.with_file_name(format!("{}{}", name, config.output_suffix));

        Ok(Self {
            name,
            source_path: source_path.to_path_buf(),
            markup_path,
            output_path,
        })
    }
}
