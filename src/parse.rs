//! Parse Module
//!
//! Reads a markup document into a [`MarkupDocument`]. Only the element tag
//! (local name, namespace prefix dropped) and the `name` attribute are
//! extracted; every other attribute, text, comment and processing
//! instruction is ignored.

use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::debug;
use xml5ever::driver::{parse_document, XmlParseOpts};
use xml5ever::tendril::TendrilSink;

use crate::document::{MarkupDocument, MarkupElement};
use crate::validate::GenerationError;

const NAME_ATTRIBUTE: &str = "name";
const UTF8_BOM: char = '\u{feff}';

lazy_static! {
    static ref COMMENT_OR_CDATA_RE: Regex = Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>").unwrap();
    static ref ENTITY_RE: Regex =
        Regex::new(r"^&(?:[A-Za-z_][A-Za-z0-9_.-]*|#[0-9]+|#x[0-9A-Fa-f]+);").unwrap();
}

/// Parse a markup document from disk. The document name is the file's
/// base name.
pub fn parse_document_file(path: &Path) -> Result<MarkupDocument, GenerationError> {
    let source = fs::read_to_string(path).map_err(|source| GenerationError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| GenerationError::Parse {
            path: path.display().to_string(),
            message: "markup file has no base name".to_string(),
        })?;

    parse_markup(&source, &name, &path.to_string_lossy())
}

/// Parse markup text that has already been loaded.
pub fn parse_markup(source: &str, name: &str, path: &str) -> Result<MarkupDocument, GenerationError> {
    let source = source.trim_start_matches(UTF8_BOM);

    let dom = parse_document(RcDom::default(), XmlParseOpts::default())
        .from_utf8()
        .read_from(&mut source.as_bytes())
        .map_err(|e| GenerationError::Parse {
            path: path.to_string(),
            message: format!("failed to read markup: {}", e),
        })?;

    if let Some(error) = dom.errors.first() {
        return Err(GenerationError::Parse {
            path: path.to_string(),
            message: error.to_string(),
        });
    }

    check_entities(source, path)?;

    let root_handle = dom
        .document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .ok_or_else(|| GenerationError::Parse {
            path: path.to_string(),
            message: "document has no root element".to_string(),
        })?;

    check_root_closed(source, &root_handle, path)?;

    let root = convert_element(&root_handle).ok_or_else(|| GenerationError::Parse {
        path: path.to_string(),
        message: "document has no root element".to_string(),
    })?;

    debug!(document = %path, elements = root.descendants().len(), "parsed markup document");

    Ok(MarkupDocument {
        name: name.to_string(),
        path: path.to_string(),
        root,
    })
}

/// Every `&` outside comments and CDATA sections must start an entity or
/// character reference.
fn check_entities(source: &str, path: &str) -> Result<(), GenerationError> {
    let text = COMMENT_OR_CDATA_RE.replace_all(source, "");
    for (offset, _) in text.match_indices('&') {
        if !ENTITY_RE.is_match(&text[offset..]) {
            return Err(GenerationError::Parse {
                path: path.to_string(),
                message: "unescaped '&' outside an entity reference".to_string(),
            });
        }
    }
    Ok(())
}

/// Strip trailing whitespace, comments and processing instructions.
fn trim_trailing_misc(source: &str) -> &str {
    let mut rest = source.trim_end();
    loop {
        let stripped = if rest.ends_with("-->") {
            rest.rfind("<!--").map(|start| &rest[..start])
        } else if rest.ends_with("?>") {
            rest.rfind("<?").map(|start| &rest[..start])
        } else {
            None
        };
        match stripped {
            Some(before) => rest = before.trim_end(),
            None => return rest,
        }
    }
}

/// The tree builder closes elements left open at end of input without
/// reporting it, so a truncated document would still produce a tree. The
/// root element must be explicitly closed as the last thing in the source:
/// either by its end tag or, when it has no children, as an empty tag.
fn check_root_closed(source: &str, root: &Handle, path: &str) -> Result<(), GenerationError> {
    let NodeData::Element { name, .. } = &root.data else {
        return Ok(());
    };
    let local = name.local.to_string();

    let tail = trim_trailing_misc(source);
    let end_tag = Regex::new(&format!(r"</(?:[^\s<>/:]+:)?{}\s*>\z", regex::escape(&local)))
        .map_err(|e| GenerationError::Parse {
            path: path.to_string(),
            message: format!("invalid root element name: {}", e),
        })?;
    let closed_by_end_tag = end_tag.is_match(tail);
    let has_children = !root.children.borrow().is_empty();
    let closed_as_empty = !has_children && tail.ends_with("/>");

    if closed_by_end_tag || closed_as_empty {
        Ok(())
    } else {
        Err(GenerationError::Parse {
            path: path.to_string(),
            message: format!("unexpected end of document, <{}> is not closed", local),
        })
    }
}

/// Convert a DOM element (and its element children) into a `MarkupElement`.
/// Returns `None` for non-element nodes.
fn convert_element(handle: &Handle) -> Option<MarkupElement> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };

    let declared_name = attrs
        .borrow()
        .iter()
        .find(|attr| attr.name.local.to_string() == NAME_ATTRIBUTE)
        .map(|attr| attr.value.to_string());

    let children = handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_element)
        .collect();

    Some(MarkupElement {
        tag: name.local.to_string(),
        declared_name,
        children,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
