//! Error taxonomy and diagnostics for binding generation.
//!
//! Every failure and warning the pipeline can produce has a stable code and a
//! guarantee string describing the invariant it protects. Hosts receive
//! errors as [`GenerationError`] and warnings as [`Diagnostic`] values.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;
use unicode_ident::{is_xid_continue, is_xid_start};

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_INVALID_ARGUMENT: &str = "UXB-ERR-ARGUMENT";
pub const ERR_CONFIGURATION: &str = "UXB-ERR-CONFIG";
pub const ERR_READ: &str = "UXB-ERR-READ";
pub const ERR_PARSE: &str = "UXB-ERR-PARSE";
pub const ERR_DUPLICATE_BINDING: &str = "UXB-ERR-DUPLICATE";
pub const ERR_INVALID_IDENTIFIER: &str = "UXB-ERR-IDENTIFIER";
pub const ERR_RESERVED_MEMBER: &str = "UXB-ERR-RESERVED";
pub const WARN_UNRESOLVED_TYPE: &str = "UXB-WARN-UNRESOLVED-TYPE";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_INVALID_ARGUMENT => "Generation is only attempted for well-formed requests.",
        ERR_CONFIGURATION => {
            "Generated members always integrate with the owner's root property and initializer."
        }
        ERR_READ => "Every owner class is bound to its sibling markup document.",
        ERR_PARSE => "Bindings are only generated from well-formed markup.",
        ERR_DUPLICATE_BINDING => "No two generated properties share a name.",
        ERR_INVALID_IDENTIFIER => "Every generated property name is a valid identifier.",
        ERR_RESERVED_MEMBER => {
            "Generated properties never collide with the root property or initializer."
        }
        WARN_UNRESOLVED_TYPE => "Only elements with a known widget type are bound.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A structured, reportable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    /// Original declared name of the element the diagnostic is about, if any.
    pub element: Option<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: &str, severity: Severity, message: &str, file: &str) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            element: None,
            hints: vec![],
        }
    }

    pub fn warning(code: &str, message: &str, file: &str) -> Self {
        Self::new(code, Severity::Warning, message, file)
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hints.push(hint.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// A set of elements whose names normalize to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub identifier: String,
    pub original_names: Vec<String>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read markup document {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse markup document {path}: {message}")]
    Parse { path: String, message: String },

    #[error(
        "failed to generate bindings for document {document} because of duplicate properties: {}",
        describe_conflicts(.conflicts)
    )]
    DuplicateBinding {
        document: String,
        conflicts: Vec<DuplicateGroup>,
    },

    #[error(
        "element '{original_name}' in document {document} normalizes to '{identifier}', which is not a valid identifier"
    )]
    InvalidIdentifier {
        document: String,
        original_name: String,
        identifier: String,
    },

    #[error("element '{original_name}' in document {document} collides with generated member '{member}'")]
    ReservedMember {
        document: String,
        original_name: String,
        member: String,
    },
}

fn describe_conflicts(conflicts: &[DuplicateGroup]) -> String {
    conflicts
        .iter()
        .map(|group| {
            format!(
                "conflict detected between {} (as '{}')",
                group.original_names.join(", "),
                group.identifier
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::InvalidArgument { .. } => ERR_INVALID_ARGUMENT,
            GenerationError::Configuration(_) => ERR_CONFIGURATION,
            GenerationError::Read { .. } => ERR_READ,
            GenerationError::Parse { .. } => ERR_PARSE,
            GenerationError::DuplicateBinding { .. } => ERR_DUPLICATE_BINDING,
            GenerationError::InvalidIdentifier { .. } => ERR_INVALID_IDENTIFIER,
            GenerationError::ReservedMember { .. } => ERR_RESERVED_MEMBER,
        }
    }

    /// Errors that only fail one document; everything else is a setup defect.
    pub fn is_document_local(&self) -> bool {
        !matches!(
            self,
            GenerationError::Configuration(_) | GenerationError::InvalidArgument { .. }
        )
    }

    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(self.code(), Severity::Error, &self.to_string(), file);
        match self {
            GenerationError::DuplicateBinding { conflicts, .. } => {
                for group in conflicts {
                    diagnostic = diagnostic.with_hint(&format!(
                        "rename one of {} so they normalize to different names",
                        group.original_names.join(", ")
                    ));
                }
            }
            GenerationError::InvalidIdentifier { original_name, .. }
            | GenerationError::ReservedMember { original_name, .. } => {
                diagnostic = diagnostic.with_element(original_name);
            }
            _ => {}
        }
        diagnostic
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    /// Reserved keywords of the target language. Contextual keywords
    /// (`var`, `async`, `record`, ...) are legal identifiers and not listed.
    static ref RESERVED_KEYWORDS: HashSet<&'static str> = [
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char",
        "checked", "class", "const", "continue", "decimal", "default", "delegate", "do",
        "double", "else", "enum", "event", "explicit", "extern", "false", "finally",
        "fixed", "float", "for", "foreach", "goto", "if", "implicit", "in", "int",
        "interface", "internal", "is", "lock", "long", "namespace", "new", "null",
        "object", "operator", "out", "override", "params", "private", "protected",
        "public", "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof",
        "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
        "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using",
        "virtual", "void", "volatile", "while",
    ]
    .into_iter()
    .collect();
}

pub fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(name)
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || is_xid_start(c)
}

/// Letters, decimal digits, connector punctuation and combining marks.
/// XID_Continue also admits a few punctuation and other-number code points
/// the target language rejects.
fn is_identifier_continue(c: char) -> bool {
    is_xid_continue(c) && !matches!(c, '\u{b7}' | '\u{387}' | '\u{1369}'..='\u{1371}' | '\u{19da}')
}

/// Whether `name` is usable as a member or type name in generated code.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => {}
        _ => return false,
    }
    chars.all(is_identifier_continue) && !is_reserved_keyword(name)
}

/// Whether `name` is a dotted sequence of valid identifiers.
pub fn is_valid_qualified_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_valid_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validity() {
        assert!(is_valid_identifier("SubmitButton"));
        assert!(is_valid_identifier("_root"));
        assert!(is_valid_identifier("Élan2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier("my-name"));
        assert!(!is_valid_identifier("has space"));
    }

    #[test]
    fn test_identifier_rejects_other_numbers_and_punctuation() {
        assert!(!is_valid_identifier("a½"));
        assert!(!is_valid_identifier("A²"));
        assert!(!is_valid_identifier("a·b"));
        assert!(is_valid_identifier("a_b"));
        assert!(is_valid_identifier("é\u{301}"));
        assert!(is_valid_identifier("Item٣"));
    }

    #[test]
    fn test_identifier_rejects_keywords() {
        assert!(!is_valid_identifier("void"));
        assert!(!is_valid_identifier("event"));
        assert!(!is_valid_identifier("class"));
        assert!(is_valid_identifier("Void"));
        assert!(is_valid_identifier("var"));
        assert!(is_valid_identifier("record"));
        assert!(!is_valid_qualified_name("App.event"));
        assert!(is_valid_qualified_name("App.Events"));
    }

    #[test]
    fn test_qualified_name_validity() {
        assert!(is_valid_qualified_name("App.UI"));
        assert!(is_valid_qualified_name("App"));
        assert!(!is_valid_qualified_name(""));
        assert!(!is_valid_qualified_name("App..UI"));
        assert!(!is_valid_qualified_name(".App"));
    }

    #[test]
    fn test_duplicate_error_names_all_conflicts() {
        let err = GenerationError::DuplicateBinding {
            document: "LoginView".to_string(),
            conflicts: vec![DuplicateGroup {
                identifier: "FooBar".to_string(),
                original_names: vec!["Foo Bar".to_string(), "FooBar".to_string()],
            }],
        };
        let message = err.to_string();
        assert!(message.contains("Foo Bar, FooBar"));
        assert_eq!(err.code(), ERR_DUPLICATE_BINDING);
        assert!(err.is_document_local());

        let diagnostic = err.to_diagnostic("LoginView.uxml");
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.hints.len(), 1);
        assert_eq!(diagnostic.guarantee, "No two generated properties share a name.");
    }

    #[test]
    fn test_configuration_error_is_not_document_local() {
        let err = GenerationError::Configuration("missing root property name".to_string());
        assert!(!err.is_document_local());
        assert_eq!(err.code(), ERR_CONFIGURATION);
    }

    #[test]
    fn test_warning_diagnostic() {
        let d = Diagnostic::warning(WARN_UNRESOLVED_TYPE, "unknown tag", "a.uxml").with_element("Extra");
        assert!(!d.is_error());
        assert_eq!(d.element.as_deref(), Some("Extra"));
        assert_eq!(d.guarantee, "Only elements with a known widget type are bound.");
    }
}
