//! Discovery Module
//!
//! Finds owner declarations in a project: partial classes whose base list
//! names the marker interface. A lightweight declaration scanner is enough
//! here; we only need type headers, namespace headers and brace nesting, not
//! a full C# parse.
//!
//! Also derives the naming configuration from the marker interface itself,
//! where members are tagged with `[GeneratorHelper(GeneratorTarget.…)]`.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{GeneratorConfig, NamingConfig};
use crate::generate::OwnerContext;
use crate::scope::{Scope, ScopeChain};
use crate::validate::GenerationError;

lazy_static! {
    static ref ATTRIBUTE_RE: Regex = Regex::new(r"\[[^\[\]]*\]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref NAMESPACE_RE: Regex =
        Regex::new(r"^namespace\s+([A-Za-z_][\w]*(?:\s*\.\s*[A-Za-z_][\w]*)*)$").unwrap();
    static ref TYPE_RE: Regex = Regex::new(
        r"^((?:[A-Za-z_]\w*\s+)*?)(class|struct|interface|record(?:\s+class|\s+struct)?)\s+([A-Za-z_]\w*)(.*)$"
    )
    .unwrap();
    static ref BASE_TOKEN_RE: Regex = Regex::new(r"[A-Za-z_]\w*").unwrap();
    static ref WHERE_CLAUSE_RE: Regex = Regex::new(r"\bwhere\b").unwrap();
    static ref GENERATOR_HELPER_RE: Regex = Regex::new(
        r"\[\s*(?:[\w.]+\.)?GeneratorHelper(?:Attribute)?\s*\(\s*(?:[\w.]+\.)?GeneratorTarget\s*\.\s*(\w+)\s*\)\s*\]\s*(?:(?:public|virtual|abstract|static)\s+)*[\w.<>\[\]?,]+\s+([A-Za-z_]\w*)"
    )
    .unwrap();
}

const ROOT_PROPERTY_TARGET: &str = "RootVisualElementProperty";
const INITIALIZE_METHOD_TARGET: &str = "InitializeBindingsMethod";

// ═══════════════════════════════════════════════════════════════════════════════
// OWNER DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerDeclaration {
    pub class_name: String,
    pub source_path: PathBuf,
    pub scope_chain: ScopeChain,
}

impl OwnerDeclaration {
    pub fn context(&self, naming: NamingConfig) -> OwnerContext {
        OwnerContext {
            class_name: self.class_name.clone(),
            scope_chain: self.scope_chain.clone(),
            naming,
        }
    }
}

/// Supplies the owner declarations for one generation pass.
pub trait OwnerSource {
    fn owners(&self) -> Result<Vec<OwnerDeclaration>, GenerationError>;
}

impl OwnerSource for Vec<OwnerDeclaration> {
    fn owners(&self) -> Result<Vec<OwnerDeclaration>, GenerationError> {
        Ok(self.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE BLANKING
// ═══════════════════════════════════════════════════════════════════════════════

fn blank(out: &mut String, c: char) {
    out.push(if c == '\n' { '\n' } else { ' ' });
}

/// Replace comments, string and char literals, and preprocessor lines with
/// spaces so braces and keywords inside them are not seen by the scanner.
/// Byte offsets are preserved for ASCII input; newlines are always kept.
fn blank_non_code(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut at_line_start = true;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        // Preprocessor directive
        if at_line_start && c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                blank(&mut out, chars[i]);
                i += 1;
            }
            continue;
        }

        if c == '/' && next == Some('/') {
            while i < chars.len() && chars[i] != '\n' {
                blank(&mut out, chars[i]);
                i += 1;
            }
            continue;
        }

        if c == '/' && next == Some('*') {
            blank(&mut out, c);
            blank(&mut out, '*');
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                blank(&mut out, chars[i]);
                i += 1;
            }
            if i < chars.len() {
                out.push_str("  ");
                i += 2;
            }
            continue;
        }

        // String literals, with optional $/@ prefixes
        let mut j = i;
        let mut verbatim = false;
        while j < chars.len() && (chars[j] == '$' || chars[j] == '@') {
            verbatim |= chars[j] == '@';
            j += 1;
        }
        if j < chars.len() && chars[j] == '"' {
            let mut quotes = 0;
            while j + quotes < chars.len() && chars[j + quotes] == '"' {
                quotes += 1;
            }
            let end = if quotes >= 3 {
                find_raw_string_end(&chars, j + quotes, quotes)
            } else {
                find_string_end(&chars, j + 1, verbatim)
            };
            for &ch in &chars[i..end] {
                blank(&mut out, ch);
            }
            i = end;
            at_line_start = false;
            continue;
        }

        if c == '\'' {
            let mut k = i + 1;
            while k < chars.len() && chars[k] != '\'' && chars[k] != '\n' {
                if chars[k] == '\\' {
                    k += 1;
                }
                k += 1;
            }
            let end = (k + 1).min(chars.len());
            for &ch in &chars[i..end] {
                blank(&mut out, ch);
            }
            i = end;
            at_line_start = false;
            continue;
        }

        out.push(c);
        if c == '\n' {
            at_line_start = true;
        } else if !c.is_whitespace() {
            at_line_start = false;
        }
        i += 1;
    }

    out
}

/// Index just past the closing quote of a regular or verbatim string whose
/// content starts at `start`.
fn find_string_end(chars: &[char], start: usize, verbatim: bool) -> usize {
    let mut k = start;
    while k < chars.len() {
        match chars[k] {
            '\\' if !verbatim => k += 2,
            '"' if verbatim && chars.get(k + 1) == Some(&'"') => k += 2,
            '"' => return k + 1,
            '\n' if !verbatim => return k,
            _ => k += 1,
        }
    }
    chars.len()
}

/// Index just past a raw string literal's closing quote run.
fn find_raw_string_end(chars: &[char], start: usize, quotes: usize) -> usize {
    let mut k = start;
    while k < chars.len() {
        if chars[k..].len() >= quotes && chars[k..k + quotes].iter().all(|&c| c == '"') {
            return k + quotes;
        }
        k += 1;
    }
    chars.len()
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATION SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Struct,
    Interface,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub is_partial: bool,
    /// Identifier tokens appearing in the base list.
    pub base_tokens: Vec<String>,
    /// Enclosing scopes, innermost first.
    pub scope_chain: ScopeChain,
    /// Byte range of the body, between the braces.
    pub body: Range<usize>,
}

impl TypeDeclaration {
    pub fn implements(&self, marker: &str) -> bool {
        self.base_tokens.iter().any(|t| t == marker)
    }
}

enum Frame {
    Namespace(String),
    Type(usize),
    Other,
}

enum Header {
    Namespace(String),
    Type {
        kind: DeclarationKind,
        name: String,
        is_partial: bool,
        base_tokens: Vec<String>,
    },
    Other,
}

/// Skip a leading bracketed group, nested groups included. Returns the text
/// after the matching close, or an empty string when it never closes.
fn skip_balanced(text: &str, open: char, close: char) -> &str {
    if !text.starts_with(open) {
        return text;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return &text[i + c.len_utf8()..];
            }
        }
    }
    ""
}

fn classify_header(raw: &str) -> Header {
    let without_attributes = ATTRIBUTE_RE.replace_all(raw, " ");
    let header = WHITESPACE_RE.replace_all(without_attributes.trim(), " ");

    if let Some(caps) = NAMESPACE_RE.captures(&header) {
        return Header::Namespace(WHITESPACE_RE.replace_all(&caps[1], "").to_string());
    }

    if let Some(caps) = TYPE_RE.captures(&header) {
        let modifiers = &caps[1];
        let kind = match &caps[2] {
            "class" => DeclarationKind::Class,
            "struct" => DeclarationKind::Struct,
            "interface" => DeclarationKind::Interface,
            _ => DeclarationKind::Record,
        };
        let rest = skip_balanced(caps[4].trim_start(), '<', '>');
        let rest = skip_balanced(rest.trim_start(), '(', ')').trim();
        let base_tokens = match rest.strip_prefix(':') {
            Some(bases) => {
                let bases = match WHERE_CLAUSE_RE.find(bases) {
                    Some(m) => &bases[..m.start()],
                    None => bases,
                };
                BASE_TOKEN_RE
                    .find_iter(bases)
                    .map(|m| m.as_str().to_string())
                    .collect()
            }
            None => Vec::new(),
        };
        return Header::Type {
            kind,
            name: caps[3].to_string(),
            is_partial: modifiers.split_whitespace().any(|m| m == "partial"),
            base_tokens,
        };
    }

    Header::Other
}

fn current_chain(file_namespace: Option<&str>, frames: &[Frame], decls: &[TypeDeclaration]) -> ScopeChain {
    let mut outermost_first: Vec<Scope> = Vec::new();
    if let Some(ns) = file_namespace {
        outermost_first.push(Scope::Namespace(ns.to_string()));
    }
    for frame in frames {
        match frame {
            Frame::Namespace(name) => outermost_first.push(Scope::Namespace(name.clone())),
            Frame::Type(index) => outermost_first.push(Scope::Type(decls[*index].name.clone())),
            Frame::Other => {}
        }
    }
    ScopeChain::from_outermost(outermost_first)
}

/// Scan C# source text for type declarations and their scope chains.
pub fn scan_declarations(source: &str) -> Vec<TypeDeclaration> {
    let code = blank_non_code(source);
    let mut decls: Vec<TypeDeclaration> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut file_namespace: Option<String> = None;
    let mut segment_start = 0;

    for (i, c) in code.char_indices() {
        match c {
            '{' => {
                let frame = match classify_header(&code[segment_start..i]) {
                    Header::Namespace(name) => Frame::Namespace(name),
                    Header::Type {
                        kind,
                        name,
                        is_partial,
                        base_tokens,
                    } => {
                        let scope_chain = current_chain(file_namespace.as_deref(), &frames, &decls);
                        decls.push(TypeDeclaration {
                            kind,
                            name,
                            is_partial,
                            base_tokens,
                            scope_chain,
                            body: i + 1..code.len(),
                        });
                        Frame::Type(decls.len() - 1)
                    }
                    Header::Other => Frame::Other,
                };
                frames.push(frame);
                segment_start = i + 1;
            }
            '}' => {
                if let Some(Frame::Type(index)) = frames.pop() {
                    decls[index].body.end = i;
                }
                segment_start = i + 1;
            }
            ';' => {
                if frames.is_empty() {
                    if let Header::Namespace(name) = classify_header(&code[segment_start..i]) {
                        file_namespace = Some(name);
                    }
                }
                segment_start = i + 1;
            }
            _ => {}
        }
    }

    decls
}

/// Owner declarations in one source file.
pub fn scan_source(source: &str, path: &Path, marker: &str) -> Vec<OwnerDeclaration> {
    scan_declarations(source)
        .into_iter()
        .filter(|d| d.kind == DeclarationKind::Class && d.is_partial && d.implements(marker))
        .map(|d| OwnerDeclaration {
            class_name: d.name,
            source_path: path.to_path_buf(),
            scope_chain: d.scope_chain,
        })
        .collect()
}

/// Names designated by `GeneratorHelper` attributes inside the marker
/// interface declared in `source`, as `(root property, initialize method)`.
/// Returns `None` when the marker interface is not declared in this source.
pub fn marker_naming(source: &str, marker: &str) -> Option<(Option<String>, Option<String>)> {
    let code = blank_non_code(source);
    let interface = scan_declarations(source)
        .into_iter()
        .find(|d| d.kind == DeclarationKind::Interface && d.name == marker)?;

    let body = &code[interface.body.clone()];
    let mut root = None;
    let mut init = None;
    for caps in GENERATOR_HELPER_RE.captures_iter(body) {
        match &caps[1] {
            ROOT_PROPERTY_TARGET => root = Some(caps[2].to_string()),
            INITIALIZE_METHOD_TARGET => init = Some(caps[2].to_string()),
            other => debug!(target = %other, "ignoring unknown generator target"),
        }
    }
    Some((root, init))
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROJECT SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Discovers owners by walking a project directory.
pub struct ProjectScanner {
    root: PathBuf,
    config: GeneratorConfig,
}

impl ProjectScanner {
    pub fn new(root: impl Into<PathBuf>, config: GeneratorConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Source files under the root, sorted, excluding configured directories
    /// and previously generated outputs.
    fn source_files(&self) -> Vec<PathBuf> {
        let exclude = &self.config.exclude;
        WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !exclude.iter().any(|ex| entry.file_name().to_str() == Some(ex.as_str()))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                let is_source = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e == self.config.source_extension)
                    .unwrap_or(false);
                let is_generated = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.ends_with(&self.config.output_suffix))
                    .unwrap_or(false);
                is_source && !is_generated
            })
            .collect()
    }

    fn read(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read source file");
                None
            }
        }
    }

    /// Naming designated by the marker interface declared somewhere in the
    /// project, if any.
    pub fn marker_naming(&self) -> Option<(Option<String>, Option<String>)> {
        self.source_files().iter().find_map(|path| {
            let source = Self::read(path)?;
            marker_naming(&source, &self.config.marker_interface)
        })
    }
}

impl OwnerSource for ProjectScanner {
    fn owners(&self) -> Result<Vec<OwnerDeclaration>, GenerationError> {
        if !self.root.is_dir() {
            return Err(GenerationError::InvalidArgument {
                argument: "root",
                reason: format!("'{}' is not a directory", self.root.display()),
            });
        }

        let mut owners = Vec::new();
        for path in self.source_files() {
            if let Some(source) = Self::read(&path) {
                owners.extend(scan_source(&source, &path, &self.config.marker_interface));
            }
        }
        debug!(root = %self.root.display(), owners = owners.len(), "discovered owner declarations");
        Ok(owners)
    }
}
