//! Codegen module
//!
//! Emits the C# compilation unit for a synthesized [`BindingSet`]: fixed
//! imports, an optional namespace block, and a preserved public partial
//! class holding the bound properties, the root property and the
//! initializer, in that order. Output is deterministic for identical input.

use std::path::Path;

use crate::generate::GenerationResult;
use crate::transform::{Binding, BindingSet, Initializer, RootProperty, SetterAccess};
use crate::validate::{is_valid_identifier, is_valid_qualified_name, GenerationError};
use crate::widgets::WIDGET_NAMESPACE;

const ENGINE_NAMESPACE: &str = "UnityEngine";
const PRESERVE_ATTRIBUTE: &str = "UnityEngine.Scripting.Preserve";
const ROOT_QUERY_METHOD: &str = "Q";
const INDENT: &str = "    ";

// ═══════════════════════════════════════════════════════════════════════════════
// WRITER
// ═══════════════════════════════════════════════════════════════════════════════

struct CodeWriter {
    output: String,
    indent_level: usize,
}

impl CodeWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    fn open_block(&mut self) {
        self.line("{");
        self.indent_level += 1;
    }

    fn close_block(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.output
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LITERALS
// ═══════════════════════════════════════════════════════════════════════════════

/// Quote `value` as a regular C# string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn accessors(setter: SetterAccess) -> &'static str {
    match setter {
        SetterAccess::Public => "{ get; set; }",
        SetterAccess::Private => "{ get; private set; }",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBERS
// ═══════════════════════════════════════════════════════════════════════════════

fn emit_property(w: &mut CodeWriter, binding: &Binding) {
    w.line(&format!(
        "public {} {} {}",
        binding.property_type,
        binding.property_name,
        accessors(binding.setter)
    ));
}

fn emit_root_property(w: &mut CodeWriter, root: &RootProperty) {
    w.line(&format!(
        "public {} {} {}",
        root.property_type,
        root.name,
        accessors(root.setter)
    ));
}

fn emit_initializer(w: &mut CodeWriter, initializer: &Initializer) {
    w.line(&format!("public void {}()", initializer.name));
    w.open_block();
    for assignment in &initializer.assignments {
        w.line(&format!(
            "{} = ({}){}?.{}({});",
            assignment.target,
            assignment.cast_type,
            initializer.root_property,
            ROOT_QUERY_METHOD,
            string_literal(&assignment.lookup_name)
        ));
    }
    w.close_block();
}

fn emit_usings(w: &mut CodeWriter, namespaces: &[&str]) {
    for ns in namespaces {
        w.line(&format!("using {};", ns));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILATION UNIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Emit the compilation unit for `owner` in `namespace` (empty for the
/// global namespace).
pub fn emit(owner: &str, namespace: &str, bindings: &BindingSet) -> Result<String, GenerationError> {
    if !is_valid_identifier(owner) {
        return Err(GenerationError::InvalidArgument {
            argument: "owner",
            reason: format!("'{}' is not a valid class name", owner),
        });
    }
    if !namespace.is_empty() && !is_valid_qualified_name(namespace) {
        return Err(GenerationError::InvalidArgument {
            argument: "namespace",
            reason: format!("'{}' is not a valid namespace", namespace),
        });
    }

    let mut w = CodeWriter::new();
    emit_usings(&mut w, &[ENGINE_NAMESPACE, WIDGET_NAMESPACE]);
    w.blank();

    let has_namespace = !namespace.is_empty();
    if has_namespace {
        w.line(&format!("namespace {}", namespace));
        w.open_block();
    }

    w.line(&format!("[{}]", PRESERVE_ATTRIBUTE));
    w.line(&format!("public partial class {}", owner));
    w.open_block();
    for binding in &bindings.properties {
        emit_property(&mut w, binding);
        w.blank();
    }
    emit_root_property(&mut w, &bindings.root);
    w.blank();
    emit_initializer(&mut w, &bindings.initializer);
    w.close_block();

    if has_namespace {
        w.close_block();
    }

    Ok(w.finish())
}

/// Generate an empty partial class script for a markup document, to be
/// placed next to it as the owner of the generated bindings.
pub fn generate_script_stub(
    document_name: &str,
    output_dir: &Path,
    output_file_name: &str,
) -> Result<GenerationResult, GenerationError> {
    if document_name.is_empty() {
        return Err(GenerationError::InvalidArgument {
            argument: "document_name",
            reason: "Cannot generate a script with an empty UI document name.".to_string(),
        });
    }
    if output_file_name.trim().is_empty() {
        return Err(GenerationError::InvalidArgument {
            argument: "output_file_name",
            reason: "An output file name is required.".to_string(),
        });
    }
    if !is_valid_identifier(document_name) {
        return Err(GenerationError::InvalidArgument {
            argument: "document_name",
            reason: format!("'{}' is not a valid class name", document_name),
        });
    }

    let mut w = CodeWriter::new();
    emit_usings(&mut w, &[ENGINE_NAMESPACE]);
    w.blank();
    w.line(&format!("public partial class {}", document_name));
    w.open_block();
    w.close_block();

    Ok(GenerationResult {
        source_text: w.finish(),
        output_path: Some(output_dir.join(output_file_name)),
        hint_name: document_name.to_string(),
        diagnostics: vec![],
    })
}
