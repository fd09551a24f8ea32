//! Generator configuration.
//!
//! The generated members must integrate with members the owner already
//! declares through the marker interface: a root-element property and an
//! initializer method. Their names are supplied explicitly as a
//! [`NamingConfig`], either from a JSON config file, from the command line,
//! or derived from the marker interface declaration (see
//! [`crate::discovery::marker_naming`]).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::validate::{is_valid_identifier, GenerationError};

/// Names of the owner members the generated code plugs into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingConfig {
    pub root_property_name: String,
    pub initialize_method_name: String,
}

impl NamingConfig {
    pub fn new(root_property_name: &str, initialize_method_name: &str) -> Result<Self, GenerationError> {
        for (what, name) in [
            ("root property name", root_property_name),
            ("initialize method name", initialize_method_name),
        ] {
            if !is_valid_identifier(name) {
                return Err(GenerationError::Configuration(format!(
                    "{} '{}' is not a valid identifier",
                    what, name
                )));
            }
        }
        if root_property_name == initialize_method_name {
            return Err(GenerationError::Configuration(format!(
                "root property and initialize method cannot share the name '{}'",
                root_property_name
            )));
        }
        Ok(Self {
            root_property_name: root_property_name.to_string(),
            initialize_method_name: initialize_method_name.to_string(),
        })
    }
}

fn default_marker_interface() -> String {
    "ILayout".to_string()
}

fn default_source_extension() -> String {
    "cs".to_string()
}

fn default_markup_extension() -> String {
    "uxml".to_string()
}

fn default_output_suffix() -> String {
    ".g.cs".to_string()
}

fn default_exclude() -> Vec<String> {
    ["Library", "Temp", "obj", "bin", ".git", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Interface whose presence in a partial class's base list marks it as an owner.
    #[serde(default = "default_marker_interface")]
    pub marker_interface: String,
    #[serde(default)]
    pub root_property_name: Option<String>,
    #[serde(default)]
    pub initialize_method_name: Option<String>,
    /// Owner source file extension, without the dot.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Markup file extension, without the dot.
    #[serde(default = "default_markup_extension")]
    pub markup_extension: String,
    /// Appended to the owner's base name to name the generated file.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    /// Directory names skipped during discovery.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            marker_interface: default_marker_interface(),
            root_property_name: None,
            initialize_method_name: None,
            source_extension: default_source_extension(),
            markup_extension: default_markup_extension(),
            output_suffix: default_output_suffix(),
            exclude: default_exclude(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_naming(root_property_name: &str, initialize_method_name: &str) -> Self {
        Self {
            root_property_name: Some(root_property_name.to_string()),
            initialize_method_name: Some(initialize_method_name.to_string()),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(json)
            .map_err(|e| GenerationError::Configuration(format!("invalid config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let data = fs::read_to_string(path).map_err(|e| {
            GenerationError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&data)
    }

    /// Fill in naming entries that are not set yet. Explicit values win.
    pub fn merge_naming(&mut self, root_property_name: Option<String>, initialize_method_name: Option<String>) {
        if self.root_property_name.is_none() {
            self.root_property_name = root_property_name;
        }
        if self.initialize_method_name.is_none() {
            self.initialize_method_name = initialize_method_name;
        }
    }

    /// Resolve the naming configuration. Both names are required.
    pub fn naming(&self) -> Result<NamingConfig, GenerationError> {
        let root = self.root_property_name.as_deref().ok_or_else(|| {
            GenerationError::Configuration(format!(
                "{} does not designate a root element property",
                self.marker_interface
            ))
        })?;
        let init = self.initialize_method_name.as_deref().ok_or_else(|| {
            GenerationError::Configuration(format!(
                "{} does not designate an initialize bindings method",
                self.marker_interface
            ))
        })?;
        NamingConfig::new(root, init)
    }

    /// Check the whole configuration before any document is processed.
    pub fn validate(&self) -> Result<NamingConfig, GenerationError> {
        if !is_valid_identifier(&self.marker_interface) {
            return Err(GenerationError::Configuration(format!(
                "marker interface '{}' is not a valid identifier",
                self.marker_interface
            )));
        }
        for (what, ext) in [
            ("source", &self.source_extension),
            ("markup", &self.markup_extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(GenerationError::Configuration(format!(
                    "{} extension '{}' must be non-empty and given without a leading dot",
                    what, ext
                )));
            }
        }
        if self.source_extension == self.markup_extension {
            return Err(GenerationError::Configuration(
                "source and markup extensions must differ".to_string(),
            ));
        }
        if self.output_suffix.is_empty() {
            return Err(GenerationError::Configuration(
                "output suffix cannot be empty".to_string(),
            ));
        }
        self.naming()
    }
}
