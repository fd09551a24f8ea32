//! Binding synthesis.
//!
//! Turns a parsed document into the set of members the owner class receives:
//! one typed property per resolvable named element, the root-element
//! property, and an initializer that looks every bound element up by its
//! original declared name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::config::NamingConfig;
use crate::document::MarkupDocument;
use crate::normalize::to_pascal_case;
use crate::validate::{
    is_valid_identifier, Diagnostic, DuplicateGroup, GenerationError, WARN_UNRESOLVED_TYPE,
};
use crate::widgets::{resolve_widget_type, ROOT_CONTAINER_TYPE};

/// A named element after normalization and type resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProperty {
    pub original_name: String,
    pub identifier_name: String,
    pub tag: String,
    pub resolved_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetterAccess {
    Public,
    Private,
}

/// A generated property bound to a markup element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub property_name: String,
    pub property_type: String,
    /// Declared name used for the lookup against the root element.
    pub original_name: String,
    pub setter: SetterAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootProperty {
    pub name: String,
    pub property_type: String,
    pub setter: SetterAccess,
}

/// `target = (cast_type)root?.Q(lookup_name)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub target: String,
    pub cast_type: String,
    pub lookup_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initializer {
    pub name: String,
    /// Property the lookups are made against.
    pub root_property: String,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingSet {
    pub document_name: String,
    /// Bound properties, in document order.
    pub properties: Vec<Binding>,
    pub root: RootProperty,
    pub initializer: Initializer,
    /// Warnings raised while synthesizing (e.g. unknown widget tags).
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalize and type-resolve every named descendant, in document order.
pub fn resolve_properties(document: &MarkupDocument) -> Vec<ResolvedProperty> {
    document
        .named_descendants()
        .map(|(element, name)| ResolvedProperty {
            original_name: name.to_string(),
            identifier_name: to_pascal_case(name),
            tag: element.tag.clone(),
            resolved_type: resolve_widget_type(&element.tag).map(|t| t.to_string()),
        })
        .collect()
}

/// Group properties by identifier, keeping only groups with more than one
/// member. Groups and names within them keep document order.
fn find_duplicates(properties: &[(&ResolvedProperty, &str)]) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (property, _) in properties {
        match index.get(property.identifier_name.as_str()) {
            Some(&i) => groups[i].original_names.push(property.original_name.clone()),
            None => {
                index.insert(&property.identifier_name, groups.len());
                groups.push(DuplicateGroup {
                    identifier: property.identifier_name.clone(),
                    original_names: vec![property.original_name.clone()],
                });
            }
        }
    }

    groups.retain(|g| g.original_names.len() > 1);
    groups
}

/// Build the bindings for one document.
///
/// Elements with an unknown tag are skipped and reported as warnings in the
/// returned set. Duplicate, invalid, or reserved identifiers abort the whole
/// document; no partial set is returned.
pub fn synthesize(document: &MarkupDocument, naming: &NamingConfig) -> Result<BindingSet, GenerationError> {
    let candidates = resolve_properties(document);
    let mut diagnostics = Vec::new();

    let mut resolved: Vec<(&ResolvedProperty, &str)> = Vec::new();
    for candidate in &candidates {
        match candidate.resolved_type.as_deref() {
            Some(ty) => resolved.push((candidate, ty)),
            None => {
                warn!(
                    document = %document.path,
                    element = %candidate.original_name,
                    tag = %candidate.tag,
                    "unknown widget type, binding skipped"
                );
                diagnostics.push(
                    Diagnostic::warning(
                        WARN_UNRESOLVED_TYPE,
                        &format!(
                            "Failed to get property type '{}' for element '{}'. Property will be ignored.",
                            candidate.tag, candidate.original_name
                        ),
                        &document.path,
                    )
                    .with_element(&candidate.original_name),
                );
            }
        }
    }

    if let Some((property, _)) = resolved
        .iter()
        .find(|(p, _)| !is_valid_identifier(&p.identifier_name))
    {
        return Err(GenerationError::InvalidIdentifier {
            document: document.name.clone(),
            original_name: property.original_name.clone(),
            identifier: property.identifier_name.clone(),
        });
    }

    let conflicts = find_duplicates(&resolved);
    if !conflicts.is_empty() {
        return Err(GenerationError::DuplicateBinding {
            document: document.name.clone(),
            conflicts,
        });
    }

    let reserved = [&naming.root_property_name, &naming.initialize_method_name];
    if let Some((property, _)) = resolved
        .iter()
        .find(|(p, _)| reserved.contains(&&p.identifier_name))
    {
        return Err(GenerationError::ReservedMember {
            document: document.name.clone(),
            original_name: property.original_name.clone(),
            member: property.identifier_name.clone(),
        });
    }

    let properties: Vec<Binding> = resolved
        .iter()
        .map(|(property, ty)| Binding {
            property_name: property.identifier_name.clone(),
            property_type: ty.to_string(),
            original_name: property.original_name.clone(),
            setter: SetterAccess::Private,
        })
        .collect();

    let assignments = properties
        .iter()
        .map(|binding| Assignment {
            target: binding.property_name.clone(),
            cast_type: binding.property_type.clone(),
            lookup_name: binding.original_name.clone(),
        })
        .collect();

    Ok(BindingSet {
        document_name: document.name.clone(),
        properties,
        root: RootProperty {
            name: naming.root_property_name.clone(),
            property_type: ROOT_CONTAINER_TYPE.to_string(),
            setter: SetterAccess::Public,
        },
        initializer: Initializer {
            name: naming.initialize_method_name.clone(),
            root_property: naming.root_property_name.clone(),
            assignments,
        },
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MarkupElement;
    use crate::validate::Severity;

    fn naming() -> NamingConfig {
        NamingConfig::new("Root", "Bind").unwrap()
    }

    fn doc(children: Vec<MarkupElement>) -> MarkupDocument {
        MarkupDocument {
            name: "LoginView".to_string(),
            path: "LoginView.uxml".to_string(),
            root: MarkupElement::new("VisualElement").with_children(children),
        }
    }

    #[test]
    fn test_synthesize_bindings_in_document_order() {
        let document = doc(vec![
            MarkupElement::named("Button", "submit-button"),
            MarkupElement::new("VisualElement")
                .with_children(vec![MarkupElement::named("Label", "StatusLabel")]),
        ]);
        let set = synthesize(&document, &naming()).unwrap();

        let names: Vec<&str> = set.properties.iter().map(|b| b.property_name.as_str()).collect();
        assert_eq!(names, vec!["SubmitButton", "StatusLabel"]);
        assert_eq!(set.properties[0].property_type, "UnityEngine.UIElements.Button");
        assert_eq!(set.properties[0].setter, SetterAccess::Private);

        assert_eq!(set.root.name, "Root");
        assert_eq!(set.root.property_type, ROOT_CONTAINER_TYPE);
        assert_eq!(set.root.setter, SetterAccess::Public);

        assert_eq!(set.initializer.name, "Bind");
        assert_eq!(
            set.initializer.assignments[0],
            Assignment {
                target: "SubmitButton".to_string(),
                cast_type: "UnityEngine.UIElements.Button".to_string(),
                lookup_name: "submit-button".to_string(),
            }
        );
        assert!(set.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_tag_is_skipped_with_warning() {
        let document = doc(vec![
            MarkupElement::named("MyCustomWidget", "Extra"),
            MarkupElement::named("Toggle", "Remember"),
        ]);
        let set = synthesize(&document, &naming()).unwrap();

        assert_eq!(set.properties.len(), 1);
        assert_eq!(set.properties[0].property_name, "Remember");
        assert_eq!(set.initializer.assignments.len(), 1);

        assert_eq!(set.diagnostics.len(), 1);
        let warning = &set.diagnostics[0];
        assert_eq!(warning.code, WARN_UNRESOLVED_TYPE);
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.element.as_deref(), Some("Extra"));
        assert!(warning.message.contains("MyCustomWidget"));
    }

    #[test]
    fn test_other_number_in_name_is_invalid_identifier() {
        let document = doc(vec![MarkupElement::named("Label", "a½")]);
        let err = synthesize(&document, &naming()).unwrap_err();
        match err {
            GenerationError::InvalidIdentifier {
                original_name,
                identifier,
                ..
            } => {
                assert_eq!(original_name, "a½");
                assert_eq!(identifier, "A½");
            }
            other => panic!("expected invalid identifier, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_names_abort_generation() {
        let document = doc(vec![
            MarkupElement::named("Label", "Foo Bar"),
            MarkupElement::named("Button", "Other"),
            MarkupElement::named("Label", "FooBar"),
        ]);
        let err = synthesize(&document, &naming()).unwrap_err();
        match err {
            GenerationError::DuplicateBinding { document, conflicts } => {
                assert_eq!(document, "LoginView");
                assert_eq!(
                    conflicts,
                    vec![DuplicateGroup {
                        identifier: "FooBar".to_string(),
                        original_names: vec!["Foo Bar".to_string(), "FooBar".to_string()],
                    }]
                );
            }
            other => panic!("expected duplicate binding error, got {other:?}"),
        }
    }

    #[test]
    fn test_every_duplicate_group_is_reported() {
        let document = doc(vec![
            MarkupElement::named("Label", "a-b"),
            MarkupElement::named("Label", "x"),
            MarkupElement::named("Label", "a_b"),
            MarkupElement::named("Label", "X"),
            MarkupElement::named("Label", "A B"),
        ]);
        let err = synthesize(&document, &naming()).unwrap_err();
        let GenerationError::DuplicateBinding { conflicts, .. } = err else {
            panic!("expected duplicate binding error");
        };
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].original_names, vec!["a-b", "a_b", "A B"]);
        assert_eq!(conflicts[1].original_names, vec!["x", "X"]);
    }

    #[test]
    fn test_duplicates_among_unresolved_elements_are_ignored() {
        let document = doc(vec![
            MarkupElement::named("MyWidget", "Panel"),
            MarkupElement::named("VisualElement", "panel"),
        ]);
        let set = synthesize(&document, &naming()).unwrap();
        assert_eq!(set.properties.len(), 1);
        assert_eq!(set.properties[0].original_name, "panel");
    }

    #[test]
    fn test_invalid_identifier_aborts_generation() {
        let document = doc(vec![MarkupElement::named("Label", "1st-place")]);
        let err = synthesize(&document, &naming()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidIdentifier { ref identifier, .. } if identifier == "1stPlace"
        ));

        let document = doc(vec![MarkupElement::named("Label", "--")]);
        assert!(synthesize(&document, &naming()).is_err());
    }

    #[test]
    fn test_reserved_member_collision() {
        let document = doc(vec![MarkupElement::named("VisualElement", "root")]);
        let err = synthesize(&document, &naming()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::ReservedMember { ref member, .. } if member == "Root"
        ));
    }

    #[test]
    fn test_empty_document_still_has_root_and_initializer() {
        let set = synthesize(&doc(vec![MarkupElement::new("Label")]), &naming()).unwrap();
        assert!(set.properties.is_empty());
        assert!(set.initializer.assignments.is_empty());
        assert_eq!(set.initializer.root_property, "Root");
    }

    #[test]
    fn test_resolve_properties_keeps_unresolved() {
        let resolved = resolve_properties(&doc(vec![
            MarkupElement::named("Slider", "volume_level"),
            MarkupElement::named("Custom", "thing"),
        ]));
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].identifier_name, "VolumeLevel");
        assert_eq!(resolved[1].resolved_type, None);
    }
}
