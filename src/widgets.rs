//! Built-in widget type registry.
//!
//! Maps the tag names the markup dialect knows about to the fully qualified
//! native widget types. The set is closed: custom controls are not bound.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Namespace every built-in widget type lives in.
pub const WIDGET_NAMESPACE: &str = "UnityEngine.UIElements";

/// Type of the generated root-element property.
pub const ROOT_CONTAINER_TYPE: &str = "UnityEngine.UIElements.VisualElement";

lazy_static! {
    static ref NATIVE_WIDGET_TYPES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // Containers
        m.insert("VisualElement", "UnityEngine.UIElements.VisualElement");
        m.insert("ScrollView", "UnityEngine.UIElements.ScrollView");
        m.insert("ListView", "UnityEngine.UIElements.ListView");
        m.insert("IMGUIContainer", "UnityEngine.UIElements.IMGUIContainer");
        m.insert("GroupBox", "UnityEngine.UIElements.GroupBox");
        // Controls
        m.insert("Label", "UnityEngine.UIElements.Label");
        m.insert("Button", "UnityEngine.UIElements.Button");
        m.insert("Toggle", "UnityEngine.UIElements.Toggle");
        m.insert("Scroller", "UnityEngine.UIElements.Scroller");
        m.insert("TextField", "UnityEngine.UIElements.TextField");
        m.insert("Foldout", "UnityEngine.UIElements.Foldout");
        m.insert("Slider", "UnityEngine.UIElements.Slider");
        m.insert("SliderInt", "UnityEngine.UIElements.SliderInt");
        m.insert("MinMaxSlider", "UnityEngine.UIElements.MinMaxSlider");
        m.insert("ProgressBar", "UnityEngine.UIElements.ProgressBar");
        m.insert("DropdownField", "UnityEngine.UIElements.DropdownField");
        m.insert("RadioButton", "UnityEngine.UIElements.RadioButton");
        m.insert("RadioButtonGroup", "UnityEngine.UIElements.RadioButtonGroup");
        m.insert("Image", "UnityEngine.UIElements.Image");
        m
    };
}

/// Resolve a markup tag to its fully qualified widget type.
///
/// Tags are matched exactly (case-sensitive). Unknown tags return `None`,
/// which callers treat as "skip this element", never as a failure.
pub fn resolve_widget_type(tag: &str) -> Option<&'static str> {
    NATIVE_WIDGET_TYPES.get(tag).copied()
}
