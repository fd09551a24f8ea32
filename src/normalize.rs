//! Identifier normalization for declared element names.
//!
//! Declared names in markup are free-form (`submit-button`, `_id`,
//! `Status Label`). Generated members need PascalCase identifiers, so every
//! name goes through [`to_pascal_case`] before it becomes a property.

/// Letters with case and numeric characters survive normalization; anything
/// else is a word separator.
fn is_word_char(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase() || c.is_numeric()
}

/// Some uppercase mappings expand into sequences that start with a
/// non-cased character (`ŉ` -> `ʼN`); those keep the original character.
fn push_upper(words: &mut String, c: char) {
    let upper: String = c.to_uppercase().collect();
    if upper.chars().all(is_word_char) {
        words.push_str(&upper);
    } else {
        words.push(c);
    }
}

/// Convert a raw declared name into a PascalCase identifier.
///
/// Single left-to-right pass. Existing uppercase letters mark word
/// boundaries, separators are dropped and capitalize the next word
/// character. The result never contains whitespace or punctuation, and
/// normalizing an already-normalized name returns it unchanged.
pub fn to_pascal_case(original: &str) -> String {
    let mut words = String::with_capacity(original.len() + 4);
    let mut make_next_upper = false;

    for (index, c) in original.chars().enumerate() {
        if !is_word_char(c) {
            make_next_upper = true;
            words.push(' ');
        } else if index == 0 || make_next_upper {
            push_upper(&mut words, c);
            make_next_upper = false;
        } else if c.is_uppercase() {
            words.push(' ');
            words.push(c);
        } else {
            words.push(c);
        }
    }

    words.trim_start().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::is_valid_identifier;

    #[test]
    fn test_separators_become_word_boundaries() {
        assert_eq!(to_pascal_case("my-name"), "MyName");
        assert_eq!(to_pascal_case("status_label"), "StatusLabel");
        assert_eq!(to_pascal_case("Foo Bar"), "FooBar");
        assert_eq!(to_pascal_case("a.b.c"), "ABC");
    }

    #[test]
    fn test_leading_separator_is_dropped() {
        assert_eq!(to_pascal_case("_id"), "Id");
        assert_eq!(to_pascal_case("--title"), "Title");
        assert_eq!(to_pascal_case(" padded "), "Padded");
    }

    #[test]
    fn test_pascal_case_passes_through() {
        assert_eq!(to_pascal_case("SubmitButton"), "SubmitButton");
        assert_eq!(to_pascal_case("camelCase"), "CamelCase");
        assert_eq!(to_pascal_case("HTTPServer"), "HTTPServer");
    }

    #[test]
    fn test_digits_are_kept() {
        assert_eq!(to_pascal_case("item2"), "Item2");
        assert_eq!(to_pascal_case("slot-3-label"), "Slot3Label");
        // A leading digit survives; the synthesizer rejects the result.
        assert_eq!(to_pascal_case("1st"), "1st");
    }

    #[test]
    fn test_consecutive_separators() {
        assert_eq!(to_pascal_case("a--b"), "AB");
        assert_eq!(to_pascal_case("my  name"), "MyName");
        assert_eq!(to_pascal_case("x-_-y"), "XY");
    }

    #[test]
    fn test_empty_and_separator_only() {
        assert_eq!(to_pascal_case(""), "");
        assert_eq!(to_pascal_case("-_-"), "");
    }

    #[test]
    fn test_output_has_no_whitespace_or_punctuation() {
        let samples = [
            "my-name",
            "_id",
            "SubmitButton",
            "a--b",
            "hello world!",
            "tab\there",
            "dots.and/slashes\\too",
            "ünïcödé-näme",
            "MIXED_case-Input 42",
        ];
        for raw in samples {
            let normalized = to_pascal_case(raw);
            assert!(
                normalized.chars().all(is_word_char),
                "{raw:?} -> {normalized:?}"
            );
        }
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "my-name",
            "_id",
            "SubmitButton",
            "Foo Bar",
            "aB",
            "status_label_2",
            "ünïcödé-näme",
            "x",
            "",
        ];
        for raw in samples {
            let once = to_pascal_case(raw);
            assert_eq!(to_pascal_case(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_expanding_uppercase_keeps_original_char() {
        assert_eq!(to_pascal_case("ŉa"), "ŉa");
        assert_eq!(to_pascal_case("x-ŉ"), "Xŉ");
        assert_eq!(to_pascal_case("straße"), "Straße");
        assert_eq!(to_pascal_case("ßig"), "SSig");
        for raw in ["ŉa", "x-ŉ", "ßig"] {
            let once = to_pascal_case(raw);
            assert!(once.chars().all(is_word_char), "{raw:?} -> {once:?}");
            assert_eq!(to_pascal_case(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_letter_led_names_are_valid_identifiers() {
        for raw in ["my-name", "_id", "ok button", "ünïcödé"] {
            assert!(is_valid_identifier(&to_pascal_case(raw)));
        }
    }
}
