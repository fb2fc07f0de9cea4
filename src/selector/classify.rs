//! Selector classification for command arguments.
//!
//! Decides whether the first argument of a command is an element selector.
//! Only selector-bearing arguments go through resolution; everything else is
//! passed to the command untouched.

use serde_json::Value;

use super::reference::ElementReference;

// ============================================================================
// Command Tables
// ============================================================================

/// Built-in commands whose first string argument is always a selector.
pub const ELEMENT_COMMANDS: &[&str] = &[
    "clearValue",
    "click",
    "clickAndHold",
    "doubleClick",
    "dragAndDrop",
    "getAccessibleName",
    "getAriaRole",
    "getAttribute",
    "getCssProperty",
    "getElementProperty",
    "getElementRect",
    "getElementSize",
    "getLocation",
    "getLocationInView",
    "getShadowRoot",
    "getTagName",
    "getText",
    "getValue",
    "isEnabled",
    "isPresent",
    "isSelected",
    "isVisible",
    "moveToElement",
    "rightClick",
    "sendKeys",
    "setAttribute",
    "setPassword",
    "setValue",
    "submitForm",
    "updateValue",
    "uploadFile",
    "waitForElementNotPresent",
    "waitForElementNotVisible",
    "waitForElementPresent",
    "waitForElementVisible",
];

/// Accessors of the nested `element(...)` API.
///
/// Their underlying implementation only accepts one plain selector, so
/// section-scoped calls locate the ancestors first and then delegate.
pub const SCOPED_ELEMENT_COMMANDS: &[&str] = &[
    "element",
    "find",
    "findAll",
    "findElement",
    "findElements",
    "get",
    "getAll",
];

/// Assertion commands whose first string argument is a selector.
pub const ELEMENT_ASSERTIONS: &[&str] = &[
    "attributeContains",
    "attributeEquals",
    "containsText",
    "cssClassNotPresent",
    "cssClassPresent",
    "cssProperty",
    "elementNotPresent",
    "elementPresent",
    "enabled",
    "hasAttribute",
    "hasClass",
    "hidden",
    "selected",
    "textContains",
    "textEquals",
    "value",
    "valueContains",
    "valueEquals",
    "visible",
    // expect-style entry points
    "elements",
    "section",
];

// ============================================================================
// Classification
// ============================================================================

/// Returns `true` if `name` is in the scoped accessor family.
#[inline]
#[must_use]
pub fn is_scoped_element_command(name: &str) -> bool {
    SCOPED_ELEMENT_COMMANDS.contains(&name)
}

/// Returns `true` if `name` takes a selector as its first string argument.
#[inline]
#[must_use]
pub fn is_element_command(name: &str) -> bool {
    ELEMENT_COMMANDS.contains(&name)
        || ELEMENT_ASSERTIONS.contains(&name)
        || is_scoped_element_command(name)
}

/// Returns `true` if `arg` should be resolved as an element selector.
///
/// - a non-array object with a string `selector` field
/// - a string starting with `@`
/// - any string, when `command_name` is an element command
///
/// Arrays are never selectors.
#[must_use]
pub fn is_possible_element_selector(arg: &Value, command_name: &str) -> bool {
    match arg {
        Value::Object(object) => object.get("selector").is_some_and(Value::is_string),
        Value::String(selector) => {
            ElementReference::is_reference(selector) || is_element_command(command_name)
        }
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_descriptor_is_selector() {
        assert!(is_possible_element_selector(
            &json!({"selector": "#go"}),
            "anything"
        ));
    }

    #[test]
    fn test_descriptor_without_string_selector() {
        assert!(!is_possible_element_selector(&json!({"selector": 3}), "click"));
        assert!(!is_possible_element_selector(&json!({"value": "x"}), "click"));
    }

    #[test]
    fn test_reference_string_is_selector_for_any_command() {
        assert!(is_possible_element_selector(&json!("@submit"), "myCommand"));
    }

    #[test]
    fn test_plain_string_depends_on_command() {
        assert!(is_possible_element_selector(&json!("#go"), "click"));
        assert!(is_possible_element_selector(&json!("#go"), "find"));
        assert!(is_possible_element_selector(&json!("#go"), "visible"));
        assert!(!is_possible_element_selector(&json!("https://x"), "url"));
    }

    #[test]
    fn test_arrays_are_never_selectors() {
        assert!(!is_possible_element_selector(&json!(["#a", "#b"]), "click"));
        assert!(!is_possible_element_selector(&json!([{"selector": "#a"}]), "click"));
    }

    #[test]
    fn test_scalars_are_not_selectors() {
        assert!(!is_possible_element_selector(&json!(5), "click"));
        assert!(!is_possible_element_selector(&Value::Null, "click"));
    }

    #[test]
    fn test_scoped_family() {
        assert!(is_scoped_element_command("findAll"));
        assert!(!is_scoped_element_command("click"));
    }
}
