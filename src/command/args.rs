//! Command call arguments.
//!
//! Arguments are dynamic JSON values until selector resolution replaces the
//! first one with a resolved [`Element`]. A call may also forward a
//! structured `{"args": [...]}` list from an intermediary command.

use serde_json::{Map, Value};

use crate::selector::Element;

// ============================================================================
// Arg
// ============================================================================

/// One argument of a command call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Raw JSON value.
    Value(Value),
    /// Resolved element selector.
    Element(Element),
    /// Pre-packed argument list (`{"args": [...]}` convention).
    Structured {
        /// The packed arguments.
        args: Vec<Arg>,
        /// Other keys of the packing object, forwarded unchanged.
        fields: Map<String, Value>,
    },
}

impl Arg {
    /// Creates a structured argument list.
    #[inline]
    #[must_use]
    pub fn structured(args: Vec<Arg>) -> Self {
        Self::Structured {
            args,
            fields: Map::new(),
        }
    }

    /// Returns the raw value, if this is one.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the resolved element, if this is one.
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the string value, if this is one.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Converts to a JSON payload.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Element(element) => element.to_value(),
            Self::Structured { args, fields } => {
                let mut object = fields.clone();
                object.insert(
                    "args".into(),
                    Value::Array(args.iter().map(Arg::to_value).collect()),
                );
                Value::Object(object)
            }
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<Element> for Arg {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

// ============================================================================
// Structured Calling Convention
// ============================================================================

/// Splits a `{"args": [...], ...}` object into its list and remaining keys.
fn packed(object: &Map<String, Value>) -> Option<Arg> {
    let list = object.get("args")?.as_array()?;
    let mut fields = object.clone();
    fields.remove("args");
    Some(Arg::Structured {
        args: list.iter().cloned().map(Arg::Value).collect(),
        fields,
    })
}

/// Returns the argument list selector resolution should operate on.
///
/// A first argument carrying an `args` array is normalised into
/// [`Arg::Structured`] in place, so resolved elements land inside the
/// structure the command receives. Arguments after it are left alone.
pub(crate) fn unpack(args: &mut [Arg]) -> &mut [Arg] {
    let structured = match args.first() {
        Some(Arg::Value(Value::Object(object))) => packed(object),
        _ => None,
    };
    if let Some(structured) = structured {
        args[0] = structured;
    }

    match args {
        [Arg::Structured { args: inner, .. }, ..] => inner.as_mut_slice(),
        other => other,
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
    fn test_unpack_plain_list() {
        let mut args = vec![Arg::from("@submit"), Arg::from(true)];
        let unpacked = unpack(&mut args);
        assert_eq!(unpacked.len(), 2);
    }

    #[test]
    fn test_unpack_structured() {
        let mut args = vec![Arg::structured(vec![Arg::from("#a"), Arg::from("text")])];
        let unpacked = unpack(&mut args);
        assert_eq!(unpacked[0].as_str(), Some("#a"));
    }

    #[test]
    fn test_unpack_packed_json() {
        let mut args = vec![Arg::from(json!({ "args": ["@submit", 1] }))];
        {
            let unpacked = unpack(&mut args);
            assert_eq!(unpacked.len(), 2);
            unpacked[0] = Arg::Element(Element::new("#go"));
        }
        // resolution lands inside the structure
        match &args[0] {
            Arg::Structured { args, .. } => assert!(args[0].as_element().is_some()),
            other => panic!("expected structured args, got {other:?}"),
        }
    }

    #[test]
    fn test_unpack_keeps_other_keys() {
        let mut args = vec![Arg::from(json!({ "args": ["@submit"], "sessionId": "s1" }))];
        assert_eq!(unpack(&mut args)[0].as_str(), Some("@submit"));

        let payload = args[0].to_value();
        assert_eq!(payload["sessionId"], json!("s1"));
        assert_eq!(payload["args"], json!(["@submit"]));
    }

    #[test]
    fn test_unpack_with_trailing_arguments() {
        let mut args = vec![Arg::from(json!({ "args": ["@submit", 1] })), Arg::from("callback")];
        let unpacked = unpack(&mut args);
        assert_eq!(unpacked.len(), 2);
        assert_eq!(unpacked[0].as_str(), Some("@submit"));
        assert_eq!(args[1], Arg::from("callback"));
    }

    #[test]
    fn test_unpack_ignores_objects_without_list() {
        let mut args = vec![Arg::from(json!({ "args": "nope", "selector": "#a" }))];
        let unpacked = unpack(&mut args);
        assert!(unpacked[0].as_value().is_some());

        let mut later = vec![Arg::from("#a"), Arg::from(json!({ "args": [] }))];
        assert_eq!(unpack(&mut later).len(), 2);
        assert!(later[1].as_value().is_some());
    }

    #[test]
    fn test_to_value_structured() {
        let arg = Arg::structured(vec![Arg::Element(Element::new("#a"))]);
        assert_eq!(arg.to_value()["args"][0]["selector"], json!("#a"));
    }
}
