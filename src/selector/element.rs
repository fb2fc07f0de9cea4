//! Resolved element selectors.
//!
//! An [`Element`] is built fresh for every command invocation from the first
//! call argument. It is either a single locator or a recursive chain of
//! locators, outermost scope first and the target last.
//!
//! # Example
//!
//! ```ignore
//! use pageobject_core::{Element, LocateStrategy};
//!
//! let footer = Element::new(".footer");
//! let link = Element::new("a.link");
//! let chain = Element::recursive(vec![footer, link]);
//!
//! assert_eq!(chain.locate_strategy(), Some(LocateStrategy::Recursion));
//! assert_eq!(chain.to_string(), ".footer > a.link");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::identifiers::SectionId;

use super::reference::ElementReference;
use super::strategy::LocateStrategy;

// ============================================================================
// ElementDefaults
// ============================================================================

/// Optional per-element properties carried from declarations to commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefaults {
    /// Zero-based index when the selector matches several elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// Per-element wait timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Poll interval in milliseconds while waiting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_interval: Option<u64>,

    /// Whether a failure aborts the test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_on_failure: Option<bool>,

    /// Whether "element not found" is reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_not_found_errors: Option<bool>,
}

impl ElementDefaults {
    /// Fills every unset property from `other`.
    pub fn fill_from(&mut self, other: &Self) {
        self.index = self.index.or(other.index);
        self.timeout = self.timeout.or(other.timeout);
        self.retry_interval = self.retry_interval.or(other.retry_interval);
        self.abort_on_failure = self.abort_on_failure.or(other.abort_on_failure);
        self.suppress_not_found_errors = self
            .suppress_not_found_errors
            .or(other.suppress_not_found_errors);
    }
}

// ============================================================================
// SelectorDescriptor
// ============================================================================

/// Caller-supplied `{selector, locateStrategy, ...}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorDescriptor {
    /// Locator string or `@name` reference.
    pub selector: String,

    /// Explicit strategy; acts as a filter for `@name` references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locate_strategy: Option<LocateStrategy>,

    /// Default properties.
    #[serde(flatten)]
    pub defaults: ElementDefaults,
}

// ============================================================================
// ElementSelector
// ============================================================================

/// Locator payload of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum ElementSelector {
    /// A single locator string.
    Single(String),
    /// Ordered scopes, outermost first, target last.
    Chain(Vec<Element>),
}

// ============================================================================
// Element
// ============================================================================

/// A selector resolved for one command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    selector: ElementSelector,
    locate_strategy: Option<LocateStrategy>,
    name: Option<String>,
    parent: Option<SectionId>,
    pseudo_selector: Option<String>,
    container: Option<Box<Element>>,
    defaults: ElementDefaults,
}

// ============================================================================
// Element - Constructors
// ============================================================================

impl Element {
    /// Creates an element from a locator string with no explicit strategy.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: ElementSelector::Single(selector.into()),
            locate_strategy: None,
            name: None,
            parent: None,
            pseudo_selector: None,
            container: None,
            defaults: ElementDefaults::default(),
        }
    }

    /// Creates an element from a caller descriptor.
    #[must_use]
    pub fn from_descriptor(descriptor: SelectorDescriptor) -> Self {
        let mut element = Self::new(descriptor.selector);
        element.locate_strategy = descriptor.locate_strategy;
        element.defaults = descriptor.defaults;
        element
    }

    /// Creates an element from a raw call argument.
    ///
    /// Strings become literal locators, objects are read as descriptors.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSelector`] for any other value type
    /// - [`Error::Json`] if the descriptor is malformed
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(selector) => Ok(Self::new(selector.clone())),
            Value::Object(_) => {
                let descriptor: SelectorDescriptor = serde_json::from_value(value.clone())?;
                Ok(Self::from_descriptor(descriptor))
            }
            other => Err(Error::invalid_selector(format!(
                "expected a string or {{selector}} object, got {other}"
            ))),
        }
    }

    /// Builds a recursive chain from ordered scopes.
    ///
    /// Nested chains are flattened so every segment is a single locator.
    #[must_use]
    pub fn recursive(scopes: Vec<Element>) -> Self {
        let mut chain = Vec::with_capacity(scopes.len());
        for scope in scopes {
            match scope.selector {
                ElementSelector::Chain(inner) => chain.extend(inner),
                ElementSelector::Single(_) => chain.push(scope),
            }
        }

        let mut element = Self::new(String::new());
        element.selector = ElementSelector::Chain(chain);
        element.locate_strategy = Some(LocateStrategy::Recursion);
        element
    }

    /// Sets the locate strategy.
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: LocateStrategy) -> Self {
        self.locate_strategy = Some(strategy);
        self
    }

    /// Sets the declared name.
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the owning section.
    #[inline]
    #[must_use]
    pub(crate) fn with_parent(mut self, parent: Option<SectionId>) -> Self {
        self.parent = parent;
        self
    }

    /// Sets the default properties.
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self, defaults: ElementDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

// ============================================================================
// Element - Accessors
// ============================================================================

impl Element {
    /// Returns the locator payload.
    #[inline]
    #[must_use]
    pub fn selector(&self) -> &ElementSelector {
        &self.selector
    }

    /// Returns the locator string, or `None` for a chain.
    #[inline]
    #[must_use]
    pub fn selector_str(&self) -> Option<&str> {
        match &self.selector {
            ElementSelector::Single(selector) => Some(selector),
            ElementSelector::Chain(_) => None,
        }
    }

    /// Returns the chain segments, or `None` for a single locator.
    #[inline]
    #[must_use]
    pub fn chain(&self) -> Option<&[Element]> {
        match &self.selector {
            ElementSelector::Chain(chain) => Some(chain),
            ElementSelector::Single(_) => None,
        }
    }

    /// Returns the locate strategy.
    #[inline]
    #[must_use]
    pub fn locate_strategy(&self) -> Option<LocateStrategy> {
        self.locate_strategy.clone()
    }

    #[inline]
    pub(crate) fn locate_strategy_ref(&self) -> Option<&LocateStrategy> {
        self.locate_strategy.as_ref()
    }

    /// Returns the declared name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the owning section.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<SectionId> {
        self.parent
    }

    /// Returns the pseudo selector.
    #[inline]
    #[must_use]
    pub fn pseudo_selector(&self) -> Option<&str> {
        self.pseudo_selector.as_deref()
    }

    /// Returns the container set by element-accepting commands.
    #[inline]
    #[must_use]
    pub fn container(&self) -> Option<&Element> {
        self.container.as_deref()
    }

    /// Returns the default properties.
    #[inline]
    #[must_use]
    pub fn defaults(&self) -> &ElementDefaults {
        &self.defaults
    }

    /// Returns `true` if this element is a recursive chain.
    #[inline]
    #[must_use]
    pub fn is_recursive(&self) -> bool {
        matches!(self.selector, ElementSelector::Chain(_))
    }

    /// Returns `true` if the selector is an `@name` reference.
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.selector_str()
            .is_some_and(ElementReference::is_reference)
    }
}

// ============================================================================
// Element - Mutation
// ============================================================================

impl Element {
    /// Sets the pseudo selector.
    #[inline]
    pub fn set_pseudo_selector(&mut self, pseudo: Option<String>) {
        self.pseudo_selector = pseudo;
    }

    /// Sets the container element.
    #[inline]
    pub fn set_container(&mut self, container: Element) {
        self.container = Some(Box::new(container));
    }

    /// Copies unset default properties and the name from `declared`.
    pub fn copy_defaults(&mut self, declared: &Element) {
        self.defaults.fill_from(&declared.defaults);
        if self.name.is_none() {
            self.name.clone_from(&declared.name);
        }
    }

    /// Overwrites locator, strategy and owning section with `declared`'s.
    pub(crate) fn overwrite_locator(&mut self, declared: &Element) {
        self.selector = declared.selector.clone();
        self.locate_strategy.clone_from(&declared.locate_strategy);
        self.parent = declared.parent;
    }

    /// Splits a chain into its ancestor scope and its final segment.
    ///
    /// The ancestor is a single element when only one scope remains, otherwise
    /// a shorter chain. Returns `None` for single locators and one-segment
    /// chains.
    #[must_use]
    pub fn split_last(&self) -> Option<(Element, Element)> {
        let chain = self.chain()?;
        let (last, ancestors) = chain.split_last()?;
        let ancestor = match ancestors {
            [] => return None,
            [single] => single.clone(),
            many => Element::recursive(many.to_vec()),
        };
        Some((ancestor, last.clone()))
    }
}

// ============================================================================
// Element - Serialization
// ============================================================================

impl Element {
    /// Converts to the JSON payload sent to the driver.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let selector = match &self.selector {
            ElementSelector::Single(selector) => Value::String(selector.clone()),
            ElementSelector::Chain(chain) => {
                Value::Array(chain.iter().map(Element::to_value).collect())
            }
        };

        let mut object = Map::new();
        object.insert("selector".into(), selector);
        object.insert(
            "locateStrategy".into(),
            self.locate_strategy
                .as_ref()
                .map_or(Value::Null, |strategy| json!(strategy.as_str())),
        );
        if let Some(name) = &self.name {
            object.insert("name".into(), json!(name));
        }
        if let Some(pseudo) = &self.pseudo_selector {
            object.insert("pseudoSelector".into(), json!(pseudo));
        }
        if let Some(container) = &self.container {
            object.insert("container".into(), container.to_value());
        }
        if let Ok(Value::Object(defaults)) = serde_json::to_value(&self.defaults) {
            object.extend(defaults);
        }

        Value::Object(object)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            ElementSelector::Single(selector) => f.write_str(selector)?,
            ElementSelector::Chain(chain) => {
                for (i, segment) in chain.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" > ")?;
                    }
                    write!(f, "{segment}")?;
                }
            }
        }
        if let Some(pseudo) = &self.pseudo_selector {
            write!(f, ":{pseudo}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
