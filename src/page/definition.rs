//! Declarative page-object definitions.
//!
//! Definitions are plain data: a page declares `elements` and `sections`, each
//! section declares its own locator plus nested `elements` and `sections`.
//!
//! # Format
//!
//! ```json
//! {
//!   "elements": {
//!     "submit": "#go",
//!     "search": { "selector": "//input", "locateStrategy": "xpath" }
//!   },
//!   "sections": {
//!     "footer": {
//!       "selector": ".footer",
//!       "elements": { "link": { "selector": "a.link" } }
//!     }
//!   }
//! }
//! ```
//!
//! `elements` may also be a list of maps, merged in order. `section` is
//! accepted as an alias of `sections`. A name may appear only once per map;
//! repeated JSON keys are rejected instead of keeping the last value.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::result::Result as StdResult;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::selector::{ElementDefaults, LocateStrategy, SelectorDescriptor};

// ============================================================================
// ElementDeclaration
// ============================================================================

/// One declared element: a locator shorthand or a full descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementDeclaration {
    /// Locator string using the page's default strategy.
    Selector(String),
    /// Full descriptor.
    Descriptor(SelectorDescriptor),
}

impl ElementDeclaration {
    /// Returns the locator string.
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::Selector(selector) => selector,
            Self::Descriptor(descriptor) => &descriptor.selector,
        }
    }

    /// Returns the explicit strategy, if any.
    #[must_use]
    pub fn locate_strategy(&self) -> Option<LocateStrategy> {
        match self {
            Self::Selector(_) => None,
            Self::Descriptor(descriptor) => descriptor.locate_strategy.clone(),
        }
    }

    /// Returns the default properties.
    #[must_use]
    pub fn defaults(&self) -> ElementDefaults {
        match self {
            Self::Selector(_) => ElementDefaults::default(),
            Self::Descriptor(descriptor) => descriptor.defaults.clone(),
        }
    }
}

impl From<&str> for ElementDeclaration {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for ElementDeclaration {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<SelectorDescriptor> for ElementDeclaration {
    fn from(descriptor: SelectorDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

// ============================================================================
// ElementDeclarations
// ============================================================================

/// Element map, or a list of maps merged in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ElementDeclarations {
    /// Single name → declaration map.
    Map(BTreeMap<String, ElementDeclaration>),
    /// List of maps.
    List(Vec<BTreeMap<String, ElementDeclaration>>),
}

impl Default for ElementDeclarations {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl ElementDeclarations {
    /// Adds a declaration, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, declaration: impl Into<ElementDeclaration>) {
        let name = name.into();
        let declaration = declaration.into();
        match self {
            Self::Map(map) => {
                map.insert(name, declaration);
            }
            Self::List(list) => {
                for map in list.iter_mut() {
                    map.remove(&name);
                }
                list.push(BTreeMap::from([(name, declaration)]));
            }
        }
    }

    /// Merges the declarations into a single map.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a list declares the same name twice
    pub fn merged(&self) -> Result<BTreeMap<String, ElementDeclaration>> {
        match self {
            Self::Map(map) => Ok(map.clone()),
            Self::List(list) => {
                let mut merged = BTreeMap::new();
                for map in list {
                    for (name, declaration) in map {
                        if merged.insert(name.clone(), declaration.clone()).is_some() {
                            return Err(Error::config(format!(
                                "element \"{name}\" is declared more than once"
                            )));
                        }
                    }
                }
                Ok(merged)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ElementDeclarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        struct DeclarationsVisitor;

        impl<'de> Visitor<'de> for DeclarationsVisitor {
            type Value = ElementDeclarations;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an element map or a list of element maps")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> StdResult<Self::Value, A::Error> {
                UniqueMapVisitor::new().visit_map(map).map(ElementDeclarations::Map)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> StdResult<Self::Value, A::Error> {
                let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(UniqueMap(map)) =
                    seq.next_element::<UniqueMap<ElementDeclaration>>()?
                {
                    list.push(map);
                }
                Ok(ElementDeclarations::List(list))
            }
        }

        deserializer.deserialize_any(DeclarationsVisitor)
    }
}

// ============================================================================
// Unique Maps
// ============================================================================

/// Map deserialized with duplicate keys rejected.
struct UniqueMap<V>(BTreeMap<String, V>);

struct UniqueMapVisitor<V>(PhantomData<V>);

impl<V> UniqueMapVisitor<V> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueMapVisitor<V> {
    type Value = BTreeMap<String, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with unique names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> StdResult<Self::Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((name, value)) = map.next_entry::<String, V>()? {
            if entries.contains_key(&name) {
                return Err(de::Error::custom(format!(
                    "\"{name}\" is declared more than once"
                )));
            }
            entries.insert(name, value);
        }
        Ok(entries)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        deserializer.deserialize_map(UniqueMapVisitor::new()).map(UniqueMap)
    }
}

fn unique_sections<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> StdResult<BTreeMap<String, SectionDefinition>, D::Error> {
    deserializer.deserialize_map(UniqueMapVisitor::new())
}

// ============================================================================
// SectionDefinition
// ============================================================================

/// A nested section declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDefinition {
    /// Locator of the section inside its parent.
    pub selector: String,

    /// Explicit strategy for the section locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locate_strategy: Option<LocateStrategy>,

    /// Declared elements.
    #[serde(default)]
    pub elements: ElementDeclarations,

    /// Declared sub-sections.
    #[serde(default, alias = "section", deserialize_with = "unique_sections")]
    pub sections: BTreeMap<String, SectionDefinition>,
}

impl SectionDefinition {
    /// Creates an empty section definition.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            locate_strategy: None,
            elements: ElementDeclarations::default(),
            sections: BTreeMap::new(),
        }
    }
}

// ============================================================================
// PageDefinition
// ============================================================================

/// Top-level page declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    /// Declared elements.
    #[serde(default)]
    pub elements: ElementDeclarations,

    /// Declared sections.
    #[serde(default, alias = "section", deserialize_with = "unique_sections")]
    pub sections: BTreeMap<String, SectionDefinition>,
}

impl PageDefinition {
    /// Parses a definition from JSON.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the document is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
