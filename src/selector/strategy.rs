//! Element locate strategies.
//!
//! Strategy names match the wire names understood by the remote driver.
//!
//! # Example
//!
//! ```ignore
//! use pageobject_core::LocateStrategy;
//!
//! let strategy: LocateStrategy = "xpath".parse()?;
//! assert_eq!(strategy.as_str(), "xpath");
//! assert_eq!(LocateStrategy::default(), LocateStrategy::Css);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

// ============================================================================
// LocateStrategy Enum
// ============================================================================

/// Method used by the driver to find an element.
///
/// Names outside the WebDriver set (for example `-android uiautomator`) are
/// kept verbatim in [`LocateStrategy::Other`] and left to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LocateStrategy {
    /// CSS selector (default).
    #[default]
    Css,

    /// XPath expression.
    XPath,

    /// Exact link text (for `<a>` elements).
    LinkText,

    /// Partial link text (for `<a>` elements).
    PartialLinkText,

    /// Tag name.
    TagName,

    /// Element id attribute.
    Id,

    /// Name attribute.
    Name,

    /// Single class name.
    ClassName,

    /// Accessibility id (mobile drivers).
    AccessibilityId,

    /// Synthetic strategy: resolve each element of a chain relative to the
    /// previous one.
    Recursion,

    /// Driver-specific strategy passed through unchanged.
    Other(String),
}

impl LocateStrategy {
    /// Strategies with a dedicated variant.
    pub const KNOWN: [Self; 10] = [
        Self::Css,
        Self::XPath,
        Self::LinkText,
        Self::PartialLinkText,
        Self::TagName,
        Self::Id,
        Self::Name,
        Self::ClassName,
        Self::AccessibilityId,
        Self::Recursion,
    ];

    /// Returns the strategy name for the protocol.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css => "css selector",
            Self::XPath => "xpath",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
            Self::TagName => "tag name",
            Self::Id => "id",
            Self::Name => "name",
            Self::ClassName => "class name",
            Self::AccessibilityId => "accessibility id",
            Self::Recursion => "recursion",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for the synthetic recursion strategy.
    #[inline]
    #[must_use]
    pub fn is_recursion(&self) -> bool {
        matches!(self, Self::Recursion)
    }

    /// Returns `true` for a driver-specific strategy.
    #[inline]
    #[must_use]
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl fmt::Display for LocateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocateStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // "css" is accepted as shorthand for the wire name
        if s == "css" {
            return Ok(Self::Css);
        }
        if s.trim().is_empty() {
            return Err(Error::invalid_selector("locate strategy must not be empty"));
        }

        let known = Self::KNOWN.into_iter().find(|strategy| strategy.as_str() == s);
        Ok(known.unwrap_or_else(|| Self::Other(s.to_string())))
    }
}

impl Serialize for LocateStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LocateStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
