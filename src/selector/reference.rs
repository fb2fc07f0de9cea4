//! `@name[:pseudo]` element references.
//!
//! A reference names an element or section declared on a page object. The
//! optional suffix after the first `:` qualifies a facet of the element, e.g.
//! `@heading:first-line`.

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Prefix marking a declared-name reference.
pub const REFERENCE_PREFIX: char = '@';

/// Separator between the name and the pseudo selector.
const PSEUDO_SEPARATOR: char = ':';

// ============================================================================
// Types
// ============================================================================

/// Whether a reference carries a pseudo selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Plain `@name`.
    Declared,
    /// `@name:pseudo`.
    Pseudo,
}

/// A parsed `@name[:pseudo]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementReference {
    kind: ReferenceKind,
    name: String,
    pseudo_selector: Option<String>,
}

// ============================================================================
// ElementReference - Parsing
// ============================================================================

impl ElementReference {
    /// Returns `true` if the string uses the reference syntax.
    #[inline]
    #[must_use]
    pub fn is_reference(value: &str) -> bool {
        value.starts_with(REFERENCE_PREFIX)
    }

    /// Parses a reference string.
    ///
    /// Only the first `:` separates the pseudo selector; later colons belong
    /// to it. An empty suffix (`@name:`) is treated as no pseudo selector.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidReference`] if the `@` prefix is missing or the name is
    ///   empty or contains whitespace
    pub fn parse(value: &str) -> Result<Self> {
        let body = value
            .strip_prefix(REFERENCE_PREFIX)
            .ok_or_else(|| Error::invalid_reference(value, "missing '@' prefix"))?;

        let (name, pseudo) = match body.split_once(PSEUDO_SEPARATOR) {
            Some((name, pseudo)) => (name, Some(pseudo)),
            None => (body, None),
        };

        if name.is_empty() {
            return Err(Error::invalid_reference(value, "name is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::invalid_reference(value, "name contains whitespace"));
        }

        let pseudo_selector = pseudo.filter(|p| !p.is_empty()).map(str::to_string);
        let kind = if pseudo_selector.is_some() {
            ReferenceKind::Pseudo
        } else {
            ReferenceKind::Declared
        };

        Ok(Self {
            kind,
            name: name.to_string(),
            pseudo_selector,
        })
    }
}

// ============================================================================
// ElementReference - Accessors
// ============================================================================

impl ElementReference {
    /// Returns the reference kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Returns the declared name (without `@`).
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pseudo selector, if any.
    #[inline]
    #[must_use]
    pub fn pseudo_selector(&self) -> Option<&str> {
        self.pseudo_selector.as_deref()
    }
}

impl fmt::Display for ElementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{REFERENCE_PREFIX}{}", self.name)?;
        if let Some(pseudo) = &self.pseudo_selector {
            write!(f, "{PSEUDO_SEPARATOR}{pseudo}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
