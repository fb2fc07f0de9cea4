//! Type-safe identifiers for page-object entities.
//!
//! Newtype wrappers prevent mixing section indices with other integers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SectionId`] | Index of a section in a page's section arena |
//! | [`Scope`] | Either the page root or one of its sections |

use std::fmt;

// ============================================================================
// SectionId
// ============================================================================

/// Index of a section inside its page's section arena.
///
/// Elements refer to their owning section through this id, never through an
/// owning pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(usize);

impl SectionId {
    /// Creates a section id from an arena index.
    #[inline]
    #[must_use]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

// ============================================================================
// Scope
// ============================================================================

/// A container that declares elements and owns commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// The page root.
    #[default]
    Page,
    /// A (possibly nested) section.
    Section(SectionId),
}

impl Scope {
    /// Returns the section id, or `None` for the page root.
    #[inline]
    #[must_use]
    pub fn section_id(self) -> Option<SectionId> {
        match self {
            Self::Page => None,
            Self::Section(id) => Some(id),
        }
    }

    /// Returns `true` for a section scope.
    #[inline]
    #[must_use]
    pub fn is_section(self) -> bool {
        matches!(self, Self::Section(_))
    }
}

impl From<SectionId> for Scope {
    fn from(id: SectionId) -> Self {
        Self::Section(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
