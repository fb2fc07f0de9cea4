//! Selector model.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LocateStrategy`] | Driver locate strategy |
//! | [`ElementReference`] | Parsed `@name[:pseudo]` reference |
//! | [`Element`] | Resolved selector or recursive chain |
//! | [`SelectorDescriptor`] | Caller `{selector, locateStrategy}` object |

// ============================================================================
// Submodules
// ============================================================================

/// Selector classification of command arguments.
pub mod classify;

/// Resolved elements and recursive chains.
pub mod element;

/// `@name[:pseudo]` reference parser.
pub mod reference;

/// Locate strategies.
pub mod strategy;

// ============================================================================
// Re-exports
// ============================================================================

pub use classify::{is_element_command, is_possible_element_selector, is_scoped_element_command};
pub use element::{Element, ElementDefaults, ElementSelector, SelectorDescriptor};
pub use reference::{ElementReference, ReferenceKind};
pub use strategy::LocateStrategy;
