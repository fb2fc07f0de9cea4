//! Page objects.
//!
//! A page is built from declarations ([`PageDefinition`] or [`PageBuilder`])
//! into an immutable [`SectionTree`] plus mutable per-scope command tables.
//!
//! # Example
//!
//! ```ignore
//! use pageobject_core::{Page, SectionBuilder};
//!
//! let page = Page::builder("home")
//!     .client(client)
//!     .element("submit", "#go")
//!     .section("footer", SectionBuilder::new(".footer").element("link", "a.link"))
//!     .build()?;
//!
//! page.section("footer")?.call("click", vec!["@link".into()])?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Page and section builders.
pub mod builder;

/// Page, section and namespace handles.
pub mod core;

/// Serde declarations.
pub mod definition;

/// Declaration arena and lookup.
pub mod tree;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{PageBuilder, SectionBuilder};
pub use core::{CommandTarget, Namespace, Page, Section, Within};
pub use definition::{ElementDeclaration, ElementDeclarations, PageDefinition, SectionDefinition};
pub use tree::SectionTree;
