//! Page-object command and selector resolution core.
//!
//! This library is the layer between page-object declarations and the
//! commands of a browser automation driver. Pages and sections declare named
//! elements; commands are called with `@name` references instead of raw
//! locators and the core resolves them into concrete locate-strategy chains.
//!
//! # Architecture
//!
//! ```text
//! page.section("footer")?.call("click", ["@link"])
//!        │
//!        ▼
//!   Command::execute_command
//!        ├─ parse_element_selector ── SectionTree lookup ── [.footer, a.link]
//!        ├─ within container (optional)
//!        ├─ CommandFn::invoke ── Client::send
//!        └─ create_result ── Target | ChainablePromise | Raw
//! ```
//!
//! Key design principles:
//!
//! - Declarations are immutable; sections live in an arena indexed by
//!   [`SectionId`]
//! - Resolution succeeds or fails before the command function runs
//! - Every call returns a [`ChainableResult`], whether the function is
//!   synchronous or returns a future
//! - The core never talks to the browser; a [`Client`] does
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use pageobject_core::{
//!     CommandDefinition, CommandEntry, CommandMap, Page, Result, SectionBuilder,
//! };
//!
//! fn build(client: Arc<dyn pageobject_core::Client>) -> Result<()> {
//!     let page = Page::builder("home")
//!         .client(client)
//!         .element("submit", "#submit")
//!         .section("footer", SectionBuilder::new(".footer").element("link", "a.link"))
//!         .commands(|_registry| {
//!             let click = CommandDefinition::future(|ctx, args| async move {
//!                 let element = args.first().map(|arg| arg.to_value()).unwrap_or_default();
//!                 ctx.client().send("click", element).await
//!             });
//!             Ok(CommandMap::from([("click".to_string(), CommandEntry::from(click))]))
//!         })
//!         .build()?;
//!
//!     page.call("click", vec!["@submit".into()])?;
//!     page.section("footer")?.call("click", vec!["@link".into()])?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`selector`] | Locate strategies, `@name` references, [`Element`] chains |
//! | [`page`] | Declarations, [`SectionTree`], [`Page`] and [`Section`] handles |
//! | [`command`] | [`Command`] wrapper, registration, chainable results |
//! | [`assertion`] | [`Assertion`] runner, soft assertions, [`UrlMatches`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Assertions and the assertion runner.
///
/// Use [`assertion_command`] to turn an [`Assertion`] into a command.
pub mod assertion;

/// Commands, registration and dispatch.
///
/// Loaders are registered through [`CommandLoader::add_wrapped_commands`].
pub mod command;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for page-object entities.
pub mod identifiers;

/// Page declarations and handles.
///
/// Use [`Page::builder()`] to create a page.
pub mod page;

/// Selector model.
pub mod selector;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

// Assertion types
pub use assertion::{Assertion, UrlMatches, assertion_command};

// Command types
pub use command::{
    Arg, ChainablePromise, ChainableResult, Client, Command, CommandDefinition, CommandEntry,
    CommandFn, CommandLoader, CommandMap, CommandOutput, CommandQueue, CommandRegistry,
    ElementApi, ExecutionContext, NamespaceMode,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{Scope, SectionId};

// Page types
pub use page::{
    CommandTarget, Namespace, Page, PageBuilder, PageDefinition, Section, SectionBuilder,
    SectionDefinition, SectionTree, Within,
};

// Selector types
pub use selector::{Element, ElementReference, LocateStrategy, SelectorDescriptor};
