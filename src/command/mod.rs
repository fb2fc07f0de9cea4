//! Commands.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CommandDefinition`] | A sync or async function plus registration options |
//! | [`Command`] | Selector-resolving wrapper bound to a page or section |
//! | [`CommandLoader`] | Registers a loader's [`CommandMap`] on a target |
//! | [`ElementApi`] | Scoped `element(...)` accessor and methods |
//! | [`ChainableResult`] | What a call returns: target, promise or raw result |
//! | [`ExecutionContext`] | Client and call flags handed to functions |

// ============================================================================
// Submodules
// ============================================================================

/// Call arguments.
pub mod args;

/// Chainable results.
pub mod chainable;

/// Client seam and execution context.
pub mod context;

/// Command functions and definitions.
pub mod function;

/// Loader registration.
pub mod loader;

/// Scoped element API.
pub mod scoped;

/// Per-scope command tables.
pub(crate) mod table;

/// Selector-resolving wrapper.
pub mod wrapper;

// ============================================================================
// Re-exports
// ============================================================================

pub use args::Arg;
pub use chainable::{ChainablePromise, ChainableResult};
pub use context::{Client, CommandQueue, ExecutionContext};
pub use function::{AsyncFn, CommandDefinition, CommandFn, CommandOutput, SyncFn};
pub use loader::{
    CommandEntry, CommandLoader, CommandMap, CommandRegistry, LoaderFn, NAMESPACES,
    is_builtin_namespace,
};
pub use scoped::{ELEMENT_API, ElementApi, wrap_element_command, wrap_scoped_element_api};
pub use table::NamespaceMode;
pub use wrapper::{Command, EXPECT_NAMESPACE, ElementMode, Resolution};
