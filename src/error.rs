//! Error types for the page-object core.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use pageobject_core::{Arg, Result};
//!
//! fn example(page: &Page) -> Result<()> {
//!     page.call("click", vec![Arg::from("@submit")])?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Declaration | [`Error::Config`], [`Error::InvalidSelector`], [`Error::InvalidReference`] |
//! | Lookup | [`Error::ElementNotFound`], [`Error::SectionNotFound`], [`Error::UnknownSection`], [`Error::CommandNotFound`] |
//! | Registration | [`Error::DuplicateCommand`] |
//! | Execution | [`Error::Command`], [`Error::AssertionFailed`], [`Error::InvalidArgument`] |
//! | External | [`Error::Json`], [`Error::Regex`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ========================================================================
    // Declaration Errors
    // ========================================================================
    /// Page or section declaration is invalid.
    ///
    /// Returned by builders and definition loading.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Selector value could not be interpreted.
    #[error("Invalid selector: {message}")]
    InvalidSelector {
        /// Description of the problem.
        message: String,
    },

    /// Malformed `@name[:pseudo]` reference.
    #[error("Invalid element reference \"{reference}\": {message}")]
    InvalidReference {
        /// The raw reference string.
        reference: String,
        /// Description of the problem.
        message: String,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// Declared element not found, or its locate strategy did not match.
    ///
    /// `available` lists every declared element of the container.
    #[error("{}", lookup_message("element", name, container, strategy.as_deref(), available))]
    ElementNotFound {
        /// Referenced name (without `@`).
        name: String,
        /// Name of the page or section searched.
        container: String,
        /// Locate strategy filter, if one was requested.
        strategy: Option<String>,
        /// Available names, annotated with strategies when filtered.
        available: Vec<String>,
    },

    /// Declared section not found, or its locate strategy did not match.
    #[error("{}", lookup_message("section", name, container, strategy.as_deref(), available))]
    SectionNotFound {
        /// Referenced name (without `@`).
        name: String,
        /// Name of the page or section searched.
        container: String,
        /// Locate strategy filter, if one was requested.
        strategy: Option<String>,
        /// Available names, annotated with strategies when filtered.
        available: Vec<String>,
    },

    /// Section id does not belong to the page's arena.
    #[error("Section {section} does not belong to page \"{page}\"")]
    UnknownSection {
        /// Arena index of the foreign id.
        section: usize,
        /// Name of the page searched.
        page: String,
    },

    /// No command registered under this name.
    #[error("Command \"{command}\" is not defined on \"{target}\"")]
    CommandNotFound {
        /// Requested command name.
        command: String,
        /// Page, section or namespace searched.
        target: String,
    },

    // ========================================================================
    // Registration Errors
    // ========================================================================
    /// Command already registered on its target.
    ///
    /// Raised while building page objects, never at call time.
    #[error("The command \"{command}\" is already defined on \"{target}\"")]
    DuplicateCommand {
        /// Duplicated command name.
        command: String,
        /// Page, section or namespace the command was registered on.
        target: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Error raised by a wrapped command function.
    #[error("Command \"{command}\" failed: {message}")]
    Command {
        /// Command name.
        command: String,
        /// Error message from the command.
        message: String,
    },

    /// Assertion evaluated to false.
    #[error("{message}")]
    AssertionFailed {
        /// Formatted assertion message.
        message: String,
        /// Expected value description.
        expected: String,
        /// Actual value observed.
        actual: String,
    },

    /// Invalid argument passed to a command.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON deserialization error.
    #[error("JSON error: {message}")]
    Json {
        /// Error message from serde.
        message: String,
    },

    /// Regular expression compile error.
    #[error("Regex error: {message}")]
    Regex {
        /// Error message from the regex compiler.
        message: String,
    },
}

// ============================================================================
// Lookup Message
// ============================================================================

fn lookup_message(
    kind: &str,
    name: &str,
    container: &str,
    strategy: Option<&str>,
    available: &[String],
) -> String {
    let plural = if kind == "element" { "elements" } else { "sections" };
    let listed = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };

    match strategy {
        Some(strategy) => format!(
            "{kind} \"@{name}\" using \"{strategy}\" was not found in \"{container}\". Available {plural}: {listed}"
        ),
        None => format!(
            "{kind} \"@{name}\" was not found in \"{container}\". Available {plural}: {listed}"
        ),
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            message: message.into(),
        }
    }

    /// Creates an invalid reference error.
    #[inline]
    pub fn invalid_reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Creates a duplicate command error.
    #[inline]
    pub fn duplicate_command(command: impl Into<String>, target: impl Into<String>) -> Self {
        Self::DuplicateCommand {
            command: command.into(),
            target: target.into(),
        }
    }

    /// Creates a command not found error.
    #[inline]
    pub fn command_not_found(command: impl Into<String>, target: impl Into<String>) -> Self {
        Self::CommandNotFound {
            command: command.into(),
            target: target.into(),
        }
    }

    /// Creates a pass-through error for a failing command function.
    #[inline]
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates an assertion failure.
    #[inline]
    pub fn assertion_failed(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionFailed {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// ============================================================================
// External Conversions
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Regex {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a lookup error.
    #[inline]
    #[must_use]
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::SectionNotFound { .. }
                | Self::UnknownSection { .. }
        )
    }

    /// Returns `true` if this is an assertion failure.
    #[inline]
    #[must_use]
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }

    /// Returns `true` if the reporting layer should display this error.
    ///
    /// Registration errors are internal programming errors and are hidden.
    #[inline]
    #[must_use]
    pub fn displayed(&self) -> bool {
        !matches!(self, Self::DuplicateCommand { .. })
    }

    /// Returns `true` if the reporting layer should print a stack trace.
    #[inline]
    #[must_use]
    pub fn show_trace(&self) -> bool {
        !matches!(self, Self::DuplicateCommand { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
