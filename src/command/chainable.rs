//! Chainable command results.
//!
//! Every command call returns a [`ChainableResult`]:
//!
//! | Variant | When | Caller can |
//! |---------|------|-----------|
//! | `Target` | synchronous command, or detached future | keep calling commands |
//! | `Promise` | future on a page, or inside an async test case | `.await` it and keep calling page commands |
//! | `Raw` | assertion (`expect`) | inspect or await the raw result |
//!
//! # Example
//!
//! ```ignore
//! // Fluent chaining
//! page.call("click", vec!["@submit".into()])?
//!     .call("setValue", vec!["@search".into(), "rust".into()])?;
//!
//! // Awaitable and still chainable
//! let promise = page.call("getText", vec!["@title".into()])?.into_promise().unwrap();
//! promise.call("click", vec!["@submit".into()])?;
//! let title = promise.await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::page::{CommandTarget, Namespace, Page, Section};

use super::args::Arg;
use super::function::CommandOutput;

// ============================================================================
// ChainablePromise
// ============================================================================

/// A pending command result that also exposes the owning page's commands.
///
/// Awaiting it yields exactly the value the command's future produced;
/// command calls are forwarded to the retained page.
pub struct ChainablePromise {
    future: BoxFuture<'static, Result<Value>>,
    page: Page,
}

impl ChainablePromise {
    /// Wraps a command future.
    #[must_use]
    pub fn new(future: BoxFuture<'static, Result<Value>>, page: Page) -> Self {
        Self { future, page }
    }

    /// Returns the page commands are forwarded to.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl Future for ChainablePromise {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().future.poll_unpin(cx)
    }
}

impl Deref for ChainablePromise {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl fmt::Debug for ChainablePromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainablePromise")
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ChainableResult
// ============================================================================

/// Value returned to callers of a command.
#[derive(Debug)]
pub enum ChainableResult {
    /// The owning page or section, for fluent chaining.
    Target(CommandTarget),
    /// Awaitable result that also exposes the page's commands.
    Promise(ChainablePromise),
    /// Unmodified assertion result; terminal.
    Raw(CommandOutput),
}

impl ChainableResult {
    /// Calls another command on the chained page or section.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] when chaining off an assertion result
    /// - any error of the invoked command
    pub fn call(&self, command: &str, args: Vec<Arg>) -> Result<ChainableResult> {
        match self {
            Self::Target(target) => target.call(command, args),
            Self::Promise(promise) => promise.call(command, args),
            Self::Raw(_) => Err(Self::terminal(command)),
        }
    }

    /// Returns a namespace of the chained page or section.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] when chaining off an assertion result
    /// - [`Error::CommandNotFound`] if the namespace does not exist
    pub fn namespace(&self, name: &str) -> Result<Namespace> {
        match self {
            Self::Target(target) => target.namespace(name),
            Self::Promise(promise) => promise.namespace(name),
            Self::Raw(_) => Err(Self::terminal(name)),
        }
    }

    /// Returns a sub-section of the chained page or section.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] when chaining off an assertion result
    /// - [`Error::SectionNotFound`] if the section does not exist
    pub fn section(&self, name: &str) -> Result<Section> {
        match self {
            Self::Target(target) => target.section(name),
            Self::Promise(promise) => promise.section(name),
            Self::Raw(_) => Err(Self::terminal(name)),
        }
    }

    /// Returns the chained page or section.
    #[must_use]
    pub fn target(&self) -> Option<&CommandTarget> {
        match self {
            Self::Target(target) => Some(target),
            _ => None,
        }
    }

    /// Converts into the awaitable promise, if this is one.
    #[must_use]
    pub fn into_promise(self) -> Option<ChainablePromise> {
        match self {
            Self::Promise(promise) => Some(promise),
            _ => None,
        }
    }

    /// Converts into the raw assertion result, if this is one.
    #[must_use]
    pub fn into_raw(self) -> Option<CommandOutput> {
        match self {
            Self::Raw(output) => Some(output),
            _ => None,
        }
    }

    /// Returns `true` for a promise result.
    #[inline]
    #[must_use]
    pub fn is_promise(&self) -> bool {
        matches!(self, Self::Promise(_))
    }

    /// Waits for the result value.
    ///
    /// Fluent targets carry no value and resolve to `null`.
    pub async fn resolve(self) -> Result<Value> {
        match self {
            Self::Target(_) => Ok(Value::Null),
            Self::Promise(promise) => promise.await,
            Self::Raw(output) => output.resolve().await,
        }
    }

    fn terminal(command: &str) -> Error {
        Error::invalid_argument(format!(
            "cannot call \"{command}\" on an assertion result; assertions are terminal"
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
