//! Command functions and their definitions.
//!
//! A command function is either synchronous, returning its value directly, or
//! asynchronous, returning a future. The variant is the function's declared
//! execution nature and decides how results are chained.
//!
//! # Example
//!
//! ```ignore
//! use pageobject_core::{CommandDefinition, Arg};
//! use serde_json::Value;
//!
//! let click = CommandDefinition::sync(|ctx, args| {
//!     tracing::debug!(selector = ?args.first(), "click");
//!     Ok(Value::Null)
//! });
//!
//! let get_text = CommandDefinition::future(|ctx, args| async move {
//!     let payload = args.first().map(Arg::to_value).unwrap_or_default();
//!     ctx.client().send("getText", payload).await
//! });
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::Result;

use super::args::Arg;
use super::context::ExecutionContext;

// ============================================================================
// Types
// ============================================================================

/// Synchronous command body.
pub type SyncFn = dyn Fn(&ExecutionContext, Vec<Arg>) -> Result<Value> + Send + Sync;

/// Asynchronous command body.
pub type AsyncFn =
    dyn Fn(ExecutionContext, Vec<Arg>) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A callable command body.
#[derive(Clone)]
pub enum CommandFn {
    /// Returns its value immediately.
    Sync(Arc<SyncFn>),
    /// Returns a future.
    Async(Arc<AsyncFn>),
}

/// What a command function produced.
pub enum CommandOutput {
    /// Immediate value.
    Ready(Value),
    /// Value still being computed.
    Pending(BoxFuture<'static, Result<Value>>),
}

// ============================================================================
// CommandFn
// ============================================================================

impl CommandFn {
    /// Returns `true` for asynchronous bodies.
    #[inline]
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Invokes the body.
    ///
    /// Synchronous errors are returned immediately; asynchronous errors
    /// surface when the future resolves.
    pub fn invoke(&self, ctx: &ExecutionContext, args: Vec<Arg>) -> Result<CommandOutput> {
        match self {
            Self::Sync(function) => function(ctx, args).map(CommandOutput::Ready),
            Self::Async(function) => Ok(CommandOutput::Pending(function(ctx.clone(), args))),
        }
    }
}

impl fmt::Debug for CommandFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("CommandFn::Sync"),
            Self::Async(_) => f.write_str("CommandFn::Async"),
        }
    }
}

// ============================================================================
// CommandOutput
// ============================================================================

impl CommandOutput {
    /// Returns `true` if the value is still pending.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Waits for the value.
    pub async fn resolve(self) -> Result<Value> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Pending(future) => future.await,
        }
    }

    /// Converts into a future regardless of readiness.
    #[must_use]
    pub fn into_future(self) -> BoxFuture<'static, Result<Value>> {
        match self {
            Self::Ready(value) => futures_util::future::ready(Ok(value)).boxed(),
            Self::Pending(future) => future,
        }
    }
}

impl fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

// ============================================================================
// CommandDefinition
// ============================================================================

/// A function exposed by a loader, plus registration options.
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    function: CommandFn,
    element_command: bool,
    overwrite: bool,
}

impl CommandDefinition {
    /// Defines a synchronous command.
    pub fn sync<F>(function: F) -> Self
    where
        F: Fn(&ExecutionContext, Vec<Arg>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_fn(CommandFn::Sync(Arc::new(function)))
    }

    /// Defines an asynchronous command.
    pub fn future<F, Fut>(function: F) -> Self
    where
        F: Fn(ExecutionContext, Vec<Arg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::from_fn(CommandFn::Async(Arc::new(
            move |ctx: ExecutionContext, args: Vec<Arg>| function(ctx, args).boxed(),
        )))
    }

    /// Wraps an existing command body.
    #[must_use]
    pub fn from_fn(function: CommandFn) -> Self {
        Self {
            function,
            element_command: false,
            overwrite: false,
        }
    }

    /// Marks a user-defined command that accepts an element.
    ///
    /// Inside a container, such commands receive the container through the
    /// element's `container` field instead of a recursive chain.
    #[inline]
    #[must_use]
    pub fn element_command(mut self) -> Self {
        self.element_command = true;
        self
    }

    /// Allows replacing an existing command with the same name.
    #[inline]
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Returns the command body.
    #[inline]
    #[must_use]
    pub fn function(&self) -> &CommandFn {
        &self.function
    }

    /// Returns `true` for asynchronous bodies.
    #[inline]
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.function.is_async()
    }

    /// Returns `true` for user-defined element-accepting commands.
    #[inline]
    #[must_use]
    pub fn is_element_command(&self) -> bool {
        self.element_command
    }

    /// Returns `true` if overwriting is allowed.
    #[inline]
    #[must_use]
    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }
}

// ============================================================================
// Tests
// ============================================================================
