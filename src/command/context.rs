//! Execution context handed to command functions.
//!
//! The context carries the driver client, the page or section the command was
//! invoked on, and the per-call flags (async test case, container).
//!
//! # Command Queue
//!
//! Futures returned by section commands outside an async test case are not
//! handed back to the caller; they are enqueued on the client and run in
//! program order:
//!
//! ```text
//! section.call("click") ──► Client::enqueue ──► CommandQueue (FIFO)
//!                                                   │
//!                              CommandQueue::run ◄──┘ awaits one by one
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Result;
use crate::page::{CommandTarget, Page};
use crate::selector::Element;

// ============================================================================
// Client
// ============================================================================

/// Connection to the remote driver.
///
/// The core never talks to the browser itself; command functions use the
/// client to send protocol commands.
#[async_trait]
pub trait Client: Send + Sync {
    /// Sends a protocol command and returns its result.
    async fn send(&self, method: &str, params: Value) -> Result<Value>;

    /// Schedules a detached command future in the driver's FIFO queue.
    fn enqueue(&self, command: &str, task: BoxFuture<'static, Result<Value>>);
}

// ============================================================================
// CommandQueue
// ============================================================================

/// A queued command future.
struct QueuedTask {
    command: String,
    task: BoxFuture<'static, Result<Value>>,
}

/// FIFO of detached command futures.
///
/// Intended to be embedded by [`Client`] implementations.
#[derive(Default)]
pub struct CommandQueue {
    tasks: Mutex<VecDeque<QueuedTask>>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a future to the queue.
    pub fn push(&self, command: impl Into<String>, task: BoxFuture<'static, Result<Value>>) {
        let command = command.into();
        trace!(command = %command, "Command enqueued");
        self.tasks.lock().push_back(QueuedTask { command, task });
    }

    /// Returns the number of queued futures.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Runs queued futures one after another until the queue is empty.
    ///
    /// Futures enqueued while running are picked up in order. Returns each
    /// command name with its result.
    pub async fn run(&self) -> Vec<(String, Result<Value>)> {
        let mut results = Vec::new();
        loop {
            // Lock is released before awaiting
            let next = self.tasks.lock().pop_front();
            let Some(QueuedTask { command, task }) = next else {
                break;
            };

            let result = task.await;
            debug!(command = %command, ok = result.is_ok(), "Queued command finished");
            results.push((command, result));
        }
        results
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// ExecutionContext
// ============================================================================

/// Context a command function runs in.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Driver client.
    client: Arc<dyn Client>,
    /// Page or section the command was invoked on.
    target: CommandTarget,
    /// Name of the running command.
    command: String,
    /// Whether the call happens inside an async test case.
    is_es6_async_testcase: bool,
    /// Container for container-relative resolution.
    within: Option<Element>,
    /// Handle of an already located scope element.
    scope: Option<Value>,
}

impl ExecutionContext {
    /// Creates a context for one invocation.
    #[must_use]
    pub fn new(target: CommandTarget, command: impl Into<String>) -> Self {
        let page = target.page();
        Self {
            client: page.client(),
            is_es6_async_testcase: page.is_async_testcase(),
            target,
            command: command.into(),
            within: None,
            scope: None,
        }
    }

    /// Sets the container flag.
    #[inline]
    #[must_use]
    pub fn with_within(mut self, container: Option<Element>) -> Self {
        self.within = container;
        self
    }

    /// Sets the located scope handle.
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: Value) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Overrides the async test case flag.
    #[inline]
    #[must_use]
    pub fn with_async_testcase(mut self, is_async: bool) -> Self {
        self.is_es6_async_testcase = is_async;
        self
    }
}

// ============================================================================
// ExecutionContext - Accessors
// ============================================================================

impl ExecutionContext {
    /// Returns the driver client.
    #[inline]
    #[must_use]
    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    /// Returns the page or section the command was invoked on.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &CommandTarget {
        &self.target
    }

    /// Returns the owning page.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &Page {
        self.target.page()
    }

    /// Returns the running command's name.
    #[inline]
    #[must_use]
    pub fn command_name(&self) -> &str {
        &self.command
    }

    /// Returns `true` inside an async test case.
    #[inline]
    #[must_use]
    pub fn is_es6_async_testcase(&self) -> bool {
        self.is_es6_async_testcase
    }

    /// Returns the container, if the call is container-relative.
    #[inline]
    #[must_use]
    pub fn within(&self) -> Option<&Element> {
        self.within.as_ref()
    }

    /// Returns the located scope handle.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<&Value> {
        self.scope.as_ref()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("target", &self.target)
            .field("command", &self.command)
            .field("is_es6_async_testcase", &self.is_es6_async_testcase)
            .field("within", &self.within)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
