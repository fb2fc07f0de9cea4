//! Shared fixtures for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};

use crate::command::{Arg, Client, CommandDefinition, CommandQueue};
use crate::error::Result;
use crate::page::{Page, PageDefinition};

// ============================================================================
// RecordingClient
// ============================================================================

/// Client recording sent methods and queueing detached futures.
#[derive(Debug, Default)]
pub(crate) struct RecordingClient {
    sent: Mutex<Vec<String>>,
    responses: Mutex<FxHashMap<String, Value>>,
    queue: CommandQueue,
}

impl RecordingClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers `method` with `value`.
    pub(crate) fn with_response(self, method: &str, value: Value) -> Self {
        self.responses.lock().insert(method.to_string(), value);
        self
    }

    /// Returns sent methods in order.
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub(crate) fn queue(&self) -> &CommandQueue {
        &self.queue
    }
}

#[async_trait]
impl Client for RecordingClient {
    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.sent.lock().push(method.to_string());
        let response = self.responses.lock().get(method).cloned();
        Ok(response.unwrap_or(params))
    }

    fn enqueue(&self, command: &str, task: BoxFuture<'static, Result<Value>>) {
        self.queue.push(command, task);
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Page with two elements and a `footer` section nesting `social`.
pub(crate) fn footer_definition() -> PageDefinition {
    let definition = json!({
        "elements": {
            "submit": "#submit",
            "search": { "selector": "//input[@name='q']", "locateStrategy": "xpath" }
        },
        "sections": {
            "footer": {
                "selector": ".footer",
                "elements": {
                    "link": "a.link",
                    "logo": { "selector": "logo", "locateStrategy": "tag name", "index": 1 }
                },
                "sections": {
                    "social": {
                        "selector": ".social",
                        "elements": { "icon": "a.icon" }
                    }
                }
            }
        }
    });
    serde_json::from_value(definition).expect("valid fixture")
}

/// Builds the footer page with a fresh [`RecordingClient`].
pub(crate) fn footer_page() -> Page {
    footer_page_with(Arc::new(RecordingClient::new()), false)
}

pub(crate) fn footer_page_with(client: Arc<RecordingClient>, async_testcase: bool) -> Page {
    Page::builder("home")
        .client(client)
        .definition(footer_definition())
        .async_testcase(async_testcase)
        .build()
        .expect("valid page")
}

/// Synchronous command returning `null`.
pub(crate) fn noop() -> CommandDefinition {
    CommandDefinition::sync(|_, _| Ok(Value::Null))
}

/// Installs a test subscriber honouring `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Argument lists received by a recording command.
pub(crate) type Recorded = Arc<Mutex<Vec<Vec<Arg>>>>;

/// Synchronous command recording its arguments.
pub(crate) fn recorder() -> (CommandDefinition, Recorded) {
    let recorded = Recorded::default();
    let sink = Arc::clone(&recorded);
    let definition = CommandDefinition::sync(move |_, args| {
        sink.lock().push(args);
        Ok(Value::Null)
    });
    (definition, recorded)
}

/// Asynchronous command recording its arguments and resolving to `value`.
pub(crate) fn async_recorder(value: Value) -> (CommandDefinition, Recorded) {
    let recorded = Recorded::default();
    let sink = Arc::clone(&recorded);
    let definition = CommandDefinition::future(move |_, args| {
        sink.lock().push(args);
        let value = value.clone();
        async move { Ok(value) }
    });
    (definition, recorded)
}

/// Returns the first argument of the `call`-th recorded invocation.
pub(crate) fn first_arg(recorded: &Recorded, call: usize) -> Arg {
    recorded.lock()[call][0].clone()
}
