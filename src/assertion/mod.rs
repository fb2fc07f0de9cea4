//! Assertions.
//!
//! An [`Assertion`] fetches raw data through the client, extracts the value
//! under test, and evaluates it. [`assertion_command`] turns an assertion
//! factory into a registrable [`CommandDefinition`]:
//!
//! ```text
//! args ──► factory ──► Assertion::command ──► value ──► evaluate
//!                                                         │
//!                    Ok(raw result) ◄── pass ─────────────┤
//!               Err(AssertionFailed) ◄── fail ─────────────┘
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`soft`] | `assert` / `verify` namespace modes |
//! | [`url_matches`] | Regex URL assertion |

// ============================================================================
// Submodules
// ============================================================================

/// Strict and soft assertion namespaces.
pub mod soft;

/// URL regex assertion.
pub mod url_matches;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::command::{Arg, CommandDefinition, ExecutionContext};
use crate::error::{Error, Result};

// ============================================================================
// Re-exports
// ============================================================================

pub use soft::{ASSERT_NAMESPACE, VERIFY_NAMESPACE};
pub use url_matches::UrlMatches;

// ============================================================================
// Assertion
// ============================================================================

/// A single leaf assertion.
#[async_trait]
pub trait Assertion: Send + Sync {
    /// Returns the expected value, used in failure messages.
    fn expected(&self) -> Value;

    /// Returns the message template and its `%s` arguments.
    fn format_message(&self) -> (String, Vec<Value>);

    /// Returns `true` if `value` satisfies the assertion.
    fn evaluate(&self, value: &Value) -> bool;

    /// Extracts the value under test from the raw command result.
    fn value(&self, result: &Value) -> Value {
        result.clone()
    }

    /// Fetches the raw data through the client.
    async fn command(&self, ctx: &ExecutionContext) -> Result<Value>;
}

// ============================================================================
// Runner
// ============================================================================

/// Adapts an assertion factory into an asynchronous command.
///
/// The factory builds the assertion from the call arguments; argument errors
/// surface when the returned future is awaited. On success the command yields
/// the raw result.
pub fn assertion_command<F, A>(factory: F) -> CommandDefinition
where
    F: Fn(&ExecutionContext, Vec<Arg>) -> Result<A> + Send + Sync + 'static,
    A: Assertion + 'static,
{
    CommandDefinition::future(move |ctx: ExecutionContext, args: Vec<Arg>| {
        let assertion = factory(&ctx, args);
        async move {
            let assertion = assertion?;
            let result = assertion.command(&ctx).await?;
            let actual = assertion.value(&result);

            let (template, message_args) = assertion.format_message();
            let message = render_message(&template, &message_args);

            if assertion.evaluate(&actual) {
                debug!(command = %ctx.command_name(), message = %message, "Assertion passed");
                Ok(result)
            } else {
                Err(Error::assertion_failed(
                    message,
                    render_value(&assertion.expected()),
                    render_value(&actual),
                ))
            }
        }
    })
}

/// Replaces `%s` placeholders in order.
///
/// Placeholders without a matching argument are left as-is.
#[must_use]
pub fn render_message(template: &str, args: &[Value]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(index) = rest.find("%s") {
        rendered.push_str(&rest[..index]);
        match args.next() {
            Some(arg) => rendered.push_str(&render_value(arg)),
            None => rendered.push_str("%s"),
        }
        rest = &rest[index + 2..];
    }
    rendered.push_str(rest);
    rendered
}

/// Renders strings unquoted and everything else as JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::command::{CommandEntry, CommandLoader, CommandMap};
    use crate::test_support::footer_page;

    struct Equals {
        expected: Value,
        actual: Value,
    }

    #[async_trait]
    impl Assertion for Equals {
        fn expected(&self) -> Value {
            self.expected.clone()
        }

        fn format_message(&self) -> (String, Vec<Value>) {
            ("Testing if value equals '%s'".to_string(), vec![self.expected.clone()])
        }

        fn evaluate(&self, value: &Value) -> bool {
            *value == self.expected
        }

        async fn command(&self, _ctx: &ExecutionContext) -> Result<Value> {
            Ok(self.actual.clone())
        }
    }

    #[test]
    fn test_render_message() {
        assert_eq!(
            render_message("a %s b %s", &[Value::from("x"), Value::from(2)]),
            "a x b 2"
        );
        assert_eq!(render_message("only %s %s", &[Value::from(true)]), "only true %s");
        assert_eq!(render_message("plain", &[]), "plain");
    }

    #[tokio::test]
    async fn test_assertion_passes() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            let equals = assertion_command(|_, _| {
                Ok(Equals {
                    expected: Value::from("home"),
                    actual: Value::from("home"),
                })
            });
            Ok(CommandMap::from([(
                "expect".to_string(),
                CommandEntry::Namespace([("equals".to_string(), equals)].into()),
            )]))
        })
        .unwrap();

        let raw = page.namespace("expect").unwrap().call("equals", vec![]).unwrap();
        assert_eq!(raw.resolve().await.unwrap(), Value::from("home"));
    }

    #[tokio::test]
    async fn test_assertion_fails_with_message() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            let equals = assertion_command(|_, _| {
                Ok(Equals {
                    expected: Value::from("home"),
                    actual: Value::from("away"),
                })
            });
            Ok(CommandMap::from([("equals".to_string(), equals.into())]))
        })
        .unwrap();

        let err = page
            .call("equals", vec![])
            .unwrap()
            .into_promise()
            .unwrap()
            .await
            .unwrap_err();

        match err {
            Error::AssertionFailed {
                message,
                expected,
                actual,
            } => {
                assert_eq!(message, "Testing if value equals 'home'");
                assert_eq!(expected, "home");
                assert_eq!(actual, "away");
            }
            other => panic!("Expected assertion failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_factory_error_surfaces_on_await() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            let broken = assertion_command(|_, _| -> Result<Equals> {
                Err(Error::invalid_argument("missing expected value"))
            });
            Ok(CommandMap::from([("broken".to_string(), broken.into())]))
        })
        .unwrap();

        let result = page.call("broken", vec![]).unwrap().resolve().await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }
}
