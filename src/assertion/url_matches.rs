//! Regex URL assertion.
//!
//! ```ignore
//! page.namespace("assert")?.call("urlMatches", vec!["^https://example\\.com".into()])?;
//! ```

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::command::{Arg, CommandDefinition, ExecutionContext};
use crate::error::{Error, Result};

use super::{Assertion, assertion_command};

/// Protocol command returning the current URL.
const URL_COMMAND: &str = "url";

/// Default failure message template.
const DEFAULT_MESSAGE: &str = "Testing if the URL matches '%s'";

/// Asserts that the current URL matches a regular expression.
#[derive(Debug, Clone)]
pub struct UrlMatches {
    pattern: Regex,
    message: Option<String>,
}

impl UrlMatches {
    /// Compiles the pattern.
    ///
    /// # Errors
    ///
    /// - [`Error::Regex`] if the pattern is invalid
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: None,
        })
    }

    /// Replaces the default message template.
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the command definition, taking the pattern and an optional
    /// message as arguments.
    #[must_use]
    pub fn definition() -> CommandDefinition {
        assertion_command(|_, args: Vec<Arg>| {
            let pattern = args.first().and_then(Arg::as_str).ok_or_else(|| {
                Error::invalid_argument("urlMatches expects a regular expression string")
            })?;

            let assertion = Self::new(pattern)?;
            Ok(match args.get(1).and_then(Arg::as_str) {
                Some(message) => assertion.with_message(message),
                None => assertion,
            })
        })
    }
}

#[async_trait]
impl Assertion for UrlMatches {
    fn expected(&self) -> Value {
        Value::String(self.pattern.as_str().to_string())
    }

    fn format_message(&self) -> (String, Vec<Value>) {
        let template = self.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
        (template.to_string(), vec![self.expected()])
    }

    fn evaluate(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|url| self.pattern.is_match(url))
    }

    /// Accepts either a bare URL or a `{"value": url}` response.
    fn value(&self, result: &Value) -> Value {
        result.get("value").unwrap_or(result).clone()
    }

    async fn command(&self, ctx: &ExecutionContext) -> Result<Value> {
        ctx.client().send(URL_COMMAND, Value::Null).await
    }
}

// ============================================================================
// Tests
// ============================================================================
