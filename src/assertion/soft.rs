//! Strict and soft assertion namespaces.
//!
//! When a target has both `assert` and `verify` namespaces, `assert` aborts on
//! the first failure while `verify` records failures on the page
//! ([`Page::soft_failures`]) and lets the chain continue.
//!
//! Only [`Error::AssertionFailed`] is softened. Lookup and driver errors stay
//! fatal in both namespaces.

use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::Value;

use crate::command::table::{CommandTable, NamespaceMode};
use crate::command::{Arg, CommandFn, ExecutionContext};
use crate::error::{Error, Result};
use crate::page::Page;

/// Strict assertion namespace.
pub const ASSERT_NAMESPACE: &str = "assert";

/// Soft assertion namespace.
pub const VERIFY_NAMESPACE: &str = "verify";

/// Sets namespace modes and softens `verify` commands.
///
/// Returns `false` if the table lacks either namespace.
pub(crate) fn install_proxy(table: &mut CommandTable) -> bool {
    if !table.namespaces.contains_key(ASSERT_NAMESPACE)
        || !table.namespaces.contains_key(VERIFY_NAMESPACE)
    {
        return false;
    }

    if let Some(assert) = table.namespaces.get_mut(ASSERT_NAMESPACE) {
        assert.mode = NamespaceMode::Strict;
    }
    if let Some(verify) = table.namespaces.get_mut(VERIFY_NAMESPACE) {
        verify.mode = NamespaceMode::Soft;
        for command in verify.commands.values_mut() {
            *command = command.soften(soft_function);
        }
    }
    true
}

/// Wraps a function so assertion failures are recorded instead of returned.
fn soft_function(function: &CommandFn) -> CommandFn {
    match function {
        CommandFn::Sync(inner) => {
            let inner = Arc::clone(inner);
            CommandFn::Sync(Arc::new(move |ctx: &ExecutionContext, args: Vec<Arg>| {
                recover(ctx.page(), inner(ctx, args))
            }))
        }
        CommandFn::Async(inner) => {
            let inner = Arc::clone(inner);
            CommandFn::Async(Arc::new(move |ctx: ExecutionContext, args: Vec<Arg>| {
                let page = ctx.page().clone();
                let future = inner(ctx, args);
                async move { recover(&page, future.await) }.boxed()
            }))
        }
    }
}

fn recover(page: &Page, result: Result<Value>) -> Result<Value> {
    match result {
        Err(error @ Error::AssertionFailed { .. }) => {
            page.record_soft_failure(error);
            Ok(Value::Null)
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
