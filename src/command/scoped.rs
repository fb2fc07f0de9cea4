//! Scoped `element(...)` API.
//!
//! Every page and section can expose an `element` command plus an `element`
//! namespace of accessor methods (`find`, `findAll`, `getText`, ...). They
//! are ordinary selector-resolving commands with one addition: called on a
//! section with a literal selector, accessors of the scoped family do not
//! receive the full chain. The ancestor chain is located first through the
//! accessor, then the original arguments run against the located scope
//! ([`ExecutionContext::scope`](super::ExecutionContext::scope)).
//!
//! ```text
//! footer.element("a.link")
//!   resolve  ─► [.footer, a.link]
//!   split    ─► ancestors [.footer] + a.link
//!   accessor([.footer])           ─► scope handle
//!   accessor("a.link", scope)     ─► element
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::page::CommandTarget;

use super::function::{CommandDefinition, CommandFn};
use super::wrapper::Command;

/// Name of the accessor command and of its method namespace.
pub const ELEMENT_API: &str = "element";

// ============================================================================
// ElementApi
// ============================================================================

/// The accessor and methods making up a scoped element API.
#[derive(Debug, Clone)]
pub struct ElementApi {
    accessor: CommandDefinition,
    methods: BTreeMap<String, CommandDefinition>,
}

impl ElementApi {
    /// Creates an API around the `element` accessor.
    ///
    /// The accessor receives a resolved element and, when called for a
    /// located scope, finds it inside [`ExecutionContext::scope`](super::ExecutionContext::scope).
    #[must_use]
    pub fn new(accessor: CommandDefinition) -> Self {
        Self {
            accessor,
            methods: BTreeMap::new(),
        }
    }

    /// Adds a method to the `element` namespace.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>, definition: CommandDefinition) -> Self {
        self.methods.insert(name.into(), definition);
        self
    }

    /// Returns the accessor definition.
    #[inline]
    #[must_use]
    pub fn accessor(&self) -> &CommandDefinition {
        &self.accessor
    }

    /// Returns the method definitions.
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &BTreeMap<String, CommandDefinition> {
        &self.methods
    }
}

// ============================================================================
// Binding
// ============================================================================

/// Wraps one method of the scoped API for `parent`.
#[must_use]
pub fn wrap_element_command(
    parent: &CommandTarget,
    name: &str,
    namespace: Option<&str>,
    definition: &CommandDefinition,
    accessor: &CommandFn,
) -> Command {
    Command::scoped(parent.scope(), name, namespace, definition, accessor.clone())
}

/// Registers the `element` command and namespace on `parent`.
///
/// Returns the number of commands registered.
///
/// # Errors
///
/// - [`Error::DuplicateCommand`] if `element` or one of the methods is
///   already registered without `overwrite`
pub fn wrap_scoped_element_api(parent: &CommandTarget, api: &ElementApi) -> Result<usize> {
    let accessor = api.accessor.function();

    let mut commands = Vec::with_capacity(api.methods.len() + 1);
    commands.push((
        None,
        api.accessor.is_overwrite(),
        wrap_element_command(parent, ELEMENT_API, None, &api.accessor, accessor),
    ));
    for (name, definition) in &api.methods {
        commands.push((
            Some(ELEMENT_API),
            definition.is_overwrite(),
            wrap_element_command(parent, name, Some(ELEMENT_API), definition, accessor),
        ));
    }

    let page = parent.page();
    let scope = parent.scope();
    let count = commands.len();

    page.with_table(scope, |table| {
        for (namespace, overwrite, command) in &commands {
            if !overwrite && table.collides(*namespace, command.name()) {
                return Err(Error::duplicate_command(
                    command.name(),
                    page.describe(scope, *namespace),
                ));
            }
        }
        for (namespace, _, command) in commands {
            table.insert(namespace, command);
        }
        Ok(())
    })?;

    debug!(target = %parent.name(), commands = count, "Scoped element API installed");
    Ok(count)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use crate::command::{Arg, CommandEntry, CommandLoader, CommandMap, ExecutionContext};
    use crate::page::Page;
    use crate::test_support::{RecordingClient, footer_definition};

    type Calls = Arc<Mutex<Vec<(Value, Option<Value>)>>>;

    /// Accessor returning a handle naming the element it found.
    fn recording_accessor(calls: Calls) -> CommandDefinition {
        CommandDefinition::sync(move |ctx: &ExecutionContext, args: Vec<Arg>| {
            let element = args.first().map(Arg::to_value).unwrap_or_default();
            calls.lock().push((element.clone(), ctx.scope().cloned()));
            Ok(json!({ "handle": element }))
        })
    }

    fn page(calls: &Calls) -> Page {
        let api = ElementApi::new(recording_accessor(calls.clone()))
            .method("find", recording_accessor(calls.clone()))
            .method("getText", recording_accessor(calls.clone()));

        Page::builder("home")
            .client(Arc::new(RecordingClient::new()))
            .definition(footer_definition())
            .element_api(api)
            .build()
            .unwrap()
    }

    #[test]
    fn test_api_registered_on_every_scope() {
        let calls = Calls::default();
        let page = page(&calls);

        assert_eq!(page.command_names(), vec![ELEMENT_API]);
        let social = page.section("footer").unwrap().section("social").unwrap();
        assert_eq!(social.command_names(), vec![ELEMENT_API]);
        assert_eq!(
            social.namespace(ELEMENT_API).unwrap().command_names(),
            vec!["find", "getText"]
        );
    }

    #[test]
    fn test_page_literal_is_not_delegated() {
        let calls = Calls::default();
        let page = page(&calls);

        page.call(ELEMENT_API, vec!["button".into()]).unwrap();
        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0["selector"], "button");
        assert_eq!(calls[0].1, None);
    }

    #[test]
    fn test_section_literal_locates_ancestors_first() {
        let calls = Calls::default();
        let page = page(&calls);
        let footer = page.section("footer").unwrap();

        footer.call(ELEMENT_API, vec!["a.link".into()]).unwrap();
        let calls = calls.lock();
        assert_eq!(calls.len(), 2);

        // Ancestor chain first
        assert_eq!(calls[0].0["selector"], ".footer");
        assert_eq!(calls[0].1, None);

        // Then the original literal inside the located scope
        assert_eq!(calls[1].0, Value::from("a.link"));
        assert_eq!(calls[1].1, Some(json!({ "handle": calls[0].0.clone() })));
    }

    #[test]
    fn test_nested_section_locates_full_ancestor_chain() {
        let calls = Calls::default();
        let page = page(&calls);
        let social = page.section("footer").unwrap().section("social").unwrap();

        social
            .namespace(ELEMENT_API)
            .unwrap()
            .call("find", vec!["a.icon".into()])
            .unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 2);
        let ancestors = calls[0].0["selector"].as_array().unwrap();
        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[0]["selector"], ".footer");
        assert_eq!(ancestors[1]["selector"], ".social");
    }

    #[test]
    fn test_non_accessor_method_gets_chain() {
        let calls = Calls::default();
        let page = page(&calls);
        let footer = page.section("footer").unwrap();

        footer
            .namespace(ELEMENT_API)
            .unwrap()
            .call("getText", vec!["a.link".into()])
            .unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0["locateStrategy"], "recursion");
    }

    #[test]
    fn test_reference_is_not_delegated() {
        let calls = Calls::default();
        let page = page(&calls);
        let footer = page.section("footer").unwrap();

        footer.call(ELEMENT_API, vec!["@link".into()]).unwrap();
        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0["locateStrategy"], "recursion");
    }

    #[test]
    fn test_duplicate_api_is_rejected() {
        let calls = Calls::default();
        let page = page(&calls);
        let api = ElementApi::new(recording_accessor(calls.clone()));

        let err = wrap_scoped_element_api(&page.target(), &api).unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand { .. }));
    }

    #[test]
    fn test_loader_extends_element_namespace() {
        let calls = Calls::default();
        let page = page(&calls);

        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([(
                ELEMENT_API.to_string(),
                CommandEntry::Namespace(BTreeMap::from([(
                    "isVisible".to_string(),
                    recording_accessor(calls.clone()),
                )])),
            )]))
        })
        .unwrap();
        assert_eq!(
            page.namespace(ELEMENT_API).unwrap().command_names(),
            vec!["find", "getText", "isVisible"]
        );

        let err = CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([(
                ELEMENT_API.to_string(),
                CommandEntry::from(recording_accessor(calls.clone())),
            )]))
        })
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand { .. }));
    }
}
