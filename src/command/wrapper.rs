//! Selector-resolving command wrapper.
//!
//! A [`Command`] is built once per registered function and reused for every
//! call. Each call:
//!
//! 1. unpacks a structured `{"args": [...]}` list, if any
//! 2. resolves the first argument into an [`Element`] when it is a selector
//! 3. applies the container of a `within` call
//! 4. invokes the function (or, for scoped accessors on sections, locates the
//!    ancestor chain first and delegates)
//! 5. turns the output into a [`ChainableResult`]
//!
//! Resolution fails before the function runs; errors of the function itself
//! pass through unchanged.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, trace};

use crate::error::Result;
use crate::identifiers::Scope;
use crate::page::{CommandTarget, SectionTree};
use crate::selector::{
    Element, ElementReference, is_possible_element_selector, is_scoped_element_command,
};

use super::args::{Arg, unpack};
use super::chainable::{ChainablePromise, ChainableResult};
use super::context::ExecutionContext;
use super::function::{CommandDefinition, CommandFn, CommandOutput};

// ============================================================================
// Constants
// ============================================================================

/// Namespace whose commands are terminal assertions.
pub const EXPECT_NAMESPACE: &str = "expect";

/// Expect-style command resolving `@name` against sections.
const SECTION_COMMAND: &str = "section";

// ============================================================================
// Types
// ============================================================================

/// How a container from a `within` call reaches the element argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementMode {
    /// Wrap as the recursive chain `[container, element]`.
    Chain,
    /// Set the element's `container` field (user-defined element commands).
    Container,
}

/// Outcome of selector resolution for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    resolved: bool,
    only_locate_sections_recursively: bool,
}

impl Resolution {
    /// Returns `true` if the first argument was replaced by an element.
    #[inline]
    #[must_use]
    pub fn resolved(&self) -> bool {
        self.resolved
    }

    /// Returns `true` if only the ancestor chain should be located
    /// recursively, delegating the final lookup.
    #[inline]
    #[must_use]
    pub fn only_locate_sections_recursively(&self) -> bool {
        self.only_locate_sections_recursively
    }
}

/// Shared state of a command.
#[derive(Clone)]
struct CommandInner {
    name: String,
    owner: Scope,
    namespace: Option<String>,
    is_chai_assertion: bool,
    is_es6_async: bool,
    element_mode: ElementMode,
    function: CommandFn,
    /// Scoped element accessor used to locate ancestor chains.
    accessor: Option<CommandFn>,
    /// Assertion failures are recorded instead of returned.
    soft: bool,
}

// ============================================================================
// Command
// ============================================================================

/// A registered, selector-resolving command.
#[derive(Clone)]
pub struct Command {
    inner: Arc<CommandInner>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.inner.name)
            .field("owner", &self.inner.owner)
            .field("namespace", &self.inner.namespace)
            .field("is_chai_assertion", &self.inner.is_chai_assertion)
            .field("is_es6_async", &self.inner.is_es6_async)
            .field("soft", &self.inner.soft)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Command - Constructor
// ============================================================================

impl Command {
    /// Wraps a command definition.
    ///
    /// Commands of the `expect` namespace are assertions.
    #[must_use]
    pub fn new(
        owner: Scope,
        name: impl Into<String>,
        namespace: Option<&str>,
        definition: &CommandDefinition,
    ) -> Self {
        Self::build(owner, name.into(), namespace, definition, None)
    }

    /// Wraps a scoped element accessor method.
    pub(crate) fn scoped(
        owner: Scope,
        name: impl Into<String>,
        namespace: Option<&str>,
        definition: &CommandDefinition,
        accessor: CommandFn,
    ) -> Self {
        Self::build(owner, name.into(), namespace, definition, Some(accessor))
    }

    fn build(
        owner: Scope,
        name: String,
        namespace: Option<&str>,
        definition: &CommandDefinition,
        accessor: Option<CommandFn>,
    ) -> Self {
        let element_mode = if definition.is_element_command() {
            ElementMode::Container
        } else {
            ElementMode::Chain
        };

        Self {
            inner: Arc::new(CommandInner {
                name,
                owner,
                namespace: namespace.map(str::to_string),
                is_chai_assertion: namespace == Some(EXPECT_NAMESPACE),
                is_es6_async: definition.is_async(),
                element_mode,
                function: definition.function().clone(),
                accessor,
                soft: false,
            }),
        }
    }

    /// Returns a soft copy whose function is wrapped by `wrap`.
    ///
    /// Already soft commands are returned unchanged.
    pub(crate) fn soften(&self, wrap: impl FnOnce(&CommandFn) -> CommandFn) -> Self {
        if self.inner.soft {
            return self.clone();
        }

        let mut inner = (*self.inner).clone();
        inner.function = wrap(&inner.function);
        inner.soft = true;
        Self {
            inner: Arc::new(inner),
        }
    }
}

// ============================================================================
// Command - Accessors
// ============================================================================

impl Command {
    /// Returns the command name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the page or section the command is registered on.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Scope {
        self.inner.owner
    }

    /// Returns the namespace, if any.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    /// Returns `true` for terminal assertions.
    #[inline]
    #[must_use]
    pub fn is_chai_assertion(&self) -> bool {
        self.inner.is_chai_assertion
    }

    /// Returns `true` if the function is declared asynchronous.
    #[inline]
    #[must_use]
    pub fn is_es6_async(&self) -> bool {
        self.inner.is_es6_async
    }

    /// Returns `true` if assertion failures are recorded on the page.
    #[inline]
    #[must_use]
    pub fn is_soft(&self) -> bool {
        self.inner.soft
    }

    /// Returns how containers are applied to the element argument.
    #[inline]
    #[must_use]
    pub fn element_mode(&self) -> ElementMode {
        self.inner.element_mode
    }
}

// ============================================================================
// Command - Selector Resolution
// ============================================================================

impl Command {
    /// Resolves the first argument into an [`Element`] in place.
    ///
    /// Arguments that are not selectors are left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidReference`](crate::Error::InvalidReference) for a
    ///   malformed `@name`
    /// - [`Error::ElementNotFound`](crate::Error::ElementNotFound) /
    ///   [`Error::SectionNotFound`](crate::Error::SectionNotFound) if the name
    ///   is not declared or the strategy filter does not match
    /// - [`Error::UnknownSection`](crate::Error::UnknownSection) if the owner
    ///   is a section of another page
    pub fn parse_element_selector(
        &self,
        tree: &SectionTree,
        args: &mut [Arg],
    ) -> Result<Resolution> {
        let Some(Arg::Value(first)) = args.first() else {
            return Ok(Resolution::default());
        };
        if !is_possible_element_selector(first, &self.inner.name) {
            return Ok(Resolution::default());
        }

        let provisional = Element::from_value(first)?;
        let mut resolution = Resolution {
            resolved: true,
            only_locate_sections_recursively: false,
        };

        let element = if provisional.is_reference() {
            self.resolve_reference(tree, provisional)?
        } else if let Scope::Section(id) = self.inner.owner {
            resolution.only_locate_sections_recursively =
                is_scoped_element_command(&self.inner.name);
            tree.recursive_lookup(&provisional.with_parent(Some(id)))?
        } else {
            provisional
        };

        debug!(
            command = %self.inner.name,
            selector = %element,
            recursive = element.is_recursive(),
            "Resolved element selector"
        );
        args[0] = Arg::Element(element);

        Ok(resolution)
    }

    fn resolve_reference(&self, tree: &SectionTree, provisional: Element) -> Result<Element> {
        let reference = ElementReference::parse(provisional.selector_str().unwrap_or_default())?;
        let filter = provisional.locate_strategy();
        let owner = self.inner.owner;

        let declared = if self.is_section_assertion() {
            tree.get_section(owner, reference.name(), filter)?
        } else {
            tree.get_element(owner, reference.name(), filter)?
        };

        let mut element = provisional;
        element.set_pseudo_selector(reference.pseudo_selector().map(str::to_string));
        element.copy_defaults(&declared);
        element.overwrite_locator(&declared);

        if element.parent().is_some() {
            element = tree.recursive_lookup(&element)?;
        }
        Ok(element)
    }

    fn is_section_assertion(&self) -> bool {
        self.inner.is_chai_assertion && self.inner.name == SECTION_COMMAND
    }

    fn inject_container(&self, args: &mut [Arg], container: &Element) {
        let Some(Arg::Element(element)) = args.first_mut() else {
            return;
        };

        match self.inner.element_mode {
            ElementMode::Container => element.set_container(container.clone()),
            ElementMode::Chain => {
                *element = Element::recursive(vec![container.clone(), element.clone()]);
            }
        }
        trace!(command = %self.inner.name, selector = %element, "Applied container");
    }
}

// ============================================================================
// Command - Dispatch
// ============================================================================

impl Command {
    /// Resolves selectors and invokes the function.
    ///
    /// The function receives the argument list in its original shape; a
    /// structured `{"args": [...]}` list stays structured with its first
    /// entry resolved.
    ///
    /// # Errors
    ///
    /// - resolution errors, before the function runs
    /// - synchronous errors of the function
    pub fn execute_command(&self, ctx: &ExecutionContext, mut args: Vec<Arg>) -> Result<CommandOutput> {
        let original = self.inner.accessor.as_ref().map(|_| args.clone());

        let unpacked = unpack(&mut args);
        let resolution = self.parse_element_selector(ctx.page().tree(), unpacked)?;

        if resolution.resolved()
            && let Some(container) = ctx.within()
        {
            self.inject_container(unpacked, container);
        }

        let delegate = match (&self.inner.accessor, original) {
            (Some(accessor), Some(original)) if resolution.only_locate_sections_recursively() => {
                unpacked
                    .first()
                    .and_then(Arg::as_element)
                    .and_then(Element::split_last)
                    .map(|(ancestors, _)| (accessor.clone(), ancestors, original))
            }
            _ => None,
        };

        if let Some((accessor, ancestors, original)) = delegate {
            return self.locate_then_delegate(ctx, &accessor, ancestors, original);
        }

        trace!(command = %self.inner.name, args = args.len(), "Executing command");
        self.inner.function.invoke(ctx, args)
    }

    /// Locates `ancestors` through the accessor, then re-invokes the original
    /// arguments against the located scope.
    fn locate_then_delegate(
        &self,
        ctx: &ExecutionContext,
        accessor: &CommandFn,
        ancestors: Element,
        original: Vec<Arg>,
    ) -> Result<CommandOutput> {
        debug!(
            command = %self.inner.name,
            scope = %ancestors,
            "Locating section chain before delegating"
        );

        let function = self.inner.function.clone();
        match accessor.invoke(ctx, vec![Arg::Element(ancestors)])? {
            CommandOutput::Ready(scope) => function.invoke(&ctx.clone().with_scope(scope), original),
            CommandOutput::Pending(located) => {
                let ctx = ctx.clone();
                Ok(CommandOutput::Pending(
                    async move {
                        let scope = located.await?;
                        function
                            .invoke(&ctx.with_scope(scope), original)?
                            .resolve()
                            .await
                    }
                    .boxed(),
                ))
            }
        }
    }

    /// Returns a closure invoking this command on a target.
    pub fn create_wrapper(
        &self,
    ) -> impl Fn(&CommandTarget, Vec<Arg>) -> Result<ChainableResult> + Send + Sync + 'static {
        let command = self.clone();
        move |target, args| command.call(target, None, args)
    }

    /// Invokes the command and classifies its result.
    pub(crate) fn call(
        &self,
        target: &CommandTarget,
        within: Option<Element>,
        args: Vec<Arg>,
    ) -> Result<ChainableResult> {
        let ctx = ExecutionContext::new(target.clone(), self.inner.name.clone()).with_within(within);
        debug!(
            command = %self.inner.name,
            target = %target.name(),
            namespace = ?self.inner.namespace,
            "Invoking command"
        );

        let output = self.execute_command(&ctx, args)?;
        Ok(self.create_result(&ctx, output))
    }

    fn create_result(&self, ctx: &ExecutionContext, output: CommandOutput) -> ChainableResult {
        if self.inner.is_chai_assertion {
            return ChainableResult::Raw(output);
        }

        let target = ctx.target();
        match output {
            CommandOutput::Pending(future) if target.is_page() || ctx.is_es6_async_testcase() => {
                ChainableResult::Promise(ChainablePromise::new(future, target.page().clone()))
            }
            CommandOutput::Pending(future) => {
                ctx.client().enqueue(&self.inner.name, future);
                ChainableResult::Target(target.clone())
            }
            CommandOutput::Ready(_) => ChainableResult::Target(target.clone()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
