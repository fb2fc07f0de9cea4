//! Builder pattern for page configuration.
//!
//! Provides a fluent API for declaring elements and sections and attaching
//! command loaders before creating a [`Page`].
//!
//! # Example
//!
//! ```ignore
//! use pageobject_core::{Page, SectionBuilder};
//!
//! let page = Page::builder("home")
//!     .client(client)
//!     .element("submit", "#go")
//!     .section("footer", SectionBuilder::new(".footer").element("link", "a.link"))
//!     .commands(|_registry| Ok(protocol_commands()))
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::command::{
    CommandLoader, CommandMap, CommandRegistry, Client, ElementApi, LoaderFn,
    wrap_scoped_element_api,
};
use crate::error::{Error, Result};
use crate::selector::LocateStrategy;

use super::core::Page;
use super::definition::{ElementDeclaration, PageDefinition, SectionDefinition};
use super::tree::SectionTree;

// ============================================================================
// SectionBuilder
// ============================================================================

/// Builder for a [`SectionDefinition`].
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    definition: SectionDefinition,
}

impl SectionBuilder {
    /// Creates a section located by `selector`.
    #[inline]
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            definition: SectionDefinition::new(selector),
        }
    }

    /// Sets the strategy of the section locator.
    #[inline]
    #[must_use]
    pub fn locate_strategy(mut self, strategy: LocateStrategy) -> Self {
        self.definition.locate_strategy = Some(strategy);
        self
    }

    /// Declares an element.
    #[inline]
    #[must_use]
    pub fn element(mut self, name: impl Into<String>, declaration: impl Into<ElementDeclaration>) -> Self {
        self.definition.elements.insert(name, declaration);
        self
    }

    /// Declares a nested section.
    #[inline]
    #[must_use]
    pub fn section(mut self, name: impl Into<String>, section: impl Into<SectionDefinition>) -> Self {
        self.definition.sections.insert(name.into(), section.into());
        self
    }

    /// Returns the definition.
    #[inline]
    #[must_use]
    pub fn build(self) -> SectionDefinition {
        self.definition
    }
}

impl From<SectionBuilder> for SectionDefinition {
    fn from(builder: SectionBuilder) -> Self {
        builder.build()
    }
}

// ============================================================================
// PageBuilder
// ============================================================================

/// Which scopes a loader is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoaderScope {
    /// Page and every section.
    All,
    /// Page root only.
    Page,
}

/// Builder for configuring a [`Page`].
///
/// Use [`Page::builder()`] to create a new builder.
#[derive(Clone)]
pub struct PageBuilder {
    /// Page name used in diagnostics.
    name: String,
    /// Element and section declarations.
    definition: PageDefinition,
    /// Driver client.
    client: Option<Arc<dyn Client>>,
    /// Strategy assumed for declarations without one.
    default_strategy: LocateStrategy,
    /// Whether commands run inside an async test case.
    async_testcase: bool,
    /// Command loaders in registration order.
    loaders: Vec<(LoaderScope, Arc<LoaderFn>)>,
    /// Scoped `element(...)` API installed on every scope.
    element_api: Option<ElementApi>,
}

impl fmt::Debug for PageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBuilder")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .field("has_client", &self.client.is_some())
            .field("default_strategy", &self.default_strategy)
            .field("async_testcase", &self.async_testcase)
            .field("loaders", &self.loaders.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PageBuilder Implementation
// ============================================================================

impl PageBuilder {
    /// Creates a builder for a page with no declarations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: PageDefinition::default(),
            client: None,
            default_strategy: LocateStrategy::Css,
            async_testcase: false,
            loaders: Vec::new(),
            element_api: None,
        }
    }

    /// Sets the driver client.
    #[inline]
    #[must_use]
    pub fn client(mut self, client: Arc<dyn Client>) -> Self {
        self.client = Some(client);
        self
    }

    /// Replaces all declarations.
    #[inline]
    #[must_use]
    pub fn definition(mut self, definition: PageDefinition) -> Self {
        self.definition = definition;
        self
    }

    /// Declares a page element.
    #[inline]
    #[must_use]
    pub fn element(mut self, name: impl Into<String>, declaration: impl Into<ElementDeclaration>) -> Self {
        self.definition.elements.insert(name, declaration);
        self
    }

    /// Declares a top-level section.
    #[inline]
    #[must_use]
    pub fn section(mut self, name: impl Into<String>, section: impl Into<SectionDefinition>) -> Self {
        self.definition.sections.insert(name.into(), section.into());
        self
    }

    /// Sets the strategy assumed for declarations without one.
    ///
    /// Defaults to [`LocateStrategy::Css`].
    #[inline]
    #[must_use]
    pub fn default_strategy(mut self, strategy: LocateStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Marks commands as running inside an async test case.
    #[inline]
    #[must_use]
    pub fn async_testcase(mut self, is_async: bool) -> Self {
        self.async_testcase = is_async;
        self
    }

    /// Adds a command loader applied to the page and every section.
    #[must_use]
    pub fn commands<F>(mut self, loader: F) -> Self
    where
        F: Fn(&CommandRegistry) -> Result<CommandMap> + Send + Sync + 'static,
    {
        self.loaders.push((LoaderScope::All, Arc::new(loader)));
        self
    }

    /// Adds a command loader applied to the page root only.
    #[must_use]
    pub fn page_commands<F>(mut self, loader: F) -> Self
    where
        F: Fn(&CommandRegistry) -> Result<CommandMap> + Send + Sync + 'static,
    {
        self.loaders.push((LoaderScope::Page, Arc::new(loader)));
        self
    }

    /// Installs the scoped `element(...)` API on the page and every section.
    #[inline]
    #[must_use]
    pub fn element_api(mut self, api: ElementApi) -> Self {
        self.element_api = Some(api);
        self
    }

    /// Builds the page with validation.
    ///
    /// The element API is installed first, then loaders run in the order
    /// they were added.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the name or client is missing, or a
    ///   declaration is invalid
    /// - [`Error::DuplicateCommand`] if loaders register a name twice
    /// - any error returned by a loader
    pub fn build(self) -> Result<Page> {
        let client = self.validate()?;
        let tree = SectionTree::build(self.name, &self.definition, self.default_strategy)?;
        let page = Page::new(tree, client, self.async_testcase);

        let scopes: Vec<_> = page.tree().scopes().collect();
        for scope in scopes {
            let target = page.scope_target(scope);

            if let Some(api) = &self.element_api {
                wrap_scoped_element_api(&target, api)?;
            }

            for (applies_to, loader) in &self.loaders {
                if *applies_to == LoaderScope::Page && scope.is_section() {
                    continue;
                }
                CommandLoader::add_wrapped_commands(&target, |registry| loader(registry))?;
            }
        }

        debug!(
            page = %page.name(),
            sections = page.tree().section_count(),
            commands = page.command_names().len(),
            "Page built"
        );
        Ok(page)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl PageBuilder {
    /// Validates the name and client configuration.
    fn validate(&self) -> Result<Arc<dyn Client>> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Page name must not be empty."));
        }

        self.client.clone().ok_or_else(|| {
            Error::config(
                "Client is required. Use .client() to set it.\n\
                 Example: Page::builder(\"home\").client(Arc::new(client))",
            )
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
