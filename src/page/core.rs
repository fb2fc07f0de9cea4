//! Page, section and namespace handles.
//!
//! A [`Page`] owns its immutable [`SectionTree`] and one command table per
//! scope. [`Section`], [`CommandTarget`], [`Namespace`] and [`Within`] are
//! cheap views onto a page.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::command::table::{CommandTable, NamespaceMode};
use crate::command::{Arg, ChainableResult, Client, Command};
use crate::error::{Error, Result};
use crate::identifiers::{Scope, SectionId};
use crate::selector::Element;

use super::builder::PageBuilder;
use super::tree::SectionTree;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a page.
pub(crate) struct PageInner {
    /// Declarations of the page and its sections.
    tree: SectionTree,
    /// Driver client.
    client: Arc<dyn Client>,
    /// Whether commands run inside an async test case.
    async_testcase: bool,
    /// Command tables by scope.
    tables: RwLock<FxHashMap<Scope, CommandTable>>,
    /// Failures recorded by soft assertions.
    soft_failures: Mutex<Vec<Error>>,
}

// ============================================================================
// Page
// ============================================================================

/// Root page object.
///
/// Cloning is cheap; clones share declarations and command tables.
#[derive(Clone)]
pub struct Page {
    pub(crate) inner: Arc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.name())
            .field("sections", &self.inner.tree.section_count())
            .field("async_testcase", &self.inner.async_testcase)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Creates a page with empty command tables.
    pub(crate) fn new(tree: SectionTree, client: Arc<dyn Client>, async_testcase: bool) -> Self {
        let tables = tree
            .scopes()
            .map(|scope| (scope, CommandTable::default()))
            .collect();

        Self {
            inner: Arc::new(PageInner {
                tree,
                client,
                async_testcase,
                tables: RwLock::new(tables),
                soft_failures: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates a builder for a page named `name`.
    #[inline]
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PageBuilder {
        PageBuilder::new(name)
    }
}

// ============================================================================
// Page - Accessors
// ============================================================================

impl Page {
    /// Returns the page name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.tree.page_name()
    }

    /// Returns the declarations.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &SectionTree {
        &self.inner.tree
    }

    /// Returns the driver client.
    #[inline]
    #[must_use]
    pub fn client(&self) -> Arc<dyn Client> {
        Arc::clone(&self.inner.client)
    }

    /// Returns `true` if commands run inside an async test case.
    #[inline]
    #[must_use]
    pub fn is_async_testcase(&self) -> bool {
        self.inner.async_testcase
    }

    /// Returns this page as a command target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> CommandTarget {
        CommandTarget::Page(self.clone())
    }

    /// Returns failures recorded by soft (`verify`) assertions.
    #[must_use]
    pub fn soft_failures(&self) -> Vec<Error> {
        self.inner.soft_failures.lock().clone()
    }

    /// Records a soft assertion failure.
    pub(crate) fn record_soft_failure(&self, error: Error) {
        warn!(page = %self.name(), error = %error, "Soft assertion failed");
        self.inner.soft_failures.lock().push(error);
    }
}

// ============================================================================
// Page - Commands
// ============================================================================

impl Page {
    /// Invokes a page command.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if no such command is registered
    /// - resolution and command errors
    pub fn call(&self, command: &str, args: Vec<Arg>) -> Result<ChainableResult> {
        self.target().call(command, args)
    }

    /// Returns a command namespace of the page.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if the namespace does not exist
    pub fn namespace(&self, name: &str) -> Result<Namespace> {
        self.target().namespace(name)
    }

    /// Returns a top-level section.
    ///
    /// # Errors
    ///
    /// - [`Error::SectionNotFound`] if the section is not declared
    pub fn section(&self, name: &str) -> Result<Section> {
        self.target().section(name)
    }

    /// Returns a call surface whose selectors resolve inside `container`.
    #[must_use]
    pub fn within(&self, container: Element) -> Within {
        self.target().within(container)
    }

    /// Returns the sorted names of the page's direct commands.
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        self.target().command_names()
    }

    /// Finds a registered command.
    ///
    /// The command is cloned out of the table so the lock is released
    /// before it runs.
    pub(crate) fn lookup_command(
        &self,
        scope: Scope,
        namespace: Option<&str>,
        command: &str,
    ) -> Result<Command> {
        let found = self
            .inner
            .tables
            .read()
            .get(&scope)
            .and_then(|table| table.commands(namespace))
            .and_then(|commands| commands.get(command))
            .cloned();

        found.ok_or_else(|| Error::command_not_found(command, self.describe(scope, namespace)))
    }

    /// Returns the failure mode of a namespace.
    pub(crate) fn namespace_mode(&self, scope: Scope, namespace: &str) -> NamespaceMode {
        self.inner
            .tables
            .read()
            .get(&scope)
            .and_then(|table| table.namespaces.get(namespace))
            .map_or(NamespaceMode::Plain, |table| table.mode)
    }

    /// Returns `true` if a namespace exists on a scope.
    pub(crate) fn has_namespace(&self, scope: Scope, namespace: &str) -> bool {
        self.inner
            .tables
            .read()
            .get(&scope)
            .is_some_and(|table| table.namespaces.contains_key(namespace))
    }

    /// Returns the command target of a scope.
    pub(crate) fn scope_target(&self, scope: Scope) -> CommandTarget {
        match scope {
            Scope::Page => CommandTarget::Page(self.clone()),
            Scope::Section(id) => CommandTarget::Section(Section {
                page: self.clone(),
                id,
            }),
        }
    }

    /// Runs `f` with write access to a scope's command table.
    pub(crate) fn with_table<R>(&self, scope: Scope, f: impl FnOnce(&mut CommandTable) -> R) -> R {
        let mut tables = self.inner.tables.write();
        f(tables.entry(scope).or_default())
    }

    /// Returns sorted command names of a scope or one of its namespaces.
    pub(crate) fn names(&self, scope: Scope, namespace: Option<&str>) -> Vec<String> {
        self.inner
            .tables
            .read()
            .get(&scope)
            .map(|table| table.names(namespace))
            .unwrap_or_default()
    }

    /// Returns a display name such as `home.footer.assert`.
    pub(crate) fn describe(&self, scope: Scope, namespace: Option<&str>) -> String {
        let mut parts = Vec::new();
        if let Some(namespace) = namespace {
            parts.push(namespace.to_string());
        }
        let mut current = scope.section_id();
        while let Some(id) = current {
            if let Some(name) = self.inner.tree.scope_name(Scope::Section(id)) {
                parts.push(name.to_string());
            }
            current = self.inner.tree.parent_of(id);
        }
        parts.push(self.name().to_string());
        parts.reverse();
        parts.join(".")
    }
}

// ============================================================================
// Section
// ============================================================================

/// A view onto one declared section of a page.
#[derive(Clone)]
pub struct Section {
    page: Page,
    id: SectionId,
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("page", &self.page.name())
            .field("name", &self.name())
            .field("id", &self.id)
            .finish()
    }
}

impl Section {
    /// Returns the section name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.page
            .tree()
            .scope_name(Scope::Section(self.id))
            .unwrap_or_default()
    }

    /// Returns the arena id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Returns the owning page.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Returns the enclosing section, if nested.
    #[must_use]
    pub fn parent(&self) -> Option<Section> {
        self.page.tree().parent_of(self.id).map(|id| Section {
            page: self.page.clone(),
            id,
        })
    }

    /// Returns the section's own locator chain from the page root.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownSection`] if the id does not belong to the page
    pub fn locator(&self) -> Result<Element> {
        self.page.tree().section_chain(self.id)
    }

    /// Returns this section as a command target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> CommandTarget {
        CommandTarget::Section(self.clone())
    }

    /// Invokes a section command.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if no such command is registered
    /// - resolution and command errors
    pub fn call(&self, command: &str, args: Vec<Arg>) -> Result<ChainableResult> {
        self.target().call(command, args)
    }

    /// Returns a command namespace of the section.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if the namespace does not exist
    pub fn namespace(&self, name: &str) -> Result<Namespace> {
        self.target().namespace(name)
    }

    /// Returns a nested section.
    ///
    /// # Errors
    ///
    /// - [`Error::SectionNotFound`] if the section is not declared
    pub fn section(&self, name: &str) -> Result<Section> {
        self.target().section(name)
    }

    /// Returns a call surface whose selectors resolve inside `container`.
    #[must_use]
    pub fn within(&self, container: Element) -> Within {
        self.target().within(container)
    }

    /// Returns the sorted names of the section's direct commands.
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        self.target().command_names()
    }
}

// ============================================================================
// CommandTarget
// ============================================================================

/// The page or section a command is invoked on and returns for chaining.
#[derive(Debug, Clone)]
pub enum CommandTarget {
    /// Page root.
    Page(Page),
    /// A section of a page.
    Section(Section),
}

impl CommandTarget {
    /// Returns the owning page.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &Page {
        match self {
            Self::Page(page) => page,
            Self::Section(section) => &section.page,
        }
    }

    /// Returns the scope of this target.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            Self::Page(_) => Scope::Page,
            Self::Section(section) => Scope::Section(section.id),
        }
    }

    /// Returns `true` for the page root.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page(_))
    }

    /// Returns the section, if this target is one.
    #[inline]
    #[must_use]
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Section(section) => Some(section),
            Self::Page(_) => None,
        }
    }

    /// Returns the page or section name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Page(page) => page.name(),
            Self::Section(section) => section.name(),
        }
    }

    /// Invokes a direct command.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if no such command is registered
    /// - resolution and command errors
    pub fn call(&self, command: &str, args: Vec<Arg>) -> Result<ChainableResult> {
        let found = self.page().lookup_command(self.scope(), None, command)?;
        found.call(self, None, args)
    }

    /// Returns a command namespace.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if the namespace does not exist
    pub fn namespace(&self, name: &str) -> Result<Namespace> {
        if !self.page().has_namespace(self.scope(), name) {
            return Err(Error::command_not_found(
                name,
                self.page().describe(self.scope(), None),
            ));
        }
        Ok(Namespace {
            target: self.clone(),
            name: name.to_string(),
            within: None,
        })
    }

    /// Returns a child section.
    ///
    /// # Errors
    ///
    /// - [`Error::SectionNotFound`] if the section is not declared
    pub fn section(&self, name: &str) -> Result<Section> {
        let id = self.page().tree().section_id(self.scope(), name)?;
        Ok(Section {
            page: self.page().clone(),
            id,
        })
    }

    /// Returns a call surface whose selectors resolve inside `container`.
    #[must_use]
    pub fn within(&self, container: Element) -> Within {
        Within {
            target: self.clone(),
            container,
        }
    }

    /// Returns the sorted names of direct commands.
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        self.page().names(self.scope(), None)
    }
}

impl From<Page> for CommandTarget {
    fn from(page: Page) -> Self {
        Self::Page(page)
    }
}

impl From<Section> for CommandTarget {
    fn from(section: Section) -> Self {
        Self::Section(section)
    }
}

// ============================================================================
// Namespace
// ============================================================================

/// A named command table of a page or section (`assert`, `expect`, ...).
#[derive(Debug, Clone)]
pub struct Namespace {
    target: CommandTarget,
    name: String,
    within: Option<Element>,
}

impl Namespace {
    /// Returns the namespace name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the page or section owning the namespace.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &CommandTarget {
        &self.target
    }

    /// Returns how failures of the namespace's commands are reported.
    #[must_use]
    pub fn mode(&self) -> NamespaceMode {
        self.target
            .page()
            .namespace_mode(self.target.scope(), &self.name)
    }

    /// Invokes a command of the namespace.
    ///
    /// In a soft (`verify`) namespace assertion failures are recorded on the
    /// page instead of returned.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if no such command is registered
    /// - resolution and command errors
    pub fn call(&self, command: &str, args: Vec<Arg>) -> Result<ChainableResult> {
        let found =
            self.target
                .page()
                .lookup_command(self.target.scope(), Some(&self.name), command)?;
        found.call(&self.target, self.within.clone(), args)
    }

    /// Returns the sorted command names of the namespace.
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        self.target
            .page()
            .names(self.target.scope(), Some(&self.name))
    }
}

// ============================================================================
// Within
// ============================================================================

/// Call surface resolving element arguments inside a container element.
#[derive(Debug, Clone)]
pub struct Within {
    target: CommandTarget,
    container: Element,
}

impl Within {
    /// Returns the container element.
    #[inline]
    #[must_use]
    pub fn container(&self) -> &Element {
        &self.container
    }

    /// Invokes a direct command with the container applied.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if no such command is registered
    /// - resolution and command errors
    pub fn call(&self, command: &str, args: Vec<Arg>) -> Result<ChainableResult> {
        let found = self
            .target
            .page()
            .lookup_command(self.target.scope(), None, command)?;
        found.call(&self.target, Some(self.container.clone()), args)
    }

    /// Returns a namespace whose calls apply the container.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandNotFound`] if the namespace does not exist
    pub fn namespace(&self, name: &str) -> Result<Namespace> {
        let mut namespace = self.target.namespace(name)?;
        namespace.within = Some(self.container.clone());
        Ok(namespace)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{footer_page, init_tracing};

    #[test]
    fn test_section_navigation() {
        init_tracing();
        let page = footer_page();
        let social = page.section("footer").unwrap().section("social").unwrap();

        assert_eq!(social.name(), "social");
        assert_eq!(social.parent().map(|s| s.name().to_string()), Some("footer".to_string()));
        assert_eq!(social.locator().unwrap().to_string(), ".footer > .social");
        assert_eq!(page.section("footer").unwrap().locator().unwrap().to_string(), ".footer");
    }

    #[test]
    fn test_unknown_section() {
        let page = footer_page();
        let err = page.section("header").unwrap_err();
        assert!(matches!(err, Error::SectionNotFound { .. }));
        assert!(err.to_string().contains("footer"));

        // Sections are scoped to their parent
        assert!(page.section("social").is_err());
    }

    #[test]
    fn test_unknown_namespace() {
        let page = footer_page();
        let err = page.namespace("assert").unwrap_err();
        assert!(matches!(err, Error::CommandNotFound { ref command, .. } if command == "assert"));
    }

    #[test]
    fn test_describe_paths() {
        let page = footer_page();
        let social = page.section("footer").unwrap().section("social").unwrap();

        assert_eq!(page.describe(Scope::Page, None), "home");
        assert_eq!(page.describe(social.target().scope(), Some("expect")), "home.footer.social.expect");
    }

    #[test]
    fn test_scope_target_round_trip() {
        let page = footer_page();
        let footer = page.section("footer").unwrap();

        let target = page.scope_target(footer.target().scope());
        assert_eq!(target.name(), "footer");
        assert!(target.as_section().is_some());
        assert!(page.scope_target(Scope::Page).is_page());
    }

    #[test]
    fn test_clones_share_state() {
        let page = footer_page();
        let clone = page.clone();
        page.record_soft_failure(Error::assertion_failed("failed", "a", "b"));
        assert_eq!(clone.soft_failures().len(), 1);
    }

    #[test]
    fn test_debug_output() {
        let page = footer_page();
        let debug = format!("{:?}", page.section("footer").unwrap());
        assert!(debug.contains("footer"));
        assert!(format!("{page:?}").contains("home"));
    }
}
