//! Section arena and declared-name lookup.
//!
//! All sections of a page live in one arena indexed by [`SectionId`]. Each
//! section records the id of its parent, so elements only ever hold an index
//! back to their owning section.
//!
//! ```text
//! page "home"
//! ├── elements: submit, search
//! └── sections
//!     └── #0 footer (.footer)
//!         ├── elements: link
//!         └── sections
//!             └── #1 social (.social)  parent = #0
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::{Scope, SectionId};
use crate::selector::{Element, LocateStrategy};

use super::definition::{ElementDeclarations, PageDefinition, SectionDefinition};

// ============================================================================
// Types
// ============================================================================

/// Elements and sub-sections declared by one container.
#[derive(Debug, Default)]
struct Declarations {
    /// Element templates by name.
    elements: FxHashMap<String, Element>,
    /// Child sections by name.
    sections: FxHashMap<String, SectionId>,
}

/// One section in the arena.
#[derive(Debug)]
struct SectionNode {
    /// Declared name.
    name: String,
    /// Locator of the section inside its parent.
    locator: Element,
    /// Owning section, `None` when declared on the page.
    parent: Option<SectionId>,
    /// Declarations of this section.
    declarations: Declarations,
}

/// Which declaration map a lookup targets.
#[derive(Debug, Clone, Copy)]
enum Collection {
    Elements,
    Sections,
}

// ============================================================================
// SectionTree
// ============================================================================

/// Immutable declarations of a page and all its sections.
#[derive(Debug)]
pub struct SectionTree {
    page_name: String,
    default_strategy: LocateStrategy,
    root: Declarations,
    sections: Vec<SectionNode>,
}

// ============================================================================
// SectionTree - Construction
// ============================================================================

impl SectionTree {
    /// Builds the arena from a page definition.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a selector is empty, element names collide, or
    ///   a container uses one name for an element and a section
    pub fn build(
        page_name: impl Into<String>,
        definition: &PageDefinition,
        default_strategy: LocateStrategy,
    ) -> Result<Self> {
        let mut tree = Self {
            page_name: page_name.into(),
            default_strategy,
            root: Declarations::default(),
            sections: Vec::new(),
        };

        tree.root.elements = Self::build_elements(&tree.page_name, &definition.elements, None)?;
        Self::check_shared_names(&tree.page_name, &tree.root.elements, &definition.sections)?;
        for (name, section) in &definition.sections {
            let id = tree.add_section(name, section, None)?;
            tree.root.sections.insert(name.clone(), id);
        }

        trace!(
            page = %tree.page_name,
            sections = tree.sections.len(),
            "Section tree built"
        );
        Ok(tree)
    }

    fn add_section(
        &mut self,
        name: &str,
        definition: &SectionDefinition,
        parent: Option<SectionId>,
    ) -> Result<SectionId> {
        if definition.selector.trim().is_empty() {
            return Err(Error::config(format!(
                "section \"{name}\" has an empty selector"
            )));
        }

        let id = SectionId::new(self.sections.len());
        let mut locator = Element::new(definition.selector.clone())
            .with_name(name)
            .with_parent(parent);
        if let Some(strategy) = definition.locate_strategy.clone() {
            locator = locator.with_strategy(strategy);
        }

        let elements = Self::build_elements(name, &definition.elements, Some(id))?;
        Self::check_shared_names(name, &elements, &definition.sections)?;
        self.sections.push(SectionNode {
            name: name.to_string(),
            locator,
            parent,
            declarations: Declarations {
                elements,
                sections: FxHashMap::default(),
            },
        });

        for (child_name, child) in &definition.sections {
            let child_id = self.add_section(child_name, child, Some(id))?;
            if let Some(node) = self.sections.get_mut(id.index()) {
                node.declarations.sections.insert(child_name.clone(), child_id);
            }
        }

        Ok(id)
    }

    fn check_shared_names(
        container: &str,
        elements: &FxHashMap<String, Element>,
        sections: &BTreeMap<String, SectionDefinition>,
    ) -> Result<()> {
        let mut shared: Vec<&str> = sections
            .keys()
            .map(String::as_str)
            .filter(|name| elements.contains_key(*name))
            .collect();
        shared.sort_unstable();
        match shared.first() {
            Some(name) => Err(Error::config(format!(
                "\"{name}\" in \"{container}\" is declared as both an element and a section"
            ))),
            None => Ok(()),
        }
    }

    fn build_elements(
        container: &str,
        declarations: &ElementDeclarations,
        parent: Option<SectionId>,
    ) -> Result<FxHashMap<String, Element>> {
        let mut elements = FxHashMap::default();
        for (name, declaration) in declarations.merged()? {
            if declaration.selector().trim().is_empty() {
                return Err(Error::config(format!(
                    "element \"{name}\" in \"{container}\" has an empty selector"
                )));
            }

            let mut element = Element::new(declaration.selector())
                .with_name(name.clone())
                .with_parent(parent)
                .with_defaults(declaration.defaults());
            if let Some(strategy) = declaration.locate_strategy() {
                element = element.with_strategy(strategy);
            }
            elements.insert(name, element);
        }
        Ok(elements)
    }
}

// ============================================================================
// SectionTree - Accessors
// ============================================================================

impl SectionTree {
    /// Returns the page name.
    #[inline]
    #[must_use]
    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    /// Returns the strategy assumed for declarations without one.
    #[inline]
    #[must_use]
    pub fn default_strategy(&self) -> &LocateStrategy {
        &self.default_strategy
    }

    /// Returns the number of sections in the arena.
    #[inline]
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Returns every scope: the page followed by all sections.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        std::iter::once(Scope::Page)
            .chain((0..self.sections.len()).map(|i| Scope::Section(SectionId::new(i))))
    }

    /// Returns the declared name of a scope, or `None` for a foreign id.
    #[must_use]
    pub fn scope_name(&self, scope: Scope) -> Option<&str> {
        match scope {
            Scope::Page => Some(&self.page_name),
            Scope::Section(id) => self.node(id).ok().map(|node| node.name.as_str()),
        }
    }

    /// Returns the parent section of a section.
    #[must_use]
    pub fn parent_of(&self, id: SectionId) -> Option<SectionId> {
        self.node(id).ok().and_then(|node| node.parent)
    }

    /// Returns the sorted element names declared on a scope.
    #[must_use]
    pub fn element_names(&self, scope: Scope) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .declarations(scope)
            .map(|declarations| declarations.elements.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Returns the sorted section names declared on a scope.
    #[must_use]
    pub fn section_names(&self, scope: Scope) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .declarations(scope)
            .map(|declarations| declarations.sections.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    fn node(&self, id: SectionId) -> Result<&SectionNode> {
        self.sections.get(id.index()).ok_or_else(|| Error::UnknownSection {
            section: id.index(),
            page: self.page_name.clone(),
        })
    }

    fn declarations(&self, scope: Scope) -> Result<&Declarations> {
        match scope {
            Scope::Page => Ok(&self.root),
            Scope::Section(id) => Ok(&self.node(id)?.declarations),
        }
    }
}

// ============================================================================
// SectionTree - Lookup
// ============================================================================

impl SectionTree {
    /// Looks up a declared element.
    ///
    /// # Errors
    ///
    /// - [`Error::ElementNotFound`] if the name is absent or its strategy
    ///   differs from `filter`
    /// - [`Error::UnknownSection`] if `scope` belongs to another page
    pub fn get_element(
        &self,
        scope: Scope,
        name: &str,
        filter: Option<LocateStrategy>,
    ) -> Result<Element> {
        self.find(scope, name, filter.as_ref(), Collection::Elements)
            .cloned()
    }

    /// Looks up a declared section and returns its locator.
    ///
    /// # Errors
    ///
    /// - [`Error::SectionNotFound`] if the name is absent or its strategy
    ///   differs from `filter`
    /// - [`Error::UnknownSection`] if `scope` belongs to another page
    pub fn get_section(
        &self,
        scope: Scope,
        name: &str,
        filter: Option<LocateStrategy>,
    ) -> Result<Element> {
        self.find(scope, name, filter.as_ref(), Collection::Sections)
            .cloned()
    }

    /// Returns the id of a child section.
    ///
    /// # Errors
    ///
    /// - [`Error::SectionNotFound`] if the name is absent
    /// - [`Error::UnknownSection`] if `scope` belongs to another page
    pub fn section_id(&self, scope: Scope, name: &str) -> Result<SectionId> {
        let declarations = self.declarations(scope)?;
        match declarations.sections.get(name) {
            Some(id) => Ok(*id),
            None => Err(self.lookup_error(scope, declarations, name, None, Collection::Sections)),
        }
    }

    /// Returns the locator of a section inside its parent.
    #[must_use]
    pub fn section_locator(&self, id: SectionId) -> Option<&Element> {
        self.node(id).ok().map(|node| &node.locator)
    }

    /// Returns the locator chain of a section from the page root.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownSection`] if `id` belongs to another page
    pub fn section_chain(&self, id: SectionId) -> Result<Element> {
        let node = self.node(id)?;
        self.recursive_lookup(&node.locator)
    }

    /// Materialises the recursive chain of an element owned by a section.
    ///
    /// The chain holds every ancestor section locator, outermost first,
    /// followed by `element`. Elements without an owning section are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownSection`] if the owning section belongs to another
    ///   page
    pub fn recursive_lookup(&self, element: &Element) -> Result<Element> {
        let Some(parent) = element.parent() else {
            return Ok(element.clone());
        };

        let mut ancestors = Vec::new();
        let mut current = Some(parent);
        while let Some(id) = current {
            let node = self.node(id)?;
            ancestors.push(node.locator.clone());
            current = node.parent;
        }
        ancestors.reverse();
        ancestors.push(element.clone());

        Ok(Element::recursive(ancestors))
    }

    fn find(
        &self,
        scope: Scope,
        name: &str,
        filter: Option<&LocateStrategy>,
        collection: Collection,
    ) -> Result<&Element> {
        let declarations = self.declarations(scope)?;
        let declared = match collection {
            Collection::Elements => declarations.elements.get(name),
            Collection::Sections => declarations
                .sections
                .get(name)
                .and_then(|id| self.section_locator(*id)),
        };

        match (declared, filter) {
            (Some(element), None) => Ok(element),
            (Some(element), Some(filter)) if self.strategy_of(element) == filter => Ok(element),
            _ => Err(self.lookup_error(scope, declarations, name, filter, collection)),
        }
    }

    fn strategy_of<'a>(&'a self, element: &'a Element) -> &'a LocateStrategy {
        element.locate_strategy_ref().unwrap_or(&self.default_strategy)
    }

    fn lookup_error(
        &self,
        scope: Scope,
        declarations: &Declarations,
        name: &str,
        filter: Option<&LocateStrategy>,
        collection: Collection,
    ) -> Error {
        let with_strategy = filter.is_some();
        let mut available: Vec<String> = match collection {
            Collection::Elements => declarations
                .elements
                .iter()
                .map(|(key, element)| self.describe(key, element, with_strategy))
                .collect(),
            Collection::Sections => declarations
                .sections
                .iter()
                .filter_map(|(key, id)| {
                    self.section_locator(*id)
                        .map(|locator| self.describe(key, locator, with_strategy))
                })
                .collect(),
        };
        available.sort_unstable();

        let name = name.to_string();
        let container = self.scope_name(scope).unwrap_or_default().to_string();
        let strategy = filter.map(ToString::to_string);
        match collection {
            Collection::Elements => Error::ElementNotFound {
                name,
                container,
                strategy,
                available,
            },
            Collection::Sections => Error::SectionNotFound {
                name,
                container,
                strategy,
                available,
            },
        }
    }

    fn describe(&self, name: &str, element: &Element, with_strategy: bool) -> String {
        if with_strategy {
            format!("{name}[{}]", self.strategy_of(element))
        } else {
            name.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
