//! Per-scope command tables.

use rustc_hash::FxHashMap;

use super::wrapper::Command;

// ============================================================================
// NamespaceMode
// ============================================================================

/// How failures of a namespace's commands are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceMode {
    /// Errors propagate unchanged.
    #[default]
    Plain,
    /// Assertion failures abort (`assert`).
    Strict,
    /// Assertion failures are recorded and execution continues (`verify`).
    Soft,
}

// ============================================================================
// Tables
// ============================================================================

/// Commands of one namespace.
#[derive(Default)]
pub(crate) struct NamespaceTable {
    pub commands: FxHashMap<String, Command>,
    pub mode: NamespaceMode,
}

/// Commands and namespaces registered on one page or section.
#[derive(Default)]
pub(crate) struct CommandTable {
    pub commands: FxHashMap<String, Command>,
    pub namespaces: FxHashMap<String, NamespaceTable>,
}

impl CommandTable {
    /// Returns the commands of a namespace, or the direct commands.
    pub fn commands(&self, namespace: Option<&str>) -> Option<&FxHashMap<String, Command>> {
        match namespace {
            None => Some(&self.commands),
            Some(name) => self.namespaces.get(name).map(|table| &table.commands),
        }
    }

    /// Returns `true` if a command is registered.
    pub fn contains(&self, namespace: Option<&str>, command: &str) -> bool {
        self.commands(namespace)
            .is_some_and(|commands| commands.contains_key(command))
    }

    /// Returns `true` if registering `command` would shadow an existing name.
    ///
    /// Direct commands and namespaces share one name space per target: a
    /// direct command clashes with a namespace of the same name, and a new
    /// namespace clashes with a direct command. Adding to a namespace that
    /// already exists only checks the namespace's own commands.
    pub fn collides(&self, namespace: Option<&str>, command: &str) -> bool {
        match namespace {
            None => self.commands.contains_key(command) || self.namespaces.contains_key(command),
            Some(name) if self.namespaces.contains_key(name) => self.contains(namespace, command),
            Some(name) => self.commands.contains_key(name),
        }
    }

    /// Inserts a command, creating its namespace when missing.
    pub fn insert(&mut self, namespace: Option<&str>, command: Command) {
        let name = command.name().to_string();
        match namespace {
            None => {
                self.commands.insert(name, command);
            }
            Some(namespace) => {
                self.namespaces
                    .entry(namespace.to_string())
                    .or_default()
                    .commands
                    .insert(name, command);
            }
        }
    }

    /// Returns sorted command names of a namespace, or the direct commands.
    pub fn names(&self, namespace: Option<&str>) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands(namespace)
            .map(|commands| commands.keys().cloned().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}
