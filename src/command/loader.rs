//! Command registration.
//!
//! A loader function receives a [`CommandRegistry`] and returns a
//! [`CommandMap`]. Every entry is wrapped into a [`Command`] bound to the
//! registry's parent and stored in the parent's command table.
//!
//! | Entry | Registered as |
//! |-------|---------------|
//! | [`CommandEntry::Command`] | direct command of the parent |
//! | [`CommandEntry::Namespace`] | one command per inner name, under the namespace |
//!
//! Registration is all-or-nothing: a duplicate name rejects the whole map.
//! Direct commands and namespaces share one name space per target.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::assertion::soft;
use crate::error::{Error, Result};
use crate::page::CommandTarget;

use super::function::CommandDefinition;
use super::wrapper::Command;

// ============================================================================
// Constants
// ============================================================================

/// Built-in namespaces a loader may populate.
pub const NAMESPACES: [&str; 6] = ["alerts", "cookies", "document", "assert", "verify", "expect"];

/// Returns `true` for a built-in namespace name.
#[inline]
#[must_use]
pub fn is_builtin_namespace(name: &str) -> bool {
    NAMESPACES.contains(&name)
}

// ============================================================================
// Types
// ============================================================================

/// One value of a loader's command map.
#[derive(Debug, Clone)]
pub enum CommandEntry {
    /// A direct command.
    Command(CommandDefinition),
    /// A namespace of commands.
    Namespace(BTreeMap<String, CommandDefinition>),
}

impl From<CommandDefinition> for CommandEntry {
    fn from(definition: CommandDefinition) -> Self {
        Self::Command(definition)
    }
}

impl From<BTreeMap<String, CommandDefinition>> for CommandEntry {
    fn from(commands: BTreeMap<String, CommandDefinition>) -> Self {
        Self::Namespace(commands)
    }
}

/// Map returned by a loader function.
pub type CommandMap = BTreeMap<String, CommandEntry>;

/// Loader function type.
pub type LoaderFn = dyn Fn(&CommandRegistry) -> Result<CommandMap> + Send + Sync;

/// Handle passed to loader functions.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    parent: CommandTarget,
}

impl CommandRegistry {
    /// Returns the page or section commands are being registered on.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> &CommandTarget {
        &self.parent
    }
}

/// A command staged for insertion.
struct Staged {
    namespace: Option<String>,
    command: Command,
    overwrite: bool,
}

// ============================================================================
// CommandLoader
// ============================================================================

/// Registers loader output on pages and sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLoader;

impl CommandLoader {
    /// Runs `loader` and registers every returned command on `parent`.
    ///
    /// When both `assert` and `verify` namespaces exist afterwards, `verify`
    /// becomes the soft variant of `assert`. Returns the number of commands
    /// registered.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateCommand`] if a name is already registered on the
    ///   same target and namespace without `overwrite`
    /// - any error returned by `loader`
    pub fn add_wrapped_commands<F>(parent: &CommandTarget, loader: F) -> Result<usize>
    where
        F: FnOnce(&CommandRegistry) -> Result<CommandMap>,
    {
        let registry = CommandRegistry {
            parent: parent.clone(),
        };
        let map = loader(&registry)?;
        let staged = Self::stage(parent, map);

        let page = parent.page();
        let scope = parent.scope();
        let count = staged.len();

        page.with_table(scope, |table| {
            if let Some(duplicate) = staged
                .iter()
                .find(|s| !s.overwrite && table.collides(s.namespace.as_deref(), s.command.name()))
            {
                return Err(Error::duplicate_command(
                    duplicate.command.name(),
                    page.describe(scope, duplicate.namespace.as_deref()),
                ));
            }

            for Staged {
                namespace, command, ..
            } in staged
            {
                table.insert(namespace.as_deref(), command);
            }

            if soft::install_proxy(table) {
                trace!(target = %parent.name(), "Installed assert/verify proxy");
            }
            Ok(())
        })?;

        debug!(target = %parent.name(), commands = count, "Commands registered");
        Ok(count)
    }

    fn stage(parent: &CommandTarget, map: CommandMap) -> Vec<Staged> {
        let scope = parent.scope();
        let mut staged = Vec::with_capacity(map.len());

        for (name, entry) in map {
            match entry {
                CommandEntry::Command(definition) => {
                    trace!(command = %name, is_async = definition.is_async(), "Staging command");
                    staged.push(Staged {
                        command: Command::new(scope, &name, None, &definition),
                        overwrite: definition.is_overwrite(),
                        namespace: None,
                    });
                }
                CommandEntry::Namespace(commands) => {
                    if !is_builtin_namespace(&name) {
                        debug!(namespace = %name, "Registering user namespace");
                    }
                    for (inner, definition) in commands {
                        trace!(namespace = %name, command = %inner, "Staging command");
                        staged.push(Staged {
                            command: Command::new(scope, inner, Some(&name), &definition),
                            overwrite: definition.is_overwrite(),
                            namespace: Some(name.clone()),
                        });
                    }
                }
            }
        }
        staged
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::command::NamespaceMode;
    use crate::test_support::{footer_page, noop, recorder};

    fn namespace(commands: &[&str]) -> CommandEntry {
        CommandEntry::Namespace(
            commands
                .iter()
                .map(|name| ((*name).to_string(), noop()))
                .collect(),
        )
    }

    #[test]
    fn test_builtin_namespaces() {
        for name in NAMESPACES {
            assert!(is_builtin_namespace(name));
        }
        assert!(!is_builtin_namespace("custom"));
    }

    #[test]
    fn test_registers_direct_and_namespaced() {
        let page = footer_page();
        let count = CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([
                ("click".to_string(), noop().into()),
                ("expect".to_string(), namespace(&["visible", "section"])),
            ]))
        })
        .unwrap();

        assert_eq!(count, 3);
        assert_eq!(page.command_names(), vec!["click"]);
        let expect = page.namespace("expect").unwrap();
        assert_eq!(expect.command_names(), vec!["section", "visible"]);
    }

    #[test]
    fn test_registry_exposes_parent() {
        let page = footer_page();
        let footer = page.section("footer").unwrap().target();
        CommandLoader::add_wrapped_commands(&footer, |registry| {
            assert_eq!(registry.parent().name(), "footer");
            assert!(!registry.parent().is_page());
            Ok(CommandMap::new())
        })
        .unwrap();
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let page = footer_page();
        let load = |_: &CommandRegistry| Ok(CommandMap::from([("click".to_string(), noop().into())]));
        CommandLoader::add_wrapped_commands(&page.target(), load).unwrap();

        let err = CommandLoader::add_wrapped_commands(&page.target(), load).unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand { ref command, .. } if command == "click"));
        assert!(!err.displayed());
        assert!(!err.show_trace());
    }

    #[test]
    fn test_duplicate_rejects_whole_map() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("click".to_string(), noop().into())]))
        })
        .unwrap();

        let result = CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([
                ("click".to_string(), noop().into()),
                ("submit".to_string(), noop().into()),
            ]))
        });
        assert!(result.is_err());
        assert_eq!(page.command_names(), vec!["click"]);
    }

    #[test]
    fn test_overwrite_replaces() {
        let page = footer_page();
        let (original, original_calls) = recorder();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("title".to_string(), original.into())]))
        })
        .unwrap();

        let (replacement, replacement_calls) = recorder();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("title".to_string(), replacement.overwrite(true).into())]))
        })
        .unwrap();

        page.call("title", vec![]).unwrap();
        assert_eq!(page.command_names(), vec!["title"]);
        assert!(original_calls.lock().is_empty());
        assert_eq!(replacement_calls.lock().len(), 1);
    }

    #[test]
    fn test_command_cannot_shadow_namespace() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("assert".to_string(), namespace(&["visible"]))]))
        })
        .unwrap();

        let err = CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("assert".to_string(), noop().into())]))
        })
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand { ref command, .. } if command == "assert"));
        assert!(page.command_names().is_empty());

        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("assert".to_string(), noop().overwrite(true).into())]))
        })
        .unwrap();
        assert_eq!(page.command_names(), vec!["assert"]);
    }

    #[test]
    fn test_namespace_cannot_shadow_command() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("custom".to_string(), noop().into())]))
        })
        .unwrap();

        let err = CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("custom".to_string(), namespace(&["ping"]))]))
        })
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand { .. }));
        assert!(page.namespace("custom").is_err());
    }

    #[test]
    fn test_existing_namespace_accepts_new_commands() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("expect".to_string(), namespace(&["visible"]))]))
        })
        .unwrap();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("expect".to_string(), namespace(&["present"]))]))
        })
        .unwrap();

        let expect = page.namespace("expect").unwrap();
        assert_eq!(expect.command_names(), vec!["present", "visible"]);
    }

    #[test]
    fn test_same_name_in_different_namespaces() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([
                ("visible".to_string(), noop().into()),
                ("assert".to_string(), namespace(&["visible"])),
            ]))
        })
        .unwrap();

        assert_eq!(page.command_names(), vec!["visible"]);
        assert_eq!(page.namespace("assert").unwrap().command_names(), vec!["visible"]);
    }

    #[test]
    fn test_same_name_on_page_and_section() {
        let page = footer_page();
        let load = |_: &CommandRegistry| Ok(CommandMap::from([("click".to_string(), noop().into())]));
        CommandLoader::add_wrapped_commands(&page.target(), load).unwrap();
        CommandLoader::add_wrapped_commands(&page.section("footer").unwrap().target(), load).unwrap();
    }

    #[test]
    fn test_user_namespace() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([("custom".to_string(), namespace(&["ping"]))]))
        })
        .unwrap();

        let custom = page.namespace("custom").unwrap();
        assert_eq!(custom.command_names(), vec!["ping"]);
        assert_eq!(custom.mode(), NamespaceMode::Plain);
    }

    #[test]
    fn test_assert_verify_proxy() {
        let page = footer_page();
        CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Ok(CommandMap::from([
                ("assert".to_string(), namespace(&["visible"])),
                ("verify".to_string(), namespace(&["visible"])),
            ]))
        })
        .unwrap();

        assert_eq!(page.namespace("assert").unwrap().mode(), NamespaceMode::Strict);
        assert_eq!(page.namespace("verify").unwrap().mode(), NamespaceMode::Soft);
    }

    #[test]
    fn test_loader_error_propagates() {
        let page = footer_page();
        let err = CommandLoader::add_wrapped_commands(&page.target(), |_| {
            Err(Error::config("loader failed"))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
