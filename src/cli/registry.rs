// src/cli/registry.rs

use crate::cli::{completion::Completion, context::CommandContext};
use anyhow::Result;
use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command '{0}' already registered.")]
    NameInUse(String),
    #[error("'{0}' is not a valid command name.")]
    InvalidName(String),
}

/// What kind of handler sits behind a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Part of the shell itself.
    BuiltIn,
    /// Created at runtime by `command --action=add`; listable and removable through it.
    GenericType,
}

/// A command the shell can run.
pub trait CommandHandler: Send + Sync {
    /// Runs the command for the line in `ctx.parsed_line()`.
    fn handle(&self, ctx: &mut CommandContext) -> Result<()>;

    /// Completion candidates for a partially typed `buffer` that starts with this command's
    /// name. Must never fail; the default offers nothing.
    fn complete(&self, _ctx: &CommandContext, buffer: &str) -> Completion {
        Completion::empty(buffer.len())
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::BuiltIn
    }
}

/// The process-wide mapping from command name to handler.
///
/// Clones share the same table. Every operation is atomic on its own, but a sequence of calls
/// (look up, then register) is not.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: Arc<RwLock<BTreeMap<String, Arc<dyn CommandHandler>>>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("names", &self.names_for_completion())
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<dyn CommandHandler>>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<dyn CommandHandler>>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `handler` under `name`.
    ///
    /// # Errors
    /// `RegistryError::NameInUse` if the name is taken, `RegistryError::InvalidName` if it is
    /// empty or contains whitespace.
    pub fn register(
        &self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistryError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        let mut handlers = self.write();
        if handlers.contains_key(name) {
            return Err(RegistryError::NameInUse(name.to_string()));
        }
        log::debug!("Registering command '{}' ({:?})", name, handler.kind());
        handlers.insert(name.to_string(), handler);
        Ok(())
    }

    /// Removes and returns the handler registered under `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        let removed = self.write().remove(name);
        if removed.is_some() {
            log::debug!("Removed command '{}'", name);
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.read().get(name).cloned()
    }

    /// Every registered name, sorted.
    pub fn names_for_completion(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}

/// Names whose handler is a generic-type command, sorted.
///
/// Names and handlers are looked up separately, so an entry removed in between is skipped.
pub fn generic_type_names(registry: &CommandRegistry) -> Vec<String> {
    registry
        .names_for_completion()
        .into_iter()
        .filter(|name| {
            registry
                .get(name)
                .is_some_and(|handler| handler.kind() == HandlerKind::GenericType)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(HandlerKind);

    impl CommandHandler for Noop {
        fn handle(&self, _ctx: &mut CommandContext) -> Result<()> {
            Ok(())
        }

        fn kind(&self) -> HandlerKind {
            self.0
        }
    }

    #[test]
    fn test_register_get_remove() {
        let registry = CommandRegistry::new();
        registry
            .register("deploy", Arc::new(Noop(HandlerKind::BuiltIn)))
            .unwrap();
        registry
            .register("ds", Arc::new(Noop(HandlerKind::GenericType)))
            .unwrap();

        assert_eq!(registry.names_for_completion(), vec!["deploy", "ds"]);
        assert_eq!(
            registry.get("ds").map(|h| h.kind()),
            Some(HandlerKind::GenericType)
        );

        assert_eq!(generic_type_names(&registry), vec!["ds"]);

        assert!(registry.remove("ds").is_some());
        assert!(registry.get("ds").is_none());
        assert!(registry.remove("ds").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let registry = CommandRegistry::new();
        registry
            .register("deploy", Arc::new(Noop(HandlerKind::BuiltIn)))
            .unwrap();
        let result = registry.register("deploy", Arc::new(Noop(HandlerKind::GenericType)));
        assert_eq!(result, Err(RegistryError::NameInUse("deploy".to_string())));
        assert_eq!(
            registry.get("deploy").map(|h| h.kind()),
            Some(HandlerKind::BuiltIn)
        );
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let registry = CommandRegistry::new();
        for name in ["", "two words"] {
            let result = registry.register(name, Arc::new(Noop(HandlerKind::GenericType)));
            assert_eq!(result, Err(RegistryError::InvalidName(name.to_string())));
        }
    }

    #[test]
    fn test_clones_share_state() {
        let registry = CommandRegistry::new();
        let other = registry.clone();
        other
            .register("ds", Arc::new(Noop(HandlerKind::GenericType)))
            .unwrap();
        assert!(registry.get("ds").is_some());
    }
}
