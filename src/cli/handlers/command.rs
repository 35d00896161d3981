//! # Handler for the `command` meta-command
//!
//! `command` extends the shell at runtime. `add` binds a new command name to a generic-type
//! handler for a node type of the model, `list` shows the names bound this way and `remove`
//! unbinds one of them. Built-in commands are visible in the registry but never removable here.

use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::{
    cli::{
        arg_spec::{ArgId, ArgSpec, ArgTable},
        completion::{Completion, CompletionProvider, complete_arguments},
        context::CommandContext,
        registry::{
            CommandHandler, CommandRegistry, HandlerKind, RegistryError, generic_type_names,
        },
    },
    constants::{ACTION_ADD, ACTION_LIST, ACTION_REMOVE, ACTIONS, WILDCARD_NAME},
    core::{address::AddressParser, arg_parser::ParsedLine},
    models::ResourceAddress,
};

pub const ACTION: ArgId = 0;
pub const NODE_TYPE: ArgId = 1;
pub const PROPERTY_ID: ArgId = 2;
pub const COMMAND_NAME: ArgId = 3;
pub const HELP: ArgId = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Missing required argument '--action'.")]
    MissingAction,
    #[error("Unexpected action '{0}'. Expected one of: add, list, remove.")]
    UnexpectedAction(String),
    #[error("Missing required argument '{0}'.")]
    MissingRequired(&'static str),
    #[error("Failed to parse the node type path: {0}")]
    BadPath(String),
    #[error("Node path '{0}' doesn't end on a type.")]
    NotAType(String),
    #[error("Type '{type_name}' not found among child types of '{parent}'.")]
    UnknownType { type_name: String, parent: String },
    #[error("Property '{property}' not found among the attributes of '{path}'.")]
    UnknownProperty { property: String, path: String },
    #[error("Property '{0}' is not read-only.")]
    PropertyNotReadOnly(String),
    #[error("Command '{0}' already registered.")]
    NameInUse(String),
    #[error("Command '{0}' is not a generic type command.")]
    NotGeneric(String),
    #[error("Failed to validate input: {0}")]
    ValidationFailed(String),
}

/// Builds the handler that gives a new command name its behaviour:
/// `(command name, node type path, id property)`.
pub type GenericHandlerFactory = fn(&str, ResourceAddress, Option<&str>) -> Arc<dyn CommandHandler>;

/// The `command` meta-handler.
pub struct CommandCommandHandler {
    registry: CommandRegistry,
    args: ArgTable,
    factory: GenericHandlerFactory,
    scratch_parser: Mutex<AddressParser>,
}

impl std::fmt::Debug for CommandCommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandCommandHandler")
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// The argument grammar of `command`. Ids are the constants above.
fn arg_table() -> ArgTable {
    ArgTable::new(vec![
        ArgSpec::new("--action")
            .at_position(0)
            .not_after(&[HELP])
            .completed_by(CompletionProvider::StaticSet(ACTIONS)),
        ArgSpec::new("--node-type")
            .completed_by(CompletionProvider::NodePath)
            .eligible_when(|table, line| {
                table.value(ACTION, line) == Some(ACTION_ADD) && !table.is_present(NODE_TYPE, line)
            }),
        ArgSpec::new("--property-id")
            .requires(&[NODE_TYPE])
            .completed_by(CompletionProvider::ReadOnlyAttributes {
                node_type: NODE_TYPE,
            }),
        ArgSpec::new("--command-name")
            .completed_by(CompletionProvider::CommandName {
                action: ACTION,
                node_type: NODE_TYPE,
            })
            .eligible_when(|table, line| {
                if table.is_present(COMMAND_NAME, line) {
                    return false;
                }
                match table.value(ACTION, line) {
                    Some(ACTION_ADD) => table.is_value_complete(NODE_TYPE, line),
                    Some(ACTION_REMOVE) => true,
                    _ => false,
                }
            }),
        ArgSpec::new("--help").switch(),
    ])
}

impl CommandCommandHandler {
    pub fn new(registry: CommandRegistry, factory: GenericHandlerFactory) -> Self {
        Self {
            registry,
            args: arg_table(),
            factory,
            scratch_parser: Mutex::new(AddressParser::new()),
        }
    }

    pub fn args(&self) -> &ArgTable {
        &self.args
    }

    /// Runs `f` with the handler's path parser, reset before and after use.
    fn with_scratch_parser<R>(&self, f: impl FnOnce(&mut AddressParser) -> R) -> R {
        let mut guard = self
            .scratch_parser
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.reset();
        let mut parser = scopeguard::guard(&mut *guard, |parser| parser.reset());
        f(&mut **parser)
    }

    /// The value of `id`. An empty value counts as missing.
    fn required<'l>(&self, id: ArgId, line: &'l ParsedLine) -> Result<&'l str, CommandError> {
        self.args
            .value(id, line)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                CommandError::MissingRequired(self.args.get(id).map_or("", |spec| spec.flag))
            })
    }

    fn list(&self, ctx: &mut CommandContext) {
        ctx.print_columns(&generic_type_names(&self.registry));
    }

    fn add(&self, ctx: &CommandContext, line: &ParsedLine) -> Result<()> {
        let node_type = self.required(NODE_TYPE, line)?;
        let command_name = self.required(COMMAND_NAME, line)?;
        let property_id = self.args.value(PROPERTY_ID, line);

        // The dispatcher splits on whitespace, so such a name could never be run.
        if command_name.chars().any(char::is_whitespace) {
            return Err(CommandError::ValidationFailed(
                RegistryError::InvalidName(command_name.to_string()).to_string(),
            )
            .into());
        }

        let address = self.validate_input(ctx, node_type, property_id)?;

        if self.registry.get(command_name).is_some() {
            return Err(CommandError::NameInUse(command_name.to_string()).into());
        }
        let handler = (self.factory)(command_name, address, property_id);
        self.registry
            .register(command_name, handler)
            .map_err(|e| match e {
                RegistryError::NameInUse(name) => CommandError::NameInUse(name),
                invalid @ RegistryError::InvalidName(_) => {
                    CommandError::ValidationFailed(invalid.to_string())
                }
            })?;
        Ok(())
    }

    fn remove(&self, line: &ParsedLine) -> Result<(), CommandError> {
        let command_name = self.required(COMMAND_NAME, line)?;
        let is_generic = self
            .registry
            .get(command_name)
            .is_some_and(|handler| handler.kind() == HandlerKind::GenericType);
        if !is_generic {
            return Err(CommandError::NotGeneric(command_name.to_string()));
        }
        self.registry.remove(command_name);
        Ok(())
    }

    /// Checks that `node_type` names a child type of its parent and, when given, that
    /// `property_id` is one of its read-only attributes. Returns the parsed type address.
    ///
    /// The child-type check always runs before the description request.
    pub fn validate_input(
        &self,
        ctx: &CommandContext,
        node_type: &str,
        property_id: Option<&str>,
    ) -> Result<ResourceAddress, CommandError> {
        let address = self
            .with_scratch_parser(|parser| parser.parse(node_type, ctx.current_node()))
            .map_err(|e| CommandError::BadPath(e.to_string()))?;

        let type_name = match address.last_type() {
            Some(type_name) if address.ends_on_type() => type_name,
            _ => return Err(CommandError::NotAType(node_type.to_string())),
        };
        let parent = address.parent_node();
        let introspector = ctx.introspector();

        let types = introspector
            .children_types(&parent)
            .map_err(|e| CommandError::ValidationFailed(e.to_string()))?;
        if !types.iter().any(|t| t == type_name) {
            return Err(CommandError::UnknownType {
                type_name: type_name.to_string(),
                parent: ctx.format_address(&parent),
            });
        }

        let attributes = introspector
            .attributes(&parent.child(type_name, WILDCARD_NAME))
            .map_err(|e| CommandError::ValidationFailed(e.to_string()))?;

        if let Some(property) = property_id {
            match attributes.iter().find(|attribute| attribute.name == property) {
                Some(attribute) if attribute.is_read_only() => {}
                Some(_) => return Err(CommandError::PropertyNotReadOnly(property.to_string())),
                None => {
                    return Err(CommandError::UnknownProperty {
                        property: property.to_string(),
                        path: ctx.format_address(&address),
                    });
                }
            }
        }
        Ok(address)
    }
}

impl CommandHandler for CommandCommandHandler {
    fn handle(&self, ctx: &mut CommandContext) -> Result<()> {
        let line = ctx.parsed_line().clone();
        if self.args.is_present(HELP, &line) {
            ctx.print_line(t!("command.usage"));
            return Ok(());
        }

        let action = self
            .args
            .value(ACTION, &line)
            .ok_or(CommandError::MissingAction)?;
        log::debug!("command: action '{}'", action);

        match action {
            ACTION_LIST => {
                self.list(ctx);
                Ok(())
            }
            ACTION_ADD => self.add(ctx, &line),
            ACTION_REMOVE => Ok(self.remove(&line)?),
            other => Err(CommandError::UnexpectedAction(other.to_string()).into()),
        }
    }

    fn complete(&self, ctx: &CommandContext, buffer: &str) -> Completion {
        self.with_scratch_parser(|parser| {
            complete_arguments(&self.args, ctx, &self.registry, parser, buffer)
        })
    }
}

// MARK: --- UNIT TESTS ---
