// src/constants.rs

//! Names shared between the shell, the meta-command and the management protocol.

/// Name under which the meta-command is registered.
pub const META_COMMAND_NAME: &str = "command";

/// The closed set of actions accepted by the meta-command.
pub const ACTIONS: &[&str] = &[ACTION_ADD, ACTION_LIST, ACTION_REMOVE];
/// Registers a new generic-type command.
pub const ACTION_ADD: &str = "add";
/// Lists the registered generic-type commands.
pub const ACTION_LIST: &str = "list";
/// Unregisters a generic-type command.
pub const ACTION_REMOVE: &str = "remove";

// --- Management protocol ---

/// Request/response key carrying the operation name.
pub const OPERATION: &str = "operation";
/// Request key carrying the target address.
pub const ADDRESS: &str = "address";
/// Response key carrying the outcome (`success` or `failed`).
pub const OUTCOME: &str = "outcome";
/// Successful outcome value.
pub const SUCCESS: &str = "success";
/// Response key carrying the operation result.
pub const RESULT: &str = "result";
/// Response key carrying a failure message.
pub const FAILURE_DESCRIPTION: &str = "failure-description";
/// Request parameter naming the child type for `read-children-names`.
pub const CHILD_TYPE: &str = "child-type";

/// Lists the child types registered under an address.
pub const READ_CHILDREN_TYPES: &str = "read-children-types";
/// Lists the instance names of one child type under an address.
pub const READ_CHILDREN_NAMES: &str = "read-children-names";
/// Describes the resource (or type, with a `?` name) at an address.
pub const READ_RESOURCE_DESCRIPTION: &str = "read-resource-description";
/// Reads the attribute values of a resource.
pub const READ_RESOURCE: &str = "read-resource";

/// Description key holding the attribute descriptions.
pub const ATTRIBUTES: &str = "attributes";
/// Attribute property holding the access type.
pub const ACCESS_TYPE: &str = "access-type";
/// Instance name addressing every instance of a type.
pub const WILDCARD_NAME: &str = "?";

// --- Configuration ---

/// Directory under the system config dir holding modelsh files.
pub const CONFIG_DIR_NAME: &str = "modelsh";
/// The configuration file name (inside the config dir).
pub const CONFIG_FILENAME: &str = "config.toml";
/// Output width used for column formatting when nothing else is configured.
pub const DEFAULT_COLUMNS: usize = 80;
