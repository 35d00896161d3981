// EN: src/cli/handlers/generic_type.rs

use anyhow::{Result, anyhow};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    cli::{
        arg_spec::{CompletionTarget, locate},
        completion::Completion,
        context::CommandContext,
        registry::{CommandHandler, HandlerKind},
    },
    models::ResourceAddress,
};

/// Argument naming the instance when no id property was bound.
const DEFAULT_ID_PROPERTY: &str = "name";

/// A command created at runtime, bound to one node type of the model.
///
/// `<name>` lists the instances of the type; `<name> <instance>` or `<name> --<id>=<instance>`
/// prints the attributes of one instance.
#[derive(Debug, Clone)]
pub struct GenericTypeHandler {
    command_name: String,
    node_type: ResourceAddress,
    id_property: Option<String>,
}

/// Factory handed to the `command` meta-handler.
pub fn create_generic_type_handler(
    command_name: &str,
    node_type: ResourceAddress,
    id_property: Option<&str>,
) -> Arc<dyn CommandHandler> {
    Arc::new(GenericTypeHandler::new(command_name, node_type, id_property))
}

impl GenericTypeHandler {
    pub fn new(command_name: &str, node_type: ResourceAddress, id_property: Option<&str>) -> Self {
        Self {
            command_name: command_name.to_string(),
            node_type,
            id_property: id_property.map(str::to_string),
        }
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn node_type(&self) -> &ResourceAddress {
        &self.node_type
    }

    pub fn id_property(&self) -> Option<&str> {
        self.id_property.as_deref()
    }

    fn id_flag(&self) -> String {
        format!(
            "--{}",
            self.id_property.as_deref().unwrap_or(DEFAULT_ID_PROPERTY)
        )
    }

    fn type_name(&self) -> Result<&str> {
        self.node_type
            .last_type()
            .ok_or_else(|| anyhow!(t!("generic.error.no_type"), path = self.node_type))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl CommandHandler for GenericTypeHandler {
    fn handle(&self, ctx: &mut CommandContext) -> Result<()> {
        let line = ctx.parsed_line().clone();
        let parent = self.node_type.parent_node();
        let type_name = self.type_name()?;
        let instance = line
            .property_value(&self.id_flag())
            .or_else(|| line.positional(0));

        let Some(instance) = instance else {
            let names = ctx.introspector().children_names(&parent, type_name)?;
            ctx.print_columns(&names);
            return Ok(());
        };

        log::debug!(
            "{}: reading {}={} under {}",
            self.command_name,
            type_name,
            instance,
            parent
        );
        let values = ctx
            .introspector()
            .resource(&parent.child(type_name, instance))?;
        for (key, value) in &values {
            ctx.print_line(&format!("{}={}", key, display_value(value)));
        }
        Ok(())
    }

    fn complete(&self, ctx: &CommandContext, buffer: &str) -> Completion {
        let Ok((line, target)) = locate(buffer) else {
            return Completion::empty(buffer.len());
        };
        let id_flag = self.id_flag();
        if line.has_property(&id_flag) || line.positional_count() > 0 {
            return Completion::empty(buffer.len());
        }
        let (partial, offset) = match target {
            CompletionTarget::Value {
                flag,
                partial,
                offset,
            } if flag == id_flag => (partial, offset),
            CompletionTarget::Positional { partial, offset, .. } => (partial, offset),
            CompletionTarget::ArgName { partial, offset } => {
                let name = format!("{}=", id_flag);
                let candidates = if name.starts_with(&partial) {
                    vec![name]
                } else {
                    Vec::new()
                };
                return Completion::new(offset, candidates);
            }
            CompletionTarget::NewToken { offset } => (String::new(), offset),
            CompletionTarget::Value { offset, .. } => return Completion::empty(offset),
        };

        let Ok(type_name) = self.type_name() else {
            return Completion::empty(offset);
        };
        match ctx
            .introspector()
            .children_names(&self.node_type.parent_node(), type_name)
        {
            Ok(names) => Completion::new(
                offset,
                names
                    .into_iter()
                    .filter(|name| name.starts_with(&partial))
                    .collect(),
            ),
            Err(e) => {
                log::warn!("{}: completion failed: {}", self.command_name, e);
                Completion::empty(offset)
            }
        }
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::GenericType
    }
}
