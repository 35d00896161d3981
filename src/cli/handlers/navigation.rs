// EN: src/cli/handlers/navigation.rs

//! `cd` and `ls`: moving around the model tree.

use anyhow::{Result, anyhow, bail};

use crate::{
    cli::{
        arg_spec::{ArgId, ArgSpec, ArgTable},
        completion::{Completion, CompletionProvider, complete_arguments},
        context::CommandContext,
        registry::{CommandHandler, CommandRegistry},
    },
    core::address::{AddressParser, parse_address},
};

const NODE_PATH: ArgId = 0;

/// Both commands take one path, bare or as `--node-path=<path>`.
fn path_args() -> ArgTable {
    ArgTable::new(vec![
        ArgSpec::new("--node-path")
            .at_position(0)
            .completed_by(CompletionProvider::NodePath),
    ])
}

fn complete_path(args: &ArgTable, ctx: &CommandContext, buffer: &str) -> Completion {
    complete_arguments(
        args,
        ctx,
        &CommandRegistry::default(),
        &mut AddressParser::new(),
        buffer,
    )
}

/// `cd <path>`: makes an existing node the current one.
#[derive(Debug)]
pub struct ChangeNodeHandler {
    args: ArgTable,
}

impl Default for ChangeNodeHandler {
    fn default() -> Self {
        Self { args: path_args() }
    }
}

impl CommandHandler for ChangeNodeHandler {
    fn handle(&self, ctx: &mut CommandContext) -> Result<()> {
        let line = ctx.parsed_line().clone();
        let Some(path) = self.args.value(NODE_PATH, &line) else {
            bail!(t!("navigation.error.missing_path"));
        };

        let address = parse_address(path, ctx.current_node())?;
        if address.ends_on_type() {
            bail!(t!("navigation.error.not_a_node"), path = path);
        }
        ctx.introspector().resource(&address).map_err(|e| {
            anyhow!(
                t!("navigation.error.no_such_node"),
                path = ctx.format_address(&address),
                reason = e
            )
        })?;

        log::debug!("cd: {} -> {}", ctx.current_node(), address);
        ctx.set_current_node(address);
        Ok(())
    }

    fn complete(&self, ctx: &CommandContext, buffer: &str) -> Completion {
        complete_path(&self.args, ctx, buffer)
    }
}

/// `ls [path]`: child types of a node, or instance names when the path ends on a type.
#[derive(Debug)]
pub struct ListNodeHandler {
    args: ArgTable,
}

impl Default for ListNodeHandler {
    fn default() -> Self {
        Self { args: path_args() }
    }
}

impl CommandHandler for ListNodeHandler {
    fn handle(&self, ctx: &mut CommandContext) -> Result<()> {
        let line = ctx.parsed_line().clone();
        let address = match self.args.value(NODE_PATH, &line) {
            Some(path) => parse_address(path, ctx.current_node())?,
            None => ctx.current_node().clone(),
        };

        let items = match address.last_type().filter(|_| address.ends_on_type()) {
            Some(type_name) => ctx
                .introspector()
                .children_names(&address.parent_node(), type_name)?,
            None => ctx.introspector().children_types(&address)?,
        };
        ctx.print_columns(&items);
        Ok(())
    }

    fn complete(&self, ctx: &CommandContext, buffer: &str) -> Completion {
        complete_path(&self.args, ctx, buffer)
    }
}
