use anyhow::{Result, anyhow};

use crate::{
    cli::{completion::Completion, context::CommandContext, registry::CommandRegistry},
    core::arg_parser::{ParsedLine, tokenize},
};

/// True for lines that carry no command: blank lines and `#` comments.
pub fn is_ignored(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Runs one input line against the registry.
///
/// The handler is looked up by the first word; the parsed line is stored in the context
/// before the handler runs.
pub fn dispatch(line: &str, registry: &CommandRegistry, ctx: &mut CommandContext) -> Result<()> {
    if is_ignored(line) {
        return Ok(());
    }
    log::debug!("Dispatching line: {:?}", line);

    let parsed = ParsedLine::parse(line)?;
    let name = parsed.command_name().unwrap_or_default();
    let handler = registry
        .get(name)
        .ok_or_else(|| anyhow!(t!("dispatch.error.unknown_command"), name = name))?;

    ctx.set_parsed_line(parsed);
    handler.handle(ctx)
}

/// Completion for a partially typed line.
///
/// While the first word is being typed, candidates are command names. After it, the command's
/// own handler completes its arguments. Unknown commands complete to nothing.
pub fn complete(buffer: &str, registry: &CommandRegistry, ctx: &CommandContext) -> Completion {
    let tokens = tokenize(buffer);
    let Some(first) = tokens.first() else {
        return Completion::new(buffer.len(), registry.names_for_completion());
    };

    if !first.complete {
        let candidates = registry
            .names_for_completion()
            .into_iter()
            .filter(|name| name.starts_with(&first.text))
            .collect();
        return Completion::new(first.start, candidates);
    }

    match registry.get(&first.text) {
        Some(handler) => handler.complete(ctx, buffer),
        None => {
            log::debug!("No handler to complete '{}'", first.text);
            Completion::empty(buffer.len())
        }
    }
}
