// src/cli/completion.rs

//! Candidate generation for partially typed argument lines.
//!
//! Providers may fail in many ways (bad paths, transport errors, odd responses). None of that
//! reaches the line editor: the engine logs the failure and offers nothing.

use crate::{
    cli::{
        arg_spec::{ArgId, ArgTable, CompletionTarget, locate},
        context::CommandContext,
        registry::{CommandRegistry, generic_type_names},
    },
    constants::{ACTION_ADD, ACTION_REMOVE, WILDCARD_NAME},
    core::{address::AddressParser, arg_parser::ParsedLine},
};
use anyhow::Result;

/// Candidates for the text under the cursor. Each candidate replaces the buffer from `offset`
/// to its end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub offset: usize,
    pub candidates: Vec<String>,
}

impl Completion {
    pub fn new(offset: usize, candidates: Vec<String>) -> Self {
        Self { offset, candidates }
    }

    pub fn empty(offset: usize) -> Self {
        Self::new(offset, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Where the values of one argument come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionProvider {
    /// A closed set of literals.
    StaticSet(&'static [&'static str]),
    /// Resource paths, walked through the model.
    NodePath,
    /// Read-only attribute names of the type named by another argument.
    ReadOnlyAttributes { node_type: ArgId },
    /// The suggested name on `add`, the removable names on `remove`.
    CommandName { action: ArgId, node_type: ArgId },
}

/// Everything a provider may consult.
#[derive(Debug)]
pub struct CompletionRequest<'a> {
    pub ctx: &'a CommandContext,
    pub table: &'a ArgTable,
    /// The line before the token being completed.
    pub line: &'a ParsedLine,
    pub partial: &'a str,
    pub registry: &'a CommandRegistry,
    pub parser: &'a mut AddressParser,
}

impl CompletionProvider {
    /// Unfiltered candidates. The engine applies the prefix filter.
    pub fn candidates_for(&self, request: &mut CompletionRequest<'_>) -> Result<Vec<String>> {
        match *self {
            Self::StaticSet(values) => Ok(values.iter().map(|v| v.to_string()).collect()),
            Self::NodePath => node_path_candidates(request),
            Self::ReadOnlyAttributes { node_type } => {
                let Some(path) = request.table.value(node_type, request.line) else {
                    return Ok(Vec::new());
                };
                let address = request.parser.parse(path, request.ctx.current_node())?;
                let Some(type_name) = address.last_type().filter(|_| address.ends_on_type())
                else {
                    return Ok(Vec::new());
                };
                let described = address.parent_node().child(type_name, WILDCARD_NAME);
                Ok(request
                    .ctx
                    .introspector()
                    .attributes(&described)?
                    .into_iter()
                    .filter(|attribute| attribute.is_read_only())
                    .map(|attribute| attribute.name)
                    .collect())
            }
            Self::CommandName { action, node_type } => {
                match request.table.value(action, request.line) {
                    Some(ACTION_ADD) => {
                        let Some(path) = request.table.value(node_type, request.line) else {
                            return Ok(Vec::new());
                        };
                        let address = request.parser.parse(path, request.ctx.current_node())?;
                        Ok(address
                            .last_type()
                            .filter(|_| address.ends_on_type())
                            .map(|type_name| vec![type_name.to_string()])
                            .unwrap_or_default())
                    }
                    Some(ACTION_REMOVE) => Ok(generic_type_names(request.registry)),
                    _ => Ok(Vec::new()),
                }
            }
        }
    }
}

/// Child types below the last complete segment of `partial`, or instance names after `type=`.
/// Candidates repeat everything up to the segment being typed.
fn node_path_candidates(request: &mut CompletionRequest<'_>) -> Result<Vec<String>> {
    let partial = request.partial;
    let (base_text, segment) = match partial.rfind('/') {
        Some(slash) => (
            partial.get(..=slash).unwrap_or_default(),
            partial.get(slash + 1..).unwrap_or_default(),
        ),
        None => ("", partial),
    };
    let base = if base_text.is_empty() {
        request.ctx.current_node().clone()
    } else {
        request.parser.parse(base_text, request.ctx.current_node())?
    };
    if base.ends_on_type() {
        return Ok(Vec::new());
    }

    let introspector = request.ctx.introspector();
    let candidates = match segment.split_once('=') {
        Some((node_type, _)) => introspector
            .children_names(&base, node_type)?
            .into_iter()
            .map(|name| format!("{}{}={}", base_text, node_type, name))
            .collect(),
        None => introspector
            .children_types(&base)?
            .into_iter()
            .map(|node_type| format!("{}{}", base_text, node_type))
            .collect(),
    };
    Ok(candidates)
}

fn filter_prefix(candidates: Vec<String>, partial: &str) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(partial))
        .collect()
}

/// Runs the provider of `id` if the argument may appear next, swallowing every failure.
fn provider_candidates(
    table: &ArgTable,
    id: ArgId,
    ctx: &CommandContext,
    registry: &CommandRegistry,
    parser: &mut AddressParser,
    line: &ParsedLine,
    partial: &str,
) -> Vec<String> {
    if !table.can_appear_next(id, line) {
        return Vec::new();
    }
    let Some(provider) = table.get(id).and_then(|spec| spec.completer) else {
        return Vec::new();
    };
    let mut request = CompletionRequest {
        ctx,
        table,
        line,
        partial,
        registry,
        parser,
    };
    match provider.candidates_for(&mut request) {
        Ok(candidates) => filter_prefix(candidates, partial),
        Err(e) => {
            log::warn!("Completion of '{}' failed: {:#}", partial, e);
            Vec::new()
        }
    }
}

/// Completes the argument under the cursor at the end of `buffer`.
///
/// Eligibility is judged on the line before the token being typed, so a value is still offered
/// for an argument whose name the user has already entered.
pub fn complete_arguments(
    table: &ArgTable,
    ctx: &CommandContext,
    registry: &CommandRegistry,
    parser: &mut AddressParser,
    buffer: &str,
) -> Completion {
    let (line, target) = match locate(buffer) {
        Ok(located) => located,
        Err(e) => {
            log::warn!("Cannot complete '{}': {}", buffer, e);
            return Completion::empty(buffer.len());
        }
    };
    log::debug!("Completing {:?}", target);

    match target {
        CompletionTarget::Value {
            flag,
            partial,
            offset,
        } => {
            let candidates = table
                .by_flag(&flag)
                .map(|id| provider_candidates(table, id, ctx, registry, parser, &line, &partial))
                .unwrap_or_default();
            Completion::new(offset, candidates)
        }
        CompletionTarget::ArgName { partial, offset } => {
            Completion::new(offset, filter_prefix(table.eligible_names(&line), &partial))
        }
        CompletionTarget::Positional {
            index,
            partial,
            offset,
        } => {
            let candidates = table
                .positional_at(index)
                .map(|id| provider_candidates(table, id, ctx, registry, parser, &line, &partial))
                .unwrap_or_default();
            Completion::new(offset, candidates)
        }
        CompletionTarget::NewToken { offset } => {
            let mut candidates = table
                .positional_at(line.positional_count())
                .map(|id| provider_candidates(table, id, ctx, registry, parser, &line, ""))
                .unwrap_or_default();
            candidates.extend(table.eligible_names(&line));
            Completion::new(offset, candidates)
        }
    }
}
