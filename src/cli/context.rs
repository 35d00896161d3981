// src/cli/context.rs

use crate::{
    core::{
        address::{DefaultNodePathFormatter, NodePathFormatter},
        arg_parser::ParsedLine,
        introspector::ResourcePathIntrospector,
    },
    models::ResourceAddress,
    system::{console::OutputSink, controller::ModelControllerClient},
};
use std::{fmt, sync::Arc};

/// Everything a handler may touch while it runs: the line being handled, the controller,
/// the session's current node, the path formatter and the output sink.
pub struct CommandContext {
    client: Arc<dyn ModelControllerClient>,
    formatter: Box<dyn NodePathFormatter>,
    output: Box<dyn OutputSink>,
    current_node: ResourceAddress,
    parsed_line: ParsedLine,
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("current_node", &self.current_node)
            .field("parsed_line", &self.parsed_line)
            .finish_non_exhaustive()
    }
}

impl CommandContext {
    pub fn new(client: Arc<dyn ModelControllerClient>, output: Box<dyn OutputSink>) -> Self {
        Self {
            client,
            formatter: Box::new(DefaultNodePathFormatter),
            output,
            current_node: ResourceAddress::root(),
            parsed_line: ParsedLine::default(),
        }
    }

    pub fn introspector(&self) -> ResourcePathIntrospector<'_> {
        ResourcePathIntrospector::new(self.client.as_ref())
    }

    pub fn format_address(&self, address: &ResourceAddress) -> String {
        self.formatter.format(address)
    }

    pub fn current_node(&self) -> &ResourceAddress {
        &self.current_node
    }

    pub fn set_current_node(&mut self, address: ResourceAddress) {
        self.current_node = address;
    }

    /// The line currently being handled. Empty before the first dispatch.
    pub fn parsed_line(&self) -> &ParsedLine {
        &self.parsed_line
    }

    pub fn set_parsed_line(&mut self, line: ParsedLine) {
        self.parsed_line = line;
    }

    pub fn print_line(&mut self, line: &str) {
        self.output.print_line(line);
    }

    pub fn print_columns(&mut self, items: &[String]) {
        self.output.print_columns(items);
    }
}
