// src/core/address.rs

//! Resource-path parsing and formatting.
//!
//! A path is a `/`-separated list of `type=name` segments. Absolute paths start at the model
//! root, relative paths at the session's current node. The last segment may name only a type
//! (`type` or `type=`), in which case the address designates a kind of node.

use crate::models::{AddressNode, ResourceAddress};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref NODE_TYPE_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_.*-]+$").expect("node type pattern is valid");
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("Segment '{0}' is missing a node type before '='.")]
    EmptyType(String),
    #[error("'{0}' is not a valid node type.")]
    InvalidType(String),
    #[error("Node type '{0}' must be followed by '=<name>' unless it is the last segment.")]
    IncompleteNode(String),
    #[error("Cannot go further up the model tree. Already at the root.")]
    AboveRoot,
}

/// Reusable path parser. It accumulates the segments of one path at a time; callers
/// reset it before each use and must not share one instance between sessions.
#[derive(Debug, Default)]
pub struct AddressParser {
    nodes: Vec<AddressNode>,
}

impl AddressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any segments accumulated by a previous parse.
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    pub fn is_reset(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parses `input`, resolving relative paths against `base`.
    ///
    /// # Errors
    /// Returns an `AddressParseError` describing the first offending segment.
    pub fn parse(
        &mut self,
        input: &str,
        base: &ResourceAddress,
    ) -> Result<ResourceAddress, AddressParseError> {
        self.reset();
        let input = input.trim();
        if !input.starts_with('/') {
            self.nodes.extend(base.nodes().iter().cloned());
        }

        for segment in input.split('/').filter(|s| !s.is_empty()) {
            if let Some(open) = self.nodes.last().filter(|node| node.name.is_none()) {
                return Err(AddressParseError::IncompleteNode(open.node_type.clone()));
            }
            match segment {
                "." => {}
                ".." => {
                    if self.nodes.pop().is_none() {
                        return Err(AddressParseError::AboveRoot);
                    }
                }
                _ => self.push_segment(segment)?,
            }
        }

        Ok(ResourceAddress::from_nodes(self.nodes.clone()))
    }

    fn push_segment(&mut self, segment: &str) -> Result<(), AddressParseError> {
        let (node_type, name) = match segment.split_once('=') {
            Some((node_type, name)) => (node_type, Some(name)),
            None => (segment, None),
        };
        if node_type.is_empty() {
            return Err(AddressParseError::EmptyType(segment.to_string()));
        }
        if !NODE_TYPE_RE.is_match(node_type) {
            return Err(AddressParseError::InvalidType(node_type.to_string()));
        }
        let name = name.filter(|n| !n.is_empty()).map(str::to_string);
        self.nodes.push(AddressNode::new(node_type, name));
        Ok(())
    }
}

/// Parses a path with a throwaway parser.
pub fn parse_address(
    input: &str,
    base: &ResourceAddress,
) -> Result<ResourceAddress, AddressParseError> {
    AddressParser::new().parse(input, base)
}

/// Renders addresses for messages and prompts.
pub trait NodePathFormatter: Send + Sync {
    fn format(&self, address: &ResourceAddress) -> String;
}

/// `/type=name/type=name`, with `/` for the root.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNodePathFormatter;

impl NodePathFormatter for DefaultNodePathFormatter {
    fn format(&self, address: &ResourceAddress) -> String {
        address.to_string()
    }
}
