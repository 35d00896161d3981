// src/models.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// --- RESOURCE ADDRESSES ---

/// One `(type, name?)` segment of a resource address.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressNode {
    pub node_type: String,
    /// `None` when the segment names a type rather than an instance.
    pub name: Option<String>,
}

impl AddressNode {
    pub fn new(node_type: impl Into<String>, name: Option<String>) -> Self {
        Self {
            node_type: node_type.into(),
            name,
        }
    }
}

/// An ordered path of `(type, name?)` segments identifying a node, or a type of node,
/// in the management model. Only the last segment may omit its name.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    nodes: Vec<AddressNode>,
}

impl ResourceAddress {
    /// The root of the model tree.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<AddressNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[AddressNode] {
        &self.nodes
    }

    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when the address designates a kind of node rather than a specific node.
    pub fn ends_on_type(&self) -> bool {
        self.nodes.last().is_some_and(|node| node.name.is_none())
    }

    /// The address with its last segment dropped. The root is its own parent.
    pub fn parent_node(&self) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.pop();
        Self { nodes }
    }

    /// The type of the last segment.
    pub fn last_type(&self) -> Option<&str> {
        self.nodes.last().map(|node| node.node_type.as_str())
    }

    /// Returns a copy with `(node_type, name)` appended.
    pub fn child(&self, node_type: &str, name: &str) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.push(AddressNode::new(node_type, Some(name.to_string())));
        Self { nodes }
    }

    /// Renders the address in the wire form: `[{"type": "name"}, ...]`.
    ///
    /// A trailing type-only segment has no wire form and is skipped; callers address
    /// a type with [`ResourceAddress::child`] and the wildcard name instead.
    pub fn to_model_address(&self) -> Value {
        let nodes = self
            .nodes
            .iter()
            .filter_map(|node| {
                node.name.as_ref().map(|name| {
                    let mut entry = Map::new();
                    entry.insert(node.node_type.clone(), Value::String(name.clone()));
                    Value::Object(entry)
                })
            })
            .collect();
        Value::Array(nodes)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return f.write_str("/");
        }
        for node in &self.nodes {
            match &node.name {
                Some(name) => write!(f, "/{}={}", node.node_type, name)?,
                None => write!(f, "/{}", node.node_type)?,
            }
        }
        Ok(())
    }
}

// --- ATTRIBUTE METADATA ---

/// How an attribute may be accessed, as reported by `read-resource-description`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessType {
    ReadOnly,
    ReadWrite,
    Metric,
    /// Any access type this shell does not know about.
    Other(String),
}

impl AccessType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "read-only" => Self::ReadOnly,
            "read-write" => Self::ReadWrite,
            "metric" => Self::Metric,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Name and access type of one attribute of a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescription {
    pub name: String,
    /// `None` when the description carries no `access-type` field.
    pub access_type: Option<AccessType>,
}

impl AttributeDescription {
    /// Only read-only attributes can identify instances of a generic-type command.
    pub fn is_read_only(&self) -> bool {
        self.access_type == Some(AccessType::ReadOnly)
    }
}

// --- CONFIGURATION MODELS (What is read from `config.toml`) ---

/// The deserialized structure of the shell's `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellConfig {
    /// Path of the JSON model document served by the local controller.
    pub model: Option<String>,
    /// Output width used when printing columns.
    pub columns: Option<usize>,
}
