// src/system/local_model.rs

//! An in-process management model served from a JSON document.
//!
//! The document is a tree of resources. Each resource holds its attribute values and, per child
//! type, a type description plus the named instances of that type:
//!
//! ```json
//! { "attributes": {}, "children": { "subsystem": {
//!     "description": { "attributes": { "name": { "access-type": "read-only" } } },
//!     "instances": { "logging": { "attributes": {}, "children": {} } } } } }
//! ```

use crate::{
    constants::{
        ADDRESS, CHILD_TYPE, FAILURE_DESCRIPTION, OPERATION, OUTCOME, READ_CHILDREN_NAMES,
        READ_CHILDREN_TYPES, READ_RESOURCE, READ_RESOURCE_DESCRIPTION, RESULT, SUCCESS,
        WILDCARD_NAME,
    },
    models::{AddressNode, ResourceAddress},
    system::controller::{ClientError, ModelControllerClient},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{collections::BTreeMap, fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Could not read model file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Model document is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// A node of the model tree.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ModelResource {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub children: BTreeMap<String, ChildType>,
}

/// All instances of one child type, plus the description they share.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ChildType {
    #[serde(default)]
    pub description: TypeDescription,
    #[serde(default)]
    pub instances: BTreeMap<String, ModelResource>,
}

/// Metadata returned by `read-resource-description`. The attribute section is optional
/// so that a type without one can be represented faithfully.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct TypeDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
}

/// Serves management requests from an in-memory model tree.
#[derive(Debug, Clone, Default)]
pub struct LocalModelController {
    root: ModelResource,
}

impl LocalModelController {
    pub fn new(root: ModelResource) -> Self {
        Self { root }
    }

    pub fn from_json_str(document: &str) -> Result<Self, ModelError> {
        Ok(Self::new(serde_json::from_str(document)?))
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    fn resolve(&self, address: &ResourceAddress) -> Result<&ModelResource, String> {
        let mut current = &self.root;
        for node in address.nodes() {
            let next = match &node.name {
                Some(name) => current
                    .children
                    .get(&node.node_type)
                    .and_then(|child| child.instances.get(name)),
                None => None,
            };
            current = next.ok_or_else(|| format!("Resource '{}' does not exist.", address))?;
        }
        Ok(current)
    }

    fn read_children_types(&self, address: &ResourceAddress) -> Result<Value, String> {
        let resource = self.resolve(address)?;
        Ok(json!(resource.children.keys().collect::<Vec<_>>()))
    }

    fn read_children_names(
        &self,
        address: &ResourceAddress,
        request: &Value,
    ) -> Result<Value, String> {
        let child_type = request
            .get(CHILD_TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("Parameter '{}' is required.", CHILD_TYPE))?;
        let resource = self.resolve(address)?;
        let child = resource.children.get(child_type).ok_or_else(|| {
            format!("'{}' is not a child type of '{}'.", child_type, address)
        })?;
        Ok(json!(child.instances.keys().collect::<Vec<_>>()))
    }

    fn read_resource_description(&self, address: &ResourceAddress) -> Result<Value, String> {
        let Some(last) = address.nodes().last() else {
            return Ok(json!({
                "description": "The model root.",
                "attributes": {},
            }));
        };
        let parent = self.resolve(&address.parent_node())?;
        let child = parent
            .children
            .get(&last.node_type)
            .ok_or_else(|| format!("Resource '{}' does not exist.", address))?;
        let name = last.name.as_deref().unwrap_or(WILDCARD_NAME);
        if name != WILDCARD_NAME && !child.instances.contains_key(name) {
            return Err(format!("Resource '{}' does not exist.", address));
        }
        serde_json::to_value(&child.description).map_err(|e| e.to_string())
    }

    fn read_resource(&self, address: &ResourceAddress) -> Result<Value, String> {
        let resource = self.resolve(address)?;
        Ok(Value::Object(resource.attributes.clone()))
    }
}

impl ModelControllerClient for LocalModelController {
    fn execute(&self, request: &Value) -> Result<Value, ClientError> {
        let operation = request
            .get(OPERATION)
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::MalformedRequest("operation name is missing".to_string()))?;
        let address = parse_wire_address(request.get(ADDRESS))?;
        log::debug!("Local model executing '{}' at {}", operation, address);

        let outcome = match operation {
            READ_CHILDREN_TYPES => self.read_children_types(&address),
            READ_CHILDREN_NAMES => self.read_children_names(&address, request),
            READ_RESOURCE_DESCRIPTION => self.read_resource_description(&address),
            READ_RESOURCE => self.read_resource(&address),
            other => Err(format!("Operation '{}' is not supported.", other)),
        };

        Ok(match outcome {
            Ok(result) => json!({ OUTCOME: SUCCESS, RESULT: result }),
            Err(message) => json!({ OUTCOME: "failed", FAILURE_DESCRIPTION: message }),
        })
    }
}

/// Reads `[{"type": "name"}, ...]`. A missing address means the root.
fn parse_wire_address(raw: Option<&Value>) -> Result<ResourceAddress, ClientError> {
    let Some(raw) = raw else {
        return Ok(ResourceAddress::root());
    };
    let malformed = || ClientError::MalformedRequest(format!("invalid address {}", raw));
    let entries = raw.as_array().ok_or_else(malformed)?;
    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        let object = entry.as_object().filter(|o| o.len() == 1).ok_or_else(malformed)?;
        for (node_type, name) in object {
            let name = name.as_str().ok_or_else(malformed)?;
            nodes.push(AddressNode::new(node_type.clone(), Some(name.to_string())));
        }
    }
    Ok(ResourceAddress::from_nodes(nodes))
}

/// Model documents shared by the unit tests of the shell.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::LocalModelController;

    pub(crate) const DATASOURCES_MODEL: &str = r#"{
        "attributes": { "name": "server-one" },
        "children": {
            "subsystem": {
                "description": { "description": "A server subsystem.", "attributes": {} },
                "instances": {
                    "datasources": {
                        "children": {
                            "data-source": {
                                "description": {
                                    "description": "A JDBC data source.",
                                    "attributes": {
                                        "jndi-name": { "type": "STRING", "access-type": "read-write" },
                                        "driver-name": { "type": "STRING", "access-type": "read-write" },
                                        "pool-name": { "type": "STRING", "access-type": "read-only" },
                                        "datasource-class": { "type": "STRING", "access-type": "read-only" },
                                        "in-use-count": { "type": "INT", "access-type": "metric" },
                                        "notes": { "type": "STRING" }
                                    }
                                },
                                "instances": {
                                    "ExampleDS": {
                                        "attributes": {
                                            "jndi-name": "java:jboss/datasources/ExampleDS",
                                            "pool-name": "ExamplePool",
                                            "driver-name": "h2"
                                        }
                                    },
                                    "ReportsDS": {
                                        "attributes": {
                                            "jndi-name": "java:jboss/datasources/ReportsDS",
                                            "pool-name": "ReportsPool",
                                            "driver-name": "postgresql"
                                        }
                                    }
                                }
                            },
                            "xa-data-source": {
                                "description": { "description": "An XA data source." },
                                "instances": {}
                            }
                        }
                    },
                    "logging": {
                        "children": {
                            "console-handler": {
                                "description": { "attributes": { "level": { "access-type": "read-write" } } },
                                "instances": { "CONSOLE": { "attributes": { "level": "INFO" } } }
                            }
                        }
                    }
                }
            }
        }
    }"#;

    pub(crate) fn datasources_model() -> LocalModelController {
        LocalModelController::from_json_str(DATASOURCES_MODEL).expect("fixture model is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::datasources_model;
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn request(operation: &str, address: Value) -> Value {
        json!({ OPERATION: operation, ADDRESS: address })
    }

    #[test]
    fn test_read_children_types() {
        let model = datasources_model();
        let response = model
            .execute(&request(READ_CHILDREN_TYPES, json!([{"subsystem": "datasources"}])))
            .unwrap();
        assert_eq!(response[OUTCOME], SUCCESS);
        assert_eq!(response[RESULT], json!(["data-source", "xa-data-source"]));
    }

    #[test]
    fn test_read_children_names() {
        let model = datasources_model();
        let mut req = request(READ_CHILDREN_NAMES, json!([{"subsystem": "datasources"}]));
        req[CHILD_TYPE] = json!("data-source");
        let response = model.execute(&req).unwrap();
        assert_eq!(response[RESULT], json!(["ExampleDS", "ReportsDS"]));
    }

    #[test]
    fn test_wildcard_description_and_missing_attribute_section() {
        let model = datasources_model();
        let response = model
            .execute(&request(
                READ_RESOURCE_DESCRIPTION,
                json!([{"subsystem": "datasources"}, {"data-source": "?"}]),
            ))
            .unwrap();
        assert_eq!(
            response[RESULT]["attributes"]["pool-name"]["access-type"],
            "read-only"
        );

        let response = model
            .execute(&request(
                READ_RESOURCE_DESCRIPTION,
                json!([{"subsystem": "datasources"}, {"xa-data-source": "?"}]),
            ))
            .unwrap();
        assert_eq!(response[OUTCOME], SUCCESS);
        assert!(response[RESULT].get("attributes").is_none());
    }

    #[test]
    fn test_unknown_resource_is_a_failed_outcome() {
        let model = datasources_model();
        let response = model
            .execute(&request(READ_RESOURCE, json!([{"subsystem": "messaging"}])))
            .unwrap();
        assert_eq!(response[OUTCOME], "failed");
        assert!(
            response[FAILURE_DESCRIPTION]
                .as_str()
                .unwrap()
                .contains("/subsystem=messaging")
        );
    }

    #[test]
    fn test_malformed_request_is_a_client_error() {
        let model = datasources_model();
        assert!(model.execute(&json!({ ADDRESS: [] })).is_err());
        assert!(
            model
                .execute(&request(READ_RESOURCE, json!(["subsystem"])))
                .is_err()
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"children": {"core": {}}}"#).unwrap();
        file.flush().unwrap();

        let model = LocalModelController::from_file(file.path()).unwrap();
        let response = model.execute(&request(READ_CHILDREN_TYPES, json!([]))).unwrap();
        assert_eq!(response[RESULT], json!(["core"]));

        assert!(LocalModelController::from_file(Path::new("missing-model.json")).is_err());
    }
}
