// src/core/introspector.rs

//! Read-only questions about the management model.
//!
//! Every call here is one synchronous round-trip to the controller. Responses are checked for a
//! successful outcome and the expected result shape before anything is handed back.

use crate::{
    constants::{
        ACCESS_TYPE, ADDRESS, ATTRIBUTES, CHILD_TYPE, FAILURE_DESCRIPTION, OPERATION, OUTCOME,
        READ_CHILDREN_NAMES, READ_CHILDREN_TYPES, READ_RESOURCE, READ_RESOURCE_DESCRIPTION,
        RESULT, SUCCESS,
    },
    models::{AccessType, AttributeDescription, ResourceAddress},
    system::controller::{ClientError, ModelControllerClient},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntrospectionError {
    #[error(transparent)]
    Transport(#[from] ClientError),
    #[error("{0}")]
    Failed(String),
    #[error("operation response doesn't contain result info.")]
    MissingResult,
    #[error("description of attributes is missing for {0}")]
    MissingAttributes(String),
    #[error("unexpected response structure: {0}")]
    Malformed(String),
}

type IntrospectionResult<T> = Result<T, IntrospectionError>;

/// Issues introspection requests against one controller.
#[derive(Clone, Copy)]
pub struct ResourcePathIntrospector<'a> {
    client: &'a dyn ModelControllerClient,
}

impl std::fmt::Debug for ResourcePathIntrospector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePathIntrospector").finish_non_exhaustive()
    }
}

impl<'a> ResourcePathIntrospector<'a> {
    pub fn new(client: &'a dyn ModelControllerClient) -> Self {
        Self { client }
    }

    /// `read-children-types` at `address`.
    pub fn children_types(&self, address: &ResourceAddress) -> IntrospectionResult<Vec<String>> {
        let result = self.execute(READ_CHILDREN_TYPES, address, None)?;
        string_list(&result)
    }

    /// `read-children-names` of `child_type` at `address`.
    pub fn children_names(
        &self,
        address: &ResourceAddress,
        child_type: &str,
    ) -> IntrospectionResult<Vec<String>> {
        let result = self.execute(READ_CHILDREN_NAMES, address, Some(child_type))?;
        string_list(&result)
    }

    /// `read-resource-description` at `address`, reduced to the attribute descriptions.
    ///
    /// # Errors
    /// `IntrospectionError::MissingAttributes` if the description has no attribute section.
    pub fn attributes(
        &self,
        address: &ResourceAddress,
    ) -> IntrospectionResult<Vec<AttributeDescription>> {
        let result = self.execute(READ_RESOURCE_DESCRIPTION, address, None)?;
        let attributes = match result.get(ATTRIBUTES) {
            Some(Value::Object(attributes)) => attributes,
            Some(Value::Null) | None => {
                return Err(IntrospectionError::MissingAttributes(address.to_string()));
            }
            Some(other) => {
                return Err(IntrospectionError::Malformed(format!(
                    "'{}' is not an object: {}",
                    ATTRIBUTES, other
                )));
            }
        };
        Ok(attributes
            .iter()
            .map(|(name, properties)| AttributeDescription {
                name: name.clone(),
                access_type: properties
                    .get(ACCESS_TYPE)
                    .and_then(Value::as_str)
                    .map(AccessType::parse),
            })
            .collect())
    }

    /// `read-resource` at `address`: the attribute values of one resource.
    pub fn resource(&self, address: &ResourceAddress) -> IntrospectionResult<Map<String, Value>> {
        match self.execute(READ_RESOURCE, address, None)? {
            Value::Object(values) => Ok(values),
            other => Err(IntrospectionError::Malformed(format!(
                "resource is not an object: {}",
                other
            ))),
        }
    }

    fn execute(
        &self,
        operation: &str,
        address: &ResourceAddress,
        child_type: Option<&str>,
    ) -> IntrospectionResult<Value> {
        let mut request = json!({
            OPERATION: operation,
            ADDRESS: address.to_model_address(),
        });
        if let Some(child_type) = child_type {
            request[CHILD_TYPE] = Value::String(child_type.to_string());
        }
        log::debug!("Sending request: {}", request);

        let response = self.client.execute(&request)?;
        match response.get(OUTCOME).and_then(Value::as_str) {
            Some(SUCCESS) => {}
            Some(_) => {
                let message = response
                    .get(FAILURE_DESCRIPTION)
                    .map(|d| d.as_str().map_or_else(|| d.to_string(), str::to_string))
                    .unwrap_or_else(|| format!("'{}' failed at {}", operation, address));
                return Err(IntrospectionError::Failed(message));
            }
            None => return Err(IntrospectionError::MissingResult),
        }
        match response.get(RESULT) {
            Some(Value::Null) | None => Err(IntrospectionError::MissingResult),
            Some(result) => Ok(result.clone()),
        }
    }
}

fn string_list(result: &Value) -> IntrospectionResult<Vec<String>> {
    let items = result
        .as_array()
        .ok_or_else(|| IntrospectionError::Malformed(format!("expected a list: {}", result)))?;
    Ok(items
        .iter()
        .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::parse_address;
    use crate::system::local_model::fixtures::datasources_model;
    use std::io;

    struct BrokenClient;

    impl ModelControllerClient for BrokenClient {
        fn execute(&self, _request: &Value) -> Result<Value, ClientError> {
            Err(ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        }
    }

    struct CannedClient(Value);

    impl ModelControllerClient for CannedClient {
        fn execute(&self, _request: &Value) -> Result<Value, ClientError> {
            Ok(self.0.clone())
        }
    }

    fn address(path: &str) -> ResourceAddress {
        parse_address(path, &ResourceAddress::root()).unwrap()
    }

    #[test]
    fn test_children_types_and_names() {
        let model = datasources_model();
        let introspector = ResourcePathIntrospector::new(&model);
        assert_eq!(
            introspector.children_types(&ResourceAddress::root()).unwrap(),
            vec!["subsystem"]
        );
        assert_eq!(
            introspector
                .children_names(&address("/subsystem=datasources"), "data-source")
                .unwrap(),
            vec!["ExampleDS", "ReportsDS"]
        );
    }

    #[test]
    fn test_attributes_of_wildcard_type() {
        let model = datasources_model();
        let introspector = ResourcePathIntrospector::new(&model);
        let attributes = introspector
            .attributes(&address("/subsystem=datasources/data-source=?"))
            .unwrap();
        let read_only: Vec<&str> = attributes
            .iter()
            .filter(|a| a.is_read_only())
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(read_only, vec!["datasource-class", "pool-name"]);

        let notes = attributes.iter().find(|a| a.name == "notes").unwrap();
        assert_eq!(notes.access_type, None);
    }

    #[test]
    fn test_missing_attribute_section() {
        let model = datasources_model();
        let introspector = ResourcePathIntrospector::new(&model);
        let result = introspector.attributes(&address("/subsystem=datasources/xa-data-source=?"));
        assert!(matches!(result, Err(IntrospectionError::MissingAttributes(_))));
    }

    #[test]
    fn test_failed_outcome_carries_description() {
        let model = datasources_model();
        let introspector = ResourcePathIntrospector::new(&model);
        let result = introspector.children_types(&address("/subsystem=messaging"));
        match result {
            Err(IntrospectionError::Failed(message)) => {
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_transport_and_structure_errors() {
        let broken = BrokenClient;
        let result = ResourcePathIntrospector::new(&broken).children_types(&ResourceAddress::root());
        assert!(matches!(result, Err(IntrospectionError::Transport(_))));

        let no_result = CannedClient(json!({ OUTCOME: SUCCESS }));
        let result =
            ResourcePathIntrospector::new(&no_result).children_types(&ResourceAddress::root());
        assert!(matches!(result, Err(IntrospectionError::MissingResult)));

        let not_a_list = CannedClient(json!({ OUTCOME: SUCCESS, RESULT: "subsystem" }));
        let result =
            ResourcePathIntrospector::new(&not_a_list).children_types(&ResourceAddress::root());
        assert!(matches!(result, Err(IntrospectionError::Malformed(_))));
    }
}
