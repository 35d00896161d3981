// src/system/controller.rs

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Communication with the management controller failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("The management controller is not available: {0}")]
    Unavailable(String),
    #[error("Request is malformed: {0}")]
    MalformedRequest(String),
}

/// Synchronous call-and-wait access to a management model.
///
/// Requests and responses follow the JSON envelope in [`crate::constants`]: a request names an
/// `operation` and an `address`; a response carries an `outcome` plus either a `result` or a
/// `failure-description`. A failed outcome is a normal response, not a `ClientError`.
pub trait ModelControllerClient: Send + Sync {
    fn execute(&self, request: &Value) -> Result<Value, ClientError>;
}
