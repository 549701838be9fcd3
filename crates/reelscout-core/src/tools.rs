//! The `Tool` contract dispatched by the router (spec §4.6).

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Argument payload handed to a tool. Router tools always receive
/// `Structured`; `String` exists for parity with single-string tool
/// conventions elsewhere in the ecosystem and for ad-hoc testing.
#[derive(Debug, Clone)]
pub enum ToolInput {
    /// A single free-text argument.
    String(String),
    /// A structured JSON object of named parameters.
    Structured(Value),
}

impl ToolInput {
    /// Read a required string field out of a `Structured` input.
    pub fn field_str<'a>(&'a self, name: &str) -> Result<&'a str> {
        match self {
            ToolInput::Structured(v) => v.get(name).and_then(Value::as_str).ok_or_else(|| {
                crate::error::Error::tool_error(format!("Missing '{name}' field in arguments"))
            }),
            ToolInput::String(_) => Err(crate::error::Error::tool_error(format!(
                "Expected structured arguments with field '{name}'"
            ))),
        }
    }

    /// Read a required string array field out of a `Structured` input.
    pub fn field_str_array(&self, name: &str) -> Result<Vec<String>> {
        match self {
            ToolInput::Structured(v) => v
                .get(name)
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .ok_or_else(|| {
                    crate::error::Error::tool_error(format!("Missing '{name}' array in arguments"))
                }),
            ToolInput::String(_) => Err(crate::error::Error::tool_error(format!(
                "Expected structured arguments with field '{name}'"
            ))),
        }
    }
}

/// A named tool the LLM can invoke. Argument schemas are strict JSON Schema
/// with `additionalProperties: false` (spec §4.6); results are always
/// intelligence packets, never raw provider payloads.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, as it appears in the LLM's tool-call contract.
    fn name(&self) -> &'static str;

    /// One-line description shown to the LLM.
    fn description(&self) -> &'static str;

    /// Strict JSON Schema for this tool's arguments.
    fn args_schema(&self) -> Value;

    /// Execute the tool, returning a JSON string result (an intelligence
    /// packet or a machine-readable error packet — tools never throw for
    /// recoverable provider errors; see spec §4.6/§7).
    async fn call(&self, input: ToolInput) -> Result<String>;
}
