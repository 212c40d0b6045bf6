//! Page controls exposed as tools
//!
//! Each tool takes typed JSON parameters (with a generated JSON schema) and returns a
//! [`ToolResult`]. The default registry carries the search-page controls:
//! `navigate`, `extract_products` (GET), `prev_page` (BACK), `next_page` (NEXT) and
//! `pager_state`.

pub mod extract;
pub mod navigate;
pub mod pager;
pub mod utils;

pub use extract::{ExtractProductsParams, ExtractProductsTool};
pub use navigate::{NavigateParams, NavigateTool};
pub use pager::{NextPageTool, PagerParams, PagerStateTool, PrevPageTool};

use crate::browser::BrowserSession;
use crate::error::{Result, TrackerError};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Execution context handed to every tool
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }
}

/// Outcome of a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// A browser operation with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of `Params`
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;
}

/// Object-safe view of [`Tool`] used by the registry
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> serde_json::Value;
    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> serde_json::Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params = serde_json::from_value(params).map_err(|e| TrackerError::InvalidArgument(format!("{}: {}", Tool::name(self), e)))?;
        self.execute_typed(params, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the search-page controls
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool::default());
        registry.register(ExtractProductsTool);
        registry.register(PrevPageTool);
        registry.register(NextPageTool);
        registry.register(PagerStateTool);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn execute(&self, name: &str, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| TrackerError::ToolNotFound(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = ToolRegistry::with_defaults();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["navigate", "extract_products", "prev_page", "next_page", "pager_state"]);
    }

    #[test]
    fn test_schemas_are_objects() {
        let registry = ToolRegistry::with_defaults();
        for name in registry.names() {
            let schema = registry.get(name).unwrap().parameters_schema();
            assert!(schema.is_object(), "schema of {} is not an object", name);
        }
    }

    #[test]
    fn test_tool_result_serialization() {
        let json = serde_json::to_value(ToolResult::failure("disabled")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "disabled"}));

        let json = serde_json::to_value(ToolResult::success()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }
}
