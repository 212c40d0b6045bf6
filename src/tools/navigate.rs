use crate::error::Result;
use crate::tools::utils::{DEFAULT_STOREFRONT, normalize_target};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL, domain or search keyword
    pub url: String,

    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_wait")]
    pub wait_for_load: bool,
}

fn default_wait() -> bool {
    true
}

/// Tool for opening a results page
pub struct NavigateTool {
    /// Storefront that bare keywords are searched on
    storefront: String,
}

impl NavigateTool {
    pub fn new(storefront: impl Into<String>) -> Self {
        Self { storefront: storefront.into() }
    }
}

impl Default for NavigateTool {
    fn default() -> Self {
        Self::new(DEFAULT_STOREFRONT)
    }
}

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let target = normalize_target(&params.url, &self.storefront);

        context.session.navigate(&target)?;

        if params.wait_for_load {
            context.session.wait_for_navigation()?;
        }

        Ok(ToolResult::success_with(serde_json::json!({
            "original_url": params.url,
            "normalized_url": target,
            "waited": params.wait_for_load
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_params_default() {
        let json = serde_json::json!({
            "url": "https://shopee.sg/search?keyword=bag"
        });

        let params: NavigateParams = serde_json::from_value(json).unwrap();
        assert_eq!(params.url, "https://shopee.sg/search?keyword=bag");
        assert!(params.wait_for_load);
    }

    #[test]
    fn test_navigate_params_explicit_wait() {
        let json = serde_json::json!({
            "url": "tote bag",
            "wait_for_load": false
        });

        let params: NavigateParams = serde_json::from_value(json).unwrap();
        assert!(!params.wait_for_load);
    }

    #[test]
    fn test_navigate_tool_metadata() {
        let tool = NavigateTool::new("https://shopee.com.my");
        assert_eq!(tool.name(), "navigate");
        assert_eq!(tool.storefront, "https://shopee.com.my");
        assert!(tool.parameters_schema().is_object());
    }
}
