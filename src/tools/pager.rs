use crate::error::Result;
use crate::listing::{go_next, go_prev, read_pager};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The pager tools take no parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PagerParams {}

/// BACK
#[derive(Default)]
pub struct PrevPageTool;

/// NEXT
#[derive(Default)]
pub struct NextPageTool;

/// Report which pager arrows can be followed
#[derive(Default)]
pub struct PagerStateTool;

fn pager_result(context: &ToolContext, moved: bool, direction: &str) -> Result<ToolResult> {
    if !moved {
        return Ok(ToolResult::failure(format!("{} is disabled on this page", direction)));
    }

    Ok(ToolResult::success_with(serde_json::json!({
        "url": context.session.current_url()?,
    })))
}

impl Tool for PrevPageTool {
    type Params = PagerParams;

    fn name(&self) -> &str {
        "prev_page"
    }

    fn execute_typed(&self, _params: PagerParams, context: &mut ToolContext) -> Result<ToolResult> {
        let went = go_prev(context.session)?;
        pager_result(context, went, "BACK")
    }
}

impl Tool for NextPageTool {
    type Params = PagerParams;

    fn name(&self) -> &str {
        "next_page"
    }

    fn execute_typed(&self, _params: PagerParams, context: &mut ToolContext) -> Result<ToolResult> {
        let went = go_next(context.session)?;
        pager_result(context, went, "NEXT")
    }
}

impl Tool for PagerStateTool {
    type Params = PagerParams;

    fn name(&self) -> &str {
        "pager_state"
    }

    fn execute_typed(&self, _params: PagerParams, context: &mut ToolContext) -> Result<ToolResult> {
        let state = read_pager(context.session)?;

        Ok(ToolResult::success_with(serde_json::json!({
            "url": state.url,
            "back_enabled": !state.prev_disabled(),
            "next_enabled": !state.next_disabled(),
            "back_url": state.prev_url(),
            "next_url": state.next_url(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_tool_names() {
        assert_eq!(PrevPageTool.name(), "prev_page");
        assert_eq!(NextPageTool.name(), "next_page");
        assert_eq!(PagerStateTool.name(), "pager_state");
    }

    #[test]
    fn test_pager_params_accept_empty_object() {
        let params: std::result::Result<PagerParams, _> = serde_json::from_value(serde_json::json!({}));
        assert!(params.is_ok());
    }
}
