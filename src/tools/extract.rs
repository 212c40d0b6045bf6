use crate::error::{Result, TrackerError};
use crate::listing::{extract_products, scrape_current_page};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractProductsParams {
    /// Wait for the result grid and scroll it into view first (default: true)
    #[serde(default = "default_render")]
    pub render: bool,
}

fn default_render() -> bool {
    true
}

/// GET: read every product card on the current results page
#[derive(Default)]
pub struct ExtractProductsTool;

impl Tool for ExtractProductsTool {
    type Params = ExtractProductsParams;

    fn name(&self) -> &str {
        "extract_products"
    }

    fn execute_typed(&self, params: ExtractProductsParams, context: &mut ToolContext) -> Result<ToolResult> {
        let report = if params.render { scrape_current_page(context.session) } else { extract_products(context.session) }
            .map_err(|e| TrackerError::ToolExecutionFailed { tool: "extract_products".to_string(), reason: e.to_string() })?;

        if report.products.is_empty() {
            return Ok(ToolResult::failure("No products found on this page"));
        }

        Ok(ToolResult::success_with(serde_json::json!({
            "page": report.page_number,
            "count": report.products.len(),
            "skipped": report.skipped,
            "products": report.products,
        })))
    }
}
