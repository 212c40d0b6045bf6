use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            error::{Result, TrackerError},
            tools::{ToolContext, ToolRegistry}};
use headless_chrome::{Browser, Tab};
use serde::de::DeserializeOwned;
use std::{ffi::OsStr, sync::Arc, time::{Duration, Instant}};

/// How often `wait_for_selector` re-checks the page
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tool registry for the BACK / GET / NEXT controls
    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Shopee serves a captcha wall to obviously automated browsers
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Paging through results by hand can leave the browser idle for a long time
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| TrackerError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| TrackerError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::debug!("Browser launched (headless: {})", options.headless);

        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| TrackerError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| TrackerError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for probe in ["document.visibilityState === 'visible' && document.hasFocus()", "document.visibilityState === 'visible'"] {
            for tab in &tabs {
                match tab.evaluate(probe, false) {
                    Ok(remote_object) => {
                        if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                            return Ok(tab.clone());
                        }
                    }
                    Err(e) => {
                        log::debug!("Failed to check tab status: {}", e);
                    }
                }
            }
        }

        // Headless tabs never report focus; fall back to the first one
        tabs.first().cloned().ok_or_else(|| TrackerError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| TrackerError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| TrackerError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// URL of the active tab
    pub fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    /// Evaluate a script that returns a JSON string and deserialize the result
    pub fn evaluate_json<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let result = self.tab()?.evaluate(script, false).map_err(|e| TrackerError::EvaluationFailed(e.to_string()))?;

        let value = result
            .value
            .ok_or_else(|| TrackerError::EvaluationFailed("No value returned from script".to_string()))?;

        // The scripts return JSON.stringify output so that nested objects survive the CDP boundary
        match value.as_str() {
            Some(json_str) => Ok(serde_json::from_str(json_str)?),
            None => Ok(serde_json::from_value(value)?),
        }
    }

    /// Count the elements matching a CSS selector in the active tab
    pub fn count_elements(&self, css_selector: &str) -> Result<usize> {
        let script = format!("document.querySelectorAll({}).length", serde_json::to_string(css_selector)?);
        let result = self.tab()?.evaluate(&script, false).map_err(|e| TrackerError::EvaluationFailed(e.to_string()))?;

        Ok(result.value.and_then(|v| v.as_u64()).unwrap_or(0) as usize)
    }

    /// Poll until at least one element matches `css_selector`.
    ///
    /// Returns `false` when the timeout elapses first; callers decide whether an empty
    /// page is an error.
    pub fn wait_for_selector(&self, css_selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.count_elements(css_selector)? > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                log::debug!("Timed out waiting for '{}'", css_selector);
                return Ok(false);
            }
            std::thread::sleep(SELECTOR_POLL_INTERVAL);
        }
    }

    /// Scroll down one viewport at a time so lazily rendered cards get materialized,
    /// then return to the top of the page
    pub fn scroll_to_render(&self, steps: usize, pause: Duration) -> Result<()> {
        let tab = self.tab()?;

        for _ in 0..steps {
            tab.evaluate("window.scrollBy(0, window.innerHeight)", false)
                .map_err(|e| TrackerError::EvaluationFailed(format!("Failed to scroll: {}", e)))?;
            std::thread::sleep(pause);
        }

        tab.evaluate("window.scrollTo(0, 0)", false)
            .map_err(|e| TrackerError::EvaluationFailed(format!("Failed to scroll: {}", e)))?;

        Ok(())
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<crate::tools::ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        // headless_chrome shuts the process down when Browser is dropped; closing tabs
        // releases the page state earlier
        let tabs = self.get_tabs()?;
        for tab in tabs {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab {}: {}", tab.get_target_id(), e);
            }
        }
        Ok(())
    }
}
