use crate::{browser::{chrome::ChromePage,
                      config::{ConnectionOptions, LaunchOptions}},
            error::{CuehandError, Result}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc};

/// Browser session that owns a Chrome/Chromium instance and hands out pages
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Hide the automation banner and navigator.webdriver flag
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        launch_opts.idle_browser_timeout = options.idle_timeout;
        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| CuehandError::LaunchFailed(e.to_string()))?;

        // headless_chrome starts without a page target, the engine needs one
        browser.new_tab().map_err(|e| CuehandError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::info!("Browser launched ({})", if options.headless { "headless" } else { "headed" });
        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect(options.ws_url.clone()).map_err(|e| CuehandError::ConnectionFailed(e.to_string()))?;

        log::info!("Connected to browser at {}", options.ws_url);
        Ok(Self { browser })
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| CuehandError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab, falling back to the first one
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        tabs.into_iter()
            .next()
            .ok_or_else(|| CuehandError::TabOperationFailed("No tab available".to_string()))
    }

    /// The page the engine should drive
    pub fn page(&self) -> Result<ChromePage> {
        Ok(ChromePage::new(self.get_active_tab()?))
    }

    /// Open a new tab and return it as a page
    pub fn new_page(&self) -> Result<ChromePage> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| CuehandError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;
        Ok(ChromePage::new(tab))
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab: {}", e);
            }
        }
        log::info!("Browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests (require Chrome to be installed)
    #[test]
    #[ignore] // Ignore by default, run with: cargo test -- --ignored
    fn test_launch_browser() {
        let result = BrowserSession::launch(LaunchOptions::new().headless(true));
        assert!(result.is_ok());
    }

    #[test]
    #[ignore]
    fn test_get_active_tab() {
        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        let tab = session.get_active_tab();
        assert!(tab.is_ok());
    }

    #[test]
    #[ignore]
    fn test_new_page() {
        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        assert!(session.new_page().is_ok());
        let tabs = session.get_tabs().expect("Failed to get tabs");
        assert!(tabs.len() >= 2);
    }
}
