use crate::actions::{AutomationDriver, DriverLauncher};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::Page;
use futures::stream::StreamExt;
use lookup_core::BrowserConfig;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Launches headless Chromium instances
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
    window_width: u32,
    window_height: u32,
    chrome_executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    /// Create a launcher from browser settings
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            headless: config.headless,
            window_width: config.window_width,
            window_height: config.window_height,
            chrome_executable: config.chrome_executable.clone(),
        }
    }

    fn chrome_config(&self, fingerprint: &FingerprintConfig) -> Result<ChromeConfig> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height);

        if !self.headless {
            builder = builder.with_head();
        }

        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        for arg in fingerprint.launch_args() {
            builder = builder.arg(arg);
        }

        builder.build().map_err(BrowserError::LaunchFailed)
    }
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::new(&BrowserConfig::default())
    }
}

#[async_trait::async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn AutomationDriver>> {
        let fingerprint =
            FingerprintConfig::randomized().with_viewport(self.window_width, self.window_height);
        let config = self.chrome_config(&fingerprint)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                trace!(?event, "chromium handler event");
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut driver = ChromiumDriver {
                    browser,
                    page: None,
                    handler: Some(handler),
                };
                if let Err(close_err) = driver.terminate().await {
                    warn!(
                        error = %close_err,
                        "failed to terminate browser after page creation failed"
                    );
                }
                return Err(BrowserError::ChromiumError(e.to_string()));
            }
        };

        debug!(
            headless = self.headless,
            width = fingerprint.viewport_width,
            height = fingerprint.viewport_height,
            "browser launched"
        );

        Ok(Box::new(ChromiumDriver {
            browser,
            page: Some(page),
            handler: Some(handler),
        }))
    }
}

/// One running Chromium process with a single page
pub struct ChromiumDriver {
    browser: Browser,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl ChromiumDriver {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::ChromiumError("browser already terminated".to_string()))
    }
}

#[async_trait::async_trait]
impl AutomationDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        let page = self.page()?;
        page.goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?
            .type_str(value)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(!elements.is_empty())
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn content(&self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn terminate(&mut self) -> Result<()> {
        let Some(handler) = self.handler.take() else {
            return Ok(());
        };
        self.page = None;

        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if let Err(e) = &closed {
            warn!(error = %e, "graceful browser close failed, killing process");
            let _ = self.browser.kill().await;
        }
        let _ = self.browser.wait().await;
        handler.abort();

        debug!("browser terminated");
        closed.map(|_| ())
    }
}
