use crate::error::{BrowserError, Result};
use std::time::Duration;

/// Interval between checks while waiting for a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A live browser page that can be driven through a search form.
#[async_trait::async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Type into the first element matching the selector
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Whether any element currently matches the selector
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Extract text from the first element matching the selector
    async fn extract_text(&self, selector: &str) -> Result<String>;

    /// Full HTML of the current page
    async fn content(&self) -> Result<String>;

    /// Shut the browser down. Calling it more than once is harmless.
    async fn terminate(&mut self) -> Result<()>;

    /// Wait until the selector matches something, polling the page.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.exists(selector).await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Starts fresh browser instances.
#[async_trait::async_trait]
pub trait DriverLauncher: Send + Sync {
    /// Launch a new browser with one open page
    async fn launch(&self) -> Result<Box<dyn AutomationDriver>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AppearsAfter {
        checks: AtomicUsize,
        after: usize,
    }

    #[async_trait::async_trait]
    impl AutomationDriver for AppearsAfter {
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn fill_field(&self, _selector: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        async fn click(&self, _selector: &str) -> Result<()> {
            Ok(())
        }
        async fn exists(&self, _selector: &str) -> Result<bool> {
            Ok(self.checks.fetch_add(1, Ordering::SeqCst) + 1 >= self.after)
        }
        async fn extract_text(&self, _selector: &str) -> Result<String> {
            Ok(String::new())
        }
        async fn content(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn terminate(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_selector_polls_until_present() {
        let driver = AppearsAfter {
            checks: AtomicUsize::new(0),
            after: 3,
        };

        driver
            .wait_for_selector(".record", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(driver.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_selector_times_out() {
        let driver = AppearsAfter {
            checks: AtomicUsize::new(0),
            after: usize::MAX,
        };

        let err = driver
            .wait_for_selector("input", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::Timeout { timeout_ms: 2000, .. }));
    }
}
