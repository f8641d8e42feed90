//! Scoped ownership of a launched browser.

use crate::actions::{AutomationDriver, DriverLauncher};
use crate::error::Result;
use tracing::{debug, warn};

/// A launched browser that is always terminated.
///
/// Call [`DriverSession::release`] on every normal exit path. If the session
/// is dropped without being released, for example because the owning future
/// was cancelled by a timeout, termination is spawned onto the current Tokio
/// runtime instead.
pub struct DriverSession {
    driver: Option<Box<dyn AutomationDriver>>,
}

impl DriverSession {
    /// Launch a browser and take ownership of it.
    pub async fn open(launcher: &dyn DriverLauncher) -> Result<Self> {
        let driver = launcher.launch().await?;
        Ok(Self {
            driver: Some(driver),
        })
    }

    /// The driver for this session.
    pub fn driver(&self) -> &dyn AutomationDriver {
        self.driver
            .as_deref()
            .expect("driver present until the session is released")
    }

    /// Terminate the browser. Termination failures are logged, not returned.
    pub async fn release(mut self) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(e) = driver.terminate().await {
                warn!(error = %e, "failed to terminate browser");
            }
        }
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("browser session dropped without release, terminating in background");
                handle.spawn(async move {
                    if let Err(e) = driver.terminate().await {
                        warn!(error = %e, "failed to terminate abandoned browser");
                    }
                });
            }
            Err(_) => {
                warn!("browser session dropped outside a runtime, process may be left running");
            }
        }
    }
}
