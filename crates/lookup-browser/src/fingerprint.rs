use rand::seq::SliceRandom;

/// Common desktop viewports a launched browser picks from
const VIEWPORTS: [(u32, u32); 4] = [(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

/// Window and locale settings for one launched browser
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub accept_language: String,
}

impl FingerprintConfig {
    /// Pick a common desktop viewport at random
    pub fn randomized() -> Self {
        let (width, height) = VIEWPORTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(VIEWPORTS[0]);

        Self {
            viewport_width: width,
            viewport_height: height,
            accept_language: "en-US,en".to_string(),
        }
    }

    /// Pin the viewport to a fixed size
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Chromium command-line switches for these settings
    pub fn launch_args(&self) -> Vec<String> {
        vec![format!("--lang={}", self.accept_language)]
    }
}
