//! Browser control over the Chrome `DevTools` Protocol.
//!
//! `BrowserConfig` is always available so configuration files can carry it.
//! The chromiumoxide-backed [`ChromiumDriver`] is compiled with the `browser`
//! feature; it owns a private tokio runtime and blocks on every CDP call, so
//! callers see the synchronous [`CanvasDriver`](crate::driver::CanvasDriver)
//! interface.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 1024,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Script answering whether the element with the given id is displayed
fn visibility_script(element_id: &str) -> String {
    // serde_json quoting keeps arbitrary ids valid JS string literals
    let quoted = serde_json::Value::from(element_id).to_string();
    format!(
        "(() => {{ \
            const el = document.getElementById({quoted}); \
            if (!el) {{ return false; }} \
            const style = window.getComputedStyle(el); \
            return style.display !== 'none' \
                && style.visibility !== 'hidden' \
                && el.getClientRects().length > 0; \
        }})()"
    )
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::cast_possible_truncation)]
mod cdp {
    use super::{visibility_script, BrowserConfig};
    use crate::driver::{CanvasDriver, ElementRect};
    use crate::geometry::Point;
    use crate::result::{ProbeError, ProbeResult};
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::element::Element;
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::layout::Point as CdpPoint;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::runtime::Runtime;

    /// Blocking [`CanvasDriver`] backed by a chromium instance
    pub struct ChromiumDriver {
        config: BrowserConfig,
        runtime: Runtime,
        browser: CdpBrowser,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
    }

    impl std::fmt::Debug for ChromiumDriver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ChromiumDriver")
                .field("config", &self.config)
                .finish_non_exhaustive()
        }
    }

    impl ChromiumDriver {
        /// Launch chromium and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if the runtime or the browser cannot be started
        pub fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let launch_err = |message: String| ProbeError::BrowserLaunch { message };

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .map_err(|e| launch_err(e.to_string()))?;

            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .viewport(Viewport {
                    width: config.viewport_width,
                    height: config.viewport_height,
                    ..Viewport::default()
                });
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder.build().map_err(launch_err)?;

            let (browser, mut handler) = runtime
                .block_on(CdpBrowser::launch(cdp_config))
                .map_err(|e| launch_err(e.to_string()))?;

            let handle = runtime.spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = runtime
                .block_on(browser.new_page("about:blank"))
                .map_err(|e| launch_err(e.to_string()))?;

            tracing::info!(
                headless = config.headless,
                viewport = %format!("{}x{}", config.viewport_width, config.viewport_height),
                "browser launched"
            );

            Ok(Self {
                config,
                runtime,
                browser,
                page,
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        ///
        /// # Errors
        ///
        /// Returns error if chromium does not shut down cleanly
        pub fn close(mut self) -> ProbeResult<()> {
            let result = self.runtime.block_on(self.browser.close());
            self.handle.abort();
            result.map(|_| ()).map_err(|e| ProbeError::driver(e.to_string()))
        }

        fn find(&self, element_id: &str) -> ProbeResult<Element> {
            self.runtime
                .block_on(self.page.find_element(format!("#{element_id}")))
                .map_err(|e| ProbeError::driver(format!("#{element_id}: {e}")))
        }
    }

    impl CanvasDriver for ChromiumDriver {
        fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            let nav_err = |e: chromiumoxide::error::CdpError| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            };
            self.runtime.block_on(async {
                self.page.goto(url).await.map_err(nav_err)?;
                self.page.wait_for_navigation().await.map_err(nav_err)?;
                Ok::<(), ProbeError>(())
            })
        }

        fn element_rect(&self, element_id: &str) -> ProbeResult<ElementRect> {
            let element = self.find(element_id)?;
            let bounds = self
                .runtime
                .block_on(element.bounding_box())
                .map_err(|e| ProbeError::driver(format!("#{element_id} bounding box: {e}")))?;
            Ok(ElementRect::new(bounds.x, bounds.y, bounds.width, bounds.height))
        }

        fn is_element_visible(&self, element_id: &str) -> ProbeResult<bool> {
            let result = self
                .runtime
                .block_on(self.page.evaluate(visibility_script(element_id)))
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            result
                .into_value::<bool>()
                .map_err(|e| ProbeError::driver(e.to_string()))
        }

        fn screenshot_element(&self, element_id: &str) -> ProbeResult<Vec<u8>> {
            let element = self.find(element_id)?;
            self.runtime
                .block_on(element.screenshot(CaptureScreenshotFormat::Png))
                .map_err(|e| ProbeError::Screenshot {
                    message: e.to_string(),
                })
        }

        fn click_at_offset(&mut self, element_id: &str, offset: Point) -> ProbeResult<()> {
            let (x, y) = self.element_rect(element_id)?.offset_to_viewport(offset);
            let target = CdpPoint::new(x, y);
            let input_err = |e: chromiumoxide::error::CdpError| ProbeError::Input {
                message: e.to_string(),
            };
            self.runtime.block_on(async {
                self.page.move_mouse(target).await.map_err(input_err)?;
                self.page.click(target).await.map_err(input_err)?;
                Ok::<(), ProbeError>(())
            })
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
