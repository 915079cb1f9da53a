//! Wait Mechanisms
//!
//! Bounded polling for page readiness. The only wait in the page lifecycle is
//! for the canvas loading indicator to disappear; when it times out the test
//! setup has failed and nothing retries it.

use crate::driver::CanvasDriver;
use crate::result::{ProbeError, ProbeResult};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for the canvas to finish loading (60 seconds)
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 60_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT CONDITION TRAIT
// =============================================================================

/// A condition polled until it holds
pub trait WaitCondition {
    /// Check the condition; errors abort the wait
    fn check(&mut self) -> ProbeResult<bool>;

    /// Description for logs and timeout errors
    fn description(&self) -> String;
}

/// A closure-based wait condition
pub struct FnCondition<F: FnMut() -> ProbeResult<bool>> {
    func: F,
    description: String,
}

impl<F: FnMut() -> ProbeResult<bool>> std::fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut() -> ProbeResult<bool>> FnCondition<F> {
    /// Create a new closure condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: FnMut() -> ProbeResult<bool>> WaitCondition for FnCondition<F> {
    fn check(&mut self) -> ProbeResult<bool> {
        (self.func)()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Holds once an element is no longer displayed (or gone)
pub struct ElementHidden<'a, D: CanvasDriver + ?Sized> {
    driver: &'a D,
    element_id: &'a str,
}

impl<D: CanvasDriver + ?Sized> std::fmt::Debug for ElementHidden<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementHidden")
            .field("element_id", &self.element_id)
            .finish_non_exhaustive()
    }
}

impl<'a, D: CanvasDriver + ?Sized> ElementHidden<'a, D> {
    /// Condition on the element with this id
    pub fn new(driver: &'a D, element_id: &'a str) -> Self {
        Self { driver, element_id }
    }
}

impl<D: CanvasDriver + ?Sized> WaitCondition for ElementHidden<'_, D> {
    fn check(&mut self) -> ProbeResult<bool> {
        Ok(!self.driver.is_element_visible(self.element_id)?)
    }

    fn description(&self) -> String {
        format!("#{} to become invisible", self.element_id)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Poll a condition until it holds or the timeout elapses
///
/// The condition is checked at least once, even with a zero timeout.
pub fn wait_for<C: WaitCondition + ?Sized>(
    condition: &mut C,
    options: &WaitOptions,
) -> ProbeResult<WaitResult> {
    let start = Instant::now();
    let timeout = options.timeout();
    let mut polls = 0;

    loop {
        polls += 1;
        if condition.check()? {
            let result = WaitResult {
                elapsed: start.elapsed(),
                polls,
                waited_for: condition.description(),
            };
            tracing::debug!(
                waited_for = %result.waited_for,
                elapsed_ms = result.elapsed.as_millis() as u64,
                polls,
                "wait satisfied"
            );
            return Ok(result);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(ProbeError::Timeout {
                ms: options.timeout_ms,
                waited_for: condition.description(),
            });
        }
        std::thread::sleep(options.poll_interval().min(timeout - elapsed));
    }
}

/// Wait for an element to become invisible
pub fn wait_until_hidden<D: CanvasDriver + ?Sized>(
    driver: &D,
    element_id: &str,
    options: &WaitOptions,
) -> ProbeResult<WaitResult> {
    wait_for(&mut ElementHidden::new(driver, element_id), options)
}

/// Wait for a closure to return true
pub fn wait_until<F>(
    predicate: F,
    description: impl Into<String>,
    options: &WaitOptions,
) -> ProbeResult<WaitResult>
where
    F: FnMut() -> ProbeResult<bool>,
{
    wait_for(&mut FnCondition::new(predicate, description), options)
}

/// Sleep for a fixed duration
pub fn wait_timeout(duration_ms: u64) {
    if duration_ms > 0 {
        std::thread::sleep(Duration::from_millis(duration_ms));
    }
}
