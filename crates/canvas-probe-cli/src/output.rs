//! Output formatting and progress reporting

use canvas_probe::scenario::{Outcome, ScenarioReport};
use canvas_probe::SyntheticDom;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::time::Duration;

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Show a spinner while something without steps runs
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    fn line(&self, message: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.suspend(|| {
                let _ = self.term.write_line(message);
            }),
            None => {
                let _ = self.term.write_line(message);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Report one finished scenario
    pub fn scenario(&self, report: &ScenarioReport) {
        let secs = report.duration.as_secs_f64();
        match report.outcome {
            Outcome::Passed => self.success(&format!("{} ({secs:.2}s)", report.name)),
            _ => self.failure(&format!("{}: {}", report.name, describe_outcome(&report.outcome))),
        }
    }

    /// Print the run summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let total = passed + failed;
        let duration_secs = duration.as_secs_f64();
        let _ = self.term.write_line("");

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({} passed, {} failed)",
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}

/// One-line description of a scenario outcome
#[must_use]
pub fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Passed => "passed".to_string(),
        Outcome::Failed {
            step,
            expected,
            actual,
        } => format!("step {step}: expected display {expected:?}, read {actual:?}"),
        Outcome::Error { step, message } => format!("step {step}: {message}"),
    }
}

/// Text table of a synthetic DOM
#[must_use]
pub fn render_dom(dom: &SyntheticDom) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "canvas {}", dom.canvas_size());
    let width = dom.ids().map(str::len).max().unwrap_or(0);
    for element in dom {
        let (Ok(location), Ok(size)) = (element.location(), element.size()) else {
            let _ = writeln!(out, "{:width$}  (unpositioned)", element.id());
            continue;
        };
        let center = element
            .centroid()
            .map_or_else(|_| "-".to_string(), |c| c.to_string());
        let _ = writeln!(
            out,
            "{:width$}  {:<12} {:<9} center {center}",
            element.id(),
            location.to_string(),
            size.to_string(),
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use canvas_probe::{LayoutTable, Size};

    #[test]
    fn test_render_dom_online() {
        let dom = LayoutTable::online_calculator().resolve(Size::new(500, 800));
        let text = render_dom(&dom);
        assert!(text.starts_with("canvas 500x800\n"));
        let display = text.lines().find(|l| l.starts_with("display")).unwrap();
        assert!(display.contains("(32, 44)"));
        assert!(display.contains("435x72"));
        assert!(display.contains("center (249, 80)"));
    }

    #[test]
    fn test_describe_failed() {
        let outcome = Outcome::Failed {
            step: 3,
            expected: "4".to_string(),
            actual: "1".to_string(),
        };
        assert_eq!(
            describe_outcome(&outcome),
            "step 3: expected display \"4\", read \"1\""
        );
    }

    #[test]
    fn test_quiet_reporter_has_no_bar() {
        let mut reporter = ProgressReporter::new(false, true);
        reporter.start_progress(4, "running");
        assert!(reporter.progress_bar.is_none());
        reporter.finish();
    }

    #[test]
    fn test_finish_clears_spinner() {
        let mut reporter = ProgressReporter::new(false, false);
        reporter.start_spinner("loading");
        assert!(reporter.progress_bar.is_some());
        reporter.finish();
        assert!(reporter.progress_bar.is_none());
        reporter.finish();
    }
}
