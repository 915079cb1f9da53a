//! Declarative end-to-end scenarios.
//!
//! A scenario is a list of button presses and display expectations run
//! against a [`CalculatorPage`]. The built-in scenarios work with either
//! calculator profile:
//!
//! | name               | steps                                              |
//! |--------------------|----------------------------------------------------|
//! | `clear`            | clear, 4 -> 4, clear -> 0                          |
//! | `one-plus-two`     | 1 -> 1, plus, 2 -> 2, equal -> 3                   |
//! | `chained-addition` | 21 -> 21, plus, 15 -> 15, plus -> 36, 6, equal -> 42 |
//! | `digit-round-trip` | for every digit: clear, digit -> digit             |

use crate::driver::CanvasDriver;
use crate::ocr::OcrEngine;
use crate::page::CalculatorPage;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// One step of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Step {
    /// Click the clear button
    Clear,
    /// Click a button by key name (`"plus"`, `"equal"`, `"7"`)
    Press(String),
    /// Click one button per character
    Insert(String),
    /// Display reads this value in the profile's native kind
    Expect(String),
    /// Display text equals this string
    ExpectText(String),
    /// Display parses to this number
    ExpectNumber(f64),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => f.write_str("clear"),
            Self::Press(key) => write!(f, "press {key}"),
            Self::Insert(digits) => write!(f, "insert {digits}"),
            Self::Expect(value) => write!(f, "expect {value}"),
            Self::ExpectText(text) => write!(f, "expect text {text:?}"),
            Self::ExpectNumber(value) => write!(f, "expect number {value}"),
        }
    }
}

/// A named list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// What the scenario checks
    #[serde(default)]
    pub description: String,
    /// Steps in order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a clear
    #[must_use]
    pub fn clear(self) -> Self {
        self.step(Step::Clear)
    }

    /// Append a button press
    #[must_use]
    pub fn press(self, key: &str) -> Self {
        self.step(Step::Press(key.to_string()))
    }

    /// Append a number entry
    #[must_use]
    pub fn insert(self, digits: &str) -> Self {
        self.step(Step::Insert(digits.to_string()))
    }

    /// Append a display expectation
    #[must_use]
    pub fn expect(self, value: &str) -> Self {
        self.step(Step::Expect(value.to_string()))
    }

    /// Clear, then 4 shows 4, then clear shows 0
    #[must_use]
    pub fn clear_resets_display() -> Self {
        Self::new("clear")
            .describe("clear resets the display to zero")
            .clear()
            .press("4")
            .expect("4")
            .clear()
            .expect("0")
    }

    /// 1 + 2 = 3
    #[must_use]
    pub fn one_plus_two() -> Self {
        Self::new("one-plus-two")
            .describe("1 + 2 = 3")
            .clear()
            .press("1")
            .expect("1")
            .press("plus")
            .press("2")
            .expect("2")
            .press("equal")
            .expect("3")
    }

    /// 21 + 15 + 6 = 42, with the running total shown after the second plus
    #[must_use]
    pub fn chained_addition() -> Self {
        Self::new("chained-addition")
            .describe("21 + 15 + 6 = 42")
            .clear()
            .insert("21")
            .expect("21")
            .press("plus")
            .insert("15")
            .expect("15")
            .press("plus")
            .expect("36")
            .insert("6")
            .expect("6")
            .press("equal")
            .expect("42")
    }

    /// Every digit reads back as itself, both as text and as a number
    #[must_use]
    pub fn digit_round_trip() -> Self {
        ('0'..='9').fold(
            Self::new("digit-round-trip").describe("each digit is recognized as itself"),
            |scenario, d| {
                let digit = d.to_string();
                scenario
                    .clear()
                    .insert(&digit)
                    .step(Step::ExpectText(digit))
                    .step(Step::ExpectNumber(f64::from(d.to_digit(10).unwrap_or(0))))
            },
        )
    }

    /// All built-in scenarios
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::clear_resets_display(),
            Self::one_plus_two(),
            Self::chained_addition(),
            Self::digit_round_trip(),
        ]
    }

    /// Built-in scenario by name
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        Self::builtin().into_iter().find(|s| s.name == name)
    }

    /// Parse a list of scenarios from YAML
    ///
    /// # Errors
    ///
    /// Returns error if the YAML does not describe a list of scenarios
    pub fn list_from_yaml(yaml: &str) -> ProbeResult<Vec<Self>> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every step ran and every expectation held
    Passed,
    /// An expectation did not hold
    Failed {
        /// Index of the failing step
        step: usize,
        /// Expected display value
        expected: String,
        /// Value read from the display
        actual: String,
    },
    /// A step returned an error
    Error {
        /// Index of the failing step
        step: usize,
        /// Error message
        message: String,
    },
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub outcome: Outcome,
    /// Number of steps executed, including the failing one
    pub steps_run: usize,
    /// Wall time
    pub duration: Duration,
}

impl ScenarioReport {
    /// Whether the scenario passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }
}

enum StepResult {
    Done,
    Mismatch { expected: String, actual: String },
}

fn run_step<D: CanvasDriver, O: OcrEngine>(
    page: &mut CalculatorPage<D, O>,
    step: &Step,
) -> ProbeResult<StepResult> {
    match step {
        Step::Clear => page.clear()?,
        Step::Press(key) => page.click_button(key)?,
        Step::Insert(digits) => page.insert_number(digits)?,
        Step::Expect(expected) => {
            let actual = page.display_value()?;
            if !actual.matches(expected) {
                return Ok(StepResult::Mismatch {
                    expected: expected.clone(),
                    actual: actual.to_string(),
                });
            }
        }
        Step::ExpectText(expected) => {
            let actual = page.display_text()?;
            if &actual != expected {
                return Ok(StepResult::Mismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Step::ExpectNumber(expected) => {
            let actual = page.read_display()?;
            if (actual - expected).abs() >= f64::EPSILON {
                return Ok(StepResult::Mismatch {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
    }
    Ok(StepResult::Done)
}

/// Run a scenario, stopping at the first failing step
pub fn run_scenario<D: CanvasDriver, O: OcrEngine>(
    page: &mut CalculatorPage<D, O>,
    scenario: &Scenario,
) -> ScenarioReport {
    let start = Instant::now();
    let mut outcome = Outcome::Passed;
    let mut steps_run = 0;

    for (i, step) in scenario.steps.iter().enumerate() {
        steps_run = i + 1;
        tracing::debug!(scenario = %scenario.name, step = i, %step, "step");
        match run_step(page, step) {
            Ok(StepResult::Done) => {}
            Ok(StepResult::Mismatch { expected, actual }) => {
                outcome = Outcome::Failed {
                    step: i,
                    expected,
                    actual,
                };
                break;
            }
            Err(e) => {
                outcome = Outcome::Error {
                    step: i,
                    message: e.to_string(),
                };
                break;
            }
        }
    }

    let report = ScenarioReport {
        name: scenario.name.clone(),
        outcome,
        steps_run,
        duration: start.elapsed(),
    };
    tracing::info!(
        scenario = %report.name,
        passed = report.passed(),
        steps = report.steps_run,
        "scenario finished"
    );
    report
}

/// Run scenarios in order
pub fn run_all<D: CanvasDriver, O: OcrEngine>(
    page: &mut CalculatorPage<D, O>,
    scenarios: &[Scenario],
) -> Vec<ScenarioReport> {
    scenarios.iter().map(|s| run_scenario(page, s)).collect()
}

/// Resolve scenario names, all built-ins when `names` is empty
///
/// # Errors
///
/// Returns [`ProbeError::Config`] naming the first unknown scenario
pub fn select_builtin(names: &[String]) -> ProbeResult<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::builtin());
    }
    names
        .iter()
        .map(|name| {
            Scenario::by_name(name).ok_or_else(|| ProbeError::Config {
                message: format!("unknown scenario '{name}'"),
            })
        })
        .collect()
}
