//! Subcommand handlers

use crate::commands::{ConfigArgs, ConfigSource, FormatArg, InspectArgs, LayoutArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::render_dom;
#[cfg(feature = "browser")]
use crate::output::ProgressReporter;
use canvas_probe::scenario::{self, Scenario};
use canvas_probe::{ProbeConfig, Size};
use std::path::Path;

/// Load the configuration file, if any, then apply the `--profile` override
///
/// A profile given on the command line replaces the file's profile but keeps
/// its other settings.
pub fn load_config(source: &ConfigSource) -> CliResult<ProbeConfig> {
    let mut config = match source.config {
        Some(ref path) => ProbeConfig::load(path)?,
        None => ProbeConfig::default(),
    };
    if let Some(profile) = source.profile {
        config.profile = profile.into();
        config.validate()?;
    }
    Ok(config)
}

// =============================================================================
// layout
// =============================================================================

/// Print the synthetic DOM for a canvas size
pub fn layout(args: &LayoutArgs) -> CliResult<()> {
    if args.width == 0 || args.height == 0 {
        return Err(CliError::config("canvas size must be non-empty"));
    }
    let profile = load_config(&args.source)?.profile()?;
    let dom = profile.layout.resolve(Size::new(args.width, args.height));

    match args.format {
        FormatArg::Text => print!("{}", render_dom(&dom)),
        FormatArg::Json => {
            let rects: Vec<_> = dom
                .rects()
                .into_iter()
                .map(|(id, rect)| serde_json::json!({ "id": id, "rect": rect }))
                .collect();
            let doc = serde_json::json!({
                "profile": profile.name,
                "layout": profile.layout.name,
                "canvas": dom.canvas_size(),
                "elements": rects,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

// =============================================================================
// config
// =============================================================================

/// Print or write the effective configuration
pub fn config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_config(&args.source)?;
    match args.write {
        Some(ref path) => {
            config.save(path)?;
            tracing::info!(path = %path.display(), "configuration written");
        }
        None => print!("{}", config.to_yaml()?),
    }
    Ok(())
}

// =============================================================================
// run
// =============================================================================

/// Scenarios named on the command line plus those from `--scenario-file`
pub fn select_scenarios(args: &RunArgs) -> CliResult<Vec<Scenario>> {
    let from_file = match args.scenario_file {
        Some(ref path) => Scenario::list_from_yaml(&std::fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    if !from_file.is_empty() && args.scenarios.is_empty() {
        return Ok(from_file);
    }
    let mut selected = scenario::select_builtin(&args.scenarios)?;
    selected.extend(from_file);
    Ok(selected)
}

/// Run scenarios against the configured calculator in chromium
pub fn run(args: &RunArgs, cli: &CliConfig) -> CliResult<()> {
    let scenarios = select_scenarios(args)?;
    let mut config = load_config(&args.source)?;
    if args.headful {
        config.browser.headless = false;
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    run_in_browser(&config, &scenarios, args.format, cli)
}

#[cfg(feature = "browser")]
fn run_in_browser(
    config: &ProbeConfig,
    scenarios: &[Scenario],
    format: FormatArg,
    cli: &CliConfig,
) -> CliResult<()> {
    use canvas_probe::{CalculatorPage, ChromiumDriver, TesseractEngine};
    use std::time::Instant;

    let profile = config.profile()?;
    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    let started = Instant::now();

    reporter.start_spinner(&format!("loading {}", profile.url));
    let driver = match ChromiumDriver::launch(config.browser.clone()) {
        Ok(driver) => driver,
        Err(e) => {
            reporter.finish();
            return Err(e.into());
        }
    };
    let mut page = CalculatorPage::new(driver, TesseractEngine::new(), profile)
        .with_options(config.page_options());
    let opened = page.open();
    reporter.finish();
    if let Err(e) = opened {
        let _ = page.into_driver().close();
        return Err(e.into());
    }

    reporter.start_progress(scenarios.len() as u64, "running scenarios");
    let mut reports = Vec::with_capacity(scenarios.len());
    for s in scenarios {
        reporter.set_message(&s.name);
        let report = scenario::run_scenario(&mut page, s);
        if format == FormatArg::Text {
            reporter.scenario(&report);
        }
        reporter.increment(1);
        reports.push(report);
    }
    reporter.finish();
    page.into_driver().close()?;

    let failed = reports.iter().filter(|r| !r.passed()).count();
    match format {
        FormatArg::Text => reporter.summary(reports.len() - failed, failed, started.elapsed()),
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    if failed > 0 {
        return Err(CliError::ScenarioFailures {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

#[cfg(not(feature = "browser"))]
fn run_in_browser(
    _config: &ProbeConfig,
    _scenarios: &[Scenario],
    _format: FormatArg,
    _cli: &CliConfig,
) -> CliResult<()> {
    Err(CliError::BrowserUnavailable("run"))
}

// =============================================================================
// inspect
// =============================================================================

/// Capture the canvas and write layout debugging artifacts to a directory
pub fn inspect(args: &InspectArgs, cli: &CliConfig) -> CliResult<()> {
    let mut config = load_config(&args.source)?;
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    std::fs::create_dir_all(&args.output)?;
    inspect_in_browser(&config, &args.output, cli)
}

#[cfg(feature = "browser")]
fn inspect_in_browser(config: &ProbeConfig, output: &Path, cli: &CliConfig) -> CliResult<()> {
    use canvas_probe::{CalculatorPage, ChromiumDriver, TesseractEngine};

    let profile = config.profile()?;
    let reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());

    let driver = ChromiumDriver::launch(config.browser.clone())?;
    let mut page = CalculatorPage::new(driver, TesseractEngine::new(), profile)
        .with_options(config.page_options());

    let result = write_captures(&mut page, output);
    page.into_driver().close()?;
    let text = result?;

    reporter.info(&format!("captures written to {}", output.display()));
    println!("display: {text}");
    Ok(())
}

/// Write canvas, overlay, display crops and the DOM, then read the display
#[cfg(feature = "browser")]
fn write_captures<D, O>(
    page: &mut canvas_probe::CalculatorPage<D, O>,
    output: &Path,
) -> CliResult<String>
where
    D: canvas_probe::CanvasDriver,
    O: canvas_probe::OcrEngine,
{
    use canvas_probe::capture::encode_png;
    use canvas_probe::overlay::{draw_dom, OverlayStyle};
    use canvas_probe::profile::DISPLAY_ID;

    page.open()?;
    let canvas = page.capture_canvas()?;
    let dom = page.canvas_dom()?.clone();
    let display = dom.find_element_by_id(DISPLAY_ID)?.crop(&canvas)?;

    write_png(output, "canvas.png", &encode_png(&canvas)?)?;
    let overlay = draw_dom(&canvas, &dom, OverlayStyle::default());
    write_png(output, "overlay.png", &encode_png(&overlay)?)?;
    write_png(output, "display.png", &encode_png(&display)?)?;
    let prepared = page.profile().display_preprocess.apply(&display).to_rgba8();
    write_png(output, "display-prepared.png", &encode_png(&prepared)?)?;

    let rects: Vec<_> = dom
        .rects()
        .into_iter()
        .map(|(id, rect)| serde_json::json!({ "id": id, "rect": rect }))
        .collect();
    let doc = serde_json::json!({
        "canvas": dom.canvas_size(),
        "elements": rects,
    });
    std::fs::write(output.join("dom.json"), serde_json::to_string_pretty(&doc)?)?;

    Ok(page.display_text()?)
}

#[cfg(feature = "browser")]
fn write_png(dir: &Path, name: &str, bytes: &[u8]) -> CliResult<()> {
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote capture");
    Ok(())
}

#[cfg(not(feature = "browser"))]
fn inspect_in_browser(_config: &ProbeConfig, _output: &Path, _cli: &CliConfig) -> CliResult<()> {
    Err(CliError::BrowserUnavailable("inspect"))
}
