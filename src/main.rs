//! Runs the example's colocated test suite as the direct entry point and
//! prints the last recorded result.

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::{debug, error};
use autotest::test_report::{JUnitReporter, JsonReporter};
use autotest::{ConsoleReporter, Tag, TestReport, TestReporter, TestRunner};
use examplepackage::{test_suite, HarnessConfig, ReporterKind};

/// Run the example test suite
#[derive(Parser)]
#[command(name = "examplepackage")]
#[command(about = "Run the example computations with their own tests")]
#[command(version)]
struct Cli {
    /// Enable verbose logging and per-test output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reporter (overrides the config file)
    #[arg(short, long, value_enum)]
    reporter: Option<ReporterKind>,

    /// Only run tests carrying this tag
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Skip tests carrying this tag
    #[arg(long = "exclude-tag")]
    exclude_tags: Vec<String>,

    /// Only run tests whose name contains this
    #[arg(short, long)]
    filter: Option<String>,

    /// Do not print test diagnostics
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    match run(cli) {
        Ok(report) if report.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<TestReport> {
    let mut config = HarnessConfig::load(cli.config.as_deref())?;

    config.verbose |= cli.verbose;
    if let Some(reporter) = cli.reporter {
        config.reporter = reporter;
    }
    // Command-line selection replaces the file's; a tag asked for with
    // --tag is no longer excluded by the file.
    if !cli.exclude_tags.is_empty() {
        config.runner.exclude_tags = cli.exclude_tags.into_iter().map(Tag::new).collect();
    } else if !cli.tags.is_empty() {
        config.runner.exclude_tags.retain(|tag| !cli.tags.iter().any(|t| t == tag.as_str()));
    }
    if !cli.tags.is_empty() {
        config.runner.include_tags = cli.tags.into_iter().map(Tag::new).collect();
    }
    if cli.filter.is_some() {
        config.runner.filter = cli.filter;
    }
    debug!(?config, "effective configuration");

    let local = !cli.quiet && config.reporter == ReporterKind::Console;
    let reporter: Box<dyn TestReporter> = match config.reporter {
        ReporterKind::Json => Box::new(JsonReporter),
        ReporterKind::Junit => Box::new(JUnitReporter),
        ReporterKind::Console => {
            Box::new(ConsoleReporter::new(config.verbose).with_progress(!local))
        }
    };

    let suite = config.discovery().discover(&test_suite());
    let runner = TestRunner::new(config.runner_config(local));
    let report = runner.run_suite(&suite, reporter.as_ref());

    if local {
        match report.namespace().get("result") {
            Some(result) => println!("The last result of the last test was\n {}", result),
            None => println!("No test recorded a result"),
        }
    }

    Ok(report)
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    Ok(())
}
