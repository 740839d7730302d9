//! Test reporting module
//!
//! A [`TestReport`] is the explicit result of a run: every record keeps the
//! attributes its test recorded, so callers can inspect them after the run.
//! Reporters display a run as it happens.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::time::Duration;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::test_context::Locals;
use crate::test_discovery::{Tag, TestCase, TestSuite};
use crate::test_runner::TestResult;

/// Outcome of one test case together with what it recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    pub description: String,
    pub tags: BTreeSet<Tag>,
    pub result: TestResult,
    pub locals: Locals,
}

impl TestRecord {
    pub fn new(test: &TestCase, tags: BTreeSet<Tag>, result: TestResult, locals: Locals) -> Self {
        Self {
            name: test.name.clone(),
            description: test.description.clone(),
            tags,
            result,
            locals,
        }
    }
}

/// Test report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Report name
    pub name: String,

    /// Records in execution order
    pub records: Vec<TestRecord>,

    /// Total duration in milliseconds
    pub duration_ms: u64,

    /// Summary statistics
    pub stats: TestStats,
}

/// Test statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TestReport {
    pub fn new(name: String) -> Self {
        Self {
            name,
            records: Vec::new(),
            duration_ms: 0,
            stats: TestStats::default(),
        }
    }

    pub fn add_record(&mut self, record: TestRecord) {
        self.stats.total += 1;

        match &record.result {
            TestResult::Pass { .. } => self.stats.passed += 1,
            TestResult::Fail { .. } => self.stats.failed += 1,
            TestResult::Skipped { .. } => self.stats.skipped += 1,
        }

        self.records.push(record);
    }

    pub fn is_success(&self) -> bool {
        self.stats.failed == 0
    }

    pub fn get(&self, name: &str) -> Option<&TestRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// The most recently executed test
    pub fn last(&self) -> Option<&TestRecord> {
        self.records.last()
    }

    /// Attributes of all records merged in execution order; a later test
    /// overrides a name recorded by an earlier one.
    pub fn namespace(&self) -> Locals {
        let mut namespace = Locals::new();
        for record in &self.records {
            namespace.extend(record.locals.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        namespace
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().filter_map(|r| match &r.result {
            TestResult::Fail { error, .. } => Some((r.name.as_str(), error.as_str())),
            _ => None,
        })
    }
}

/// Test reporter trait
pub trait TestReporter {
    /// Called when a test suite starts
    fn on_suite_start(&self, suite: &TestSuite);

    /// Called when test count is determined
    fn on_test_count(&self, count: usize);

    /// Called when a test starts
    fn on_test_start(&self, test: &TestCase);

    /// Called when a test finishes
    fn on_test_finish(&self, test: &TestCase, result: &TestResult);

    /// Called when a test suite finishes
    fn on_suite_finish(&self, report: &TestReport);
}

/// Reporter that prints nothing
pub struct SilentReporter;

impl TestReporter for SilentReporter {
    fn on_suite_start(&self, _suite: &TestSuite) {}
    fn on_test_count(&self, _count: usize) {}
    fn on_test_start(&self, _test: &TestCase) {}
    fn on_test_finish(&self, _test: &TestCase, _result: &TestResult) {}
    fn on_suite_finish(&self, _report: &TestReport) {}
}

/// Console test reporter
pub struct ConsoleReporter {
    verbose: bool,
    progress: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress: false,
            spinner: RefCell::new(None),
        }
    }

    /// Show a spinner on stderr while a test runs
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn print_test_result(&self, test: &TestCase, result: &TestResult) {
        println!("{} ... {}", test.name, format_status(result));

        if self.verbose || result.is_fail() {
            match result {
                TestResult::Pass { output: Some(output), .. } |
                TestResult::Fail { output: Some(output), .. } => {
                    println!("  Output: {}", output.dimmed());
                }
                _ => {}
            }
        }
    }
}

fn format_status(result: &TestResult) -> String {
    match result {
        TestResult::Pass { duration_ms, .. } => {
            format!("{} ({}ms)", "PASS".green(), duration_ms)
        }
        TestResult::Fail { duration_ms, error, .. } => {
            format!("{} ({}ms): {}", "FAIL".red(), duration_ms, error)
        }
        TestResult::Skipped { reason } => {
            format!("{}: {}", "SKIP".yellow(), reason)
        }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_suite_start(&self, suite: &TestSuite) {
        println!("\n{} {}", "Running".bold(), suite.name);
        if self.verbose && !suite.description.is_empty() {
            println!("{}", suite.description.dimmed());
        }
        println!();
    }

    fn on_test_count(&self, count: usize) {
        if self.verbose {
            println!("Found {} tests", count);
        }
    }

    fn on_test_start(&self, test: &TestCase) {
        if self.verbose {
            println!("Running {} ({}) ...", test.name, test.description);
        }

        if self.progress {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
                spinner.set_style(style);
            }
            spinner.set_message(test.name.clone());
            spinner.enable_steady_tick(Duration::from_millis(100));
            *self.spinner.borrow_mut() = Some(spinner);
        }
    }

    fn on_test_finish(&self, test: &TestCase, result: &TestResult) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }

        self.print_test_result(test, result);
    }

    fn on_suite_finish(&self, report: &TestReport) {
        println!("\n{}", "Test Summary".bold().underline());
        println!();

        let stats = &report.stats;

        if stats.passed > 0 {
            println!("  {} passed", stats.passed.to_string().green());
        }
        if stats.failed > 0 {
            println!("  {} failed", stats.failed.to_string().red());
        }
        if stats.skipped > 0 {
            println!("  {} skipped", stats.skipped.to_string().yellow());
        }

        println!();
        println!("Total: {} tests in {:.2}s",
            stats.total,
            report.duration_ms as f64 / 1000.0
        );

        if report.is_success() {
            println!("\n{}", "All tests passed!".green().bold());
        } else {
            println!("\n{}", "Some tests failed.".red().bold());

            println!("\nFailed tests:");
            for (name, error) in report.failures() {
                println!("  - {}: {}", name, error);
            }
        }
    }
}

/// JSON test reporter
pub struct JsonReporter;

impl JsonReporter {
    pub fn render(report: &TestReport) -> Value {
        json!({
            "name": report.name,
            "duration_ms": report.duration_ms,
            "stats": {
                "total": report.stats.total,
                "passed": report.stats.passed,
                "failed": report.stats.failed,
                "skipped": report.stats.skipped,
            },
            "success": report.is_success(),
            "results": report.records.iter().map(|record| {
                let mut entry = match &record.result {
                    TestResult::Pass { duration_ms, output } => json!({
                        "status": "pass",
                        "duration_ms": duration_ms,
                        "output": output,
                    }),
                    TestResult::Fail { duration_ms, error, output } => json!({
                        "status": "fail",
                        "duration_ms": duration_ms,
                        "error": error,
                        "output": output,
                    }),
                    TestResult::Skipped { reason } => json!({
                        "status": "skipped",
                        "reason": reason,
                    }),
                };
                entry["name"] = json!(record.name);
                entry["tags"] = json!(record.tags);
                entry["locals"] = json!(record.locals);
                entry
            }).collect::<Vec<_>>(),
        })
    }
}

impl TestReporter for JsonReporter {
    fn on_suite_start(&self, _suite: &TestSuite) {}

    fn on_test_count(&self, _count: usize) {}

    fn on_test_start(&self, _test: &TestCase) {}

    fn on_test_finish(&self, _test: &TestCase, _result: &TestResult) {}

    fn on_suite_finish(&self, report: &TestReport) {
        match serde_json::to_string_pretty(&Self::render(report)) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("failed to serialize report: {}", e),
        }
    }
}

/// JUnit XML test reporter
pub struct JUnitReporter;

impl JUnitReporter {
    pub fn render(report: &TestReport) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" time=\"{}\">\n",
            escape_xml(&report.name),
            report.stats.total,
            report.stats.failed,
            report.stats.skipped,
            report.duration_ms as f64 / 1000.0,
        ));

        for record in &report.records {
            let name = escape_xml(&record.name);
            match &record.result {
                TestResult::Pass { duration_ms, .. } => {
                    xml.push_str(&format!(
                        "  <testcase name=\"{}\" time=\"{}\" />\n",
                        name,
                        *duration_ms as f64 / 1000.0,
                    ));
                }
                TestResult::Fail { duration_ms, error, .. } => {
                    xml.push_str(&format!(
                        "  <testcase name=\"{}\" time=\"{}\">\n",
                        name,
                        *duration_ms as f64 / 1000.0,
                    ));
                    xml.push_str(&format!("    <failure message=\"{}\" />\n", escape_xml(error)));
                    xml.push_str("  </testcase>\n");
                }
                TestResult::Skipped { reason } => {
                    xml.push_str(&format!("  <testcase name=\"{}\">\n", name));
                    xml.push_str(&format!("    <skipped message=\"{}\" />\n", escape_xml(reason)));
                    xml.push_str("  </testcase>\n");
                }
            }
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

impl TestReporter for JUnitReporter {
    fn on_suite_start(&self, _suite: &TestSuite) {}

    fn on_test_count(&self, _count: usize) {}

    fn on_test_start(&self, _test: &TestCase) {}

    fn on_test_finish(&self, _test: &TestCase, _result: &TestResult) {}

    fn on_suite_finish(&self, report: &TestReport) {
        print!("{}", Self::render(report));
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
