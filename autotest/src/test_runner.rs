//! Test runner
//!
//! Runs the cases of a discovered suite one after another, each against a
//! fresh [`TestContext`], and collects the outcomes into a [`TestReport`].

use std::collections::BTreeSet;
use std::time::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::test_context::TestContext;
use crate::test_discovery::{Tag, TestCase, TestSuite};
use crate::test_report::{TestRecord, TestReport, TestReporter};

/// Test runner configuration
#[derive(Debug, Clone, Default)]
pub struct TestRunnerConfig {
    /// Running as the direct entry point; enables test diagnostics
    pub local: bool,

    /// Test name filter pattern
    pub filter: Option<String>,

    /// Only run tests carrying one of these tags (all tests when empty)
    pub include_tags: BTreeSet<Tag>,

    /// Never run tests carrying one of these tags
    pub exclude_tags: BTreeSet<Tag>,
}

/// Test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestResult {
    /// Test passed
    Pass {
        duration_ms: u64,
        output: Option<String>,
    },

    /// Test failed
    Fail {
        duration_ms: u64,
        error: String,
        output: Option<String>,
    },

    /// Test was skipped
    Skipped {
        reason: String,
    },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }
}

/// Test runner
pub struct TestRunner {
    config: TestRunnerConfig,
}

impl TestRunner {
    pub fn new(config: TestRunnerConfig) -> Self {
        Self { config }
    }

    /// Run all selected tests in a test suite
    pub fn run_suite(&self, suite: &TestSuite, reporter: &dyn TestReporter) -> TestReport {
        reporter.on_suite_start(suite);

        let start_time = Instant::now();
        let mut report = TestReport::new(suite.name.clone());

        let tests_to_run: Vec<&TestCase> = suite.tests.iter()
            .filter(|test| self.should_run_test(suite, test))
            .collect();

        reporter.on_test_count(tests_to_run.len());

        for test in tests_to_run {
            reporter.on_test_start(test);
            let record = self.run_test(suite, test);
            reporter.on_test_finish(test, &record.result);
            report.add_record(record);
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            suite = %report.name,
            passed = report.stats.passed,
            failed = report.stats.failed,
            skipped = report.stats.skipped,
            "suite finished"
        );
        reporter.on_suite_finish(&report);

        report
    }

    /// Run a single test against a fresh context
    pub fn run_test(&self, suite: &TestSuite, test: &TestCase) -> TestRecord {
        let tags = suite.tags_of(test);

        if test.attributes.skip {
            let reason = test.attributes.skip_reason.clone()
                .unwrap_or_else(|| "skipped".to_string());
            debug!(test = %test.name, %reason, "skipping test");
            return TestRecord::new(test, tags, TestResult::Skipped { reason }, Default::default());
        }

        debug!(test = %test.name, "running test");
        let mut ctx = TestContext::new(test.name.clone(), self.config.local);

        let start = Instant::now();
        let outcome = test.invoke(&mut ctx);
        let duration_ms = start.elapsed().as_millis() as u64;

        let (locals, output) = ctx.finish();
        let result = match outcome {
            Ok(()) => TestResult::Pass { duration_ms, output },
            Err(e) => {
                warn!(test = %test.name, error = %e, "test failed");
                TestResult::Fail {
                    duration_ms,
                    error: e.to_string(),
                    output,
                }
            }
        };

        TestRecord::new(test, tags, result, locals)
    }

    fn should_run_test(&self, suite: &TestSuite, test: &TestCase) -> bool {
        if let Some(filter) = &self.config.filter {
            if !test.name.contains(filter.as_str()) {
                return false;
            }
        }

        let tags = suite.tags_of(test);
        if tags.iter().any(|tag| self.config.exclude_tags.contains(tag)) {
            return false;
        }

        self.config.include_tags.is_empty()
            || tags.iter().any(|tag| self.config.include_tags.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestError;
    use crate::test_report::SilentReporter;
    use serde_json::json;

    fn suite() -> TestSuite {
        TestSuite::new("runner", "Runner tests")
            .case(TestCase::new("test_fails", "compares 3 with 2", |ctx| {
                ctx.set("value", 3)?;
                ctx.assert_eq(1 + 2, 2, "unexpected result")
            }))
            .case(TestCase::new("test_passes", "records a value", |ctx| {
                ctx.set("value", 2)?;
                ctx.report("passes result: 2");
                ctx.assert_eq(1 + 1, 2, "unexpected result")
            }))
            .case(TestCase::new("test_slow", "long-running", |_| Ok(())).tag(Tag::LONG))
            .case(TestCase::new("test_todo", "skipped", |_| Err(TestError::failed("never runs")))
                .skip("not ready"))
    }

    #[test]
    fn test_failure_does_not_abort_run() {
        let runner = TestRunner::new(TestRunnerConfig::default());
        let report = runner.run_suite(&suite(), &SilentReporter);

        assert_eq!(report.stats.total, 4);
        assert_eq!(report.stats.passed, 2);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.skipped, 1);

        assert!(report.get("test_fails").unwrap().result.is_fail());
        assert!(!report.get("test_passes").unwrap().result.is_fail());
        match &report.get("test_fails").unwrap().result {
            TestResult::Fail { error, .. } => {
                assert!(error.contains("expected 2"));
                assert!(error.contains("got 3"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_locals_and_output_recorded() {
        let runner = TestRunner::new(TestRunnerConfig::default());
        let report = runner.run_suite(&suite(), &SilentReporter);

        let record = report.get("test_passes").unwrap();
        assert_eq!(record.locals["value"], json!(2));
        match &record.result {
            TestResult::Pass { output, .. } => {
                assert_eq!(output.as_deref(), Some("passes result: 2"));
            }
            other => panic!("expected pass, got {:?}", other),
        }
    }

    #[test]
    fn test_exclude_tag() {
        let config = TestRunnerConfig {
            exclude_tags: [Tag::LONG].into_iter().collect(),
            ..Default::default()
        };
        let report = TestRunner::new(config).run_suite(&suite(), &SilentReporter);
        assert!(report.get("test_slow").is_none());
        assert_eq!(report.stats.total, 3);
    }

    #[test]
    fn test_include_tag() {
        let config = TestRunnerConfig {
            include_tags: [Tag::LONG].into_iter().collect(),
            ..Default::default()
        };
        let report = TestRunner::new(config).run_suite(&suite(), &SilentReporter);
        assert_eq!(report.stats.total, 1);
        assert!(report.get("test_slow").unwrap().result.is_pass());
    }

    #[test]
    fn test_filter() {
        let config = TestRunnerConfig {
            filter: Some("pass".to_string()),
            ..Default::default()
        };
        let report = TestRunner::new(config).run_suite(&suite(), &SilentReporter);
        assert_eq!(report.stats.total, 1);
        assert!(report.is_success());
    }

    #[test]
    fn test_context_is_fresh_per_test() {
        let suite = TestSuite::new("isolation", "")
            .case(TestCase::new("test_a", "", |ctx| ctx.set("a", 1)))
            .case(TestCase::new("test_b", "", |ctx| {
                ctx.assert_true(ctx.get("a").is_none(), "saw state from another test")
            }));
        let report = TestRunner::new(TestRunnerConfig::default()).run_suite(&suite, &SilentReporter);
        assert!(report.is_success());
        assert!(!report.get("test_b").unwrap().locals.contains_key("a"));
    }
}
