//! Self-testing harness for example code
//!
//! Example modules register their test cases on a [`TestSuite`], run them
//! with a [`TestRunner`] and get back a [`TestReport`] whose records keep
//! every attribute the tests recorded, for inspection after the run.

pub mod error;
pub mod test_context;
pub mod test_discovery;
pub mod test_report;
pub mod test_runner;

pub use error::TestError;
pub use test_context::{Locals, TestContext};
pub use test_discovery::{DiscoveryOrder, Tag, TestCase, TestDiscovery, TestSuite};
pub use test_report::{ConsoleReporter, TestRecord, TestReport, TestReporter};
pub use test_runner::{TestResult, TestRunner, TestRunnerConfig};

/// Discover and run a suite as the direct entry point of the process:
/// test diagnostics are printed and the report is returned for inspection.
pub fn local_test(suite: &TestSuite, reporter: &dyn TestReporter) -> TestReport {
    let discovered = TestDiscovery::default().discover(suite);
    let runner = TestRunner::new(TestRunnerConfig {
        local: true,
        ..Default::default()
    });
    runner.run_suite(&discovered, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_report::SilentReporter;

    #[test]
    fn test_local_test_runs_in_local_mode() {
        let suite = TestSuite::new("local", "")
            .case(TestCase::new("test_local", "", |ctx| {
                ctx.set("result", ctx.is_local())?;
                ctx.assert_true(ctx.is_local(), "not running locally")
            }))
            .case(TestCase::new("helper", "", |_| Err(TestError::failed("not a test"))));

        let report = local_test(&suite, &SilentReporter);
        assert!(report.is_success());
        assert_eq!(report.stats.total, 1);
        assert_eq!(report.namespace()["result"], serde_json::json!(true));
    }
}
