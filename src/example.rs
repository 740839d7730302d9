//! Example code with its own colocated test suite.
//!
//! Run the `examplepackage` binary to execute [`test_suite`] in local mode
//! and see each computation's result.

use std::thread;
use std::time::Duration;
use serde::Serialize;
use autotest::{Tag, TestCase, TestContext, TestSuite};
use autotest::error::Result;

/// Simulated latency of [`ComputationUnit::slow_compute`]
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Two example computations, one fast and one slow
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComputationUnit {
    delay: Duration,
}

impl Default for ComputationUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputationUnit {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn fast_compute(&self) -> u32 {
        1 + 1
    }

    /// Blocks the calling thread for the configured delay.
    pub fn slow_compute(&self) -> u32 {
        thread::sleep(self.delay);
        6 * 7
    }
}

/// The module's registered test cases
pub fn test_suite() -> TestSuite {
    TestSuite::new("example", "Example Test")
        .tag(Tag::LONG)
        .case(TestCase::new(
            "test_slow_compute",
            "example.slow_compute test",
            test_slow_compute,
        ))
        .case(TestCase::new(
            "test_fast_compute",
            "example.fast_compute test",
            test_fast_compute,
        ))
}

fn test_slow_compute(ctx: &mut TestContext) -> Result<()> {
    let unit = ComputationUnit::new();
    ctx.set("m", unit)?;
    let result = unit.slow_compute();
    ctx.set("result", result)?;

    if ctx.is_local() {
        ctx.report(format!("slow computation result: {:?}", result));
    }

    ctx.assert_eq(result, 42, "unexpected result")
}

fn test_fast_compute(ctx: &mut TestContext) -> Result<()> {
    let unit = ComputationUnit::new();
    ctx.set("m", unit)?;
    let result_short = unit.fast_compute();
    ctx.set("result_short", result_short)?;

    if ctx.is_local() {
        ctx.report(format!("fast computation result: {:?}", result_short));
    }

    ctx.assert_eq(result_short, 2, "unexpected result")
}
