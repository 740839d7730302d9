//! Per-test execution context
//!
//! Every test case gets a fresh context: a place to record attributes for
//! later inspection, the assertions, and the local-mode diagnostics switch.

use std::collections::BTreeMap;
use std::fmt::Debug;
use serde::Serialize;
use serde_json::Value;
use crate::error::{Result, TestError};

/// Attributes recorded by a test, by name
pub type Locals = BTreeMap<String, Value>;

#[derive(Debug)]
pub struct TestContext {
    name: String,
    local: bool,
    locals: Locals,
    output: Vec<String>,
}

impl TestContext {
    pub fn new(name: impl Into<String>, local: bool) -> Self {
        Self {
            name: name.into(),
            local,
            locals: Locals::new(),
            output: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the suite runs as the direct entry point of the process
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Record an attribute under `key`, exported with the test's record
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| TestError::failed(format!("{}: cannot record '{}': {}", self.name(), key, e)))?;
        self.locals.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.locals.get(key)
    }

    /// Diagnostic line; printed in local mode, always kept as test output
    pub fn report(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.local {
            println!("{}", line);
        }
        self.output.push(line);
    }

    pub fn assert_eq<A, E>(&self, actual: A, expected: E, message: &str) -> Result<()>
    where
        A: PartialEq<E> + Debug,
        E: Debug,
    {
        if actual == expected {
            Ok(())
        } else {
            Err(TestError::assertion(
                message,
                format!("{:?}", actual),
                format!("{:?}", expected),
            ))
        }
    }

    pub fn assert_true(&self, condition: bool, message: &str) -> Result<()> {
        self.assert_eq(condition, true, message)
    }

    pub(crate) fn finish(self) -> (Locals, Option<String>) {
        let output = if self.output.is_empty() {
            None
        } else {
            Some(self.output.join("\n"))
        };
        (self.locals, output)
    }
}
