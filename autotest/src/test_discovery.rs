//! Test discovery module
//!
//! Test cases are registered explicitly on a [`TestSuite`]; discovery selects
//! the registered cases that look like tests and puts them in a stable order.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::test_context::TestContext;

/// Default prefix a registered case name must carry to be discovered
pub const DEFAULT_PREFIX: &str = "test_";

/// Category label used to select subsets of tests
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// Long-running tests
    pub const LONG: Tag = Tag(Cow::Borrowed("long"));

    pub fn new(name: impl Into<String>) -> Self {
        Tag(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::new(name)
    }
}

/// Body of a test case
pub type TestFn = Arc<dyn Fn(&mut TestContext) -> Result<()> + Send + Sync>;

/// Test case
#[derive(Clone)]
pub struct TestCase {
    /// Test name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Test attributes (tags, skip conditions)
    pub attributes: TestAttributes,

    body: TestFn,
}

/// Test attributes
#[derive(Debug, Clone, Default)]
pub struct TestAttributes {
    /// Tags for grouping tests
    pub tags: BTreeSet<Tag>,

    /// Whether this test should be skipped
    pub skip: bool,

    /// Skip reason
    pub skip_reason: Option<String>,
}

impl TestCase {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TestContext) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            attributes: TestAttributes::default(),
            body: Arc::new(body),
        }
    }

    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.attributes.tags.insert(tag.into());
        self
    }

    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.attributes.skip = true;
        self.attributes.skip_reason = Some(reason.into());
        self
    }

    pub(crate) fn invoke(&self, ctx: &mut TestContext) -> Result<()> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Test suite
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,

    /// Suite description
    pub description: String,

    /// Tags applied to every case in the suite
    pub tags: BTreeSet<Tag>,

    /// Registered cases, in declaration order
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: BTreeSet::new(),
            tests: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Register a case. Registering a name twice replaces the earlier body
    /// but keeps its declaration position.
    pub fn case(mut self, case: TestCase) -> Self {
        match self.tests.iter_mut().find(|t| t.name == case.name) {
            Some(existing) => *existing = case,
            None => self.tests.push(case),
        }
        self
    }

    /// Case tags merged with the suite tags
    pub fn tags_of(&self, test: &TestCase) -> BTreeSet<Tag> {
        self.tags.union(&test.attributes.tags).cloned().collect()
    }

    /// Tests grouped by tag
    pub fn by_tag(&self) -> BTreeMap<Tag, Vec<&TestCase>> {
        let mut index: BTreeMap<Tag, Vec<&TestCase>> = BTreeMap::new();
        for test in &self.tests {
            for tag in self.tags_of(test) {
                index.entry(tag).or_default().push(test);
            }
        }
        index
    }

    fn with_tests(&self, name: String, tests: Vec<TestCase>) -> Self {
        Self {
            name,
            description: self.description.clone(),
            tags: self.tags.clone(),
            tests,
        }
    }
}

/// Order in which discovered tests run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryOrder {
    /// Sorted by test name
    #[default]
    Name,
    /// As registered
    Declaration,
}

/// Test discovery
#[derive(Debug, Clone)]
pub struct TestDiscovery {
    prefix: String,
    order: DiscoveryOrder,
}

impl Default for TestDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DiscoveryOrder::default())
    }
}

impl TestDiscovery {
    pub fn new(prefix: impl Into<String>, order: DiscoveryOrder) -> Self {
        Self {
            prefix: prefix.into(),
            order,
        }
    }

    /// Discover all tests registered on a suite
    pub fn discover(&self, suite: &TestSuite) -> TestSuite {
        let mut tests: Vec<TestCase> = suite.tests.iter()
            .filter(|test| self.is_test_name(&test.name))
            .cloned()
            .collect();

        if self.order == DiscoveryOrder::Name {
            tests.sort_by(|a, b| a.name.cmp(&b.name));
        }

        tracing::debug!(suite = %suite.name, count = tests.len(), "discovered tests");
        suite.with_tests(suite.name.clone(), tests)
    }

    /// Discover tests by pattern
    pub fn discover_by_pattern(&self, suite: &TestSuite, pattern: &str) -> TestSuite {
        let all_tests = self.discover(suite);

        let filtered_tests: Vec<TestCase> = all_tests.tests
            .into_iter()
            .filter(|test| test.name.contains(pattern))
            .collect();

        suite.with_tests(format!("{} (matching '{}')", suite.name, pattern), filtered_tests)
    }

    /// Discover tests by tag, suite tags included
    pub fn discover_by_tag(&self, suite: &TestSuite, tag: &Tag) -> TestSuite {
        let all_tests = self.discover(suite);

        let filtered_tests: Vec<TestCase> = all_tests.tests
            .into_iter()
            .filter(|test| suite.tags_of(test).contains(tag))
            .collect();

        suite.with_tests(format!("{} (tagged '{}')", suite.name, tag), filtered_tests)
    }

    fn is_test_name(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name.len() > self.prefix.len()
    }
}
