//! Conformance cases for the query-string strategies.
//!
//! Each case names a method (`parse` or `build`), a strategy, the input and
//! the expected output:
//! - parse cases take a query string and expect a JSON value
//! - build cases take JSON text and expect a query string
//!
//! An expected output of `"!error"` means the case must fail.

use qsnest_tree::{Strategy, Value};
use serde::Deserialize;
use tracing::debug;

/// Expected output marking a case that must fail.
pub const EXPECT_ERROR: &str = "!error";

/// The bundled corpus, as JSON.
pub const CORPUS: &str = include_str!("../corpus/cases.json");

/// Which direction a case runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Parse,
    Build,
}

/// One conformance case.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub method: Method,
    /// Strategy name: `simplistic`, `collapsing` or `nested`.
    pub strategy: String,
    /// Query string (parse) or JSON text (build).
    pub teststring: String,
    /// Expected JSON value (parse) or query string (build).
    pub output: serde_json::Value,
    #[serde(default)]
    pub description: String,
}

/// Result of running a case.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Output matched.
    Pass,
    /// Output differed; `actual` is what was produced.
    Fail { actual: String },
    /// The case could not be run as written.
    Error { message: String },
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl TestCase {
    fn expects_error(&self) -> bool {
        self.output.as_str() == Some(EXPECT_ERROR)
    }
}

/// Load cases from JSON text.
pub fn load(json: &str) -> Result<Vec<TestCase>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Load the bundled corpus.
pub fn corpus() -> Result<Vec<TestCase>, serde_json::Error> {
    load(CORPUS)
}

/// Run one case.
pub fn run_case(case: &TestCase) -> Outcome {
    debug!("Running case {} ({:?} {})", case.id, case.method, case.strategy);
    let strategy: Strategy = match case.strategy.parse() {
        Ok(strategy) => strategy,
        Err(e) => {
            return Outcome::Error {
                message: e.to_string(),
            };
        }
    };

    let result = match case.method {
        Method::Parse => qsnest_tree::parse(&case.teststring, strategy)
            .map(|value| serde_json::Value::from(&value)),
        Method::Build => {
            let json: serde_json::Value = match serde_json::from_str(&case.teststring) {
                Ok(json) => json,
                Err(e) => {
                    return Outcome::Error {
                        message: format!("invalid JSON input: {e}"),
                    };
                }
            };
            qsnest_tree::build(&Value::from(json), strategy).map(serde_json::Value::String)
        }
    };

    match result {
        Ok(actual) if !case.expects_error() && actual == case.output => Outcome::Pass,
        Ok(actual) => Outcome::Fail {
            actual: match actual {
                serde_json::Value::String(s) if case.method == Method::Build => s,
                other => other.to_string(),
            },
        },
        Err(_) if case.expects_error() => Outcome::Pass,
        Err(e) => Outcome::Fail {
            actual: format!("error: {e}"),
        },
    }
}
