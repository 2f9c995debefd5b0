use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::RouteError;

/// A shared, type-erased matcher.
pub type BoxedMatcher = Arc<dyn Matcher>;

/// Accepts or rejects a single route parameter value.
pub trait Matcher: Send + Sync + 'static {
    fn matches(&self, value: &str) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    fn matches(&self, value: &str) -> bool {
        self(value)
    }
}

impl fmt::Debug for dyn Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Matcher")
    }
}

/// Matches when the whole value matches a regular expression.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compiles `pattern` anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| RouteError::InvalidPattern {
            path: pattern.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl Matcher for RegexMatcher {
    fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Positive integers without a leading zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericMatcher;

impl Matcher for NumericMatcher {
    fn matches(&self, value: &str) -> bool {
        let mut digits = value.chars();
        matches!(digits.next(), Some('1'..='9')) && digits.all(|c| c.is_ascii_digit())
    }
}
