//! Compiled regular expressions.

use std::fmt;
use std::sync::Arc;

/// A compiled regular expression, shared between the literal that produced
/// it and every value derived from it.
///
/// Two regexps are equal when their source patterns are equal.
#[derive(Clone)]
pub struct Regexp(Arc<regex::Regex>);

impl Regexp {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        regex::Regex::new(pattern).map(|re| Regexp(Arc::new(re)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for Regexp {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Regexp {}

impl fmt::Debug for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Regexp({:?})", self.as_str())
    }
}

impl fmt::Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for c in self.as_str().chars() {
            if c == '/' {
                f.write_str("\\/")?;
            } else {
                write!(f, "{c}")?;
            }
        }
        f.write_str("/")
    }
}
