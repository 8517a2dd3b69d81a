use crate::error::{AnalysisError, Result};
use regex::Regex;

/// Shell-style glob over a full literal name.
///
/// `*` matches any (possibly empty) substring, `?` exactly one character; every
/// other character matches itself. Matching is anchored and case-sensitive.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| AnalysisError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if let Some(c) = pattern
            .chars()
            .find(|c| c.is_whitespace() || "()[]{}\"".contains(*c))
        {
            return Err(invalid(&format!("'{}' cannot appear in a name", c)));
        }

        let mut re = String::with_capacity(pattern.len() * 2 + 2);
        re.push('^');
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                other => re.push_str(&regex::escape(&other.to_string())),
            }
        }
        re.push('$');

        let regex = Regex::new(&re).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Compiles an optional pattern; `None` matches everything.
    pub fn optional(pattern: Option<&str>) -> Result<Option<Self>> {
        pattern.map(Self::compile).transpose()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
