//! Regex pattern sets for gate classification.
//!
//! Patterns are compiled once when a gate is built via `PatternSet`, then
//! reused for every check. Matching is plain `Regex::is_match`; callers
//! lowercase their text first when they want case-insensitive behavior.

use regex::Regex;

/// An ordered, pre-compiled list of regexes.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile a list of pattern strings.
    /// Returns an error naming the first pattern that fails to compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns: compiled })
    }

    /// Compile the built-in patterns followed by user-supplied extras.
    pub fn with_extras<S: AsRef<str>>(
        builtin: &[&str],
        extras: &[S],
    ) -> Result<Self, regex::Error> {
        let mut set = Self::new(builtin)?;
        for extra in extras {
            set.patterns.push(Regex::new(extra.as_ref())?);
        }
        Ok(set)
    }

    /// Returns true if any pattern matches somewhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

}

/// Build an alternation group body (`a|b|c`) from literal words.
pub fn literal_alternation<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}
