use std::collections::HashSet;

use faultline_signature::{parse_signature, MethodSignature, SignatureParseError};

/// Which methods the interception hook should instrument: a set of
/// signatures, usually read from a newline-separated list file.
///
/// The filter belongs to the harness side of the boundary — the engine
/// dispatches whatever the hook sends it — but shares the signature model
/// so a filter entry and a rule target canonicalize identically.
#[derive(Debug, Clone, Default)]
pub struct MethodFilter {
    methods: HashSet<MethodSignature>,
}

#[derive(Debug, thiserror::Error)]
#[error("Method filter line {line}: {source}")]
pub struct FilterError {
    pub line: usize,
    #[source]
    pub source: SignatureParseError,
}

impl MethodFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter list: one signature per line, blank lines and
    /// `#`-comments skipped. Reports the 1-based line of the first
    /// malformed entry.
    pub fn from_text(text: &str) -> Result<Self, FilterError> {
        let mut methods = HashSet::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let signature = parse_signature(line).map_err(|source| FilterError {
                line: index + 1,
                source,
            })?;
            methods.insert(signature);
        }
        Ok(Self { methods })
    }

    pub fn insert(&mut self, signature: MethodSignature) {
        self.methods.insert(signature);
    }

    pub fn contains(&self, signature: &MethodSignature) -> bool {
        self.methods.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_list_with_comments() {
        let filter = MethodFilter::from_text(
            "# methods under test\nFoo.Bar(int)\n\nAcme.Storage.Flush()\n",
        )
        .unwrap();
        assert_eq!(filter.len(), 2);

        let probe = parse_signature("Foo.Bar( int )").unwrap();
        assert!(filter.contains(&probe));
    }

    #[test]
    fn test_reports_offending_line() {
        let err = MethodFilter::from_text("Foo.Bar(int)\nnot a signature\n").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
