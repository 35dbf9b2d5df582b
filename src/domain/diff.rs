/// Raw output of `git diff --cached`, captured once per invocation.
#[derive(Debug, Clone)]
pub struct StagedDiff(String);

impl StagedDiff {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_diff_counts_as_empty() {
        assert!(StagedDiff::new("").is_empty());
        assert!(StagedDiff::new("  \n\t\n").is_empty());
        assert!(!StagedDiff::new("+line").is_empty());
    }
}
