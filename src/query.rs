use crate::error::SiseError;

/// A validated search query.
///
/// Construction is the only place an empty query is rejected, so every
/// matcher can assume at least one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw:    String,
    tokens: Vec<String>,
}

impl SearchQuery {
    /// Split `raw` on whitespace.
    ///
    /// # Errors
    ///
    /// [`SiseError::Argument`] when `raw` holds no token at all.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SiseError> {
        let raw = raw.into();
        let tokens: Vec<String> = raw.split_whitespace().map(str::to_owned).collect();
        if tokens.is_empty() {
            return Err(SiseError::Argument("search text required".into()));
        }
        Ok(Self { raw, tokens })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Tokens in the order they were typed.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let q = SearchQuery::parse("  alpha\tbeta   gamma ").unwrap();
        assert_eq!(q.tokens(), ["alpha", "beta", "gamma"]);
        assert_eq!(q.raw(), "  alpha\tbeta   gamma ");
    }

    #[test]
    fn empty_and_blank_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let err = SearchQuery::parse(raw).unwrap_err();
            assert!(matches!(err, SiseError::Argument(_)));
            assert_eq!(err.to_string(), "search text required");
        }
    }
}
