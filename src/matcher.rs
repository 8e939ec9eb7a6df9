use std::borrow::Cow;

use crate::query::SearchQuery;
use crate::traits::Matcher;

/// How the query is compared against a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Every token must appear on some line. Tokens may hit different lines.
    #[default]
    Terms,
    /// The raw query must appear verbatim within one line.
    Phrase,
}

impl MatchStrategy {
    /// Build the matcher for `query` under this strategy.
    pub fn matcher(self, query: &SearchQuery, ignore_case: bool) -> Box<dyn Matcher> {
        match self {
            Self::Terms  => Box::new(TermMatcher::new(query, ignore_case)),
            Self::Phrase => Box::new(PhraseMatcher::new(query, ignore_case)),
        }
    }
}

fn fold(s: &str, ignore_case: bool) -> Cow<'_, str> {
    if ignore_case {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

// ---------------------------------------------------------------------------
// TermMatcher
// ---------------------------------------------------------------------------

/// Matches when each token is a substring of at least one line.
///
/// With a single token this is a plain substring search.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    tokens:      Vec<String>,
    ignore_case: bool,
}

impl TermMatcher {
    pub fn new(query: &SearchQuery, ignore_case: bool) -> Self {
        Self {
            tokens: query.tokens().iter().map(|t| fold(t, ignore_case).into_owned()).collect(),
            ignore_case,
        }
    }
}

impl Matcher for TermMatcher {
    fn is_match(&self, text: &str) -> bool {
        if self.tokens.is_empty() {
            return false;
        }

        let mut pending = vec![true; self.tokens.len()];
        let mut left = self.tokens.len();

        for line in text.lines() {
            let line = fold(line, self.ignore_case);
            for (token, open) in self.tokens.iter().zip(pending.iter_mut()) {
                if *open && line.contains(token.as_str()) {
                    *open = false;
                    left -= 1;
                }
            }
            if left == 0 {
                return true;
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// PhraseMatcher
// ---------------------------------------------------------------------------

/// Matches when the whole query text occurs within a single line.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    phrase:      String,
    ignore_case: bool,
}

impl PhraseMatcher {
    pub fn new(query: &SearchQuery, ignore_case: bool) -> Self {
        Self {
            phrase: fold(query.raw().trim(), ignore_case).into_owned(),
            ignore_case,
        }
    }
}

impl Matcher for PhraseMatcher {
    fn is_match(&self, text: &str) -> bool {
        text.lines()
            .any(|line| fold(line, self.ignore_case).contains(self.phrase.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(q: &str) -> TermMatcher {
        TermMatcher::new(&SearchQuery::parse(q).unwrap(), false)
    }

    #[test]
    fn single_token_is_substring() {
        let m = terms("x");
        assert!(m.is_match("first line\nbox of tools\n"));
        assert!(!m.is_match("nothing here\n"));
    }

    #[test]
    fn tokens_may_match_on_different_lines() {
        let m = terms("foo bar");
        assert!(m.is_match("there is foo\nand then bar\n"));
        assert!(!m.is_match("only foo here\nfoo again\n"));
    }

    #[test]
    fn every_token_is_required() {
        let m = terms("alpha beta gamma");
        assert!(m.is_match("alpha\nbeta\ngamma\n"));
        assert!(m.is_match("gamma beta alpha"));
        assert!(!m.is_match("alpha\nbeta\n"));
    }

    #[test]
    fn repeated_token_needs_one_line() {
        assert!(terms("tag tag").is_match("one tag\n"));
    }

    #[test]
    fn empty_text_never_matches() {
        assert!(!terms("a").is_match(""));
    }

    #[test]
    fn case_folding_is_opt_in() {
        let q = SearchQuery::parse("Gaps").unwrap();
        assert!(!TermMatcher::new(&q, false).is_match("adds gaps between windows"));
        assert!(TermMatcher::new(&q, true).is_match("adds gaps between windows"));
    }

    #[test]
    fn folding_borrows_unless_ignoring_case() {
        assert!(matches!(fold("Gaps", false), Cow::Borrowed("Gaps")));
        assert_eq!(fold("Gaps", true), "gaps");
    }

    #[test]
    fn phrase_needs_contiguous_text() {
        let q = SearchQuery::parse("useless gaps").unwrap();
        let m = PhraseMatcher::new(&q, false);
        assert!(m.is_match("adds useless gaps between windows\n"));
        assert!(!m.is_match("useless\ngaps\n"));
        assert!(!m.is_match("gaps useless\n"));
    }

    #[test]
    fn strategy_builds_matching_kind() {
        let q = SearchQuery::parse("foo bar").unwrap();
        let text = "foo\nbar\n";
        assert!(MatchStrategy::Terms.matcher(&q, false).is_match(text));
        assert!(!MatchStrategy::Phrase.matcher(&q, false).is_match(text));
    }
}
